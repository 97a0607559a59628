//! Module fleet listing. Static metadata, no gateway round-trip.

use tabled::Tabled;

use fabwatch_core::DigitalModule;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ModuleRow {
    #[tabled(rename = "Module")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Sensors")]
    sensors: String,
    #[tabled(rename = "Scope")]
    scope: String,
}

impl From<&DigitalModule> for ModuleRow {
    fn from(m: &DigitalModule) -> Self {
        Self {
            id: m.to_string(),
            description: m.description().to_string(),
            sensors: if m.sensor_count() == 0 {
                "-".into()
            } else {
                m.sensor_count().to_string()
            },
            scope: if m.is_log_only() { "log only" } else { "live" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let modules: Vec<DigitalModule> = DigitalModule::all().collect();
    let out = output::render_list(&global.output, &modules, |m| ModuleRow::from(m), |m| m.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
