//! Sensor catalog and threshold command handlers.

use tabled::Tabled;

use fabwatch_core::{Console, Sensor, ThresholdField};

use crate::cli::{GlobalOpts, SensorsArgs, SensorsCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Sensor")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
}

impl From<&Sensor> for SensorRow {
    fn from(s: &Sensor) -> Self {
        Self {
            id: s.sensor_id.clone(),
            name: s.name.clone(),
            unit: s.unit.clone().unwrap_or_else(|| "-".into()),
            min: s.min_value.map_or_else(|| "-".into(), |v| v.to_string()),
            max: s.max_value.map_or_else(|| "-".into(), |v| v.to_string()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SensorsCommand::List { page } => {
            let mut editor = console.threshold_editor();
            editor.load().await?;
            editor.set_page(page);

            let out = output::render_list(
                &global.output,
                editor.page_sensors(),
                |s| SensorRow::from(s),
                |s| s.sensor_id.clone(),
            );
            output::print_output(&out, global.quiet);

            if !global.quiet && matches!(global.output, crate::cli::OutputFormat::Table) {
                eprintln!(
                    "Page {} / {} ({} sensors)",
                    editor.page(),
                    editor.total_pages(),
                    editor.sensors().len()
                );
            }
            Ok(())
        }

        SensorsCommand::SetThresholds { sensor_id, min, max } => {
            let mut editor = console.threshold_editor();
            editor.load().await?;

            editor.set_draft(&sensor_id, ThresholdField::Min, min);
            editor.set_draft(&sensor_id, ThresholdField::Max, max);
            editor.save(&sensor_id).await?;

            // The editor refetched the catalog on success; report the
            // authoritative values.
            let persisted = editor
                .sensors()
                .iter()
                .find(|s| s.sensor_id == sensor_id)
                .cloned();

            if !global.quiet {
                match persisted {
                    Some(s) => eprintln!(
                        "Thresholds updated for {}: min={}, max={}",
                        s.sensor_id,
                        s.min_value.map_or_else(|| "-".into(), |v| v.to_string()),
                        s.max_value.map_or_else(|| "-".into(), |v| v.to_string()),
                    ),
                    None => eprintln!("Thresholds updated for {sensor_id}"),
                }
            }
            Ok(())
        }
    }
}
