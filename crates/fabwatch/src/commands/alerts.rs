//! Historical alert log command handlers.

use tabled::Tabled;

use fabwatch_core::{AlertLog, AlertRecord, Console, FilterUpdate, format_timestamp};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Alert")]
    alert_type: String,
    #[tabled(rename = "Sensor")]
    sensor: String,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Started")]
    started: String,
}

impl From<&AlertRecord> for AlertRow {
    fn from(r: &AlertRecord) -> Self {
        Self {
            alert_type: r.alert_type.clone().unwrap_or_else(|| "Threshold Alert".into()),
            sensor: r.sensor_id.clone().unwrap_or_else(|| "-".into()),
            module: r.digital_module_id.clone().unwrap_or_else(|| "-".into()),
            status: r.status.map_or_else(|| "-".into(), |s| s.to_string()),
            started: r
                .started_at
                .as_deref()
                .map_or_else(|| "N/A".into(), format_timestamp),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlertsCommand::Query {
            sensor,
            module,
            status,
            from,
            to,
            page,
            page_size,
        } => {
            let mut log = match page_size {
                Some(size) => AlertLog::with_page_size(console.client(), size),
                None => console.alert_log(),
            };

            log.set_filter(FilterUpdate {
                sensor_id: sensor,
                digital_module_id: module,
                status,
                from,
                to,
            });

            log.search().await?;
            log.set_page(page);

            let out = output::render_list(&global.output, log.page_records(), |r| AlertRow::from(r), |r| {
                r.alert_id.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);

            if !global.quiet && matches!(global.output, crate::cli::OutputFormat::Table) {
                eprintln!(
                    "Page {} / {} ({} alerts)",
                    log.page(),
                    log.total_pages(),
                    log.records().len()
                );
            }
            Ok(())
        }
    }
}
