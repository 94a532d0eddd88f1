//! Daemon status command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, DaemonHealth, DaemonReadiness};
use crate::output::{color_status, format_timestamp, print_info, OutputFormat};

/// Row for the component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
}

/// Show daemon health and readiness
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: DaemonHealth = client.get("healthz").await?;
    let readiness: DaemonReadiness = client.get("readyz").await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "health": health,
                "readiness": readiness,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            print_info(&format!("Overall: {}", color_status(&health.status)));
            match &readiness.reason {
                Some(reason) => print_info(&format!("Ready: {} ({})", readiness.ready, reason)),
                None => print_info(&format!("Ready: {}", readiness.ready)),
            }

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    component: name.clone(),
                    status: color_status(&component.status),
                    message: component.message.clone().unwrap_or_default(),
                    last_check: format_timestamp(component.last_check_timestamp),
                })
                .collect();
            rows.sort_by(|a, b| a.component.cmp(&b.component));

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
