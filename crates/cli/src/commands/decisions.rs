//! Decision inspection command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, DecisionRecord};
use crate::output::{color_status, format_timestamp, print_warning, OutputFormat};

/// Row for the decisions table
#[derive(Tabled)]
struct DecisionRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Candidate")]
    candidate: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Previous")]
    previous: String,
    #[tabled(rename = "Top Score")]
    top_score: String,
    #[tabled(rename = "Evaluated")]
    evaluated: String,
}

/// Show the latest decision per service, optionally filtered
pub async fn show_decisions(
    client: &ApiClient,
    service: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let records: Vec<DecisionRecord> = client.get("decisions").await?;

    let filtered: Vec<_> = records
        .into_iter()
        .filter(|r| {
            service
                .as_ref()
                .map(|s| r.service.contains(s.as_str()))
                .unwrap_or(true)
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        OutputFormat::Table => {
            if filtered.is_empty() {
                print_warning("No decisions recorded yet");
                return Ok(());
            }

            let rows: Vec<DecisionRow> = filtered
                .iter()
                .map(|r| DecisionRow {
                    service: r.service.clone(),
                    namespace: r.namespace.clone(),
                    candidate: r.candidate.clone(),
                    action: color_status(&r.action),
                    current: r.current_config.clone(),
                    previous: r.previous_config.clone(),
                    top_score: r
                        .scores
                        .get(&r.candidate)
                        .map(|s| format!("{:.2}", s))
                        .unwrap_or_default(),
                    evaluated: format_timestamp(r.evaluated_at),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nTotal: {} services", filtered.len());
        }
    }

    Ok(())
}
