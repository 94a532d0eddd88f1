//! Catalog rendering command

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tabled::Tabled;

use crate::output::{format_bytes, format_cpu, print_warning, OutputFormat};

/// Resource shape as defined in catalog.json
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct CatalogEntry {
    cpu_request_millicores: u32,
    cpu_limit_millicores: u32,
    memory_request_bytes: u64,
    memory_limit_bytes: u64,
    replicas: u32,
}

/// Row for the catalog table
#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "Config")]
    config: String,
    #[tabled(rename = "CPU Req")]
    cpu_request: String,
    #[tabled(rename = "CPU Lim")]
    cpu_limit: String,
    #[tabled(rename = "Mem Req")]
    memory_request: String,
    #[tabled(rename = "Mem Lim")]
    memory_limit: String,
    #[tabled(rename = "Replicas")]
    replicas: String,
}

/// Render a catalog definition file
pub fn show_catalog(file: &str, format: OutputFormat) -> Result<()> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read catalog file '{}'", file))?;
    let catalog: BTreeMap<String, CatalogEntry> =
        serde_json::from_str(&data).with_context(|| format!("Failed to parse '{}'", file))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        OutputFormat::Table => {
            if catalog.is_empty() {
                print_warning("Catalog defines no configurations");
                return Ok(());
            }

            let rows: Vec<CatalogRow> = catalog
                .iter()
                .map(|(id, entry)| CatalogRow {
                    config: id.clone(),
                    cpu_request: format_cpu(entry.cpu_request_millicores),
                    cpu_limit: format_cpu(entry.cpu_limit_millicores),
                    memory_request: format_bytes(entry.memory_request_bytes),
                    memory_limit: format_bytes(entry.memory_limit_bytes),
                    replicas: entry.replicas.to_string(),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::json!({
            "C1": {
                "cpu_request_millicores": 200,
                "cpu_limit_millicores": 400,
                "memory_request_bytes": 209715200,
                "memory_limit_bytes": 314572800,
                "replicas": 1
            }
        });
        std::fs::write(&path, serde_json::to_string(&json).unwrap()).unwrap();

        assert!(show_catalog(path.to_str().unwrap(), OutputFormat::Table).is_ok());
        assert!(show_catalog(path.to_str().unwrap(), OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_show_catalog_missing_file() {
        assert!(show_catalog("/nonexistent/catalog.json", OutputFormat::Table).is_err());
    }
}
