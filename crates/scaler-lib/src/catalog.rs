//! Configuration catalog: the fixed set of resource shapes a service can run as

use crate::error::EngineError;
use crate::models::ResourceConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Ordered, read-only set of named resource configurations.
///
/// Catalog invariant: configuration ids sort ascending by resource cost
/// ("C1" is the smallest shape, "C5" the largest), so the lexicographically
/// smallest id is also the cheapest. The selector's tie-break depends on
/// this naming convention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationCatalog {
    configs: BTreeMap<String, ResourceConfig>,
}

impl ConfigurationCatalog {
    pub fn new(configs: BTreeMap<String, ResourceConfig>) -> Self {
        Self { configs }
    }

    /// Load a catalog definition from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file {:?}", path))?;
        let catalog: Self = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse catalog file {:?}", path))?;
        if catalog.is_empty() {
            anyhow::bail!("catalog file {:?} defines no configurations", path);
        }
        Ok(catalog)
    }

    pub fn get(&self, config_id: &str) -> Option<&ResourceConfig> {
        self.configs.get(config_id)
    }

    /// Look up a configuration, failing with the engine taxonomy when the
    /// id is not part of the catalog.
    pub fn resolve(&self, config_id: &str) -> Result<&ResourceConfig, EngineError> {
        self.configs
            .get(config_id)
            .ok_or_else(|| EngineError::UnknownConfiguration {
                config_id: config_id.to_string(),
            })
    }

    pub fn contains(&self, config_id: &str) -> bool {
        self.configs.contains_key(config_id)
    }

    /// The first (cheapest, by the naming invariant) configuration id.
    pub fn first_id(&self) -> Option<&str> {
        self.configs.keys().next().map(String::as_str)
    }

    /// Configuration ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceConfig)> {
        self.configs.iter().map(|(id, cfg)| (id.as_str(), cfg))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(cpu: u32, mem: u64, replicas: u32) -> ResourceConfig {
        ResourceConfig {
            cpu_request_millicores: cpu,
            cpu_limit_millicores: cpu * 2,
            memory_request_bytes: mem,
            memory_limit_bytes: mem * 2,
            replicas,
        }
    }

    fn test_catalog() -> ConfigurationCatalog {
        let mut configs = BTreeMap::new();
        configs.insert("C1".to_string(), resource(200, 200 * 1024 * 1024, 1));
        configs.insert("C2".to_string(), resource(400, 300 * 1024 * 1024, 1));
        configs.insert("C3".to_string(), resource(600, 500 * 1024 * 1024, 2));
        ConfigurationCatalog::new(configs)
    }

    #[test]
    fn test_ids_in_ascending_order() {
        let catalog = test_catalog();
        let ids: Vec<_> = catalog.ids().collect();
        assert_eq!(ids, vec!["C1", "C2", "C3"]);
        assert_eq!(catalog.first_id(), Some("C1"));
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let catalog = test_catalog();
        assert!(catalog.resolve("C2").is_ok());

        let err = catalog.resolve("C9").unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownConfiguration { ref config_id } if config_id == "C9"
        ));
    }

    #[test]
    fn test_load_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let json = serde_json::json!({
            "C1": {
                "cpu_request_millicores": 200,
                "cpu_limit_millicores": 400,
                "memory_request_bytes": 209715200,
                "memory_limit_bytes": 314572800,
                "replicas": 1
            },
            "C2": {
                "cpu_request_millicores": 400,
                "cpu_limit_millicores": 600,
                "memory_request_bytes": 314572800,
                "memory_limit_bytes": 524288000,
                "replicas": 1
            }
        });
        std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

        let catalog = ConfigurationCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("C1").unwrap().cpu_request_millicores, 200);
        assert_eq!(catalog.get("C2").unwrap().replicas, 1);
    }

    #[test]
    fn test_load_rejects_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(ConfigurationCatalog::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(ConfigurationCatalog::load(&path).is_err());
    }
}
