//! # Registry Configuration
//!
//! Loaded once at startup from TOML. Every key is optional:
//!
//! ```toml
//! sparse_page_bits = 11            # 2048 sparse slots per page
//! initial_entity_capacity = 100000
//! initial_component_capacity = 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};
use crate::sparse_set::{DEFAULT_PAGE_BITS, MAX_PAGE_BITS};

/// Tunables for a [`crate::Registry`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// log2 of the sparse page size used by every component storage.
    pub sparse_page_bits: u32,
    /// Entity slots to reserve up front.
    pub initial_entity_capacity: usize,
    /// Component types to reserve up front.
    pub initial_component_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sparse_page_bits: DEFAULT_PAGE_BITS,
            initial_entity_capacity: 0,
            initial_component_capacity: 0,
        }
    }
}

impl RegistryConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`EcsError::ConfigParse`] for malformed TOML or unknown keys,
    /// [`EcsError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`EcsError::ConfigIo`] if the file cannot be read, otherwise as
    /// [`RegistryConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::ConfigIo(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded registry config");
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// [`EcsError::ConfigParse`] if serialization fails.
    pub fn to_toml_string(&self) -> EcsResult<String> {
        toml::to_string(self).map_err(|e| EcsError::ConfigParse(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if `sparse_page_bits` is outside `1..=16`.
    pub fn validate(&self) -> EcsResult<()> {
        if !(1..=MAX_PAGE_BITS).contains(&self.sparse_page_bits) {
            return Err(EcsError::InvalidConfig(format!(
                "sparse_page_bits must be in 1..={MAX_PAGE_BITS}, got {}",
                self.sparse_page_bits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.sparse_page_bits, 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_document() {
        let config = RegistryConfig::from_toml_str("initial_entity_capacity = 500\n")
            .expect("valid config");
        assert_eq!(config.initial_entity_capacity, 500);
        assert_eq!(config.sparse_page_bits, DEFAULT_PAGE_BITS);
        assert_eq!(config.initial_component_capacity, 0);
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(
            RegistryConfig::from_toml_str("").expect("valid config"),
            RegistryConfig::default()
        );
    }

    #[test]
    fn test_rejects_out_of_range_page_bits() {
        for bits in [0, 17, 32] {
            let text = format!("sparse_page_bits = {bits}");
            assert!(matches!(
                RegistryConfig::from_toml_str(&text),
                Err(EcsError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            RegistryConfig::from_toml_str("page_size = 4096"),
            Err(EcsError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RegistryConfig {
            sparse_page_bits: 9,
            initial_entity_capacity: 1_000,
            initial_component_capacity: 8,
        };
        let text = config.to_toml_string().expect("serializable");
        assert_eq!(RegistryConfig::from_toml_str(&text), Ok(config));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("sparsecs_missing_config_does_not_exist.toml");
        assert!(matches!(
            RegistryConfig::load(&path),
            Err(EcsError::ConfigIo(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!("sparsecs_config_{id}.toml"));
        std::fs::write(&path, "sparse_page_bits = 12\n").expect("temp dir writable");

        let config = RegistryConfig::load(&path).expect("valid config");
        assert_eq!(config.sparse_page_bits, 12);

        std::fs::remove_file(&path).ok();
    }
}
