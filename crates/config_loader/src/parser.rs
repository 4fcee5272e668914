//! Configuration parsing (TOML / JSON)

use contracts::{ContractError, DoorwayBlueprint};

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Map a file extension to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse blueprint content in the given format
pub(crate) fn parse(
    content: &str,
    format: ConfigFormat,
) -> Result<DoorwayBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content)
            .map_err(|e| ContractError::config_parse(format!("TOML parse error: {e}"))),
        ConfigFormat::Json => serde_json::from_str(content)
            .map_err(|e| ContractError::config_parse(format!("JSON parse error: {e}"))),
    }
}
