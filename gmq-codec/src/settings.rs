use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::v5::UnknownPropertyPolicy;

/// Codec settings.
///
/// Sizes are in bytes, `0` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub max_inbound_size: u32,
    #[serde(default)]
    pub max_outbound_size: u32,
    #[serde(default)]
    pub unknown_property: UnknownPropertyPolicy,
}

impl Settings {
    /// Loads settings from `/etc/gmq/codec` and `gmq-codec` config files, then `GMQ_*`
    /// environment variables, then `cfg_name` when given. Missing files are skipped.
    pub fn load(cfg_name: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::with_name("/etc/gmq/codec").required(false))
            .add_source(File::with_name("gmq-codec").required(false))
            .add_source(Environment::with_prefix("gmq").try_parsing(true));

        if let Some(cfg) = cfg_name {
            builder = builder.add_source(File::with_name(cfg).required(false));
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        log::debug!("Codec settings: {:?}", settings);
        Ok(settings)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let settings = Config::builder().add_source(File::from_str(s, FileFormat::Toml)).build()?.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml() {
        let settings = Settings::from_toml(
            r#"
            max_inbound_size = 1048576
            max_outbound_size = 65536
            unknown_property = "reject"
            "#,
        )
        .unwrap();
        assert_eq!(settings.max_inbound_size, 1_048_576);
        assert_eq!(settings.max_outbound_size, 65_536);
        assert_eq!(settings.unknown_property, UnknownPropertyPolicy::Reject);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("max_inbound_size = 10").unwrap();
        assert_eq!(settings.max_outbound_size, 0);
        assert_eq!(settings.unknown_property, UnknownPropertyPolicy::Discard);

        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_policy() {
        assert!(Settings::from_toml(r#"unknown_property = "skip""#).is_err());
    }

    #[test]
    fn test_load_from_env() {
        std::env::set_var("GMQ_MAX_INBOUND_SIZE", "4096");
        let res = Settings::load(None);
        std::env::remove_var("GMQ_MAX_INBOUND_SIZE");
        assert_eq!(res.unwrap().max_inbound_size, 4096);
    }

    #[test]
    fn test_load_missing_file() {
        let settings = Settings::load(Some("/nonexistent/gmq-codec-test")).unwrap();
        assert_eq!(settings.unknown_property, UnknownPropertyPolicy::default());
    }
}
