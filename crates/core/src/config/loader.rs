use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from a TOML file, then apply `STOREFRONT_` environment
/// overrides. Nested keys use a double underscore, so
/// `STOREFRONT_CATALOG__PAGE_SIZE=24` sets `catalog.page_size`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("STOREFRONT_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SortKey;
    use figment::Jail;

    const BASE: &str = r#"
[catalog]
page_size = 10
default_sort = "popularity-desc"

[queue]
storage_key = "offlineQueue"
"#;

    #[test]
    fn test_env_overrides_nested_catalog_keys() {
        Jail::expect_with(|jail| {
            jail.create_file("storefront.toml", BASE)?;
            jail.set_env("STOREFRONT_CATALOG__PAGE_SIZE", "24");
            jail.set_env("STOREFRONT_CATALOG__DEFAULT_SORT", "price-asc");

            let config = load_config(Path::new("storefront.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.catalog.page_size, 24);
            assert_eq!(config.catalog.default_sort, SortKey::PriceAsc);
            assert_eq!(config.queue.storage_key, "offlineQueue");
            Ok(())
        });
    }

    #[test]
    fn test_env_sort_key_must_be_known() {
        Jail::expect_with(|jail| {
            jail.create_file("storefront.toml", BASE)?;
            jail.set_env("STOREFRONT_CATALOG__DEFAULT_SORT", "alphabetical");

            let err = load_config(Path::new("storefront.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError(_)));
            Ok(())
        });
    }

    #[test]
    fn test_file_settings_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "storefront.toml",
                r#"
[connectivity]
probe_url = "http://127.0.0.1:3000/api/v1/health"
poll_interval_ms = 1000

[catalog]
simulated_latency_ms = 250
"#,
            )?;

            let config = load_config(Path::new("storefront.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.connectivity.poll_interval_ms, 1000);
            assert_eq!(config.connectivity.timeout_ms, 3000);
            assert_eq!(config.catalog.simulated_latency_ms, Some(250));
            assert_eq!(config.catalog.default_sort, SortKey::PopularityDesc);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_str_rejects_bad_page_size() {
        let err = load_config_from_str("[catalog]\npage_size = \"ten\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/storefront.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }
}
