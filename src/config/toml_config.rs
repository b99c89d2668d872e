use crate::core::pacer::FixedDelayPacer;
use crate::core::scanner::ScanSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StockError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_INVENTORY_URL: &str =
    "https://spinventoryapp.super-pharm.co.il/api/InventoryCheck/CheckInventory";
pub const DEFAULT_BRANCHES_URL: &str = "https://shop.super-pharm.co.il/branches/filter?q=&page={page}&buildFacets=true&selectedCity=&clinic=&service=&brand=&branch=&ignoreDistanceLimit=true";

pub const OUTPUT_FORMATS: [&str; 2] = ["json", "csv"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub data: DataConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub inventory_url: String,
    pub branches_url: String,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub batch_count: usize,
    pub chunk_count: usize,
    pub probe_delay_ms: u64,
    pub batch_cooldown_secs: u64,
    pub failure_backoff_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_count: 6,
            chunk_count: 3,
            probe_delay_ms: 1000,
            batch_cooldown_secs: 30,
            failure_backoff_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub branches_file: String,
    pub products_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            branches_file: "./sfBranchCodes.json".to_string(),
            products_file: "./productIds.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub format: Option<String>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointsConfig {
                inventory_url: DEFAULT_INVENTORY_URL.to_string(),
                branches_url: DEFAULT_BRANCHES_URL.to_string(),
                request_timeout_secs: None,
            },
            scan: ScanConfig::default(),
            data: DataConfig::default(),
            output: None,
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StockError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StockError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StockError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("endpoints.inventory_url", &self.endpoints.inventory_url)?;
        validation::validate_url("endpoints.branches_url", &self.endpoints.branches_url)?;
        if !self.endpoints.branches_url.contains("{page}") {
            return Err(StockError::InvalidConfigValueError {
                field: "endpoints.branches_url".to_string(),
                value: self.endpoints.branches_url.clone(),
                reason: "URL must contain a {page} placeholder".to_string(),
            });
        }
        if let Some(timeout) = self.endpoints.request_timeout_secs {
            validation::validate_range("endpoints.request_timeout_secs", timeout, 1, 600)?;
        }

        validation::validate_positive_number("scan.batch_count", self.scan.batch_count, 1)?;
        validation::validate_range("scan.chunk_count", self.scan.chunk_count, 1, 64)?;

        validation::validate_path("data.branches_file", &self.data.branches_file)?;
        validation::validate_path("data.products_file", &self.data.products_file)?;

        if let Some(output) = &self.output {
            validation::validate_path("output.path", &output.path)?;
            if let Some(format) = &output.format {
                validation::validate_one_of("output.format", format, &OUTPUT_FORMATS)?;
            }
        }

        Ok(())
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            batch_count: self.scan.batch_count,
            chunk_count: self.scan.chunk_count,
        }
    }

    pub fn pacer(&self) -> FixedDelayPacer {
        FixedDelayPacer::new(
            Duration::from_millis(self.scan.probe_delay_ms),
            Duration::from_secs(self.scan.batch_cooldown_secs),
            Duration::from_secs(self.scan.failure_backoff_secs),
        )
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.path.as_str())
    }

    pub fn output_format(&self) -> &str {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .unwrap_or("json")
    }
}

impl ConfigProvider for TomlConfig {
    fn inventory_endpoint(&self) -> &str {
        &self.endpoints.inventory_url
    }

    fn branches_endpoint(&self) -> &str {
        &self.endpoints.branches_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoints.request_timeout_secs.unwrap_or(30))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[endpoints]
inventory_url = "https://inventory.example.com/api/CheckInventory"
branches_url = "https://shop.example.com/branches/filter?page={page}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.scan.batch_count, 6);
        assert_eq!(config.scan.chunk_count, 3);
        assert_eq!(config.scan.batch_cooldown_secs, 30);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.output_format(), "json");
        assert!(config.output_path().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[endpoints]
inventory_url = "https://inventory.example.com/api/CheckInventory"
branches_url = "https://shop.example.com/branches/filter?page={page}"
request_timeout_secs = 5

[scan]
batch_count = 4
chunk_count = 2
probe_delay_ms = 250
batch_cooldown_secs = 12
failure_backoff_secs = 3

[data]
branches_file = "./branches.json"
products_file = "./products.json"

[output]
path = "./out"
format = "csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.scan_settings().batch_count, 4);
        assert_eq!(config.scan_settings().chunk_count, 2);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.output_path(), Some("./out"));
        assert_eq!(config.output_format(), "csv");
        assert_eq!(config.pacer().batch_cooldown, Duration::from_secs(12));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STOCK_FINDER_TEST_INVENTORY", "https://test.inventory.com/check");

        let toml_content = r#"
[endpoints]
inventory_url = "${STOCK_FINDER_TEST_INVENTORY}"
branches_url = "https://shop.example.com/branches?page={page}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoints.inventory_url, "https://test.inventory.com/check");

        std::env::remove_var("STOCK_FINDER_TEST_INVENTORY");
    }

    #[test]
    fn test_config_validation() {
        let mut config = TomlConfig::default();
        assert!(config.validate().is_ok());

        config.endpoints.inventory_url = "invalid-url".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.endpoints.branches_url = "https://shop.example.com/branches".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.scan.batch_count = 0;
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.output = Some(OutputConfig {
            path: "./out".to_string(),
            format: Some("xml".to_string()),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[endpoints\ninventory_url = 1").unwrap_err();
        assert!(matches!(err, StockError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[endpoints]
inventory_url = "https://inventory.example.com/check"
branches_url = "https://shop.example.com/branches?page={page}"

[data]
branches_file = "b.json"
products_file = "p.json"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.data.branches_file, "b.json");
    }
}
