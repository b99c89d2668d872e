pub mod cli;
pub mod static_data;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::{OutputConfig, TomlConfig};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "stock-finder")]
#[command(about = "Find which branches have the tracked products in stock")]
pub struct CliConfig {
    /// Path to TOML configuration file; built-in defaults are used when absent
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub branches_file: Option<String>,

    #[arg(long)]
    pub products_file: Option<String>,

    /// Only scan these branch codes (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub branches: Vec<String>,

    #[arg(long)]
    pub batch_count: Option<usize>,

    #[arg(long)]
    pub chunk_count: Option<usize>,

    /// Directory to write the report into
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long, value_parser = ["json", "csv"])]
    pub format: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Show the scan plan without sending any requests")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_toml(&self) -> crate::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(path) = &self.branches_file {
            config.data.branches_file = path.clone();
        }
        if let Some(path) = &self.products_file {
            config.data.products_file = path.clone();
        }
        if let Some(count) = self.batch_count {
            config.scan.batch_count = count;
        }
        if let Some(count) = self.chunk_count {
            config.scan.chunk_count = count;
        }
        if let Some(path) = &self.output {
            let format = config.output.as_ref().and_then(|o| o.format.clone());
            config.output = Some(OutputConfig {
                path: path.clone(),
                format,
            });
        }
        if let Some(format) = &self.format {
            let output = config.output.get_or_insert_with(|| OutputConfig {
                path: ".".to_string(),
                format: None,
            });
            output.format = Some(format.clone());
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = CliConfig::parse_from([
            "stock-finder",
            "--branches-file",
            "b.json",
            "--batch-count",
            "2",
            "--output",
            "./reports",
            "--format",
            "csv",
            "--branches",
            "101,205",
        ]);

        let config = cli.load_toml().unwrap();

        assert_eq!(config.data.branches_file, "b.json");
        assert_eq!(config.data.products_file, "./productIds.json");
        assert_eq!(config.scan.batch_count, 2);
        assert_eq!(config.scan.chunk_count, 3);
        assert_eq!(config.output_path(), Some("./reports"));
        assert_eq!(config.output_format(), "csv");
        assert_eq!(cli.branches, vec!["101".to_string(), "205".to_string()]);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let result = CliConfig::try_parse_from(["stock-finder", "--format", "xml"]);
        assert!(result.is_err());
    }
}
