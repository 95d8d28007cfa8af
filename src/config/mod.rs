pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::ReconCategory;
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::LEDGER_EXTENSIONS;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use toml_config::TomlConfig;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8080/api/v1";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Effective settings after merging flags, the TOML file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base: String,
    pub output_path: String,
    pub timeout_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ClientSettings {
    /// Flag values win over the file, the file over built-in defaults.
    pub fn merge(
        file: Option<&TomlConfig>,
        api_base: Option<&str>,
        output_path: Option<&str>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        let mut settings = match file {
            Some(file) => Self {
                api_base: file.api_base().to_string(),
                output_path: file.output_path().to_string(),
                timeout_seconds: file.timeout_seconds(),
            },
            None => Self::default(),
        };

        if let Some(api_base) = api_base {
            settings.api_base = api_base.to_string();
        }
        if let Some(output_path) = output_path {
            settings.output_path = output_path.to_string();
        }
        if let Some(timeout_seconds) = timeout_seconds {
            settings.timeout_seconds = timeout_seconds;
        }
        settings
    }
}

impl ConfigProvider for ClientSettings {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base", &self.api_base)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "recon-client")]
#[command(about = "Submit two ledgers for reconciliation and preview or download the result")]
pub struct CliConfig {
    /// Partner / switch ledger (.xlsx or .xls)
    #[arg(long)]
    pub primary: Option<String>,

    /// Bank ledger (.xlsx or .xls)
    #[arg(long)]
    pub secondary: Option<String>,

    /// Reconciliation category: atm, tele, mpesa, tele-incoming
    #[arg(long)]
    pub category: Option<ReconCategory>,

    /// Download the spreadsheet report instead of previewing
    #[arg(long)]
    pub download: bool,

    #[arg(long, help = "Base URL of the reconciliation API")]
    pub api_base: Option<String>,

    #[arg(long, help = "Directory where reports and exports are saved")]
    pub output_path: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Also write the mismatch table as CSV to this file")]
    pub export_csv: Option<String>,

    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Print the available categories and exit")]
    pub list_categories: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn settings(&self) -> Result<ClientSettings> {
        let file = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Some(file)
            }
            None => None,
        };

        let settings = ClientSettings::merge(
            file.as_ref(),
            self.api_base.as_deref(),
            self.output_path.as_deref(),
            self.timeout_seconds,
        );
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    /// Only checks what was given; missing ledgers are left for the workflow to refuse.
    fn validate(&self) -> Result<()> {
        let ledgers: Vec<String> = [&self.primary, &self.secondary]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        validation::validate_file_extensions("ledger", &ledgers, LEDGER_EXTENSIONS)?;

        if let Some(path) = &self.export_csv {
            validation::validate_path("export_csv", path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_precedence() {
        let file = TomlConfig::from_toml_str(
            r#"
[api]
base_url = "https://file.example.com/api/v1"
timeout_seconds = 30

[output]
path = "./from-file"
"#,
        )
        .unwrap();

        let settings = ClientSettings::merge(
            Some(&file),
            Some("https://flag.example.com/api/v1"),
            None,
            None,
        );

        assert_eq!(settings.api_base, "https://flag.example.com/api/v1");
        assert_eq!(settings.output_path, "./from-file");
        assert_eq!(settings.timeout_seconds, 30);
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = ClientSettings::merge(None, None, None, None);
        assert_eq!(settings, ClientSettings::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let settings = ClientSettings::merge(None, Some("not a url"), None, Some(0));
        assert!(settings.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_parsing() {
        let config = CliConfig::parse_from([
            "recon-client",
            "--primary",
            "eth.xlsx",
            "--secondary",
            "zzb.xls",
            "--category",
            "tele-incoming",
            "--download",
        ]);

        assert_eq!(config.category, Some(ReconCategory::TeleBirrIncoming));
        assert!(config.download);
        assert!(config.validate().is_ok());
        assert_eq!(config.settings().unwrap(), ClientSettings::default());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_rejects_unknown_category_and_csv_ledgers() {
        assert!(CliConfig::try_parse_from(["recon-client", "--category", "swift"]).is_err());

        let config = CliConfig::parse_from(["recon-client", "--primary", "eth.csv"]);
        assert!(config.validate().is_err());
    }
}
