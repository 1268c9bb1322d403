pub mod cli;
pub mod toml_config;

use crate::app::report::SUPPORTED_FORMATS;
use crate::domain::model::ScanOptions;
use crate::utils::error::Result;
use crate::utils::validation;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::DisplaySettings;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const MAX_RANGE_SPAN_LIMIT: u32 = 100;

/// 掃描前所有入口共用的設定檢查
pub struct ScanSettings<'a> {
    pub catalog_path: &'a str,
    pub inputs: &'a [String],
    pub output_path: &'a str,
    pub output_formats: &'a [String],
    pub concurrency: usize,
    pub options: ScanOptions,
}

pub fn validate_scan_settings(settings: &ScanSettings<'_>) -> Result<()> {
    validation::validate_path("catalog", settings.catalog_path)?;
    validation::validate_file_extensions(
        "catalog",
        &[settings.catalog_path.to_string()],
        &["json"],
    )?;

    validation::validate_non_empty_list("inputs", settings.inputs)?;
    for input in settings.inputs {
        validation::validate_path("inputs", input)?;
    }

    validation::validate_path("output_path", settings.output_path)?;
    validation::validate_non_empty_list("formats", settings.output_formats)?;
    validation::validate_allowed_values("formats", settings.output_formats, SUPPORTED_FORMATS)?;

    validation::validate_positive_number("concurrency", settings.concurrency, 1)?;
    validation::validate_range(
        "max_range_span",
        settings.options.max_range_span,
        1,
        MAX_RANGE_SPAN_LIMIT,
    )?;

    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "course-lens")]
#[command(about = "Find course codes in documents and resolve them against a course catalog")]
pub struct CliConfig {
    /// Catalog JSON produced by build_catalog
    #[arg(long, default_value = "data/catalog.json")]
    pub catalog: String,

    /// Documents to scan (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub inputs: Vec<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Report formats: json, csv, text
    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub formats: Vec<String>,

    #[arg(long, default_value = "4")]
    pub concurrency: usize,

    #[arg(long, default_value = "20")]
    pub max_range_span: u32,

    /// Never split compounds like "APh/EE 23/24" into separate courses
    #[arg(long)]
    pub no_compound_expansion: bool,

    /// Parse every input as HTML
    #[arg(long)]
    pub html: bool,

    #[arg(long)]
    pub hide_units: bool,

    #[arg(long)]
    pub hide_terms: bool,

    #[arg(long)]
    pub hide_prerequisites: bool,

    #[arg(long)]
    pub show_description: bool,

    #[arg(long)]
    pub show_instructors: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system resource usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog
    }

    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            max_range_span: self.max_range_span,
            expand_compounds: !self.no_compound_expansion,
        }
    }

    fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            show_units: !self.hide_units,
            show_terms: !self.hide_terms,
            show_prerequisites: !self.hide_prerequisites,
            show_description: self.show_description,
            show_instructors: self.show_instructors,
        }
    }

    fn force_html(&self) -> bool {
        self.html
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_scan_settings(&ScanSettings {
            catalog_path: &self.catalog,
            inputs: &self.inputs,
            output_path: &self.output_path,
            output_formats: &self.formats,
            concurrency: self.concurrency,
            options: self.scan_options(),
        })
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::utils::error::LensError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["course-lens"];
        argv.extend_from_slice(args);
        CliConfig::parse_from(argv)
    }

    #[test]
    fn test_cli_defaults() {
        let config = parse(&["--inputs", "a.txt,b.html"]);
        assert_eq!(config.inputs, vec!["a.txt", "b.html"]);
        assert_eq!(config.formats, vec!["json"]);
        assert_eq!(config.scan_options(), ScanOptions::default());
        assert_eq!(config.display_settings(), DisplaySettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_flags_map_to_settings() {
        let config = parse(&[
            "--inputs",
            "a.txt",
            "--formats",
            "csv,text",
            "--max-range-span",
            "5",
            "--no-compound-expansion",
            "--hide-terms",
            "--show-instructors",
        ]);
        assert_eq!(config.formats, vec!["csv", "text"]);
        assert_eq!(
            config.scan_options(),
            ScanOptions {
                max_range_span: 5,
                expand_compounds: false
            }
        );
        let display = config.display_settings();
        assert!(!display.show_terms);
        assert!(display.show_instructors);
    }

    #[test]
    fn test_cli_validation() {
        assert!(matches!(
            parse(&[]).validate(),
            Err(LensError::MissingConfigError { .. })
        ));
        assert!(parse(&["--inputs", "a.txt", "--formats", "xml"]).validate().is_err());
        assert!(parse(&["--inputs", "a.txt", "--concurrency", "0"]).validate().is_err());
        assert!(parse(&["--inputs", "a.txt", "--max-range-span", "101"]).validate().is_err());
        assert!(parse(&["--inputs", "a.txt", "--catalog", "catalog.csv"]).validate().is_err());
    }
}
