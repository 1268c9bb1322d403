use crate::config::{validate_scan_settings, ScanSettings};
use crate::core::ConfigProvider;
use crate::domain::model::{DisplaySettings, ScanOptions};
use crate::utils::error::{LensError, Result};
use crate::utils::validation::{self, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("Failed to compile env var regex"));

const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub scan: ScanSection,
    pub catalog: CatalogSection,
    pub input: InputSection,
    #[serde(default)]
    pub options: ScanOptions,
    #[serde(default)]
    pub display: DisplaySettings,
    pub output: OutputSection,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSection {
    pub name: String,
    pub description: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSection {
    pub paths: Vec<String>,
    /// 所有輸入都當作 HTML 處理
    pub html: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LensError::ConfigError {
                message: format!("Config file '{}' not found", path.display()),
            });
        }
        let content = std::fs::read_to_string(path).map_err(LensError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LensError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_scan_settings(&ScanSettings {
            catalog_path: &self.catalog.path,
            inputs: &self.input.paths,
            output_path: &self.output.path,
            output_formats: &self.output.formats,
            concurrency: self.concurrency(),
            options: self.options,
        })
        .map_err(qualify_field)?;

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.clone()) {
            validation::validate_allowed_values(
                "monitoring.log_format",
                &[format],
                &["compact", "json"],
            )?;
        }

        Ok(())
    }

    pub fn concurrency(&self) -> usize {
        self.scan.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

/// 把欄位名稱對應回 TOML 區段
fn qualify_field(error: LensError) -> LensError {
    let section = |field: &str| match field {
        "catalog" => "catalog.path".to_string(),
        "inputs" => "input.paths".to_string(),
        "output_path" => "output.path".to_string(),
        "formats" => "output.formats".to_string(),
        "concurrency" => "scan.concurrency".to_string(),
        "max_range_span" => "options.max_range_span".to_string(),
        other => other.to_string(),
    };

    match error {
        LensError::InvalidConfigValueError {
            field,
            value,
            reason,
        } => LensError::InvalidConfigValueError {
            field: section(&field),
            value,
            reason,
        },
        LensError::MissingConfigError { field } => LensError::MissingConfigError {
            field: section(&field),
        },
        other => other,
    }
}

impl ConfigProvider for TomlConfig {
    fn catalog_path(&self) -> &str {
        &self.catalog.path
    }

    fn inputs(&self) -> &[String] {
        &self.input.paths
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn concurrency(&self) -> usize {
        self.concurrency()
    }

    fn scan_options(&self) -> ScanOptions {
        self.options
    }

    fn display_settings(&self) -> DisplaySettings {
        self.display
    }

    fn force_html(&self) -> bool {
        self.input.html.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
