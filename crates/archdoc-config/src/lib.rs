//! Configuration management for archdoc.
//!
//! Parses `archdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `output.path`
//! - `diagrams.remote_url`
//! - `diagrams.script_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output PDF path.
    pub output: Option<PathBuf>,
    /// Override the local rendering preference.
    pub prefer_local: Option<bool>,
    /// Override remote rendering service URL.
    pub remote_url: Option<String>,
    /// Override directory for temporary diagram images.
    pub temp_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "archdoc.toml";

/// Default output filename.
pub const DEFAULT_OUTPUT: &str = "EWallet_Flutter_SDK_Architecture.pdf";

/// Default remote rendering service.
pub const DEFAULT_REMOTE_URL: &str = "https://mermaid.ink";

/// Default Mermaid script loaded by the local renderer.
pub const DEFAULT_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Diagram rendering configuration (paths are relative strings from TOML).
    diagrams: DiagramsConfigRaw,
    /// Page and styling configuration.
    pub document: DocumentConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    path: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Destination PDF file.
    pub path: PathBuf,
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    prefer_local: Option<bool>,
    remote_url: Option<String>,
    timeout_secs: Option<u64>,
    settle_timeout_ms: Option<u64>,
    temp_dir: Option<String>,
    script_url: Option<String>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug)]
pub struct DiagramsConfig {
    /// Try the local headless browser before the remote service.
    pub prefer_local: bool,
    /// Base URL of the remote rendering service.
    pub remote_url: String,
    /// HTTP timeout for remote rendering.
    pub timeout: Duration,
    /// Maximum wait for the local renderer to finish laying out a diagram.
    pub settle_timeout: Duration,
    /// Directory for `temp_{name}.png` files.
    pub temp_dir: PathBuf,
    /// Mermaid script URL loaded by the local renderer.
    pub script_url: String,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            prefer_local: true,
            remote_url: DEFAULT_REMOTE_URL.to_owned(),
            timeout: Duration::from_secs(30),
            settle_timeout: Duration::from_secs(2),
            temp_dir: PathBuf::from("."),
            script_url: DEFAULT_SCRIPT_URL.to_owned(),
        }
    }
}

/// Page size of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// US Letter, 8.5 x 11 in.
    #[default]
    Letter,
    /// ISO A4, 210 x 297 mm.
    A4,
}

impl PageSize {
    /// Page dimensions in points (width, height).
    #[must_use]
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.28, 841.89),
        }
    }
}

/// Page and styling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Page size.
    pub page_size: PageSize,
    /// Margin on all four sides, in points.
    pub margin: f32,
    /// Brand colors.
    pub colors: ColorsConfig,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::Letter,
            margin: 72.0,
            colors: ColorsConfig::default(),
        }
    }
}

/// Brand colors as `#RRGGBB` strings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Title page heading.
    pub title: String,
    /// Level 2 section headings.
    pub heading2: String,
    /// Level 3 section headings.
    pub heading3: String,
    /// Code listing text.
    pub code_text: String,
    /// Code listing background.
    pub code_background: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            title: "#4CAF50".to_owned(),
            heading2: "#2196F3".to_owned(),
            heading3: "#FF9800".to_owned(),
            code_text: "#263238".to_owned(),
            code_background: "#F5F5F5".to_owned(),
        }
    }
}

impl ColorsConfig {
    fn fields(&self) -> [(&str, &str); 5] {
        [
            ("document.colors.title", self.title.as_str()),
            ("document.colors.heading2", self.heading2.as_str()),
            ("document.colors.heading3", self.heading3.as_str()),
            ("document.colors.code_text", self.code_text.as_str()),
            ("document.colors.code_background", self.code_background.as_str()),
        ]
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.remote_url`").
        field: String,
        /// Error message (e.g., "${`MERMAID_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a color field to be `#RRGGBB`.
fn require_hex_color(value: &str, field: &str) -> Result<(), ConfigError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} must be a #RRGGBB color, got '{value}'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `archdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output) = &settings.output {
            self.output_resolved.path.clone_from(output);
        }
        if let Some(prefer_local) = settings.prefer_local {
            self.diagrams_resolved.prefer_local = prefer_local;
        }
        if let Some(remote_url) = &settings.remote_url {
            self.diagrams_resolved.remote_url.clone_from(remote_url);
        }
        if let Some(temp_dir) = &settings.temp_dir {
            self.diagrams_resolved.temp_dir.clone_from(temp_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            diagrams: DiagramsConfigRaw::default(),
            document: DocumentConfig::default(),
            output_resolved: OutputConfig {
                path: base.join(DEFAULT_OUTPUT),
            },
            diagrams_resolved: DiagramsConfig {
                temp_dir: base.to_path_buf(),
                ..DiagramsConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_output()?;
        self.validate_diagrams()?;
        self.validate_document()?;
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        if self.output_resolved.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.path cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams_resolved;
        require_non_empty(&diagrams.remote_url, "diagrams.remote_url")?;
        require_http_url(&diagrams.remote_url, "diagrams.remote_url")?;
        require_non_empty(&diagrams.script_url, "diagrams.script_url")?;
        require_http_url(&diagrams.script_url, "diagrams.script_url")?;

        if diagrams.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if diagrams.settle_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.settle_timeout_ms must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_document(&self) -> Result<(), ConfigError> {
        let document = &self.document;
        let (width, height) = document.page_size.dimensions_pt();

        if !document.margin.is_finite() {
            return Err(ConfigError::Validation(
                "document.margin must be a finite number".to_owned(),
            ));
        }
        if document.margin < 0.0 {
            return Err(ConfigError::Validation(
                "document.margin cannot be negative".to_owned(),
            ));
        }
        if document.margin * 2.0 >= width.min(height) {
            return Err(ConfigError::Validation(
                "document.margin leaves no room for content".to_owned(),
            ));
        }

        for (field, value) in document.colors.fields() {
            require_hex_color(value, field)?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.output.path {
            self.output.path = Some(expand::expand_env(path, "output.path")?);
        }
        if let Some(ref url) = self.diagrams.remote_url {
            self.diagrams.remote_url = Some(expand::expand_env(url, "diagrams.remote_url")?);
        }
        if let Some(ref url) = self.diagrams.script_url {
            self.diagrams.script_url = Some(expand::expand_env(url, "diagrams.script_url")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = DiagramsConfig::default();
        let raw = &self.diagrams;

        self.output_resolved = OutputConfig {
            path: config_dir.join(self.output.path.as_deref().unwrap_or(DEFAULT_OUTPUT)),
        };

        self.diagrams_resolved = DiagramsConfig {
            prefer_local: raw.prefer_local.unwrap_or(defaults.prefer_local),
            remote_url: raw.remote_url.clone().unwrap_or(defaults.remote_url),
            timeout: raw
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            settle_timeout: raw
                .settle_timeout_ms
                .map_or(defaults.settle_timeout, Duration::from_millis),
            temp_dir: config_dir.join(raw.temp_dir.as_deref().unwrap_or(".")),
            script_url: raw.script_url.clone().unwrap_or(defaults.script_url),
        };
    }
}
