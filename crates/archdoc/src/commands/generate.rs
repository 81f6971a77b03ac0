//! `archdoc generate` command implementation.

use std::path::PathBuf;

use archdoc_config::{CliSettings, Config, DiagramsConfig, DocumentConfig};
use archdoc_diagrams::{DiagramRenderer, RemoteBackend};
use archdoc_document::{Color, Generator, Theme};
use clap::Args;

use crate::content;
use crate::error::CliError;
use crate::output::Output;

const BANNER: &str = "EWallet Flutter SDK Documentation Generator";

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to configuration file (default: auto-discover archdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output PDF path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render every diagram with the remote service, never the local browser.
    #[arg(long)]
    remote_only: bool,

    /// Remote rendering service URL (overrides config).
    #[arg(long, env = "ARCHDOC_REMOTE_URL")]
    remote_url: Option<String>,

    /// Directory for temporary diagram images (overrides config).
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Enable verbose output (show backend failures and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the PDF cannot be written.
    /// Diagram rendering failures are not errors.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output: self.output,
            prefer_local: self.remote_only.then_some(false),
            remote_url: self.remote_url,
            temp_dir: self.temp_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "loaded configuration");
        }

        output.banner(BANNER);
        let theme = theme_from_config(&config.document)?;
        let renderer = build_renderer(&config.diagrams_resolved, &output);
        let report = content::ewallet_report();

        output.info(&format!(
            "Generating {} ({} diagrams)...",
            config.output_resolved.path.display(),
            report.diagram_count()
        ));

        let summary = Generator::new(renderer, &config.output_resolved.path)
            .with_theme(theme)
            .generate_with(&report, |step, outcome| output.diagram(step.label(), outcome))?;

        output.summary(&summary);
        Ok(())
    }
}

/// Backends in preference order: local browser (when wanted and built in),
/// then the remote service.
fn build_renderer(config: &DiagramsConfig, output: &Output) -> DiagramRenderer {
    let mut renderer = DiagramRenderer::new(&config.temp_dir);
    if config.prefer_local {
        renderer = with_local_backend(renderer, config, output);
    } else {
        output.info(&format!("Using {} for diagram rendering", config.remote_url));
    }
    renderer.with_backend(RemoteBackend::new(config.remote_url.as_str()).timeout(config.timeout))
}

#[cfg(feature = "chrome")]
fn with_local_backend(
    renderer: DiagramRenderer,
    config: &DiagramsConfig,
    output: &Output,
) -> DiagramRenderer {
    use archdoc_diagrams::ChromeBackend;

    output.info(&format!(
        "Using headless Chrome for diagram rendering (fallback: {})",
        config.remote_url
    ));
    renderer.with_backend(
        ChromeBackend::new()
            .script_url(config.script_url.as_str())
            .settle_timeout(config.settle_timeout),
    )
}

#[cfg(not(feature = "chrome"))]
fn with_local_backend(
    renderer: DiagramRenderer,
    config: &DiagramsConfig,
    output: &Output,
) -> DiagramRenderer {
    output.warning(&format!(
        "Headless Chrome support not built in, using {} for diagram rendering",
        config.remote_url
    ));
    renderer
}

fn theme_from_config(config: &DocumentConfig) -> Result<Theme, CliError> {
    let color = |field: &str, value: &str| {
        Color::from_hex(value)
            .ok_or_else(|| CliError::Validation(format!("document.colors.{field}: invalid color '{value}'")))
    };
    let (page_width, page_height) = config.page_size.dimensions_pt();

    Ok(Theme {
        page_width,
        page_height,
        margin: config.margin,
        title_color: color("title", &config.colors.title)?,
        heading2_color: color("heading2", &config.colors.heading2)?,
        heading3_color: color("heading3", &config.colors.heading3)?,
        code_text_color: color("code_text", &config.colors.code_text)?,
        code_background_color: color("code_background", &config.colors.code_background)?,
    })
}
