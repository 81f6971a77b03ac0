//! Colored terminal output for report generation.

use archdoc_document::{DiagramOutcome, GenerateSummary};
use console::{Style, Term};

const RULE_WIDTH: usize = 60;

/// Progress and summary printer. Everything goes to stderr.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    fn rule(&self) {
        let _ = self.term.write_line(&"=".repeat(RULE_WIDTH));
    }

    /// Title framed by rules.
    pub(crate) fn banner(&self, title: &str) {
        self.rule();
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(format!("  {title}")).to_string());
        self.rule();
    }

    /// One line per diagram as it is rendered.
    pub(crate) fn diagram(&self, caption: &str, outcome: DiagramOutcome) {
        match outcome {
            DiagramOutcome::Rendered(backend) => {
                let line = format!("  Added: {caption} ({backend})");
                let _ = self.term.write_line(&self.green.apply_to(line).to_string());
            }
            DiagramOutcome::Placeholder => {
                self.warning(&format!("  Skipped: {caption} (rendering failed)"));
            }
        }
    }

    /// Final report: file, size, pages, figures and failures.
    pub(crate) fn summary(&self, summary: &GenerateSummary) {
        self.rule();
        let _ = self
            .term
            .write_line(&self.green.apply_to("PDF generated successfully").to_string());
        self.info(&format!("File: {}", summary.path.display()));
        self.info(&format!("Size: {}", kilobytes(summary.bytes)));
        self.info(&format!("Pages: {}", summary.pages));
        self.info(&format!("Figures: {}", summary.figures()));
        if summary.placeholders() > 0 {
            self.warning(&format!(
                "Failed diagrams: {} (placeholders inserted)",
                summary.placeholders()
            ));
        }
        self.rule();
    }
}

/// Byte count as kilobytes with two decimals.
fn kilobytes(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}
