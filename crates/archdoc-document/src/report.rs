//! Report scripts: the ordered list of insertions that make up a document.

use crate::block::TitlePage;

/// Body of a section: one paragraph or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionContent {
    Text(String),
    Paragraphs(Vec<String>),
}

impl From<&str> for SectionContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for SectionContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for SectionContent {
    fn from(paragraphs: Vec<String>) -> Self {
        Self::Paragraphs(paragraphs)
    }
}

impl From<&[&str]> for SectionContent {
    fn from(paragraphs: &[&str]) -> Self {
        Self::Paragraphs(paragraphs.iter().map(|p| (*p).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SectionContent {
    fn from(paragraphs: [&str; N]) -> Self {
        Self::from(&paragraphs[..])
    }
}

/// One insertion in a report script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStep {
    Section {
        title: String,
        content: SectionContent,
        level: u8,
    },
    Diagram {
        description: String,
        caption: String,
        name: String,
    },
    Code {
        source: String,
        language: String,
    },
}

impl ReportStep {
    /// Short label for progress logging.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Section { title, .. } => title,
            Self::Diagram { caption, .. } => caption,
            Self::Code { language, .. } => language,
        }
    }
}

/// A deterministic document script: optional title page, then steps in order.
///
/// # Example
///
/// ```ignore
/// let report = Report::new()
///     .section("1. Overview", ["First paragraph.", "Second paragraph."])
///     .diagram("graph LR\n A --> B", "Data Flow", "flow")
///     .code("fn main() {}", "rust");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub title_page: Option<TitlePage>,
    pub steps: Vec<ReportStep>,
}

impl Report {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title page.
    #[must_use]
    pub fn title_page(mut self, page: TitlePage) -> Self {
        self.title_page = Some(page);
        self
    }

    /// Append a level 2 section.
    #[must_use]
    pub fn section(self, title: impl Into<String>, content: impl Into<SectionContent>) -> Self {
        self.section_at(title, content, 2)
    }

    /// Append a section at an explicit heading level.
    #[must_use]
    pub fn section_at(
        mut self,
        title: impl Into<String>,
        content: impl Into<SectionContent>,
        level: u8,
    ) -> Self {
        self.steps.push(ReportStep::Section {
            title: title.into(),
            content: content.into(),
            level,
        });
        self
    }

    /// Append a diagram.
    #[must_use]
    pub fn diagram(
        mut self,
        description: impl Into<String>,
        caption: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.steps.push(ReportStep::Diagram {
            description: description.into(),
            caption: caption.into(),
            name: name.into(),
        });
        self
    }

    /// Append a code listing.
    #[must_use]
    pub fn code(mut self, source: impl Into<String>, language: impl Into<String>) -> Self {
        self.steps.push(ReportStep::Code {
            source: source.into(),
            language: language.into(),
        });
        self
    }

    /// Number of diagram steps.
    #[must_use]
    pub fn diagram_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, ReportStep::Diagram { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_preserves_order() {
        let report = Report::new()
            .section("Overview", ["a", "b"])
            .diagram("graph LR\n A --> B", "Flow", "flow")
            .code("x = 1", "toml")
            .section_at("Details", "text", 3);

        let labels: Vec<&str> = report.steps.iter().map(ReportStep::label).collect();
        assert_eq!(labels, vec!["Overview", "Flow", "toml", "Details"]);
        assert_eq!(report.diagram_count(), 1);
        assert!(report.title_page.is_none());
    }

    #[test]
    fn test_section_content_conversions() {
        assert_eq!(SectionContent::from("x"), SectionContent::Text("x".to_owned()));
        assert_eq!(
            SectionContent::from(["a", "b"]),
            SectionContent::Paragraphs(vec!["a".to_owned(), "b".to_owned()])
        );
        assert_eq!(
            SectionContent::from(vec!["c".to_owned()]),
            SectionContent::Paragraphs(vec!["c".to_owned()])
        );
    }

    #[test]
    fn test_section_default_level() {
        let report = Report::new().section("Overview", "");
        assert!(matches!(
            report.steps[0],
            ReportStep::Section { level: 2, .. }
        ));
    }
}
