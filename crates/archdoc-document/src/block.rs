//! Content blocks: the ordered, append-only body of a document.

use archdoc_diagrams::RenderedImage;

/// Line shown after a code listing that was cut short.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Static strings for the title page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitlePage {
    /// Main title, centered in the brand color.
    pub title: String,
    /// First subtitle line.
    pub subtitle: String,
    /// Second, smaller subtitle line.
    pub tagline: String,
    /// Justified summary paragraph.
    pub summary: String,
    /// Version label shown under the generation date.
    pub version: String,
}

/// How a paragraph is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Justified 11pt body text.
    Body,
    /// Left-aligned 10pt text.
    Normal,
    /// Bold body text above a figure.
    Caption,
    /// Italic marker standing in for a diagram that failed to render.
    Placeholder,
}

/// One unit of document content, in visual order.
#[derive(Debug, PartialEq)]
pub enum ContentBlock {
    /// Title page group; `generated` is the formatted generation timestamp.
    TitlePage { page: TitlePage, generated: String },
    /// Section heading. Levels 2 and 3 are branded; others use the default style.
    Heading { text: String, level: u8 },
    /// Paragraph of inline markup.
    Paragraph { text: String, style: ParagraphStyle },
    /// Monospaced listing. Lines are markup-escaped.
    CodeBlock {
        lines: Vec<String>,
        language: String,
        truncated: bool,
    },
    /// Rendered diagram with its caption.
    Figure {
        image: RenderedImage,
        caption: String,
    },
    /// Start a new page.
    PageBreak,
}

/// Per-kind block tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockCounts {
    pub headings: usize,
    /// Body, normal and caption paragraphs. Placeholders are counted separately.
    pub paragraphs: usize,
    pub placeholders: usize,
    pub code_blocks: usize,
    pub figures: usize,
    pub page_breaks: usize,
}

impl BlockCounts {
    /// Count the blocks of each kind.
    #[must_use]
    pub fn of(blocks: &[ContentBlock]) -> Self {
        let mut counts = Self::default();
        for block in blocks {
            match block {
                ContentBlock::TitlePage { .. } => {}
                ContentBlock::Heading { .. } => counts.headings += 1,
                ContentBlock::Paragraph {
                    style: ParagraphStyle::Placeholder,
                    ..
                } => counts.placeholders += 1,
                ContentBlock::Paragraph { .. } => counts.paragraphs += 1,
                ContentBlock::CodeBlock { .. } => counts.code_blocks += 1,
                ContentBlock::Figure { .. } => counts.figures += 1,
                ContentBlock::PageBreak => counts.page_breaks += 1,
            }
        }
        counts
    }
}
