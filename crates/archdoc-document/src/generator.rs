//! Document assembly: the operations that append content and the final write.

use std::path::PathBuf;

use archdoc_diagrams::{BackendKind, DiagramRenderer, DiagramRequest};

use crate::block::{BlockCounts, ContentBlock, ParagraphStyle, TRUNCATION_MARKER, TitlePage};
use crate::error::DocumentError;
use crate::markup;
use crate::pdf;
use crate::report::{Report, ReportStep, SectionContent};
use crate::temp::TempFiles;
use crate::theme::Theme;

/// Longest code listing kept in the document, in source lines.
pub const MAX_CODE_LINES: usize = 30;

const TIMESTAMP_FORMAT: &str = "%B %d, %Y at %I:%M %p";
const UNTITLED: &str = "Architecture Report";

/// What happened to one diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramOutcome {
    /// A figure was added with an image from this backend.
    Rendered(BackendKind),
    /// Every backend failed and a placeholder paragraph was added.
    Placeholder,
}

/// Statistics for a finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateSummary {
    pub path: PathBuf,
    /// Size of the output file in bytes.
    pub bytes: u64,
    pub pages: usize,
    pub counts: BlockCounts,
}

impl GenerateSummary {
    #[must_use]
    pub fn figures(&self) -> usize {
        self.counts.figures
    }

    /// Diagrams that failed to render.
    #[must_use]
    pub fn placeholders(&self) -> usize {
        self.counts.placeholders
    }
}

/// Builds one document.
///
/// Content is appended in call order. Rendered diagram images become owned
/// temp files and are deleted when [`Generator::finish`] returns, whatever
/// the outcome, or when the generator is dropped.
pub struct Generator {
    renderer: DiagramRenderer,
    output: PathBuf,
    theme: Theme,
    blocks: Vec<ContentBlock>,
    temp_files: TempFiles,
}

impl Generator {
    /// Create a generator that writes to `output`.
    #[must_use]
    pub fn new(renderer: DiagramRenderer, output: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output: output.into(),
            theme: Theme::default(),
            blocks: Vec::new(),
            temp_files: TempFiles::new(),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Blocks appended so far.
    #[must_use]
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    /// Temp files awaiting cleanup.
    #[must_use]
    pub fn temp_files(&self) -> &[PathBuf] {
        self.temp_files.paths()
    }

    /// Append the title page and a page break.
    pub fn add_title_block(&mut self, page: TitlePage) {
        let generated = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.blocks.push(ContentBlock::TitlePage { page, generated });
        self.blocks.push(ContentBlock::PageBreak);
    }

    /// Append a heading followed by one body paragraph per content item.
    pub fn add_section(&mut self, title: &str, content: impl Into<SectionContent>, level: u8) {
        self.blocks.push(ContentBlock::Heading {
            text: title.to_owned(),
            level,
        });
        match content.into() {
            SectionContent::Text(text) => self.push_body(text),
            SectionContent::Paragraphs(paragraphs) => {
                for text in paragraphs {
                    self.push_body(text);
                }
            }
        }
    }

    fn push_body(&mut self, text: String) {
        self.blocks.push(ContentBlock::Paragraph {
            text,
            style: ParagraphStyle::Body,
        });
    }

    /// Render a diagram and append it as a figure, or append a placeholder
    /// paragraph if no backend could render it.
    ///
    /// A name already used by an earlier figure gets a numeric suffix
    /// (`temp_{name}_2.png`, ...) so every figure keeps its own file.
    pub fn add_diagram(&mut self, description: &str, caption: &str, name: &str) -> DiagramOutcome {
        let request = self.unique_request(description, name);
        match self.renderer.render(&request) {
            Ok(image) => {
                let origin = image.origin();
                tracing::info!(name, backend = %origin, "diagram added");
                self.temp_files.register(image.path());
                self.blocks.push(ContentBlock::Figure {
                    image,
                    caption: caption.to_owned(),
                });
                DiagramOutcome::Rendered(origin)
            }
            Err(e) => {
                tracing::warn!(name, error = %e, "diagram skipped, rendering failed");
                self.blocks.push(ContentBlock::Paragraph {
                    text: format!("[Diagram: {} - Rendering failed]", markup::escape(caption)),
                    style: ParagraphStyle::Placeholder,
                });
                DiagramOutcome::Placeholder
            }
        }
    }

    fn unique_request(&self, description: &str, name: &str) -> DiagramRequest {
        let dir = self.renderer.temp_dir();
        let taken = |request: &DiagramRequest| self.temp_files.paths().contains(&request.temp_path(dir));

        let mut request = DiagramRequest::new(description, name);
        let mut n = 2;
        while taken(&request) {
            request = DiagramRequest::new(description, format!("{name}_{n}"));
            n += 1;
        }
        if request.name() != name {
            tracing::debug!(name, renamed = request.name(), "diagram name already in use");
        }
        request
    }

    /// Append a code listing, keeping at most [`MAX_CODE_LINES`] lines.
    pub fn add_code_block(&mut self, source: &str, language: &str) {
        let all: Vec<&str> = source.split('\n').collect();
        let truncated = all.len() > MAX_CODE_LINES;
        let mut lines: Vec<String> = all
            .iter()
            .take(MAX_CODE_LINES)
            .map(|line| markup::escape(line))
            .collect();
        if truncated {
            lines.push(TRUNCATION_MARKER.to_owned());
        }
        self.blocks.push(ContentBlock::CodeBlock {
            lines,
            language: language.to_owned(),
            truncated,
        });
    }

    /// Run `report` and write the document.
    pub fn generate(self, report: &Report) -> Result<GenerateSummary, DocumentError> {
        self.generate_with(report, |_, _| {})
    }

    /// Like [`Generator::generate`], calling `on_diagram` after each diagram step.
    pub fn generate_with<F>(mut self, report: &Report, mut on_diagram: F) -> Result<GenerateSummary, DocumentError>
    where
        F: FnMut(&ReportStep, DiagramOutcome),
    {
        if let Some(page) = &report.title_page {
            self.add_title_block(page.clone());
        }
        for step in &report.steps {
            match step {
                ReportStep::Section {
                    title,
                    content,
                    level,
                } => self.add_section(title, content.clone(), *level),
                ReportStep::Diagram {
                    description,
                    caption,
                    name,
                } => {
                    let outcome = self.add_diagram(description, caption, name);
                    on_diagram(step, outcome);
                }
                ReportStep::Code { source, language } => self.add_code_block(source, language),
            }
        }
        self.finish()
    }

    /// Write the document, then delete every temp file.
    ///
    /// Cleanup runs whether or not the write succeeded; a write failure is
    /// returned after cleanup.
    pub fn finish(mut self) -> Result<GenerateSummary, DocumentError> {
        let title = self.document_title();
        let result = pdf::write(&self.blocks, &self.theme, &title, &self.output);

        let pending = self.temp_files.len();
        let removed = self.temp_files.cleanup();
        tracing::debug!(pending, removed, "temp files cleaned up");

        let written = result?;
        Ok(GenerateSummary {
            path: self.output.clone(),
            bytes: written.bytes,
            pages: written.pages,
            counts: BlockCounts::of(&self.blocks),
        })
    }

    fn document_title(&self) -> String {
        self.blocks
            .iter()
            .find_map(|block| match block {
                ContentBlock::TitlePage { page, .. } => {
                    Some(markup::plain_text(&markup::parse(&page.title)))
                }
                _ => None,
            })
            .unwrap_or_else(|| UNTITLED.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archdoc_diagrams::{BackendError, RemoteBackend, RenderBackend};
    use pretty_assertions::assert_eq;
    use printpdf::image_crate::{self, DynamicImage, ImageOutputFormat, RgbImage};
    use std::cell::Cell;
    use std::io::{BufRead, BufReader, Cursor, Write};
    use std::net::TcpListener;
    use std::path::Path;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn encode_png(width: u32, height: u32) -> Result<Vec<u8>, BackendError> {
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut data), ImageOutputFormat::Png)
            .map_err(|e| BackendError::Http(e.to_string()))?;
        Ok(data)
    }

    struct PngBackend;

    impl RenderBackend for PngBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        fn render(&self, _request: &DiagramRequest) -> Result<Vec<u8>, BackendError> {
            encode_png(40, 20)
        }
    }

    /// Each render is ten times wider than the previous one.
    struct GrowingPngBackend {
        width: Cell<u32>,
    }

    impl RenderBackend for GrowingPngBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        fn render(&self, _request: &DiagramRequest) -> Result<Vec<u8>, BackendError> {
            let width = self.width.get();
            self.width.set(width * 10);
            encode_png(width, 20)
        }
    }

    struct StatusBackend(u16);

    impl RenderBackend for StatusBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Remote
        }

        fn render(&self, _request: &DiagramRequest) -> Result<Vec<u8>, BackendError> {
            Err(BackendError::Status(self.0))
        }
    }

    fn generator(tmp: &TempDir, renderer: DiagramRenderer) -> Generator {
        Generator::new(renderer, tmp.path().join("out.pdf"))
    }

    /// Answer every request on a local port with HTTP 500.
    fn serve_server_error() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                }
                let _ = write!(
                    stream,
                    "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom"
                );
                let _ = stream.flush();
            }
        });

        url
    }

    fn temp_pngs(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect()
    }

    #[test]
    fn test_code_block_truncates_long_input() {
        let tmp = TempDir::new().unwrap();
        let mut doc = generator(&tmp, DiagramRenderer::new(tmp.path()));
        let source: Vec<String> = (1..=45).map(|i| format!("line {i}")).collect();

        doc.add_code_block(&source.join("\n"), "dart");

        match &doc.blocks()[0] {
            ContentBlock::CodeBlock {
                lines, truncated, ..
            } => {
                assert_eq!(lines.len(), 31);
                assert_eq!(lines[..30], source[..30]);
                assert_eq!(lines[30], TRUNCATION_MARKER);
                assert!(truncated);
            }
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn test_code_block_keeps_short_input() {
        let tmp = TempDir::new().unwrap();
        let mut doc = generator(&tmp, DiagramRenderer::new(tmp.path()));
        let source: Vec<String> = (1..=10).map(|i| format!("final x{i} = {i};")).collect();

        doc.add_code_block(&source.join("\n"), "dart");

        assert_eq!(
            doc.blocks()[0],
            ContentBlock::CodeBlock {
                lines: source,
                language: "dart".to_owned(),
                truncated: false,
            }
        );
    }

    #[test]
    fn test_code_block_escapes_markup() {
        let tmp = TempDir::new().unwrap();
        let mut doc = generator(&tmp, DiagramRenderer::new(tmp.path()));

        doc.add_code_block("<script>alert('x')</script>\nif (a && b > c) {}", "html");

        let ContentBlock::CodeBlock { lines, .. } = &doc.blocks()[0] else {
            panic!("expected code block");
        };
        assert_eq!(lines[0], "&lt;script&gt;alert('x')&lt;/script&gt;");
        assert_eq!(lines[1], "if (a &amp;&amp; b &gt; c) {}");
        for line in lines {
            assert!(!line.contains('<'));
            assert!(!line.contains('>'));
        }
    }

    #[test]
    fn test_section_with_paragraph_list() {
        let tmp = TempDir::new().unwrap();
        let mut doc = generator(&tmp, DiagramRenderer::new(tmp.path()));

        doc.add_section("Overview", ["First.", "Second."], 2);

        let counts = BlockCounts::of(doc.blocks());
        assert_eq!(counts.headings, 1);
        assert_eq!(counts.paragraphs, 2);
        assert_eq!(counts.figures, 0);
    }

    #[test]
    fn test_section_with_scalar_and_empty_content() {
        let tmp = TempDir::new().unwrap();
        let mut doc = generator(&tmp, DiagramRenderer::new(tmp.path()));

        doc.add_section("A", "Only paragraph.", 3);
        doc.add_section("B", "", 7);

        assert_eq!(
            doc.blocks(),
            &[
                ContentBlock::Heading {
                    text: "A".to_owned(),
                    level: 3
                },
                ContentBlock::Paragraph {
                    text: "Only paragraph.".to_owned(),
                    style: ParagraphStyle::Body
                },
                ContentBlock::Heading {
                    text: "B".to_owned(),
                    level: 7
                },
                ContentBlock::Paragraph {
                    text: String::new(),
                    style: ParagraphStyle::Body
                },
            ]
        );
    }

    #[test]
    fn test_title_block_ends_with_page_break() {
        let tmp = TempDir::new().unwrap();
        let mut doc = generator(&tmp, DiagramRenderer::new(tmp.path()));

        doc.add_title_block(TitlePage {
            title: "Title".to_owned(),
            subtitle: "Sub".to_owned(),
            tagline: "Tag".to_owned(),
            summary: "Summary.".to_owned(),
            version: "1.0.0".to_owned(),
        });

        assert_eq!(doc.blocks().len(), 2);
        assert!(matches!(doc.blocks()[0], ContentBlock::TitlePage { ref generated, .. } if generated.contains(" at ")));
        assert_eq!(doc.blocks()[1], ContentBlock::PageBreak);
        assert_eq!(BlockCounts::of(doc.blocks()).headings, 0);
    }

    #[test]
    fn test_failed_diagram_adds_placeholder() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(StatusBackend(500));
        let mut doc = generator(&tmp, renderer);

        let outcome = doc.add_diagram("graph LR\n A --> B", "Data <Flow>", "flow");

        assert_eq!(outcome, DiagramOutcome::Placeholder);
        assert_eq!(
            doc.blocks(),
            &[ContentBlock::Paragraph {
                text: "[Diagram: Data &lt;Flow&gt; - Rendering failed]".to_owned(),
                style: ParagraphStyle::Placeholder,
            }]
        );
        assert!(doc.temp_files().is_empty());
    }

    #[test]
    fn test_rendered_diagram_adds_figure_and_registers_temp_file() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(PngBackend);
        let mut doc = generator(&tmp, renderer);

        let outcome = doc.add_diagram("graph LR\n A --> B", "Flow", "flow");

        assert_eq!(outcome, DiagramOutcome::Rendered(BackendKind::Remote));
        assert_eq!(doc.temp_files(), &[tmp.path().join("temp_flow.png")]);
        assert!(matches!(&doc.blocks()[0], ContentBlock::Figure { caption, .. } if caption == "Flow"));
    }

    #[test]
    fn test_overview_scenario() {
        let tmp = TempDir::new().unwrap();
        let report = Report::new().section("Overview", ["First paragraph.", "Second paragraph."]);

        let summary = generator(&tmp, DiagramRenderer::new(tmp.path()))
            .generate(&report)
            .unwrap();

        assert_eq!(summary.counts.headings, 1);
        assert_eq!(summary.counts.paragraphs, 2);
        assert_eq!(summary.figures(), 0);
        assert_eq!(summary.pages, 1);
        assert!(std::fs::read(&summary.path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_remote_failure_scenario_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(StatusBackend(500));
        let report = Report::new()
            .section("Overview", "Text.")
            .diagram("graph LR\n A --> B", "Flow", "flow");

        let summary = generator(&tmp, renderer).generate(&report).unwrap();

        assert_eq!(summary.placeholders(), 1);
        assert_eq!(summary.figures(), 0);
        assert!(temp_pngs(tmp.path()).is_empty());
    }

    #[test]
    fn test_remote_http_500_yields_placeholder_and_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let remote = RemoteBackend::new(serve_server_error()).timeout(Duration::from_secs(5));
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(remote);
        let report = Report::new()
            .section("Overview", "Text.")
            .diagram("graph LR\n A --> B", "Flow", "flow");

        let summary = generator(&tmp, renderer).generate(&report).unwrap();

        assert_eq!(summary.placeholders(), 1);
        assert_eq!(summary.figures(), 0);
        assert!(summary.path.exists());
        assert!(temp_pngs(tmp.path()).is_empty());
    }

    #[test]
    fn test_repeated_diagram_name_gets_own_file() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(GrowingPngBackend {
            width: Cell::new(40),
        });
        let mut doc = generator(&tmp, renderer);

        doc.add_diagram("graph LR\n A --> B", "One", "same");
        doc.add_diagram("graph TD\n C --> D", "Two", "same");

        let first = tmp.path().join("temp_same.png");
        let second = tmp.path().join("temp_same_2.png");
        assert_eq!(doc.temp_files(), &[first.clone(), second.clone()]);

        let figures: Vec<_> = doc
            .blocks()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Figure { image, .. } => Some(image),
                _ => None,
            })
            .collect();
        assert_eq!(figures.len(), 2);
        assert_eq!(figures[0].path(), first);
        assert_eq!(figures[1].path(), second);
        for image in figures {
            assert_eq!(std::fs::metadata(image.path()).unwrap().len(), image.size());
        }
        assert_eq!(image_crate::image_dimensions(&first).unwrap(), (40, 20));
        assert_eq!(image_crate::image_dimensions(&second).unwrap(), (400, 20));

        let summary = doc.finish().unwrap();
        assert_eq!(summary.figures(), 2);
        assert!(temp_pngs(tmp.path()).is_empty());
    }

    #[test]
    fn test_generate_with_figures_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(PngBackend);
        let report = Report::new()
            .section("Architecture", "Text.")
            .diagram("graph LR\n A --> B", "One", "one")
            .diagram("graph TD\n C --> D", "Two", "two")
            .code("void main() {}", "dart");

        let mut outcomes = Vec::new();
        let summary = generator(&tmp, renderer)
            .generate_with(&report, |step, outcome| {
                outcomes.push((step.label().to_owned(), outcome));
            })
            .unwrap();

        assert_eq!(summary.figures(), 2);
        assert_eq!(summary.counts.code_blocks, 1);
        assert_eq!(
            outcomes,
            vec![
                ("One".to_owned(), DiagramOutcome::Rendered(BackendKind::Remote)),
                ("Two".to_owned(), DiagramOutcome::Rendered(BackendKind::Remote)),
            ]
        );
        assert!(temp_pngs(tmp.path()).is_empty());
    }

    #[test]
    fn test_write_failure_still_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(PngBackend);
        let report = Report::new().diagram("graph LR\n A --> B", "Flow", "flow");
        let doc = Generator::new(renderer, tmp.path().join("no/such/dir/out.pdf"));

        let err = doc.generate(&report).unwrap_err();

        assert!(matches!(err, DocumentError::Write { .. }));
        assert!(temp_pngs(tmp.path()).is_empty());
    }

    #[test]
    fn test_missing_image_is_fatal_after_cleanup() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(PngBackend);
        let mut doc = generator(&tmp, renderer);
        doc.add_diagram("graph LR\n A --> B", "Flow", "flow");
        std::fs::remove_file(tmp.path().join("temp_flow.png")).unwrap();

        let err = doc.finish().unwrap_err();

        assert!(matches!(err, DocumentError::MissingImage(_)));
        assert!(!tmp.path().join("out.pdf").exists());
    }

    #[test]
    fn test_drop_without_finish_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let renderer = DiagramRenderer::new(tmp.path()).with_backend(PngBackend);
        {
            let mut doc = generator(&tmp, renderer);
            doc.add_diagram("graph LR\n A --> B", "Flow", "flow");
            assert_eq!(temp_pngs(tmp.path()).len(), 1);
        }
        assert!(temp_pngs(tmp.path()).is_empty());
    }
}
