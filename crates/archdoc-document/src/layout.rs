//! Page layout.
//!
//! Turns content blocks into positioned draw operations, one list per page.
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page; text `y` values are baselines.

use std::mem;

use crate::block::{ContentBlock, ParagraphStyle, TitlePage};
use crate::markup::{self, Span};
use crate::metrics::{Font, sanitize};
use crate::theme::{Color, Theme};

const INCH: f32 = 72.0;

/// Figures are set at 6.5 in wide unless the content area is narrower.
pub const FIGURE_WIDTH: f32 = 6.5 * INCH;

const CODE_SIZE: f32 = 8.0;
const CODE_LEADING: f32 = 10.0;
const CODE_INDENT: f32 = 20.0;
const CODE_PADDING: f32 = 6.0;

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Color,
        text: String,
    },
    /// Filled rectangle; `(x, y)` is the lower-left corner.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Figure image by figure index; `(x, y)` is the lower-left corner.
    Image {
        index: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Draw operations for one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text drawn on this page, one entry per text operation.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    leading: f32,
    color: Color,
    bold: bool,
    italic: bool,
    align: Align,
    space_before: f32,
    space_after: f32,
}

impl TextStyle {
    const fn new(size: f32, leading: f32) -> Self {
        Self {
            size,
            leading,
            color: Color::BLACK,
            bold: false,
            italic: false,
            align: Align::Left,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    const fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    const fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    const fn spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }
}

fn paragraph_style(style: ParagraphStyle) -> TextStyle {
    match style {
        ParagraphStyle::Body => TextStyle::new(11.0, 14.0)
            .align(Align::Justify)
            .spacing(0.0, 12.0),
        ParagraphStyle::Normal => TextStyle::new(10.0, 12.0).spacing(0.0, 6.0),
        ParagraphStyle::Caption => TextStyle::new(11.0, 14.0).bold().spacing(0.0, 0.1 * INCH),
        ParagraphStyle::Placeholder => TextStyle::new(10.0, 12.0)
            .italic()
            .spacing(0.0, 0.2 * INCH),
    }
}

fn heading_style(level: u8, theme: &Theme) -> TextStyle {
    match level {
        2 => TextStyle::new(16.0, 19.2)
            .bold()
            .color(theme.heading2_color)
            .spacing(12.0, 12.0),
        3 => TextStyle::new(14.0, 16.8)
            .bold()
            .color(theme.heading3_color)
            .spacing(10.0, 10.0),
        _ => TextStyle::new(14.0, 17.0).bold().spacing(12.0, 6.0),
    }
}

/// Lay out `blocks` onto pages.
///
/// `image_sizes` holds the pixel dimensions of each figure, in the order the
/// figures appear in `blocks`. The result always has at least one page.
#[must_use]
pub fn layout(blocks: &[ContentBlock], theme: &Theme, image_sizes: &[(u32, u32)]) -> Vec<Page> {
    let mut cursor = Cursor::new(theme);
    let mut figure = 0;

    for block in blocks {
        match block {
            ContentBlock::TitlePage { page, generated } => cursor.title_page(page, generated),
            ContentBlock::Heading { text, level } => {
                cursor.paragraph(&markup::parse(text), heading_style(*level, theme));
            }
            ContentBlock::Paragraph { text, style } => {
                cursor.paragraph(&markup::parse(text), paragraph_style(*style));
            }
            ContentBlock::CodeBlock { lines, .. } => cursor.code(lines),
            ContentBlock::Figure { caption, .. } => {
                let size = image_sizes.get(figure).copied().unwrap_or((1, 1));
                cursor.figure(figure, caption, size);
                figure += 1;
            }
            ContentBlock::PageBreak => cursor.page_break(),
        }
    }

    cursor.finish()
}

struct Cursor<'a> {
    theme: &'a Theme,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            pages: Vec::new(),
            current: Page::default(),
            y: theme.page_height - theme.margin,
        }
    }

    fn top(&self) -> f32 {
        self.theme.page_height - self.theme.margin
    }

    fn bottom(&self) -> f32 {
        self.theme.margin
    }

    fn at_top(&self) -> bool {
        self.y >= self.top() - f32::EPSILON
    }

    fn remaining(&self) -> f32 {
        self.y - self.bottom()
    }

    fn new_page(&mut self) {
        self.pages.push(mem::take(&mut self.current));
        self.y = self.top();
    }

    /// Start a new page unless `height` still fits on this one.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.at_top() {
            self.new_page();
        }
    }

    /// Vertical space; swallowed at the top of a page.
    fn space(&mut self, amount: f32) {
        if !self.at_top() {
            self.y = (self.y - amount).max(self.bottom());
        }
    }

    fn page_break(&mut self) {
        if !self.current.ops.is_empty() {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }

    fn title_page(&mut self, page: &TitlePage, generated: &str) {
        let theme = self.theme;
        let normal = paragraph_style(ParagraphStyle::Normal).spacing(0.0, 0.0);

        self.y -= 2.0 * INCH;
        self.paragraph(
            &markup::parse(&page.title),
            TextStyle::new(24.0, 28.8)
                .bold()
                .align(Align::Center)
                .color(theme.title_color),
        );
        self.y -= 0.3 * INCH;
        self.paragraph(
            &markup::parse(&page.subtitle),
            TextStyle::new(14.0, 17.0).bold().align(Align::Center),
        );
        self.y -= 0.5 * INCH;
        self.paragraph(
            &markup::parse(&page.tagline),
            TextStyle::new(12.0, 14.4).bold().align(Align::Center),
        );
        self.y -= INCH;
        self.paragraph(
            &markup::parse(&page.summary),
            paragraph_style(ParagraphStyle::Body).spacing(0.0, 0.0),
        );
        self.y -= 0.5 * INCH;
        let generated = format!("<b>Generated:</b> {}", markup::escape(generated));
        self.paragraph(&markup::parse(&generated), normal);
        self.y -= 0.2 * INCH;
        let version = format!("<b>Version:</b> {}", markup::escape(&page.version));
        self.paragraph(&markup::parse(&version), normal);
    }

    fn paragraph(&mut self, spans: &[Span], style: TextStyle) {
        let tokens = tokenize(spans, &style);
        if tokens.is_empty() {
            return;
        }

        self.space(style.space_before);
        let width = self.theme.content_width();
        let lines = wrap(tokens, style.size, width);
        let last = lines.len() - 1;
        for (i, line) in lines.into_iter().enumerate() {
            self.ensure(style.leading);
            let justify = style.align == Align::Justify && i != last && !line.hard_break;
            let baseline = self.y - style.size;
            self.emit_line(&line, &style, baseline, justify);
            self.y -= style.leading;
        }
        self.space(style.space_after);
    }

    fn emit_line(&mut self, line: &Line, style: &TextStyle, baseline: f32, justify: bool) {
        if line.words.is_empty() {
            return;
        }
        let width = self.theme.content_width();
        let space = space_width(style.size);
        let natural = line.width(space);

        let mut gap = space;
        let mut x = self.theme.margin;
        if justify && line.words.len() > 1 {
            gap += (width - natural).max(0.0) / (line.words.len() - 1) as f32;
        } else if style.align == Align::Center {
            x += ((width - natural) / 2.0).max(0.0);
        }

        for word in &line.words {
            let mut run_x = x;
            for run in &word.runs {
                self.current.ops.push(DrawOp::Text {
                    x: run_x,
                    y: baseline,
                    size: style.size,
                    font: run.font,
                    color: style.color,
                    text: run.text.clone(),
                });
                run_x += run.font.text_width(&run.text, style.size);
            }
            x += word.width + gap;
        }
    }

    fn code(&mut self, lines: &[String]) {
        let theme = self.theme;
        let box_x = theme.margin + CODE_INDENT;
        let box_width = theme.content_width() - 2.0 * CODE_INDENT;
        let per_line = ((box_width - 2.0 * CODE_PADDING) / Font::Courier.text_width(" ", CODE_SIZE))
            .floor()
            .max(1.0) as usize;

        let visual: Vec<String> = lines
            .iter()
            .flat_map(|line| hard_wrap(&sanitize(&markup::unescape(line)), per_line))
            .collect();
        if visual.is_empty() {
            return;
        }

        self.space(10.0);
        let mut segment: Option<(usize, f32)> = None;
        for text in visual {
            if self.remaining() < CODE_LEADING + CODE_PADDING {
                if let Some((index, top)) = segment.take() {
                    self.close_code_segment(index, top, box_x, box_width);
                }
                if !self.at_top() {
                    self.new_page();
                }
            }
            if segment.is_none() {
                segment = Some((self.current.ops.len(), self.y));
                self.y -= CODE_PADDING;
            }
            if !text.is_empty() {
                self.current.ops.push(DrawOp::Text {
                    x: box_x + CODE_PADDING,
                    y: self.y - CODE_SIZE,
                    size: CODE_SIZE,
                    font: Font::Courier,
                    color: theme.code_text_color,
                    text,
                });
            }
            self.y -= CODE_LEADING;
        }
        if let Some((index, top)) = segment {
            self.close_code_segment(index, top, box_x, box_width);
        }
        self.space(10.0 + 0.15 * INCH);
    }

    /// Insert the background for a code segment beneath its text.
    fn close_code_segment(&mut self, index: usize, top: f32, x: f32, width: f32) {
        self.y = (self.y - CODE_PADDING).max(self.bottom());
        self.current.ops.insert(
            index,
            DrawOp::Rect {
                x,
                y: self.y,
                width,
                height: top - self.y,
                color: self.theme.code_background_color,
            },
        );
    }

    fn figure(&mut self, index: usize, caption: &str, (px_width, px_height): (u32, u32)) {
        let style = paragraph_style(ParagraphStyle::Caption);
        let caption = format!("Figure: {}", markup::escape(caption));
        let spans = markup::parse(&caption);
        let caption_lines = wrap(
            tokenize(&spans, &style),
            style.size,
            self.theme.content_width(),
        )
        .len() as f32;
        let caption_height = caption_lines * style.leading + style.space_after;

        let mut width = FIGURE_WIDTH.min(self.theme.content_width());
        let mut height = width * px_height.max(1) as f32 / px_width.max(1) as f32;
        let max_height = self.theme.content_height() - caption_height;
        if height > max_height && max_height > 0.0 {
            width *= max_height / height;
            height = max_height;
        }

        self.ensure(caption_height + height);
        self.paragraph(&spans, style);

        let x = self.theme.margin + (self.theme.content_width() - width) / 2.0;
        self.y -= height;
        self.current.ops.push(DrawOp::Image {
            index,
            x,
            y: self.y,
            width,
            height,
        });
        self.space(0.2 * INCH);
    }
}

#[derive(Debug)]
struct Run {
    text: String,
    font: Font,
}

#[derive(Debug, Default)]
struct Word {
    runs: Vec<Run>,
    width: f32,
}

#[derive(Debug)]
enum Token {
    Word(Word),
    Break,
}

#[derive(Debug, Default)]
struct Line {
    words: Vec<Word>,
    hard_break: bool,
}

impl Line {
    fn width(&self, space: f32) -> f32 {
        let words: f32 = self.words.iter().map(|w| w.width).sum();
        words + space * self.words.len().saturating_sub(1) as f32
    }
}

fn space_width(size: f32) -> f32 {
    Font::Helvetica.text_width(" ", size)
}

/// Split spans into words. Text on both sides of a style change with no
/// whitespace between stays one word.
fn tokenize(spans: &[Span], style: &TextStyle) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = Word::default();

    for span in spans {
        match span {
            Span::Break => {
                flush(&mut tokens, &mut word);
                tokens.push(Token::Break);
            }
            Span::Text { text, bold, italic } => {
                let font = Font::helvetica(*bold || style.bold, *italic || style.italic);
                for (i, piece) in text.split(char::is_whitespace).enumerate() {
                    if i > 0 {
                        flush(&mut tokens, &mut word);
                    }
                    if piece.is_empty() {
                        continue;
                    }
                    let piece = sanitize(piece);
                    word.width += font.text_width(&piece, style.size);
                    match word.runs.last_mut() {
                        Some(run) if run.font == font => run.text.push_str(&piece),
                        _ => word.runs.push(Run { text: piece, font }),
                    }
                }
            }
        }
    }
    flush(&mut tokens, &mut word);
    tokens
}

fn flush(tokens: &mut Vec<Token>, word: &mut Word) {
    if !word.runs.is_empty() {
        tokens.push(Token::Word(mem::take(word)));
    }
}

/// Greedy line filling. A word wider than the line gets a line to itself.
fn wrap(tokens: Vec<Token>, size: f32, max_width: f32) -> Vec<Line> {
    let space = space_width(size);
    let mut lines = Vec::new();
    let mut line = Line::default();
    let mut width = 0.0;

    for token in tokens {
        match token {
            Token::Break => {
                line.hard_break = true;
                lines.push(mem::take(&mut line));
                width = 0.0;
            }
            Token::Word(word) => {
                if !line.words.is_empty() && width + space + word.width > max_width {
                    lines.push(mem::take(&mut line));
                    width = 0.0;
                }
                width += if line.words.is_empty() {
                    word.width
                } else {
                    space + word.width
                };
                line.words.push(word);
            }
        }
    }
    if !line.words.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split a code line into chunks of at most `per_line` characters.
fn hard_wrap(line: &str, per_line: usize) -> Vec<String> {
    let chars: Vec<char> = line.trim_end().chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(per_line).map(|c| c.iter().collect()).collect()
}
