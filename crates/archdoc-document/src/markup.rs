//! Inline markup for paragraph text.
//!
//! Paragraphs accept a tiny XML-like subset: `<b>`/`<strong>`, `<i>`/`<em>`,
//! `<br/>`, and the five predefined XML entities plus numeric character
//! references. Anything else is kept as text. Text that is not well-formed
//! is rendered literally.

use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// A run of text with uniform styling, or a hard line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text {
        text: String,
        bold: bool,
        italic: bool,
    },
    Break,
}

impl Span {
    /// Plain text span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    /// Bold text span.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }
}

/// Escape the characters that are significant to the markup layer.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`].
#[must_use]
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Parse marked-up text into styled spans.
///
/// Adjacent text with the same style is merged into one span.
#[must_use]
pub fn parse(text: &str) -> Vec<Span> {
    match try_parse(text) {
        Ok(spans) => spans,
        Err(e) => {
            tracing::warn!(error = %e, "malformed inline markup, rendering literally");
            vec![Span::plain(text)]
        }
    }
}

fn try_parse(text: &str) -> Result<Vec<Span>, quick_xml::Error> {
    let wrapped = format!("<p>{text}</p>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    let mut spans = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"b" | b"strong" => bold += 1,
                b"i" | b"em" => italic += 1,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"b" | b"strong" => bold = bold.saturating_sub(1),
                b"i" | b"em" => italic = italic.saturating_sub(1),
                _ => {}
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"br" {
                    spans.push(Span::Break);
                }
            }
            Event::Text(e) => {
                let decoded = reader.decoder().decode(&e)?;
                push_text(&mut spans, &decoded, bold > 0, italic > 0);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                let resolved = decode_entity(&entity);
                push_text(&mut spans, &resolved, bold > 0, italic > 0);
            }
            Event::CData(e) => {
                let raw = String::from_utf8_lossy(&e).into_owned();
                push_text(&mut spans, &raw, bold > 0, italic > 0);
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    Ok(spans)
}

fn push_text(spans: &mut Vec<Span>, text: &str, bold: bool, italic: bool) {
    if text.is_empty() {
        return;
    }
    if let Some(Span::Text {
        text: last,
        bold: last_bold,
        italic: last_italic,
    }) = spans.last_mut()
        && *last_bold == bold
        && *last_italic == italic
    {
        last.push_str(text);
        return;
    }
    spans.push(Span::Text {
        text: text.to_owned(),
        bold,
        italic,
    });
}

/// Resolve an entity name (without `&` and `;`).
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "quot" => "\"".to_owned(),
        "apos" => "'".to_owned(),
        "nbsp" => " ".to_owned(),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), String::from)
        }
    }
}

/// Concatenate the text of all spans, mapping breaks to newlines.
#[must_use]
pub fn plain_text(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Span::Text { text, .. } => text.as_str(),
            Span::Break => "\n",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_angle_brackets() {
        assert_eq!(escape("<script>alert(1)</script>"), "&lt;script&gt;alert(1)&lt;/script&gt;");
    }

    #[test]
    fn test_escape_ampersand_first() {
        assert_eq!(escape("a && b < c"), "a &amp;&amp; b &lt; c");
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let source = "if (a < b && c > d) { return \"&lt;\"; }";
        assert_eq!(unescape(&escape(source)), source);
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse("Hello world"), vec![Span::plain("Hello world")]);
    }

    #[test]
    fn test_parse_bold_prefix() {
        assert_eq!(
            parse("<b>Step 1:</b> Create the package"),
            vec![Span::bold("Step 1:"), Span::plain(" Create the package")]
        );
    }

    #[test]
    fn test_parse_italic_and_nested() {
        assert_eq!(
            parse("<i>[Diagram: <b>x</b>]</i>"),
            vec![
                Span::Text {
                    text: "[Diagram: ".to_owned(),
                    bold: false,
                    italic: true
                },
                Span::Text {
                    text: "x".to_owned(),
                    bold: true,
                    italic: true
                },
                Span::Text {
                    text: "]".to_owned(),
                    bold: false,
                    italic: true
                },
            ]
        );
    }

    #[test]
    fn test_parse_line_break() {
        assert_eq!(
            parse("first<br/>second"),
            vec![Span::plain("first"), Span::Break, Span::plain("second")]
        );
    }

    #[test]
    fn test_parse_entities_merge_into_text() {
        assert_eq!(parse("a &lt;b&gt; &amp; c"), vec![Span::plain("a <b> & c")]);
    }

    #[test]
    fn test_parse_numeric_entity() {
        assert_eq!(parse("&#65;&#x42;"), vec![Span::plain("AB")]);
    }

    #[test]
    fn test_parse_unknown_tag_keeps_text() {
        assert_eq!(parse("<u>under</u>"), vec![Span::plain("under")]);
    }

    #[test]
    fn test_parse_malformed_falls_back_to_literal() {
        assert_eq!(
            parse("unclosed </b> tag"),
            vec![Span::plain("unclosed </b> tag")]
        );
        assert_eq!(
            parse("unclosed <b>bold"),
            vec![Span::plain("unclosed <b>bold")]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_plain_text() {
        let spans = parse("<b>A</b> b<br/>c");
        assert_eq!(plain_text(&spans), "A b\nc");
    }
}
