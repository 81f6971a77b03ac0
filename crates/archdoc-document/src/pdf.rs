//! PDF serialization with printpdf.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use printpdf::image_crate::{self, DynamicImage, RgbImage};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    Rect, Rgb,
};

use crate::block::ContentBlock;
use crate::error::DocumentError;
use crate::layout::{self, DrawOp, Page};
use crate::metrics::Font;
use crate::theme::{Color, Theme};

/// Result of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    /// Size of the output file in bytes.
    pub bytes: u64,
    pub pages: usize,
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// Lay out `blocks` and write them to `path` as a PDF.
///
/// Every figure image is loaded before anything is written, so a missing
/// image fails the write without creating the output file.
pub fn write(
    blocks: &[ContentBlock],
    theme: &Theme,
    title: &str,
    path: &Path,
) -> Result<Written, DocumentError> {
    let images = load_images(blocks)?;
    let sizes: Vec<(u32, u32)> = images.iter().map(|i| (i.width(), i.height())).collect();
    let pages = layout::layout(blocks, theme, &sizes);

    let doc = render(&pages, &images, theme, title)?;

    let file = File::create(path).map_err(|source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;

    let bytes = fs::metadata(path)
        .map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    tracing::debug!(path = %path.display(), bytes, pages = pages.len(), "PDF written");
    Ok(Written {
        bytes,
        pages: pages.len(),
    })
}

fn load_images(blocks: &[ContentBlock]) -> Result<Vec<DynamicImage>, DocumentError> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Figure { image, .. } => Some(image.path()),
            _ => None,
        })
        .map(|path| {
            let data = fs::read(path).map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    DocumentError::MissingImage(path.to_path_buf())
                } else {
                    DocumentError::Image {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                }
            })?;
            let image = image_crate::load_from_memory(&data).map_err(|e| DocumentError::Image {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Ok(flatten(&image))
        })
        .collect()
}

/// Composite any alpha channel onto white.
fn flatten(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return DynamicImage::ImageRgb8(image.to_rgb8());
    }
    let rgba = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let blend = |c: u8| {
            let a = u16::from(a);
            ((u16::from(c) * a + 255 * (255 - a)) / 255) as u8
        };
        rgb.put_pixel(x, y, image_crate::Rgb([blend(r), blend(g), blend(b)]));
    }
    DynamicImage::ImageRgb8(rgb)
}

fn render(
    pages: &[Page],
    images: &[DynamicImage],
    theme: &Theme,
    title: &str,
) -> Result<PdfDocumentReference, DocumentError> {
    let width = mm(theme.page_width);
    let height = mm(theme.page_height);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let fonts = load_fonts(&doc)?;

    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for op in &page.ops {
            match op {
                DrawOp::Text {
                    x,
                    y,
                    size,
                    font,
                    color,
                    text,
                } => {
                    let Some(font) = fonts.get(font) else {
                        continue;
                    };
                    layer.set_fill_color(fill(*color));
                    layer.use_text(text.as_str(), *size, mm(*x), mm(*y), font);
                }
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    layer.set_fill_color(fill(*color));
                    layer.add_rect(Rect::new(mm(*x), mm(*y), mm(x + width), mm(y + height)));
                }
                DrawOp::Image {
                    index,
                    x,
                    y,
                    width,
                    ..
                } => {
                    let Some(image) = images.get(*index) else {
                        continue;
                    };
                    // Scale comes from dpi: the image spans px * 72 / dpi points.
                    let dpi = image.width() as f32 * 72.0 / width;
                    Image::from_dynamic_image(image).add_to_layer(
                        layer.clone(),
                        ImageTransform {
                            translate_x: Some(mm(*x)),
                            translate_y: Some(mm(*y)),
                            dpi: Some(dpi),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    Ok(doc)
}

fn load_fonts(doc: &PdfDocumentReference) -> Result<HashMap<Font, IndirectFontRef>, DocumentError> {
    [
        (Font::Helvetica, BuiltinFont::Helvetica),
        (Font::HelveticaBold, BuiltinFont::HelveticaBold),
        (Font::HelveticaOblique, BuiltinFont::HelveticaOblique),
        (Font::HelveticaBoldOblique, BuiltinFont::HelveticaBoldOblique),
        (Font::Courier, BuiltinFont::Courier),
    ]
    .into_iter()
    .map(|(font, builtin)| {
        doc.add_builtin_font(builtin)
            .map(|r| (font, r))
            .map_err(|e| DocumentError::Pdf(e.to_string()))
    })
    .collect()
}

fn fill(color: Color) -> printpdf::Color {
    let (r, g, b) = color.to_unit();
    printpdf::Color::Rgb(Rgb::new(r, g, b, None))
}
