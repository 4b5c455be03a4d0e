//! Footer lettering.
//!
//! The guest name and the `date // id` line are laid out as SVG text and
//! rasterized with resvg against the fonts installed on the machine. Extra
//! fonts can be dropped into `$NOIRBOOTH_FONT_DIR`.

use std::sync::{Arc, OnceLock};

use image::{Rgba, RgbaImage};
use resvg::tiny_skia;
use usvg::fontdb;

use crate::error::{BoothError, Result};

const NAME_SIZE: u32 = 20;
const META_SIZE: u32 = 8;
const NAME_BASELINE: u32 = 28;
const META_BASELINE: u32 = 42;

/// Text drawn into the strip footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterText {
    pub name: String,
    /// `MM/DD/YYYY // ID`
    pub meta: String,
}

impl FooterText {
    pub fn new(user_name: &str, date: &str, record_id: &str) -> Self {
        Self {
            name: user_name.to_string(),
            meta: format!("{} // {}", date, record_id),
        }
    }
}

fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            if let Some(dir) = std::env::var_os("NOIRBOOTH_FONT_DIR") {
                db.load_fonts_dir(dir);
            }
            let faces = db.faces().count();
            if faces == 0 {
                tracing::warn!("No fonts found; strip footers will have no lettering");
            } else {
                tracing::debug!("Loaded {} font faces for strip footers", faces);
            }
            Arc::new(db)
        })
        .clone()
}

/// Whether any font face is available to draw footer text with.
pub fn fonts_available() -> bool {
    font_database().faces().next().is_some()
}

/// Generic families rarely resolve without fontconfig, so fall back to any face.
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::Named(name) => fontdb::Family::Name(name),
                    _ => fontdb::Family::SansSerif,
                })
                .collect();
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            };
            db.query(&query)
                .or_else(|| db.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// SVG document for a `width` x `height` text box at `scale` pixels per unit.
pub(crate) fn footer_svg(text: &FooterText, width: u32, height: u32, scale: u32) -> String {
    format!(
        concat!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"##,
            r##"<text x="0" y="{name_y}" font-family="sans-serif" font-size="{name_size}" font-weight="300" fill="#000000">{name}</text>"##,
            r##"<text x="0" y="{meta_y}" font-family="monospace" font-size="{meta_size}" font-weight="700" fill="#444444">{meta}</text>"##,
            "</svg>"
        ),
        w = width,
        h = height,
        name_y = NAME_BASELINE * scale,
        name_size = NAME_SIZE * scale,
        meta_y = META_BASELINE * scale,
        meta_size = META_SIZE * scale,
        name = escape_xml(&text.name),
        meta = escape_xml(&text.meta),
    )
}

/// Rasterize the footer text into a transparent `width` x `height` image.
///
/// Without any installed fonts the result is fully transparent.
pub fn render_lettering(
    text: &FooterText,
    width: u32,
    height: u32,
    scale: u32,
) -> Result<RgbaImage> {
    let svg = footer_svg(text, width, height, scale);
    let options = usvg::Options {
        fontdb: font_database(),
        font_resolver: font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &options)
        .map_err(|e| BoothError::Export(format!("failed to lay out footer text: {}", e)))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| BoothError::Export(format!("invalid footer size {}x{}", width, height)))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let mut lettering = RgbaImage::new(width, height);
    for (dst, src) in lettering.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Ok(lettering)
}
