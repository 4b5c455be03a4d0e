//! Strip composition.
//!
//! Lays a record's frames out on a black strip following its layout template,
//! each photo covered with a light film grain. The white footer band carries
//! the guest name, the `date // id` line and a QR code linking to the capture.
//! Sizes are in design units multiplied by `StripStyle::scale`.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Luma, Rgba, RgbaImage};
use qrcode::QrCode;

use super::lettering::{render_lettering, FooterText};
use crate::booth::{CaptureRecord, Frame};
use crate::error::{BoothError, Result};

const PADDING: u32 = 10;
const GAP: u32 = 6;
const FOOTER_HEIGHT: u32 = 60;
const QR_SIZE: u32 = 45;
const ACCENT_WIDTH: u32 = 4;
const TEXT_GAP: u32 = 6;

/// Largest strip side in pixels, whatever the scale.
pub const MAX_STRIP_DIMENSION: u32 = 16_384;

const STRIP_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FOOTER_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const ACCENT: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Visual parameters of an exported strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripStyle {
    /// Pixels per design unit
    pub scale: u32,
    /// Host the QR code links to
    pub share_host: String,
    /// Film grain strength, 0 for none
    pub grain: u8,
}

impl Default for StripStyle {
    fn default() -> Self {
        Self {
            scale: 2,
            share_host: "noir.booth".to_string(),
            grain: 12,
        }
    }
}

impl StripStyle {
    /// `https://<host>/<id>`
    pub fn share_url(&self, record_id: &str) -> String {
        format!("https://{}/{}", self.share_host.trim_end_matches('/'), record_id)
    }
}

/// Pixel geometry of a strip for one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripGeometry {
    pub width: u32,
    pub height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub padding: u32,
    pub gap: u32,
    pub footer_height: u32,
}

impl StripGeometry {
    pub fn for_record(record: &CaptureRecord, scale: u32) -> Result<Self> {
        let layout = record.layout();
        let scale = scale.max(1);
        let scaled = |units: u32| {
            units
                .checked_mul(scale)
                .filter(|px| *px <= MAX_STRIP_DIMENSION)
                .ok_or_else(|| {
                    BoothError::Export(format!(
                        "layout {} is too large at scale {} (max {}px per side)",
                        layout.id, scale, MAX_STRIP_DIMENSION
                    ))
                })
        };
        let width = scaled(layout.display_width)?;
        let height = scaled(layout.display_height)?;
        let padding = scaled(PADDING)?;
        let gap = scaled(GAP)?;
        let footer_height = scaled(FOOTER_HEIGHT)?;

        let columns = layout.columns;
        let rows = layout.rows();

        let cell_width = width
            .saturating_sub(2 * padding + (columns - 1) * gap)
            / columns;
        let cell_height = height
            .saturating_sub(2 * padding + footer_height + (rows.saturating_sub(1)) * gap)
            / rows.max(1);

        if cell_width == 0 || cell_height == 0 {
            return Err(BoothError::Export(format!(
                "layout {} leaves no room for photos at scale {}",
                layout.id, scale
            )));
        }

        Ok(Self {
            width,
            height,
            cell_width,
            cell_height,
            padding,
            gap,
            footer_height,
        })
    }

    /// Top-left corner of the cell for a frame index.
    pub fn cell_origin(&self, index: usize, columns: u32) -> (u32, u32) {
        let col = index as u32 % columns;
        let row = index as u32 / columns;
        (
            self.padding + col * (self.cell_width + self.gap),
            self.padding + row * (self.cell_height + self.gap),
        )
    }
}

/// Render a record into a single strip image.
pub fn compose_strip(record: &CaptureRecord, style: &StripStyle) -> Result<RgbaImage> {
    let geometry = StripGeometry::for_record(record, style.scale)?;
    let columns = record.layout().columns;

    let mut canvas = RgbaImage::from_pixel(geometry.width, geometry.height, STRIP_BACKGROUND);

    for (index, frame) in record.images().iter().enumerate() {
        let mut cell = cover(frame, geometry.cell_width, geometry.cell_height)?;
        add_grain(&mut cell, style.grain, frame.shot as u32);
        let (x, y) = geometry.cell_origin(index, columns);
        imageops::overlay(&mut canvas, &cell, x as i64, y as i64);
    }

    draw_footer(&mut canvas, &geometry, record, style)?;
    Ok(canvas)
}

/// Scale and center-crop a frame so it fills `width` x `height`.
fn cover(frame: &Frame, width: u32, height: u32) -> Result<RgbaImage> {
    let src = frame.pixels();
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return Err(BoothError::Export(format!("frame {} has no pixels", frame.shot + 1)));
    }

    // Largest crop with the target aspect ratio
    let (crop_w, crop_h) = if (sw as u64) * (height as u64) > (sh as u64) * (width as u64) {
        (((sh as u64 * width as u64) / height as u64).max(1) as u32, sh)
    } else {
        (sw, ((sw as u64 * height as u64) / width as u64).max(1) as u32)
    };
    let x = (sw - crop_w) / 2;
    let y = (sh - crop_h) / 2;

    let cropped = imageops::crop_imm(src, x, y, crop_w, crop_h).to_image();
    Ok(imageops::resize(&cropped, width, height, FilterType::Triangle))
}

/// Monochrome noise of up to `strength` levels per pixel, the same for a
/// given shot every time.
fn add_grain(image: &mut RgbaImage, strength: u8, seed: u32) {
    if strength == 0 {
        return;
    }
    let strength = i32::from(strength);
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let delta = grain_noise(x, y, seed) * strength / 128;
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (i32::from(*channel) + delta).clamp(0, 255) as u8;
        }
    }
}

/// Hash of a pixel position in `-128..128`.
fn grain_noise(x: u32, y: u32, seed: u32) -> i32 {
    let mut h = x.wrapping_mul(0x9E37_79B1)
        ^ y.wrapping_mul(0x85EB_CA77)
        ^ seed.wrapping_add(1).wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFF) as i32 - 128
}

fn draw_footer(
    canvas: &mut RgbaImage,
    geometry: &StripGeometry,
    record: &CaptureRecord,
    style: &StripStyle,
) -> Result<()> {
    let scale = style.scale.max(1);
    let top = geometry.height - geometry.padding - geometry.footer_height;
    let left = geometry.padding;
    let right = geometry.width - geometry.padding;

    fill_rect(
        canvas,
        left,
        top,
        right - left,
        geometry.footer_height,
        FOOTER_BACKGROUND,
    );

    // Branding accent on the left edge of the footer
    let inset = 8 * scale;
    fill_rect(
        canvas,
        left + inset,
        top + inset,
        ACCENT_WIDTH * scale,
        geometry.footer_height.saturating_sub(2 * inset),
        ACCENT,
    );

    let qr = render_qr(&style.share_url(record.id()), QR_SIZE * scale)?;
    let qr_x = right.saturating_sub(qr.width() + inset);
    let qr_y = top + geometry.footer_height.saturating_sub(qr.height()) / 2;
    imageops::overlay(canvas, &qr, qr_x as i64, qr_y as i64);

    // Name and date // id between the accent and the QR code
    let text_x = left + inset + (ACCENT_WIDTH + TEXT_GAP) * scale;
    let text_width = qr_x.saturating_sub(text_x + TEXT_GAP * scale);
    if text_width > 0 {
        let text = FooterText::new(record.user_name(), &record.display_date(), record.id());
        let lettering = render_lettering(&text, text_width, geometry.footer_height, scale)?;
        imageops::overlay(canvas, &lettering, text_x as i64, top as i64);
    }

    Ok(())
}

/// Encode `url` as a QR code no larger than `size` pixels square.
pub fn render_qr(url: &str, size: u32) -> Result<RgbaImage> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| BoothError::Export(format!("failed to encode QR code: {}", e)))?;
    let luma = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .max_dimensions(size, size)
        .build();
    Ok(DynamicImage::ImageLuma8(luma).to_rgba8())
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}
