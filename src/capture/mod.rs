//! Frame sources.
//!
//! The capture loop only knows the [`FrameSource`] trait. Which implementation
//! backs it (a synthetic test card or a directory of photos standing in for the
//! camera roll) is decided once at startup from settings.

mod directory;
mod synthetic;

use async_trait::async_trait;
use image::RgbaImage;

use crate::booth::Frame;
use crate::error::Result;

pub use directory::DirectoryCamera;
pub use synthetic::SyntheticCamera;

/// A camera-like device the session controller pulls frames from.
///
/// Every session that calls `activate` calls `release` once afterwards, even
/// if activation itself failed or the session was dropped mid-capture.
#[async_trait]
pub trait FrameSource: Send + Sync + 'static {
    /// Human-readable device name for logs.
    fn name(&self) -> &str;

    /// Claim the device. Fails with `BoothError::Device` if it is unavailable.
    async fn activate(&self) -> Result<()>;

    /// Capture one frame. Fails with `BoothError::Device` on capture errors.
    async fn acquire_frame(&self, shot: usize) -> Result<Frame>;

    /// Give the device back. Must be idempotent and must not block.
    fn release(&self);
}

/// Apply the selfie-mirror flip when enabled.
pub(crate) fn mirror_if(pixels: RgbaImage, mirror: bool) -> RgbaImage {
    if mirror {
        image::imageops::flip_horizontal(&pixels)
    } else {
        pixels
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_mirror_flips_horizontally() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

        let mirrored = mirror_if(img.clone(), true);
        assert_eq!(mirrored.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));

        let untouched = mirror_if(img, false);
        assert_eq!(untouched.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }
}
