use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use image::{Rgba, RgbaImage};

use super::{mirror_if, FrameSource};
use crate::booth::Frame;
use crate::error::{BoothError, Result};

/// Renders a deterministic test card per shot.
///
/// Stands in for a real camera in headless runs and demos: every shot gets a
/// grayscale ramp plus a marker band whose position depends on the shot index,
/// so composed strips show each frame landed in the right slot.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    mirror: bool,
    active: AtomicBool,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32, mirror: bool) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            mirror,
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn render(&self, shot: usize) -> RgbaImage {
        let (w, h) = (self.width, self.height);
        let band_width = (w / 8).max(1);
        let band_start = (shot as u32 * band_width) % w;

        RgbaImage::from_fn(w, h, |x, y| {
            if x >= band_start && x < band_start + band_width {
                return Rgba([235, 235, 235, 255]);
            }
            // Diagonal ramp, kept dark for the noir look
            let shade = ((x + y) * 160 / (w + h)) as u8 + 20;
            Rgba([shade, shade, shade, 255])
        })
    }
}

#[async_trait]
impl FrameSource for SyntheticCamera {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn activate(&self) -> Result<()> {
        self.active.store(true, Ordering::SeqCst);
        tracing::debug!("Synthetic camera active ({}x{})", self.width, self.height);
        Ok(())
    }

    async fn acquire_frame(&self, shot: usize) -> Result<Frame> {
        if !self.is_active() {
            return Err(BoothError::Device("camera is not active".to_string()));
        }
        let pixels = mirror_if(self.render(shot), self.mirror);
        Ok(Frame::new(shot, pixels))
    }

    fn release(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            tracing::debug!("Synthetic camera released");
        }
    }
}
