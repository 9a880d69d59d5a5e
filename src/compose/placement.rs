use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, Rectangle};
use crate::core::model::ScaleMode;

/// Points per image pixel at 96 dpi.
pub const PX_TO_PT: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::A4
    }
}

/// Where an image lands on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub page: PageSize,
    pub rect: Rectangle,
    pub pixel_width: f32,
    pub pixel_height: f32,
}

impl ImagePlacement {
    /// Points per pixel along x.
    pub fn scale_x(&self) -> f32 {
        self.rect.width / self.pixel_width
    }

    /// Points per pixel along y.
    pub fn scale_y(&self) -> f32 {
        self.rect.height / self.pixel_height
    }

    /// Maps an image-space box (pixels, origin top-left) to a user-space
    /// rectangle (points, origin bottom-left).
    pub fn to_user_space(&self, bbox: &BBox) -> Rectangle {
        let (sx, sy) = (self.scale_x(), self.scale_y());
        Rectangle::new(
            self.rect.x + bbox.x0 * sx,
            self.rect.y + (self.pixel_height - bbox.y1) * sy,
            bbox.width() * sx,
            bbox.height() * sy,
        )
    }
}

pub fn place_image(
    pixel_width: u32,
    pixel_height: u32,
    mode: ScaleMode,
    page: PageSize,
) -> Result<ImagePlacement> {
    if pixel_width == 0 || pixel_height == 0 {
        bail!("image has no pixels ({pixel_width}x{pixel_height})");
    }
    let (pw, ph) = (pixel_width as f32, pixel_height as f32);
    let (natural_w, natural_h) = (pw * PX_TO_PT, ph * PX_TO_PT);

    let (page, rect) = match mode {
        ScaleMode::KeepOriginalSize => (
            PageSize::new(natural_w, natural_h),
            Rectangle::new(0.0, 0.0, natural_w, natural_h),
        ),
        ScaleMode::ScaleWidth => {
            let height = page.width * ph / pw;
            (
                PageSize::new(page.width, height),
                Rectangle::new(0.0, 0.0, page.width, height),
            )
        }
        ScaleMode::ScaleHeight => {
            let width = page.height * pw / ph;
            (
                PageSize::new(width, page.height),
                Rectangle::new(0.0, 0.0, width, page.height),
            )
        }
        ScaleMode::ScaleToFit => {
            let scale = (page.width / natural_w).min(page.height / natural_h);
            let (width, height) = (natural_w * scale, natural_h * scale);
            (
                page,
                Rectangle::new(
                    (page.width - width) / 2.0,
                    (page.height - height) / 2.0,
                    width,
                    height,
                ),
            )
        }
    };

    Ok(ImagePlacement {
        page,
        rect,
        pixel_width: pw,
        pixel_height: ph,
    })
}
