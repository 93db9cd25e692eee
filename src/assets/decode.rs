use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::{RgbaImage, imageops::FilterType};

use crate::foundation::{
    core::Canvas,
    error::{ReelError, ReelResult},
};

/// A decoded still image as premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("image dimensions must be non-zero"));
        }
        if rgba8_premul.len() != (width as usize) * (height as usize) * 4 {
            return Err(ReelError::validation(
                "image buffer size mismatch with width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Solid opaque image, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ReelResult<Self> {
        let px = premultiply(rgba);
        Self::from_premul(width, height, px.repeat((width as usize) * (height as usize)))
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub(crate) fn to_rgba_image(&self) -> ReelResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.rgba8_premul.as_ref().clone())
            .ok_or_else(|| ReelError::evaluation("image buffer does not match its dimensions"))
    }

    pub(crate) fn from_rgba_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba8_premul: Arc::new(img.into_raw()),
        }
    }

    /// Resize to exactly `canvas`, keeping this image when it already matches.
    pub fn fit_to(&self, canvas: Canvas) -> ReelResult<Self> {
        if self.width == canvas.width && self.height == canvas.height {
            return Ok(self.clone());
        }
        let img = self.to_rgba_image()?;
        let resized = image::imageops::resize(&img, canvas.width, canvas.height, FilterType::Lanczos3);
        Ok(Self::from_rgba_image(resized))
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> ReelResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage::from_premul(width, height, rgba8_premul)
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> ReelResult<PreparedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| {
        ReelError::Other(anyhow::anyhow!("decode image '{}': {e}", path.display()))
    })
}

fn premultiply(px: [u8; 4]) -> [u8; 4] {
    let mut out = px;
    premultiply_rgba8_in_place(&mut out);
    out
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
