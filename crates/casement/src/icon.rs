//! Window icon loading

use std::path::Path;

/// Decoded icon pixels ready to hand to a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    /// Icon width in pixels
    pub width: u32,
    /// Icon height in pixels
    pub height: u32,
    /// Raw RGBA pixel data, row-major
    pub rgba: Vec<u8>,
}

impl IconImage {
    /// Decode an icon from an image file (BMP or PNG)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let rgba = image::open(path)?.into_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!("Loaded icon {}x{} from {:?}", width, height, path);

        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Build an icon from raw RGBA pixels
    ///
    /// Returns `None` when the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_length_must_match_dimensions() {
        assert!(IconImage::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(IconImage::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn decodes_bmp_written_by_image_crate() {
        let path = std::env::temp_dir().join(format!("casement-icon-{}.bmp", std::process::id()));
        let pixels = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
        pixels.save(&path).unwrap();

        let icon = IconImage::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((icon.width, icon.height), (3, 2));
        assert_eq!(&icon.rgba[..4], &[255, 0, 0, 255]);
    }
}
