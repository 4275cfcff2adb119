//! Background photo loading and fitting into the display area.

use crate::util;
use base64::Engine;
use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the background image.
///
/// These never abort the editing session: the canvas records the failure and
/// keeps its drawing tools inert until a valid image arrives.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("failed to read background image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background image data is empty")]
    Empty,

    #[error("failed to decode background image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid image data URI: {0}")]
    DataUri(String),

    #[error("failed to prepare image surface: {0}")]
    Surface(#[from] cairo::Error),

    #[error("image surface unavailable: {0}")]
    Borrow(#[from] cairo::BorrowError),
}

/// A decoded photo, already scaled to the canvas display resolution.
#[derive(Debug)]
pub struct Background {
    surface: cairo::ImageSurface,
    source_width: u32,
    source_height: u32,
    scale: f64,
}

impl Background {
    /// Decodes PNG/JPEG/WebP/GIF/BMP bytes and fits them into `max_width` x `max_height`.
    pub fn from_bytes(data: &[u8], max_width: u32, max_height: u32) -> Result<Self, ImageLoadError> {
        if data.is_empty() {
            return Err(ImageLoadError::Empty);
        }

        let rgba = image::load_from_memory(data)?.to_rgba8();
        let (source_width, source_height) = rgba.dimensions();
        if source_width == 0 || source_height == 0 {
            return Err(ImageLoadError::Empty);
        }

        let source = rgba_to_surface(&rgba)?;
        let scale = util::fit_scale(source_width, source_height, max_width, max_height);
        let (width, height) = util::fitted_size(source_width, source_height, max_width, max_height);

        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)?;
        {
            let ctx = cairo::Context::new(&surface)?;
            ctx.scale(scale, scale);
            ctx.set_source_surface(&source, 0.0, 0.0)?;
            ctx.source().set_filter(cairo::Filter::Good);
            ctx.paint()?;
        }
        surface.flush();

        debug!(
            "Fitted {}x{} background to {}x{} (scale {:.3})",
            source_width, source_height, width, height, scale
        );

        Ok(Self {
            surface,
            source_width,
            source_height,
            scale,
        })
    }

    /// Reads and decodes an image file.
    pub fn load(path: &Path, max_width: u32, max_height: u32) -> Result<Self, ImageLoadError> {
        let data = std::fs::read(path).map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let background = Self::from_bytes(&data, max_width, max_height)?;
        info!(
            "Loaded background {} ({}x{})",
            path.display(),
            background.source_width,
            background.source_height
        );
        Ok(background)
    }

    /// Decodes a `data:image/...;base64,` URI or a bare base64 string.
    pub fn from_data_uri(uri: &str, max_width: u32, max_height: u32) -> Result<Self, ImageLoadError> {
        let encoded = if uri.starts_with("data:") {
            uri.find(";base64,")
                .map(|pos| &uri[pos + 8..])
                .ok_or_else(|| ImageLoadError::DataUri("missing ;base64, marker".to_string()))?
        } else {
            uri
        };

        let data = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ImageLoadError::DataUri(e.to_string()))?;
        Self::from_bytes(&data, max_width, max_height)
    }

    /// Display width in pixels.
    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    /// Display height in pixels.
    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    /// Original image size before fitting.
    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// Scale applied to fit the display area (1.0 = original size).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Paints the image at the origin of `ctx`.
    pub fn paint(&self, ctx: &cairo::Context) -> Result<(), cairo::Error> {
        ctx.save()?;
        ctx.set_source_surface(&self.surface, 0.0, 0.0)?;
        ctx.paint()?;
        ctx.restore()
    }
}

/// Copies straight-alpha RGBA pixels into a premultiplied ARGB32 Cairo surface.
fn rgba_to_surface(rgba: &image::RgbaImage) -> Result<cairo::ImageSurface, ImageLoadError> {
    let (width, height) = rgba.dimensions();
    let mut surface =
        cairo::ImageSurface::create(cairo::Format::ARgb32, width as i32, height as i32)?;
    let stride = surface.stride() as usize;

    {
        let mut data = surface.data()?;
        for (y, row) in rgba.rows().enumerate() {
            let offset = y * stride;
            for (x, pixel) in row.enumerate() {
                let [r, g, b, a] = pixel.0;
                let premultiply = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u32;
                let argb = (a as u32) << 24
                    | premultiply(r) << 16
                    | premultiply(g) << 8
                    | premultiply(b);
                let start = offset + x * 4;
                data[start..start + 4].copy_from_slice(&argb.to_ne_bytes());
            }
        }
    }

    Ok(surface)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    /// Encodes a solid-color PNG for use as a test background.
    pub(crate) fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn large_images_are_fitted_to_bounds() {
        let png = solid_png(400, 200, [255, 255, 255, 255]);
        let background = Background::from_bytes(&png, 100, 100).unwrap();
        assert_eq!(background.width(), 100);
        assert_eq!(background.height(), 50);
        assert_eq!(background.source_size(), (400, 200));
        assert_eq!(background.scale(), 0.25);
    }

    #[test]
    fn small_images_keep_their_size() {
        let png = solid_png(30, 20, [0, 0, 0, 255]);
        let background = Background::from_bytes(&png, 1200, 800).unwrap();
        assert_eq!((background.width(), background.height()), (30, 20));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = Background::from_bytes(b"definitely not an image", 100, 100).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode(_)), "got {err:?}");
    }

    #[test]
    fn empty_bytes_are_rejected() {
        assert!(matches!(
            Background::from_bytes(&[], 100, 100),
            Err(ImageLoadError::Empty)
        ));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = Background::load(Path::new("/nonexistent/photo.png"), 100, 100).unwrap_err();
        assert!(matches!(err, ImageLoadError::Io { .. }));
    }

    #[test]
    fn data_uri_round_trip() {
        let png = solid_png(4, 4, [10, 20, 30, 255]);
        let uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );
        let background = Background::from_data_uri(&uri, 100, 100).unwrap();
        assert_eq!(background.width(), 4);
    }
}
