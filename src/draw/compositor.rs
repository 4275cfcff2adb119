//! Scene composition: background photo plus annotations, live or flattened.

use super::background::Background;
use super::color::Color;
use super::render::{fill_background, render_annotation, render_annotations};
use super::shape::Annotation;
use log::debug;
use thiserror::Error;

/// Errors that can occur while producing a flattened export.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no background image is loaded")]
    NoBackground,

    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] cairo::IoError),
}

/// Draws the visible composition to `ctx`.
///
/// Order: backdrop, background photo, committed annotations in z-order, then
/// the in-progress annotation on top so it stays visible while dragging.
pub fn render_scene(
    ctx: &cairo::Context,
    backdrop: Color,
    background: &Background,
    committed: &[Annotation],
    in_progress: Option<&Annotation>,
) -> Result<(), cairo::Error> {
    fill_background(ctx, backdrop);
    background.paint(ctx)?;
    render_annotations(ctx, committed);
    if let Some(annotation) = in_progress {
        render_annotation(ctx, annotation);
    }
    ctx.status()
}

/// Renders background and committed annotations into a PNG at display resolution.
///
/// Only committed annotations take part, so the output depends on nothing but
/// the background and the annotation list.
pub fn flatten_to_png(
    backdrop: Color,
    background: &Background,
    committed: &[Annotation],
) -> Result<Vec<u8>, RenderError> {
    let surface = cairo::ImageSurface::create(
        cairo::Format::ARgb32,
        background.width(),
        background.height(),
    )?;
    {
        let ctx = cairo::Context::new(&surface)?;
        render_scene(&ctx, backdrop, background, committed, None)?;
    }
    surface.flush();

    let mut png = Vec::new();
    surface.write_to_png(&mut png)?;
    debug!(
        "Flattened {} annotation(s) into {}x{} PNG ({} bytes)",
        committed.len(),
        background.width(),
        background.height(),
        png.len()
    );
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::background::tests::solid_png;
    use crate::draw::color::{CANVAS_GRAY, RED};

    fn rect(id: &str) -> Annotation {
        Annotation::Rectangle {
            id: id.into(),
            x: 5.0,
            y: 5.0,
            width: 20.0,
            height: 10.0,
            stroke: RED,
            stroke_width: 2.0,
            fill: None,
        }
    }

    #[test]
    fn flatten_produces_png_of_display_size() {
        let background = Background::from_bytes(&solid_png(64, 32, [255, 255, 255, 255]), 32, 32)
            .unwrap();
        let png = flatten_to_png(CANVAS_GRAY, &background, &[rect("a")]).unwrap();
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn flatten_is_deterministic() {
        let background =
            Background::from_bytes(&solid_png(40, 40, [200, 220, 240, 255]), 100, 100).unwrap();
        let shapes = [rect("a"), rect("b")];
        let first = flatten_to_png(CANVAS_GRAY, &background, &shapes).unwrap();
        let second = flatten_to_png(CANVAS_GRAY, &background, &shapes).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn annotations_change_the_output() {
        let background =
            Background::from_bytes(&solid_png(40, 40, [255, 255, 255, 255]), 100, 100).unwrap();
        let bare = flatten_to_png(CANVAS_GRAY, &background, &[]).unwrap();
        let annotated = flatten_to_png(CANVAS_GRAY, &background, &[rect("a")]).unwrap();
        assert_ne!(bare, annotated);
    }
}
