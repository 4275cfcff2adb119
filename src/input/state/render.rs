use crate::draw::{RenderError, flatten_to_png, render_scene};

use super::AnnotationCanvas;

impl AnnotationCanvas {
    /// Draws the visible canvas: photo, committed annotations, then the live preview.
    ///
    /// With no photo ready nothing is drawn, leaving the surface blank. Clears
    /// [`AnnotationCanvas::needs_redraw`].
    pub fn render(&mut self, ctx: &cairo::Context) -> Result<(), RenderError> {
        self.needs_redraw = false;
        let Some(background) = self.background() else {
            return Ok(());
        };
        render_scene(
            ctx,
            self.settings.backdrop,
            background,
            self.collection.snapshot(),
            self.in_progress(),
        )?;
        Ok(())
    }

    /// Flattens photo and committed annotations into a PNG at display resolution.
    ///
    /// The in-progress annotation is never included.
    pub fn export_flattened(&self) -> Result<Vec<u8>, RenderError> {
        let background = self.background().ok_or(RenderError::NoBackground)?;
        flatten_to_png(
            self.settings.backdrop,
            background,
            self.collection.snapshot(),
        )
    }

    /// Display size of the canvas, `None` until a photo is ready.
    pub fn display_size(&self) -> Option<(i32, i32)> {
        self.background().map(|bg| (bg.width(), bg.height()))
    }
}
