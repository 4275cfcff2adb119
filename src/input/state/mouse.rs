use crate::draw::Point;
use crate::input::events::MouseButton;

use super::AnnotationCanvas;

impl AnnotationCanvas {
    /// Processes a mouse button press event.
    ///
    /// # Arguments
    /// * `button` - Which mouse button was pressed
    /// * `x` - Pointer X coordinate in canvas pixels
    /// * `y` - Pointer Y coordinate in canvas pixels
    ///
    /// # Behavior
    /// - Left click: Starts a drag with the active tool
    /// - Right click: Cancels the current drag
    pub fn on_pointer_press(&mut self, button: MouseButton, x: f64, y: f64) {
        match button {
            MouseButton::Left => self.begin_drag(Point::new(x, y)),
            MouseButton::Right => self.cancel_drag(),
            MouseButton::Middle => {}
        }
    }

    /// Processes pointer motion; grows the in-progress annotation while dragging.
    pub fn on_pointer_motion(&mut self, x: f64, y: f64) {
        self.update_drag(Point::new(x, y));
    }

    /// Processes mouse button release events.
    ///
    /// When the left button is released during a drag the annotation is
    /// extended to the release point and committed.
    pub fn on_pointer_release(&mut self, button: MouseButton, x: f64, y: f64) {
        if button != MouseButton::Left {
            return;
        }
        self.update_drag(Point::new(x, y));
        self.commit_drag();
    }

    /// The pointer left the canvas; any drag is abandoned.
    pub fn on_pointer_leave(&mut self) {
        self.cancel_drag();
    }
}
