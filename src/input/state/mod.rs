mod core;
mod drag;
mod mouse;
mod persist;
mod render;

pub use core::{AnnotationCanvas, BackgroundStatus, CanvasSettings, DrawingState};
pub use persist::{SaveDispatch, SaveMode};
