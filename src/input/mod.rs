//! Pointer input handling and the annotation canvas state machine.
//!
//! This module translates pointer events from the embedding UI into drawing
//! actions. It owns the tool registry, the active tool, and the state machine
//! that turns a press-drag-release into a committed annotation.

pub mod events;
pub mod state;
pub mod tool;

// Re-export commonly used types at module level
pub use events::MouseButton;
pub use state::{
    AnnotationCanvas, BackgroundStatus, CanvasSettings, DrawingState, SaveDispatch, SaveMode,
};
pub use tool::{ToolDefinition, ToolId, ToolRegistry, UnknownToolError};
