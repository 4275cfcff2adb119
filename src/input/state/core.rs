//! Drawing state machine and canvas state management.

use crate::draw::{
    Annotation, AnnotationCollection, Background, Color, ImageLoadError, Point, color::CANVAS_GRAY,
};
use crate::input::tool::{ToolDefinition, ToolId, ToolRegistry, UnknownToolError};
use crate::persistence::PersistedAnnotationPayload;
use log::{info, warn};
use serde_json::{Map, Value};
use std::path::Path;

/// Current drawing mode state machine.
///
/// Tracks whether the user is idle or actively dragging out an annotation.
/// Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    /// Not actively drawing - waiting for a pointer press
    Idle,
    /// Pointer held down, annotation growing with the drag
    Dragging {
        /// Tool the drag started with (kept even if the active tool changes)
        tool: ToolId,
        /// Where the pointer was pressed
        seed: Point,
        /// Candidate annotation, updated on every pointer move
        annotation: Annotation,
    },
}

/// Load state of the photo behind the annotations.
#[derive(Debug, Default)]
pub enum BackgroundStatus {
    /// Nothing loaded yet
    #[default]
    Empty,
    Ready(Background),
    /// Last load attempt failed; drawing stays disabled until a photo loads
    Failed(ImageLoadError),
}

impl BackgroundStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, BackgroundStatus::Ready(_))
    }
}

/// Display settings for a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSettings {
    /// Maximum display width; larger photos are scaled down
    pub max_width: u32,
    /// Maximum display height; larger photos are scaled down
    pub max_height: u32,
    /// Color painted behind the photo
    pub backdrop: Color,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 800,
            backdrop: CANVAS_GRAY,
        }
    }
}

/// One editing session over a single photo.
///
/// Holds the active tool, the drag state machine, the committed annotations
/// and the photo. All transitions are synchronous and driven by pointer
/// events; saving and reporting are handed off to a
/// [`PersistenceManager`](crate::persistence::PersistenceManager).
pub struct AnnotationCanvas {
    /// Tools available on this canvas
    registry: ToolRegistry,
    pub(super) settings: CanvasSettings,
    /// Currently selected tool
    active_tool: ToolId,
    /// Current drawing mode state machine
    pub state: DrawingState,
    pub(super) collection: AnnotationCollection,
    pub(super) background: BackgroundStatus,
    /// Submission being edited, if any
    pub(super) submission_id: Option<String>,
    /// Free-text recommendations loaded with the payload
    pub(super) recommendations: Option<String>,
    /// Unrecognised top-level payload fields, written back on save
    pub(super) payload_extra: Map<String, Value>,
    /// Revision of a save that has been dispatched but not yet answered
    pub(super) pending_save: Option<u64>,
    /// Whether the display needs to be redrawn
    pub needs_redraw: bool,
}

impl AnnotationCanvas {
    /// Creates an empty canvas with the select tool active.
    pub fn new(registry: ToolRegistry, settings: CanvasSettings) -> Self {
        Self {
            registry,
            settings,
            active_tool: ToolId::Select,
            state: DrawingState::Idle,
            collection: AnnotationCollection::new(),
            background: BackgroundStatus::Empty,
            submission_id: None,
            recommendations: None,
            payload_extra: Map::new(),
            pending_save: None,
            needs_redraw: true,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn active_tool(&self) -> &ToolDefinition {
        self.registry.definition(self.active_tool)
    }

    /// Switches the active tool.
    ///
    /// An in-progress drag keeps the tool it started with. Unknown ids leave the
    /// current tool unchanged.
    pub fn set_tool(&mut self, id: &str) -> Result<(), UnknownToolError> {
        let tool = self.registry.get_tool(id)?.id;
        self.set_tool_id(tool);
        Ok(())
    }

    pub fn set_tool_id(&mut self, tool: ToolId) {
        if self.active_tool != tool {
            log::debug!("Tool changed: {} -> {}", self.active_tool, tool);
            self.active_tool = tool;
            self.needs_redraw = true;
        }
    }

    pub fn collection(&self) -> &AnnotationCollection {
        &self.collection
    }

    /// Committed annotations in z-order.
    pub fn annotations(&self) -> &[Annotation] {
        self.collection.snapshot()
    }

    pub fn is_dirty(&self) -> bool {
        self.collection.is_dirty()
    }

    /// Removes every committed annotation and discards any drag.
    pub fn clear_all(&mut self) {
        self.cancel_drag();
        self.collection.clear_all();
        self.needs_redraw = true;
    }

    pub fn background_status(&self) -> &BackgroundStatus {
        &self.background
    }

    pub fn background(&self) -> Option<&Background> {
        match &self.background {
            BackgroundStatus::Ready(background) => Some(background),
            _ => None,
        }
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    pub fn recommendations(&self) -> Option<&str> {
        self.recommendations.as_deref()
    }

    /// Whether a save dispatched by this canvas is still awaiting its outcome.
    pub fn save_pending(&self) -> bool {
        self.pending_save.is_some()
    }

    /// Decodes `image` as the new photo.
    ///
    /// Failures are recorded in [`BackgroundStatus::Failed`] and returned for
    /// display; the session keeps running with drawing disabled.
    pub fn load_background_bytes(&mut self, image: &[u8]) -> Result<(), &ImageLoadError> {
        let result = Background::from_bytes(image, self.settings.max_width, self.settings.max_height);
        self.set_background(result)
    }

    /// Reads and decodes the photo at `path`.
    pub fn load_background_path(&mut self, path: &Path) -> Result<(), &ImageLoadError> {
        let result = Background::load(path, self.settings.max_width, self.settings.max_height);
        self.set_background(result)
    }

    fn set_background(
        &mut self,
        result: Result<Background, ImageLoadError>,
    ) -> Result<(), &ImageLoadError> {
        self.cancel_drag();
        self.needs_redraw = true;
        self.background = match result {
            Ok(background) => BackgroundStatus::Ready(background),
            Err(err) => {
                warn!("Background image unavailable: {err}");
                BackgroundStatus::Failed(err)
            }
        };
        match &self.background {
            BackgroundStatus::Failed(err) => Err(err),
            _ => Ok(()),
        }
    }

    /// Switches the canvas to another submission.
    ///
    /// Replaces the collection wholesale with the annotations in `payload`
    /// (unsaved work is dropped) and loads the photo. Malformed payloads give
    /// an empty collection.
    pub fn load_submission(
        &mut self,
        submission_id: impl Into<String>,
        image: &[u8],
        payload: Option<&Value>,
    ) -> Result<(), &ImageLoadError> {
        let submission_id = submission_id.into();
        if self.collection.is_dirty() {
            warn!(
                "Discarding unsaved annotations of {}",
                self.submission_id.as_deref().unwrap_or("<none>")
            );
        }

        self.cancel_drag();
        let parsed = payload
            .map(PersistedAnnotationPayload::from_value)
            .unwrap_or_default();
        self.collection.reset_to(parsed.annotations);
        self.recommendations = parsed.recommendations;
        self.payload_extra = parsed.extra;
        self.pending_save = None;
        info!(
            "Loaded submission {} with {} annotation(s)",
            submission_id,
            self.collection.len()
        );
        self.submission_id = Some(submission_id);

        self.load_background_bytes(image)
    }
}
