use crate::draw::{Annotation, AnnotationId, Point};
use log::debug;

use super::{AnnotationCanvas, DrawingState};

impl AnnotationCanvas {
    /// Starts a new annotation at `p` with the active tool.
    ///
    /// Does nothing when the select tool is active, a drag is already running,
    /// or no photo is ready.
    pub fn begin_drag(&mut self, p: Point) {
        if !matches!(self.state, DrawingState::Idle) {
            return;
        }
        if !self.background.is_ready() {
            debug!("Ignoring drag: no background image");
            return;
        }

        let tool = self.active_tool();
        let Some(kind) = tool.shape else {
            return;
        };
        let (tool, style) = (tool.id, tool.style);

        let annotation = Annotation::seeded(kind, AnnotationId::generate(), p, style);
        self.state = DrawingState::Dragging {
            tool,
            seed: p,
            annotation,
        };
        self.needs_redraw = true;
    }

    /// Grows the in-progress annotation towards `p`.
    pub fn update_drag(&mut self, p: Point) {
        let DrawingState::Dragging {
            seed, annotation, ..
        } = &mut self.state
        else {
            return;
        };
        let seed = *seed;

        match annotation {
            Annotation::Rectangle { width, height, .. } => {
                *width = p.x - seed.x;
                *height = p.y - seed.y;
            }
            Annotation::Circle { radius, .. } => {
                *radius = seed.distance_to(p);
            }
            Annotation::Arrow { points, .. } => {
                points[2] = p.x;
                points[3] = p.y;
            }
            Annotation::Freehand { points, .. } => {
                points.push(p);
            }
        }
        self.needs_redraw = true;
    }

    /// Appends the in-progress annotation to the collection.
    ///
    /// Returns the id of the committed annotation, or `None` when not dragging.
    pub fn commit_drag(&mut self) -> Option<AnnotationId> {
        let DrawingState::Dragging {
            tool, annotation, ..
        } = std::mem::replace(&mut self.state, DrawingState::Idle)
        else {
            return None;
        };

        let id = annotation.id().clone();
        debug!("Committed {} annotation {} ({tool})", annotation.kind(), id);
        self.collection.append(annotation);
        self.needs_redraw = true;
        Some(id)
    }

    /// Discards the in-progress annotation, leaving the collection untouched.
    pub fn cancel_drag(&mut self) {
        if matches!(self.state, DrawingState::Dragging { .. }) {
            self.state = DrawingState::Idle;
            self.needs_redraw = true;
        }
    }

    /// The annotation currently being dragged, for live preview.
    pub fn in_progress(&self) -> Option<&Annotation> {
        match &self.state {
            DrawingState::Dragging { annotation, .. } => Some(annotation),
            DrawingState::Idle => None,
        }
    }
}
