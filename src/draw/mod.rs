//! Annotation data model and Cairo rendering.
//!
//! This module defines the core drawing types used for photo annotation:
//! - [`Color`]: RGBA color representation with hex (de)serialization
//! - [`Annotation`]: Different annotation kinds (rectangles, circles, arrows, freehand)
//! - [`AnnotationCollection`]: Container for all committed annotations of one image
//! - [`Background`]: The decoded photo being annotated
//! - Rendering and flattening functions for Cairo-based output

pub mod background;
pub mod collection;
pub mod color;
pub mod compositor;
pub mod render;
pub mod shape;

pub use background::{Background, ImageLoadError};
pub use collection::AnnotationCollection;
pub use color::Color;
pub use compositor::{RenderError, flatten_to_png, render_scene};
pub use render::{render_annotation, render_annotations, render_freehand_borrowed};
pub use shape::{Annotation, AnnotationId, Bounds, Point, ShapeKind, Style};
