//! Drawing tool registry.

use crate::draw::color::TRANSPARENT;
use crate::draw::{Color, ShapeKind, Style};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a tool id is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool '{0}'")]
pub struct UnknownToolError(pub String);

/// Drawing tool selection.
///
/// The active tool determines what annotation is created when the user drags
/// the pointer over the photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    /// Pointer only, dragging draws nothing
    Select,
    /// Rectangle from drag start corner to current point
    Rectangle,
    /// Circle centred on the drag start point
    Circle,
    /// Arrow from drag start to current point
    Arrow,
    /// Freehand stroke following the pointer
    Pen,
    /// Translucent red circle marking a suspected cavity
    Cavity,
    /// Translucent brown rectangle marking staining
    Stain,
}

impl ToolId {
    /// Every tool in registry order.
    pub const ALL: [ToolId; 7] = [
        ToolId::Select,
        ToolId::Rectangle,
        ToolId::Circle,
        ToolId::Arrow,
        ToolId::Pen,
        ToolId::Cavity,
        ToolId::Stain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::Select => "select",
            ToolId::Rectangle => "rectangle",
            ToolId::Circle => "circle",
            ToolId::Arrow => "arrow",
            ToolId::Pen => "pen",
            ToolId::Cavity => "cavity",
            ToolId::Stain => "stain",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolId {
    type Err = UnknownToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolId::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownToolError(s.to_string()))
    }
}

/// Immutable description of one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub id: ToolId,
    /// Human-readable name shown in the toolbar
    pub label: &'static str,
    /// Default style of annotations drawn with this tool
    pub style: Style,
    /// Kind of annotation produced, `None` for the select tool
    pub shape: Option<ShapeKind>,
}

impl ToolDefinition {
    /// Whether dragging with this tool produces an annotation.
    pub fn draws(&self) -> bool {
        self.shape.is_some()
    }
}

/// Default stroke width for every drawing tool.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

const SELECT_STYLE: Style = Style {
    stroke: TRANSPARENT,
    stroke_width: 0.0,
    fill: None,
};

/// The fixed table of available tools.
///
/// Built once per canvas and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Registry with the built-in styles.
    pub fn builtin() -> Self {
        Self::with_stroke_width(DEFAULT_STROKE_WIDTH)
    }

    /// Registry whose drawing tools all use `stroke_width`.
    pub fn with_stroke_width(stroke_width: f64) -> Self {
        let style = |stroke: Color, fill: Option<Color>| Style {
            stroke,
            stroke_width,
            fill,
        };

        let amber = Color::from_rgb8(0xF5, 0x9E, 0x0B);
        let tools = vec![
            ToolDefinition {
                id: ToolId::Select,
                label: "Select",
                style: SELECT_STYLE,
                shape: None,
            },
            ToolDefinition {
                id: ToolId::Rectangle,
                label: "Rectangle",
                style: style(Color::from_rgb8(0x3B, 0x82, 0xF6), None),
                shape: Some(ShapeKind::Rectangle),
            },
            ToolDefinition {
                id: ToolId::Circle,
                label: "Circle",
                style: style(Color::from_rgb8(0x10, 0xB9, 0x81), None),
                shape: Some(ShapeKind::Circle),
            },
            ToolDefinition {
                id: ToolId::Arrow,
                label: "Arrow",
                style: style(amber, Some(amber)),
                shape: Some(ShapeKind::Arrow),
            },
            ToolDefinition {
                id: ToolId::Pen,
                label: "Pen",
                style: style(Color::from_rgb8(0xEF, 0x44, 0x44), None),
                shape: Some(ShapeKind::Freehand),
            },
            ToolDefinition {
                id: ToolId::Cavity,
                label: "Cavity",
                style: style(
                    Color::from_rgb8(0xDC, 0x26, 0x26),
                    Some(Color::from_rgba8(0xDC, 0x26, 0x26, 0x40)),
                ),
                shape: Some(ShapeKind::Circle),
            },
            ToolDefinition {
                id: ToolId::Stain,
                label: "Stain",
                style: style(
                    Color::from_rgb8(0xA1, 0x62, 0x07),
                    Some(Color::from_rgba8(0xA1, 0x62, 0x07, 0x33)),
                ),
                shape: Some(ShapeKind::Rectangle),
            },
        ];

        Self { tools }
    }

    /// All tools in registry order.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Looks up a tool by its string id.
    pub fn get_tool(&self, id: &str) -> Result<&ToolDefinition, UnknownToolError> {
        let id = id.parse::<ToolId>()?;
        Ok(self.definition(id))
    }

    /// Looks up a tool by typed id. Every `ToolId` is registered.
    pub fn definition(&self, id: ToolId) -> &ToolDefinition {
        // Registry order matches `ToolId::ALL`.
        &self.tools[id as usize]
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
