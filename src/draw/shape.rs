//! Annotation shape definitions and their wire format.

use super::color::Color;
use crate::util;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A position on the canvas in display pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Stable identifier of an annotation within a collection.
///
/// Freshly drawn annotations get a time-ordered UUID v7; hydrated annotations
/// keep whatever identifier they were saved with (older payloads used
/// millisecond timestamps, sometimes as bare JSON numbers).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    /// Generates a new collision-resistant identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AnnotationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AnnotationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// Visual style shared by every annotation kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    /// Outline color
    pub stroke: Color,
    /// Outline thickness in pixels
    pub stroke_width: f64,
    /// Interior fill; `None` draws the outline only
    pub fill: Option<Color>,
}

/// The closed set of shape kinds a tool can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Arrow,
    Freehand,
}

impl ShapeKind {
    /// Name used for the `type` tag of serialized annotations.
    pub fn type_tag(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Freehand => "line",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Arrow => "arrow",
            ShapeKind::Freehand => "freehand",
        };
        f.write_str(name)
    }
}

/// One user-drawn annotation.
///
/// Serialized as a flat JSON object with a `type` discriminator and camelCase
/// fields, e.g. `{"id":"a1","type":"circle","x":5,"y":5,"radius":12,...}`.
/// Rectangle `width`/`height` keep the sign of the drag that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Annotation {
    /// Axis-aligned rectangle anchored at the drag start corner
    #[serde(alias = "rect")]
    Rectangle {
        id: AnnotationId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        stroke: Color,
        stroke_width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
    },
    /// Circle centred on the drag start point
    #[serde(alias = "ellipse")]
    Circle {
        id: AnnotationId,
        x: f64,
        y: f64,
        radius: f64,
        stroke: Color,
        stroke_width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
    },
    /// Straight arrow; the head sits at the second point
    Arrow {
        id: AnnotationId,
        /// `[x1, y1, x2, y2]`
        points: [f64; 4],
        stroke: Color,
        stroke_width: f64,
        /// Arrowhead fill (falls back to the stroke color)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
    },
    /// Freehand pen stroke
    #[serde(rename = "line", alias = "freehand", alias = "pen")]
    Freehand {
        id: AnnotationId,
        /// Pointer samples in drawing order, written as `[x0, y0, x1, y1, ...]`
        #[serde(with = "flat_points")]
        points: Vec<Point>,
        stroke: Color,
        stroke_width: f64,
    },
}

impl Annotation {
    /// Creates an annotation of `kind` with zero-size geometry at `seed`.
    pub fn seeded(kind: ShapeKind, id: AnnotationId, seed: Point, style: Style) -> Self {
        let Style {
            stroke,
            stroke_width,
            fill,
        } = style;
        match kind {
            ShapeKind::Rectangle => Annotation::Rectangle {
                id,
                x: seed.x,
                y: seed.y,
                width: 0.0,
                height: 0.0,
                stroke,
                stroke_width,
                fill,
            },
            ShapeKind::Circle => Annotation::Circle {
                id,
                x: seed.x,
                y: seed.y,
                radius: 0.0,
                stroke,
                stroke_width,
                fill,
            },
            ShapeKind::Arrow => Annotation::Arrow {
                id,
                points: [seed.x, seed.y, seed.x, seed.y],
                stroke,
                stroke_width,
                fill: fill.or(Some(stroke)),
            },
            ShapeKind::Freehand => Annotation::Freehand {
                id,
                points: vec![seed],
                stroke,
                stroke_width,
            },
        }
    }

    pub fn id(&self) -> &AnnotationId {
        match self {
            Annotation::Rectangle { id, .. }
            | Annotation::Circle { id, .. }
            | Annotation::Arrow { id, .. }
            | Annotation::Freehand { id, .. } => id,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Annotation::Rectangle { .. } => ShapeKind::Rectangle,
            Annotation::Circle { .. } => ShapeKind::Circle,
            Annotation::Arrow { .. } => ShapeKind::Arrow,
            Annotation::Freehand { .. } => ShapeKind::Freehand,
        }
    }

    pub fn style(&self) -> Style {
        match self {
            Annotation::Rectangle {
                stroke,
                stroke_width,
                fill,
                ..
            }
            | Annotation::Circle {
                stroke,
                stroke_width,
                fill,
                ..
            } => Style {
                stroke: *stroke,
                stroke_width: *stroke_width,
                fill: *fill,
            },
            Annotation::Arrow {
                stroke,
                stroke_width,
                fill,
                ..
            } => Style {
                stroke: *stroke,
                stroke_width: *stroke_width,
                fill: Some(fill.unwrap_or(*stroke)),
            },
            Annotation::Freehand {
                stroke,
                stroke_width,
                ..
            } => Style {
                stroke: *stroke,
                stroke_width: *stroke_width,
                fill: None,
            },
        }
    }

    /// Checks the numeric invariants serde cannot express.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let style = self.style();
        if !style.stroke_width.is_finite() || style.stroke_width < 0.0 {
            return Err(format!("invalid strokeWidth {}", style.stroke_width));
        }

        let finite = match self {
            Annotation::Rectangle {
                x, y, width, height, ..
            } => [*x, *y, *width, *height].iter().all(|v| v.is_finite()),
            Annotation::Circle { x, y, radius, .. } => {
                if *radius < 0.0 {
                    return Err(format!("negative radius {radius}"));
                }
                [*x, *y, *radius].iter().all(|v| v.is_finite())
            }
            Annotation::Arrow { points, .. } => points.iter().all(|v| v.is_finite()),
            Annotation::Freehand { points, .. } => {
                if points.is_empty() {
                    return Err("freehand stroke without points".to_string());
                }
                points.iter().all(|p| p.is_finite())
            }
        };

        if finite {
            Ok(())
        } else {
            Err("non-finite coordinate".to_string())
        }
    }

    /// Returns the axis-aligned bounds of the shape, expanded to cover the stroke.
    ///
    /// Signed rectangles are normalized here; the stored geometry is untouched.
    pub fn bounding_box(&self) -> Option<Bounds> {
        let pad = self.style().stroke_width / 2.0;
        let bounds = match self {
            Annotation::Rectangle {
                x, y, width, height, ..
            } => Bounds::from_points(&[Point::new(*x, *y), Point::new(x + width, y + height)]),
            Annotation::Circle { x, y, radius, .. } => Bounds::from_points(&[
                Point::new(x - radius, y - radius),
                Point::new(x + radius, y + radius),
            ]),
            Annotation::Arrow {
                points,
                stroke_width,
                ..
            } => {
                let start = Point::new(points[0], points[1]);
                let tip = Point::new(points[2], points[3]);
                match util::arrowhead_triangle(start, tip, *stroke_width) {
                    // The head's side corners can stick out past the line.
                    Some([_, left, right]) => Bounds::from_points(&[start, tip, left, right]),
                    None => Bounds::from_points(&[start, tip]),
                }
            }
            Annotation::Freehand { points, .. } => Bounds::from_points(points),
        };
        bounds.map(|bounds| bounds.expand(pad))
    }
}

/// Floating-point axis-aligned rectangle with non-negative size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    fn expand(self, pad: f64) -> Self {
        Self {
            x: self.x - pad,
            y: self.y - pad,
            width: self.width + pad * 2.0,
            height: self.height + pad * 2.0,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Serde adapter writing `Vec<Point>` as a flat `[x0, y0, x1, y1, ...]` array.
mod flat_points {
    use super::Point;
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(points.len() * 2))?;
        for point in points {
            seq.serialize_element(&point.x)?;
            seq.serialize_element(&point.y)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let flat = Vec::<f64>::deserialize(deserializer)?;
        if flat.len() % 2 != 0 {
            return Err(D::Error::custom(format!(
                "points must hold x/y pairs, got {} numbers",
                flat.len()
            )));
        }
        Ok(flat
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};
    use serde_json::json;

    fn style() -> Style {
        Style {
            stroke: BLUE,
            stroke_width: 2.0,
            fill: None,
        }
    }

    #[test]
    fn circle_serializes_with_type_tag_and_camel_case() {
        let circle = Annotation::Circle {
            id: "a1".into(),
            x: 5.0,
            y: 5.0,
            radius: 12.0,
            stroke: RED,
            stroke_width: 2.0,
            fill: None,
        };

        let value = serde_json::to_value(&circle).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "circle",
                "id": "a1",
                "x": 5.0,
                "y": 5.0,
                "radius": 12.0,
                "stroke": "#FF0000",
                "strokeWidth": 2.0
            })
        );
    }

    #[test]
    fn freehand_points_are_flat_on_the_wire() {
        let stroke = Annotation::Freehand {
            id: "p".into(),
            points: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            stroke: RED,
            stroke_width: 2.0,
        };

        let value = serde_json::to_value(&stroke).unwrap();
        assert_eq!(value["type"], "line");
        assert_eq!(value["points"], json!([1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn odd_freehand_points_are_rejected() {
        let raw = json!({
            "id": "p", "type": "line", "points": [1, 2, 3],
            "stroke": "#EF4444", "strokeWidth": 2
        });
        assert!(serde_json::from_value::<Annotation>(raw).is_err());
    }

    #[test]
    fn arrow_requires_exactly_four_numbers() {
        let raw = json!({
            "id": "a", "type": "arrow", "points": [0, 0, 10],
            "stroke": "#F59E0B", "strokeWidth": 2, "fill": "#F59E0B"
        });
        assert!(serde_json::from_value::<Annotation>(raw).is_err());
    }

    #[test]
    fn synonyms_and_numeric_ids_are_accepted() {
        let raw = json!({
            "id": 1717171717171u64, "type": "rect", "x": 1, "y": 2,
            "width": 3, "height": 4, "stroke": "#3B82F6", "strokeWidth": 2
        });
        let annotation: Annotation = serde_json::from_value(raw).unwrap();
        assert_eq!(annotation.kind(), ShapeKind::Rectangle);
        assert_eq!(annotation.id().as_str(), "1717171717171");
    }

    #[test]
    fn seeded_shapes_have_zero_size() {
        let seed = Point::new(10.0, 20.0);
        let rect = Annotation::seeded(ShapeKind::Rectangle, "r".into(), seed, style());
        assert!(matches!(rect, Annotation::Rectangle { width, height, .. } if width == 0.0 && height == 0.0));

        let arrow = Annotation::seeded(ShapeKind::Arrow, "a".into(), seed, style());
        match arrow {
            Annotation::Arrow { points, fill, .. } => {
                assert_eq!(points, [10.0, 20.0, 10.0, 20.0]);
                assert_eq!(fill, Some(BLUE));
            }
            other => panic!("expected arrow, got {other:?}"),
        }

        let pen = Annotation::seeded(ShapeKind::Freehand, "f".into(), seed, style());
        assert!(matches!(pen, Annotation::Freehand { ref points, .. } if points == &vec![seed]));
    }

    #[test]
    fn negative_rectangle_bounds_are_normalized() {
        let rect = Annotation::Rectangle {
            id: "r".into(),
            x: 10.0,
            y: 10.0,
            width: -10.0,
            height: -10.0,
            stroke: BLUE,
            stroke_width: 2.0,
            fill: None,
        };
        let bounds = rect.bounding_box().unwrap();
        assert_eq!(bounds.x, -1.0);
        assert_eq!(bounds.y, -1.0);
        assert_eq!(bounds.width, 12.0);
        assert_eq!(bounds.height, 12.0);
    }

    #[test]
    fn arrow_bounds_cover_the_arrowhead() {
        // Short and thick: the head is 10 wide across a horizontal 20px line.
        let arrow = Annotation::Arrow {
            id: "a".into(),
            points: [0.0, 0.0, 20.0, 0.0],
            stroke: BLUE,
            stroke_width: 4.0,
            fill: None,
        };
        let bounds = arrow.bounding_box().unwrap();
        assert_eq!(bounds.x, -2.0);
        assert_eq!(bounds.width, 24.0);
        assert_eq!(bounds.y, -7.0);
        assert_eq!(bounds.height, 14.0);
    }

    #[test]
    fn validate_flags_negative_radius() {
        let circle = Annotation::Circle {
            id: "c".into(),
            x: 0.0,
            y: 0.0,
            radius: -1.0,
            stroke: BLUE,
            stroke_width: 2.0,
            fill: None,
        };
        assert!(circle.validate().is_err());
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = AnnotationId::generate();
        let b = AnnotationId::generate();
        assert_ne!(a, b);
    }
}
