//! Cairo-based rendering functions for annotations.

use super::color::Color;
use super::shape::{Annotation, Point};
use crate::util::{self, PathSegment};

/// Renders all annotations in a collection to a Cairo context.
///
/// Annotations are drawn in the order they appear (first = bottom layer).
pub fn render_annotations(ctx: &cairo::Context, annotations: &[Annotation]) {
    for annotation in annotations {
        render_annotation(ctx, annotation);
    }
}

/// Renders a single annotation to a Cairo context.
///
/// Dispatches to the appropriate internal rendering function based on the
/// annotation kind.
pub fn render_annotation(ctx: &cairo::Context, annotation: &Annotation) {
    let _ = ctx.save();
    match annotation {
        Annotation::Rectangle {
            x,
            y,
            width,
            height,
            stroke,
            stroke_width,
            fill,
            ..
        } => render_rectangle(ctx, *x, *y, *width, *height, *stroke, *stroke_width, *fill),
        Annotation::Circle {
            x,
            y,
            radius,
            stroke,
            stroke_width,
            fill,
            ..
        } => render_circle(ctx, *x, *y, *radius, *stroke, *stroke_width, *fill),
        Annotation::Arrow {
            points,
            stroke,
            stroke_width,
            fill,
            ..
        } => render_arrow(
            ctx,
            Point::new(points[0], points[1]),
            Point::new(points[2], points[3]),
            *stroke,
            *stroke_width,
            fill.unwrap_or(*stroke),
        ),
        Annotation::Freehand {
            points,
            stroke,
            stroke_width,
            ..
        } => render_freehand_borrowed(ctx, points, *stroke, *stroke_width),
    }
    let _ = ctx.restore();
}

/// Fills the current path when a visible fill is set, then strokes it.
fn fill_and_stroke(ctx: &cairo::Context, stroke: Color, stroke_width: f64, fill: Option<Color>) {
    if let Some(fill) = fill.filter(|f| f.is_visible()) {
        fill.apply(ctx);
        let _ = ctx.fill_preserve();
    }

    if stroke_width > 0.0 {
        stroke.apply(ctx);
        ctx.set_line_width(stroke_width);
        let _ = ctx.stroke();
    } else {
        ctx.new_path();
    }
}

/// Render a rectangle anchored at `(x, y)`.
///
/// Negative sizes extend left/up from the anchor; Cairo handles signed
/// rectangles directly, so no normalization happens here.
#[allow(clippy::too_many_arguments)]
fn render_rectangle(
    ctx: &cairo::Context,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stroke: Color,
    stroke_width: f64,
    fill: Option<Color>,
) {
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(x, y, width, height);
    fill_and_stroke(ctx, stroke, stroke_width, fill);
}

/// Render a circle centred at `(x, y)`
fn render_circle(
    ctx: &cairo::Context,
    x: f64,
    y: f64,
    radius: f64,
    stroke: Color,
    stroke_width: f64,
    fill: Option<Color>,
) {
    if radius <= 0.0 {
        return;
    }

    ctx.new_sub_path();
    ctx.arc(x, y, radius, 0.0, 2.0 * std::f64::consts::PI);
    fill_and_stroke(ctx, stroke, stroke_width, fill);
}

/// Render an arrow: a stroked shaft with a filled head at `tip`
fn render_arrow(
    ctx: &cairo::Context,
    start: Point,
    tip: Point,
    stroke: Color,
    stroke_width: f64,
    fill: Color,
) {
    stroke.apply(ctx);
    ctx.set_line_width(stroke_width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.move_to(start.x, start.y);
    ctx.line_to(tip.x, tip.y);
    let _ = ctx.stroke();

    let Some([tip, left, right]) = util::arrowhead_triangle(start, tip, stroke_width) else {
        return;
    };

    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.move_to(tip.x, tip.y);
    ctx.line_to(left.x, left.y);
    ctx.line_to(right.x, right.y);
    ctx.close_path();
    fill_and_stroke(ctx, stroke, stroke_width, Some(fill));
}

/// Render a freehand stroke as a smoothed curve through its samples.
///
/// Accepts a borrowed slice so the in-progress stroke can be previewed on
/// every pointer move without cloning it. A single sample renders as a dot.
pub fn render_freehand_borrowed(
    ctx: &cairo::Context,
    points: &[Point],
    color: Color,
    stroke_width: f64,
) {
    let Some(first) = points.first() else {
        return;
    };

    color.apply(ctx);

    if points.len() == 1 {
        ctx.new_sub_path();
        ctx.arc(first.x, first.y, stroke_width / 2.0, 0.0, 2.0 * std::f64::consts::PI);
        let _ = ctx.fill();
        return;
    }

    ctx.set_line_width(stroke_width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(first.x, first.y);
    for segment in util::smooth_polyline(points, util::FREEHAND_TENSION) {
        match segment {
            PathSegment::LineTo(p) => ctx.line_to(p.x, p.y),
            PathSegment::CurveTo(c1, c2, end) => ctx.curve_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y),
        }
    }

    let _ = ctx.stroke();
}

/// Fills the whole surface with a solid color.
pub fn fill_background(ctx: &cairo::Context, color: Color) {
    let _ = ctx.save();
    color.apply(ctx);
    ctx.set_operator(cairo::Operator::Source);
    let _ = ctx.paint();
    let _ = ctx.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED, WHITE};
    use crate::draw::shape::ShapeKind;

    fn white_surface(width: i32, height: i32) -> (cairo::ImageSurface, cairo::Context) {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        fill_background(&ctx, WHITE);
        (surface, ctx)
    }

    /// Returns `[b, g, r, a]` bytes for a pixel (little-endian ARGB32).
    fn pixel(surface: &mut cairo::ImageSurface, x: usize, y: usize) -> [u8; 4] {
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let start = y * stride + x * 4;
        let argb = u32::from_ne_bytes([
            data[start],
            data[start + 1],
            data[start + 2],
            data[start + 3],
        ]);
        [
            (argb & 0xFF) as u8,
            (argb >> 8 & 0xFF) as u8,
            (argb >> 16 & 0xFF) as u8,
            (argb >> 24) as u8,
        ]
    }

    fn is_white(px: [u8; 4]) -> bool {
        px == [255, 255, 255, 255]
    }

    #[test]
    fn negative_rectangle_draws_up_and_left_of_anchor() {
        let (mut surface, ctx) = white_surface(60, 60);
        render_annotation(
            &ctx,
            &Annotation::Rectangle {
                id: "r".into(),
                x: 50.0,
                y: 50.0,
                width: -40.0,
                height: -40.0,
                stroke: RED,
                stroke_width: 4.0,
                fill: None,
            },
        );
        drop(ctx);

        // Left edge of the normalized rectangle sits at x = 10.
        assert!(!is_white(pixel(&mut surface, 10, 30)));
        // Interior stays unfilled.
        assert!(is_white(pixel(&mut surface, 30, 30)));
        // Nothing beyond the anchor corner.
        assert!(is_white(pixel(&mut surface, 56, 56)));
    }

    #[test]
    fn filled_circle_paints_interior() {
        let (mut surface, ctx) = white_surface(40, 40);
        render_annotation(
            &ctx,
            &Annotation::Circle {
                id: "c".into(),
                x: 20.0,
                y: 20.0,
                radius: 10.0,
                stroke: BLUE,
                stroke_width: 2.0,
                fill: Some(BLUE),
            },
        );
        drop(ctx);
        assert!(!is_white(pixel(&mut surface, 20, 20)));
    }

    #[test]
    fn outline_circle_leaves_interior_untouched() {
        let (mut surface, ctx) = white_surface(40, 40);
        render_annotation(
            &ctx,
            &Annotation::Circle {
                id: "c".into(),
                x: 20.0,
                y: 20.0,
                radius: 10.0,
                stroke: BLUE,
                stroke_width: 2.0,
                fill: None,
            },
        );
        drop(ctx);
        assert!(is_white(pixel(&mut surface, 20, 20)));
        assert!(!is_white(pixel(&mut surface, 30, 20)));
    }

    #[test]
    fn arrow_head_is_filled_at_tip() {
        let (mut surface, ctx) = white_surface(100, 40);
        render_annotation(
            &ctx,
            &Annotation::Arrow {
                id: "a".into(),
                points: [10.0, 20.0, 90.0, 20.0],
                stroke: RED,
                stroke_width: 2.0,
                fill: Some(RED),
            },
        );
        drop(ctx);
        // Inside the head, off the shaft.
        assert!(!is_white(pixel(&mut surface, 84, 21)));
        // Beside the shaft far from the head.
        assert!(is_white(pixel(&mut surface, 40, 26)));
    }

    #[test]
    fn single_point_freehand_renders_a_dot() {
        let (mut surface, ctx) = white_surface(20, 20);
        let dot = Annotation::seeded(
            ShapeKind::Freehand,
            "f".into(),
            Point::new(10.0, 10.0),
            crate::draw::Style {
                stroke: RED,
                stroke_width: 6.0,
                fill: None,
            },
        );
        render_annotation(&ctx, &dot);
        drop(ctx);
        assert!(!is_white(pixel(&mut surface, 10, 10)));
    }
}
