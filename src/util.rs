//! Geometry helpers for arrowheads, stroke smoothing, and image fitting.
//!
//! This module provides:
//! - Arrowhead triangle calculation
//! - Cardinal-spline smoothing for freehand strokes
//! - Aspect-preserving fit of an image into the display bounds

use crate::draw::Point;

// ============================================================================
// Arrowhead Geometry
// ============================================================================

/// Minimum arrowhead length in pixels.
pub const MIN_ARROWHEAD_LENGTH: f64 = 10.0;

/// Arrowhead length per pixel of stroke width.
pub const ARROWHEAD_PER_STROKE: f64 = 5.0;

/// Calculates the filled arrowhead triangle for an arrow from `start` to `tip`.
///
/// The head length is proportional to the stroke width (never below
/// [`MIN_ARROWHEAD_LENGTH`]) and is capped at half of the line length so short
/// arrows stay readable. The head is as wide as it is long.
///
/// # Returns
/// `[tip, left, right]`, or `None` when the line is shorter than one pixel.
pub fn arrowhead_triangle(start: Point, tip: Point, stroke_width: f64) -> Option<[Point; 3]> {
    let dx = tip.x - start.x;
    let dy = tip.y - start.y;
    let line_length = dx.hypot(dy);

    if line_length < 1.0 {
        return None;
    }

    let ux = dx / line_length;
    let uy = dy / line_length;

    let length = (stroke_width * ARROWHEAD_PER_STROKE)
        .max(MIN_ARROWHEAD_LENGTH)
        .min(line_length * 0.5);
    let half_width = length / 2.0;

    let base_x = tip.x - ux * length;
    let base_y = tip.y - uy * length;

    // Perpendicular (-uy, ux)
    let left = Point::new(base_x - uy * half_width, base_y + ux * half_width);
    let right = Point::new(base_x + uy * half_width, base_y - ux * half_width);

    Some([tip, left, right])
}

// ============================================================================
// Stroke Smoothing
// ============================================================================

/// Tension used when smoothing freehand strokes for display.
pub const FREEHAND_TENSION: f64 = 0.5;

/// One drawing command after the initial `move_to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    LineTo(Point),
    /// Cubic Bézier: two control points then the end point
    CurveTo(Point, Point, Point),
}

/// Builds a smoothed path through `points` using a cardinal spline.
///
/// The path passes through every sample; only the rendering is smoothed, the
/// stored samples are never modified. Two samples produce a straight line and
/// `tension <= 0` produces a plain polyline.
pub fn smooth_polyline(points: &[Point], tension: f64) -> Vec<PathSegment> {
    if points.len() < 3 || tension <= 0.0 {
        return points.iter().skip(1).map(|&p| PathSegment::LineTo(p)).collect();
    }

    // Control points on either side of every interior sample.
    let controls: Vec<(Point, Point)> = points
        .windows(3)
        .map(|w| control_points(w[0], w[1], w[2], tension))
        .collect();

    let last = points.len() - 1;
    let mut segments = Vec::with_capacity(last);

    // First segment: quadratic into the first interior sample.
    segments.push(quadratic(points[0], controls[0].0, points[1]));

    for i in 1..last - 1 {
        segments.push(PathSegment::CurveTo(
            controls[i - 1].1,
            controls[i].0,
            points[i + 1],
        ));
    }

    // Last segment: quadratic out of the final interior sample.
    segments.push(quadratic(points[last - 1], controls[last - 2].1, points[last]));

    segments
}

fn control_points(p0: Point, p1: Point, p2: Point, tension: f64) -> (Point, Point) {
    let d01 = p0.distance_to(p1);
    let d12 = p1.distance_to(p2);
    let total = d01 + d12;
    if total == 0.0 {
        return (p1, p1);
    }

    let fa = tension * d01 / total;
    let fb = tension * d12 / total;
    let before = Point::new(p1.x - fa * (p2.x - p0.x), p1.y - fa * (p2.y - p0.y));
    let after = Point::new(p1.x + fb * (p2.x - p0.x), p1.y + fb * (p2.y - p0.y));
    (before, after)
}

/// Expresses a quadratic Bézier as the equivalent cubic.
fn quadratic(from: Point, control: Point, to: Point) -> PathSegment {
    let c1 = Point::new(
        from.x + 2.0 / 3.0 * (control.x - from.x),
        from.y + 2.0 / 3.0 * (control.y - from.y),
    );
    let c2 = Point::new(
        to.x + 2.0 / 3.0 * (control.x - to.x),
        to.y + 2.0 / 3.0 * (control.y - to.y),
    );
    PathSegment::CurveTo(c1, c2, to)
}

// ============================================================================
// Image Fitting
// ============================================================================

/// Scale factor that fits a `width` x `height` image into the display bounds.
///
/// Preserves aspect ratio and never upscales. Degenerate sizes map to 1.0.
pub fn fit_scale(width: u32, height: u32, max_width: u32, max_height: u32) -> f64 {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return 1.0;
    }
    let sx = max_width as f64 / width as f64;
    let sy = max_height as f64 / height as f64;
    sx.min(sy).min(1.0)
}

/// Display size of an image after [`fit_scale`], at least 1x1.
pub fn fitted_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (i32, i32) {
    let scale = fit_scale(width, height, max_width, max_height);
    let w = ((width as f64 * scale).round() as i32).max(1);
    let h = ((height as f64 * scale).round() as i32).max(1);
    (w, h)
}
