//! Geometry kernel for wall and sensor tests
//!
//! Axis-aligned rectangles, segment intersection, circle overlap, and the
//! ray-marching wall sensor. Everything here is total: degenerate inputs
//! (zero-length segments, zero-radius circles) get a defined answer, never
//! a NaN-driven comparison.

use glam::Vec2;

use crate::sim::state::Wall;

/// Determinant magnitude below which two segments are treated as parallel
const PARALLEL_EPS: f32 = 1e-10;
/// Tolerance on the [0,1] parametric range so near-boundary hits count
const SEGMENT_TOL: f32 = 1e-5;

/// Inclusive point-in-rectangle test with an optional epsilon margin.
///
/// A positive margin grows the rectangle, which avoids boundary-skimming
/// artifacts when testing sampled ray points.
#[inline]
pub fn point_in_rect(px: f32, py: f32, wall: &Wall, margin: f32) -> bool {
    px >= wall.x - margin
        && px <= wall.x + wall.width + margin
        && py >= wall.y - margin
        && py <= wall.y + wall.height + margin
}

/// Segment-segment intersection via the parametric determinant solution.
///
/// Near-parallel pairs (determinant below epsilon) report no intersection,
/// which also covers zero-length segments.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let da = a2 - a1;
    let db = b2 - b1;

    let det = da.x * db.y - da.y * db.x;
    if det.abs() < PARALLEL_EPS {
        return false;
    }

    let diff = b1 - a1;
    let t = (diff.x * db.y - diff.y * db.x) / det;
    let u = (diff.x * da.y - diff.y * da.x) / det;

    t >= -SEGMENT_TOL && t <= 1.0 + SEGMENT_TOL && u >= -SEGMENT_TOL && u <= 1.0 + SEGMENT_TOL
}

/// True if the segment `p0..p1` touches the wall: either endpoint inside,
/// or the segment crosses one of the four edges.
pub fn line_intersects_rect(p0: Vec2, p1: Vec2, wall: &Wall) -> bool {
    if point_in_rect(p0.x, p0.y, wall, 0.0) || point_in_rect(p1.x, p1.y, wall, 0.0) {
        return true;
    }

    let tl = Vec2::new(wall.x, wall.y);
    let tr = Vec2::new(wall.x + wall.width, wall.y);
    let bl = Vec2::new(wall.x, wall.y + wall.height);
    let br = Vec2::new(wall.x + wall.width, wall.y + wall.height);

    segments_intersect(p0, p1, tl, tr)
        || segments_intersect(p0, p1, tr, br)
        || segments_intersect(p0, p1, br, bl)
        || segments_intersect(p0, p1, bl, tl)
}

/// Circle-rectangle overlap: clamp the center onto the rectangle and compare
/// the distance to the closest point against the radius.
///
/// A zero-radius circle overlaps nothing (strict comparison).
pub fn circle_overlaps_rect(cx: f32, cy: f32, radius: f32, wall: &Wall) -> bool {
    let closest_x = cx.clamp(wall.x, wall.x + wall.width);
    let closest_y = cy.clamp(wall.y, wall.y + wall.height);
    let dx = cx - closest_x;
    let dy = cy - closest_y;
    dx * dx + dy * dy < radius * radius
}

/// True if the circle overlaps any wall in the slice
pub fn circle_overlaps_any_wall(cx: f32, cy: f32, radius: f32, walls: &[Wall]) -> bool {
    walls.iter().any(|w| circle_overlaps_rect(cx, cy, radius, w))
}

/// True if the segment from `p0` to `p1` is blocked by any wall
pub fn line_blocked_by_walls(p0: Vec2, p1: Vec2, walls: &[Wall]) -> bool {
    walls.iter().any(|w| line_intersects_rect(p0, p1, w))
}

/// March a ray from `(x0, y0)` along `angle` and return the distance at
/// which it leaves the arena or enters a wall, capped at `max_dist`.
///
/// This is the agents' wall sensor. The fixed marching increment trades
/// precision for speed; sampled distances are only accurate to one
/// increment, which is all the sensor promises. A non-positive `step_size`
/// degenerates to testing only the origin.
pub fn cast_ray(
    x0: f32,
    y0: f32,
    angle: f32,
    walls: &[Wall],
    bounds: Vec2,
    max_dist: f32,
    step_size: f32,
) -> f32 {
    let step = step_size.max(1.0);
    let dir = Vec2::new(angle.cos(), angle.sin());
    let mut d = 0.0;

    while d < max_dist {
        let p = Vec2::new(x0, y0) + dir * d;
        if p.x < 0.0 || p.x > bounds.x || p.y < 0.0 || p.y > bounds.y {
            return d;
        }
        if walls.iter().any(|w| point_in_rect(p.x, p.y, w, 0.0)) {
            return d;
        }
        d += step;
    }

    max_dist
}
