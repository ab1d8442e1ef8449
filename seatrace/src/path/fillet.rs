//! Corner-rounding path interpolation.
//!
//! [`FilletInterpolator`] joins consecutive waypoint segments with circular
//! arcs whose radius follows the vehicle's turning radius. Corners the
//! geometry cannot round (collinear segments, reversals, segments shorter
//! than the required tangent length allows) fall back to the sharp corner,
//! with the radius shrunk to fit where possible.

use super::{Curve, PathError, PathInterpolator, Waypoint};

/// Minimum segment length considered for filleting, in meters.
const MIN_SEGMENT: f64 = 1e-9;

/// Turn angles below this are treated as straight-through, in radians.
const MIN_TURN: f64 = 1e-6;

/// Default spacing between generated arc vertices, in meters.
pub const DEFAULT_ARC_STEP: f64 = 1.0;

/// Interpolator that rounds interior corners with circular arc fillets.
#[derive(Debug, Clone)]
pub struct FilletInterpolator {
    /// Maximum spacing between generated arc vertices in meters.
    arc_step: f64,
}

impl FilletInterpolator {
    pub fn new() -> Self {
        Self {
            arc_step: DEFAULT_ARC_STEP,
        }
    }

    /// Sets the arc densification step (builder pattern).
    pub fn with_arc_step(mut self, arc_step: f64) -> Self {
        self.arc_step = arc_step.max(MIN_SEGMENT);
        self
    }

    /// Appends the fillet arc for the corner at `b`, or `b` itself when the
    /// corner cannot be rounded.
    fn round_corner(&self, out: &mut Vec<Waypoint>, a: Waypoint, b: Waypoint, c: Waypoint, radius: f64) {
        let (v1x, v1y) = (b.x - a.x, b.y - a.y);
        let (v2x, v2y) = (c.x - b.x, c.y - b.y);
        let len1 = (v1x * v1x + v1y * v1y).sqrt();
        let len2 = (v2x * v2x + v2y * v2y).sqrt();
        if len1 < MIN_SEGMENT || len2 < MIN_SEGMENT {
            out.push(b);
            return;
        }

        let (u1x, u1y) = (v1x / len1, v1y / len1);
        let (u2x, u2y) = (v2x / len2, v2y / len2);
        let cross = u1x * u2y - u1y * u2x;
        let dot = u1x * u2x + u1y * u2y;

        // Turn angle between the incoming and outgoing directions
        let phi = cross.abs().atan2(dot);
        if !(MIN_TURN..=std::f64::consts::PI - MIN_TURN).contains(&phi) {
            out.push(b);
            return;
        }

        // Tangent length from the corner, shrinking the radius when the
        // adjacent segments cannot accommodate it
        let half_tan = (phi / 2.0).tan();
        let mut tangent = radius * half_tan;
        let mut r = radius;
        let max_tangent = 0.5 * len1.min(len2);
        if tangent > max_tangent {
            tangent = max_tangent;
            r = tangent / half_tan;
        }
        if r < MIN_SEGMENT {
            out.push(b);
            return;
        }

        // Tangent points on both segments, with elevation carried linearly
        let t1 = Waypoint::new(
            b.x - tangent * u1x,
            b.y - tangent * u1y,
            a.z + ((len1 - tangent) / len1) * (b.z - a.z),
        );
        let t2 = Waypoint::new(
            b.x + tangent * u2x,
            b.y + tangent * u2y,
            b.z + (tangent / len2) * (c.z - b.z),
        );

        let side = if cross >= 0.0 { 1.0 } else { -1.0 };
        let center_x = t1.x + side * (-u1y) * r;
        let center_y = t1.y + side * u1x * r;

        let start_angle = (t1.y - center_y).atan2(t1.x - center_x);
        let sweep = side * phi;
        let segments = ((r * phi / self.arc_step).ceil() as usize).max(2);

        for k in 0..=segments {
            let f = k as f64 / segments as f64;
            let angle = start_angle + sweep * f;
            out.push(Waypoint::new(
                center_x + r * angle.cos(),
                center_y + r * angle.sin(),
                t1.z + f * (t2.z - t1.z),
            ));
        }
    }
}

impl Default for FilletInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl PathInterpolator for FilletInterpolator {
    fn interpolate(
        &self,
        waypoints: &[Waypoint],
        turning_radius: f64,
    ) -> Result<Curve, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints(waypoints.len()));
        }
        if turning_radius <= 0.0 || waypoints.len() == 2 {
            return Ok(Curve::from_vertices(waypoints.to_vec()));
        }

        let mut vertices = Vec::with_capacity(waypoints.len() * 4);
        vertices.push(waypoints[0]);
        for window in waypoints.windows(3) {
            self.round_corner(&mut vertices, window[0], window[1], window[2], turning_radius);
        }
        vertices.push(waypoints[waypoints.len() - 1]);
        Ok(Curve::from_vertices(vertices))
    }
}
