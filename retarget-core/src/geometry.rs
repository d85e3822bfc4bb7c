//! Small vector helpers shared by the pipeline stages.

use glam::Vec3;

/// Reflect a point across the sagittal (YZ) plane.
pub fn mirror_x(p: Vec3) -> Vec3 { Vec3::new(-p.x, p.y, p.z) }

/// Intersect the infinite line through `a` and `b` with the plane through `plane_co` with
/// normal `plane_no`. Returns `None` when the line is parallel to the plane.
pub fn intersect_line_plane(a: Vec3, b: Vec3, plane_co: Vec3, plane_no: Vec3) -> Option<Vec3> {
    let u = b - a;
    let dot = plane_no.dot(u);
    if dot.abs() > f32::EPSILON {
        let w = a - plane_co;
        let fac = -plane_no.dot(w) / dot;
        Some(a + u * fac)
    } else {
        None
    }
}

/// Foot of the perpendicular from `p` onto the line through `origin` along `line`.
/// `line` must not be zero-length.
pub fn project_onto_line(p: Vec3, origin: Vec3, line: Vec3) -> Vec3 {
    let len = line.length();
    let dir = line / len;
    dir * (line.dot(p - origin) / len) + origin
}

/// Component-wise `to / from` where a zero denominator yields zero, reduced by `max`.
pub fn max_axis_ratio(to: Vec3, from: Vec3) -> f32 {
    let ratio = |t: f32, f: f32| if f == 0.0 { 0.0 } else { t / f };
    ratio(to.x, from.x).max(ratio(to.y, from.y)).max(ratio(to.z, from.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool { (a - b).length() < 1e-5 }

    #[test]
    fn mirror_negates_only_x() {
        assert_eq!(mirror_x(Vec3::new(0.25, -1.0, 2.0)), Vec3::new(-0.25, -1.0, 2.0));
    }

    #[test]
    fn line_hits_plane_beyond_segment() {
        let hit = intersect_line_plane(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, -3.0, 0.0), Vec3::Y);
        assert!(close(hit.unwrap(), Vec3::new(0.0, -3.0, 0.0)));
    }

    #[test]
    fn parallel_line_misses() {
        assert!(intersect_line_plane(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Y).is_none());
    }

    #[test]
    fn projection_drops_perpendicular() {
        let p = project_onto_line(Vec3::new(1.0, 2.0, 0.0), Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0));
        assert!(close(p, Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn ratio_ignores_zero_axes_and_takes_max() {
        assert_eq!(max_axis_ratio(Vec3::new(3.0, 5.0, 1.0), Vec3::new(2.0, 0.0, 4.0)), 1.5);
        assert_eq!(max_axis_ratio(Vec3::new(3.0, 5.0, 1.0), Vec3::ZERO), 0.0);
        assert_eq!(max_axis_ratio(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)), 0.0);
    }
}
