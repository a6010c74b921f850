//! Ray and screen-space hit tests
//!
//! Mesh proxies are hit by casting the pointer ray; line proxies are hit by
//! their projected distance to the pointer in pixels.

use glam::{Vec2, Vec3};

/// Ray-triangle intersection (Möller–Trumbore), two-sided.
///
/// Returns the ray parameter `t` of the hit, so the hit point is
/// `origin + dir * t`.
pub fn ray_triangle_intersection(origin: Vec3, dir: Vec3, tri: [Vec3; 3]) -> Option<f32> {
    let [a, b, c] = tri;
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-9 {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv;
    (t >= 0.0).then_some(t)
}

/// Ray-plane intersection.
///
/// Returns `None` when the ray is parallel to the plane or the plane lies
/// behind the origin.
pub fn ray_plane_intersection(origin: Vec3, dir: Vec3, point: Vec3, normal: Vec3) -> Option<Vec3> {
    let denom = dir.dot(normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - origin).dot(normal) / denom;
    (t >= 0.0).then(|| origin + dir * t)
}

/// Closest point on segment `a..b` to `p`, as the segment parameter in `0..=1`
pub fn closest_on_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return 0.0;
    }
    ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
}
