//! Closed-region detection for sketches
//!
//! Regions come from three sources: closed curves (circles, closed
//! splines), and chains of open curves whose endpoints meet exactly and
//! form a simple cycle.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3};

use super::element::SketchElement;
use crate::kernel::TessellatedMesh;

type PointKey = [u32; 3];

fn key(p: Vec3) -> PointKey {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

/// Find closed outlines formed by `elements`.
///
/// `plane` maps sketch-local XY into world space. With `include_nested`
/// false, outlines lying entirely inside another outline are dropped.
pub fn find_outlines(elements: &[&SketchElement], plane: Mat4, include_nested: bool) -> Vec<Vec<Vec3>> {
    let normal = plane.transform_vector3(Vec3::Z).normalize_or_zero();
    let mut outlines: Vec<Vec<Vec3>> = Vec::new();
    let mut open: Vec<Vec<Vec3>> = Vec::new();

    for element in elements {
        let mut poly = element.tessellate(normal);
        if element.is_closed() {
            poly.pop();
            outlines.push(poly);
        } else if element.endpoints().is_some() && poly.len() >= 2 {
            open.push(poly);
        }
    }
    outlines.extend(chain_loops(&open));

    let to_local = plane.inverse();
    let flat: Vec<Vec<Vec2>> = outlines
        .iter()
        .map(|o| o.iter().map(|p| to_local.transform_point3(*p).truncate()).collect())
        .collect();

    outlines
        .into_iter()
        .enumerate()
        .filter(|(i, outline)| {
            outline.len() >= 3
                && (include_nested
                    || !flat.iter().enumerate().any(|(j, other)| {
                        j != *i && flat[*i].iter().all(|p| point_in_polygon(*p, other))
                    }))
        })
        .map(|(_, outline)| outline)
        .collect()
}

/// Join open polylines into cycles where every junction has degree two
fn chain_loops(open: &[Vec<Vec3>]) -> Vec<Vec<Vec3>> {
    let mut incident: HashMap<PointKey, Vec<usize>> = HashMap::new();
    for (i, poly) in open.iter().enumerate() {
        incident.entry(key(poly[0])).or_default().push(i);
        incident.entry(key(poly[poly.len() - 1])).or_default().push(i);
    }

    let mut used = vec![false; open.len()];
    let mut loops = Vec::new();

    for start in 0..open.len() {
        if used[start] {
            continue;
        }
        let mut outline: Vec<Vec3> = open[start].clone();
        let mut members = vec![start];
        let origin = key(outline[0]);
        let mut closed = false;

        loop {
            let tail = key(outline[outline.len() - 1]);
            if tail == origin && members.len() > 1 || (members.len() == 1 && tail == origin) {
                closed = true;
                break;
            }
            let Some(edges) = incident.get(&tail) else { break };
            if edges.len() != 2 {
                break;
            }
            let Some(&next) = edges.iter().find(|&&e| !members.contains(&e)) else {
                break;
            };
            let mut segment = open[next].clone();
            if key(segment[0]) != tail {
                segment.reverse();
            }
            outline.extend(segment.into_iter().skip(1));
            members.push(next);
        }

        if closed && incident.get(&origin).is_some_and(|e| e.len() == 2) {
            outline.pop();
            for m in &members {
                used[*m] = true;
            }
            loops.push(outline);
        }
    }
    loops
}

fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn signed_area(polygon: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        area += a.perp_dot(b);
    }
    area * 0.5
}

/// Ear-clip a planar outline into a mesh lying on `plane`
pub fn triangulate(outline: &[Vec3], plane: Mat4) -> TessellatedMesh {
    let normal = plane.transform_vector3(Vec3::Z).normalize_or_zero();
    let to_local = plane.inverse();
    let flat: Vec<Vec2> = outline
        .iter()
        .map(|p| to_local.transform_point3(*p).truncate())
        .collect();

    let mut order: Vec<usize> = (0..flat.len()).collect();
    if signed_area(&flat) < 0.0 {
        order.reverse();
    }

    let mut indices = Vec::with_capacity(flat.len().saturating_sub(2) * 3);
    let mut guard = 0;
    while order.len() > 3 && guard < flat.len() * flat.len() {
        guard += 1;
        let n = order.len();
        let ear = (0..n).find(|&i| {
            let (a, b, c) = (flat[order[(i + n - 1) % n]], flat[order[i]], flat[order[(i + 1) % n]]);
            if (b - a).perp_dot(c - b) <= 0.0 {
                return false;
            }
            !order.iter().any(|&k| {
                let p = flat[k];
                p != a && p != b && p != c && in_triangle(p, a, b, c)
            })
        });
        // Nearly degenerate input can leave no strict ear; clip anyway
        let i = ear.unwrap_or(0);
        indices.extend([
            order[(i + n - 1) % n] as u32,
            order[i] as u32,
            order[(i + 1) % n] as u32,
        ]);
        order.remove(i);
    }
    if order.len() == 3 {
        indices.extend(order.iter().map(|&i| i as u32));
    }

    TessellatedMesh {
        vertices: outline.iter().map(|p| p.to_array()).collect(),
        normals: vec![normal.to_array(); outline.len()],
        indices,
    }
}

fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::ElementKind;

    fn square(size: f32) -> Vec<SketchElement> {
        let a = Vec3::ZERO;
        let b = Vec3::new(size, 0.0, 0.0);
        let c = Vec3::new(size, size, 0.0);
        let d = Vec3::new(0.0, size, 0.0);
        vec![
            SketchElement::line(a, b),
            SketchElement::line(b, c),
            // Reversed on purpose
            SketchElement::line(d, c),
            SketchElement::line(d, a),
        ]
    }

    #[test]
    fn test_square_loop_is_found() {
        let elements = square(2.0);
        let refs: Vec<_> = elements.iter().collect();
        let outlines = find_outlines(&refs, Mat4::IDENTITY, false);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].len(), 4);
    }

    #[test]
    fn test_open_chain_has_no_region() {
        let mut elements = square(2.0);
        elements.pop();
        let refs: Vec<_> = elements.iter().collect();
        assert!(find_outlines(&refs, Mat4::IDENTITY, false).is_empty());
    }

    #[test]
    fn test_two_segment_loop_with_arc() {
        let line = SketchElement::line(Vec3::NEG_X, Vec3::X);
        let arc = SketchElement::arc(Vec3::X, Vec3::NEG_X, Vec3::Y);
        let refs = vec![&line, &arc];
        assert_eq!(find_outlines(&refs, Mat4::IDENTITY, false).len(), 1);
    }

    #[test]
    fn test_nested_circle_is_dropped_unless_requested() {
        let outer = SketchElement::circle(Vec3::ZERO, 5.0, Vec3::X).unwrap();
        let inner = SketchElement::circle(Vec3::ZERO, 1.0, Vec3::X).unwrap();
        let refs = vec![&outer, &inner];
        assert_eq!(find_outlines(&refs, Mat4::IDENTITY, false).len(), 1);
        assert_eq!(find_outlines(&refs, Mat4::IDENTITY, true).len(), 2);
    }

    #[test]
    fn test_closed_spline_is_a_region() {
        let pts = vec![
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::ZERO,
        ];
        let spline = SketchElement::new(ElementKind::Spline, pts).unwrap();
        assert_eq!(find_outlines(&[&spline], Mat4::IDENTITY, false).len(), 1);
    }

    #[test]
    fn test_triangulate_concave_outline() {
        // L-shape, six corners
        let outline = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let mesh = triangulate(&outline, Mat4::IDENTITY);
        assert_eq!(mesh.triangle_count(), 4);
        let area: f32 = mesh
            .triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).length() * 0.5)
            .sum();
        approx::assert_relative_eq!(area, 3.0, epsilon = 1e-5);
    }
}
