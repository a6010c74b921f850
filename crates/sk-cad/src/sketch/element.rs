//! Sketch element geometry
//!
//! Elements are stored as their control handles. Everything else (snap
//! points, polylines, loop endpoints) is derived from the handles.

use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::{CadError, CadResult};

/// Segments used for a full circle
const CIRCLE_SEGMENTS: usize = 64;
/// Samples per spline span
const SPLINE_SAMPLES: usize = 8;

/// Kind of sketch element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Handles: `[start, end]`
    Line,
    /// Handles: `[center, rim]`
    Circle,
    /// Handles: `[start, end, through]`
    Arc,
    /// Handles: interpolated points, two or more
    Spline,
}

impl ElementKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Line => "Line",
            ElementKind::Circle => "Circle",
            ElementKind::Arc => "Arc",
            ElementKind::Spline => "Spline",
        }
    }

    fn accepts(&self, count: usize) -> bool {
        match self {
            ElementKind::Line | ElementKind::Circle => count == 2,
            ElementKind::Arc => count == 3,
            ElementKind::Spline => count >= 2,
        }
    }
}

/// A curve in a sketch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchElement {
    /// Element id
    pub id: Uuid,
    /// Element kind
    pub kind: ElementKind,
    handles: Vec<Vec3>,
}

impl SketchElement {
    /// Create an element, validating the handle count
    pub fn new(kind: ElementKind, handles: Vec<Vec3>) -> CadResult<Self> {
        if !kind.accepts(handles.len()) {
            return Err(CadError::InvalidGeometry(format!(
                "{} cannot have {} handles",
                kind.name(),
                handles.len()
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            handles,
        })
    }

    /// Line segment
    pub fn line(start: Vec3, end: Vec3) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Line,
            handles: vec![start, end],
        }
    }

    /// Circle with its rim handle placed along `axis`
    pub fn circle(center: Vec3, radius: f32, axis: Vec3) -> CadResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CadError::InvalidGeometry(format!("circle radius {radius}")));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Circle,
            handles: vec![center, center + axis.normalize_or_zero() * radius],
        })
    }

    /// Arc from `start` to `end` passing through `through`
    pub fn arc(start: Vec3, end: Vec3, through: Vec3) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ElementKind::Arc,
            handles: vec![start, end, through],
        }
    }

    /// Control handles
    pub fn handles(&self) -> &[Vec3] {
        &self.handles
    }

    /// Replace the control handles
    pub fn set_handles(&mut self, handles: &[Vec3]) -> CadResult<()> {
        if !self.kind.accepts(handles.len()) {
            return Err(CadError::InvalidGeometry(format!(
                "{} cannot have {} handles",
                self.kind.name(),
                handles.len()
            )));
        }
        self.handles = handles.to_vec();
        Ok(())
    }

    /// Points other geometry can snap to
    pub fn snap_points(&self) -> Vec<Vec3> {
        match self.kind {
            ElementKind::Line | ElementKind::Spline => self.handles.clone(),
            ElementKind::Circle => vec![self.handles[0]],
            ElementKind::Arc => vec![self.handles[0], self.handles[1]],
        }
    }

    /// Open endpoints, `None` for closed curves
    pub fn endpoints(&self) -> Option<(Vec3, Vec3)> {
        match self.kind {
            ElementKind::Circle => None,
            ElementKind::Spline if self.is_closed() => None,
            ElementKind::Line | ElementKind::Spline => {
                Some((self.handles[0], self.handles[self.handles.len() - 1]))
            }
            ElementKind::Arc => Some((self.handles[0], self.handles[1])),
        }
    }

    /// Whether the curve bounds an area by itself
    pub fn is_closed(&self) -> bool {
        match self.kind {
            ElementKind::Circle => true,
            ElementKind::Spline => {
                self.handles.len() > 3 && self.handles[0] == self.handles[self.handles.len() - 1]
            }
            _ => false,
        }
    }

    /// Radius of a circle or arc
    pub fn radius(&self) -> Option<f32> {
        match self.kind {
            ElementKind::Circle => Some(self.handles[0].distance(self.handles[1])),
            ElementKind::Arc => {
                circumcenter(self.handles[0], self.handles[1], self.handles[2])
                    .map(|c| c.distance(self.handles[0]))
            }
            _ => None,
        }
    }

    /// Polyline approximation. `normal` is the sketch plane normal.
    pub fn tessellate(&self, normal: Vec3) -> Vec<Vec3> {
        match self.kind {
            ElementKind::Line => self.handles.clone(),
            ElementKind::Circle => tessellate_circle(self.handles[0], self.handles[1], normal),
            ElementKind::Arc => tessellate_arc(self.handles[0], self.handles[1], self.handles[2]),
            ElementKind::Spline => tessellate_spline(&self.handles),
        }
    }
}

fn tessellate_circle(center: Vec3, rim: Vec3, normal: Vec3) -> Vec<Vec3> {
    let radius = center.distance(rim);
    if radius <= f32::EPSILON {
        return vec![center; CIRCLE_SEGMENTS + 1];
    }
    let u = (rim - center) / radius;
    let v = normal.normalize_or_zero().cross(u);
    let mut points: Vec<Vec3> = (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let t = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            center + (u * t.cos() + v * t.sin()) * radius
        })
        .collect();
    points.push(rim);
    points
}

/// Center of the circle through three points, `None` if they are collinear
pub fn circumcenter(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    let ab = b - a;
    let ac = c - a;
    let n = ab.cross(ac);
    let denom = 2.0 * n.length_squared();
    if denom <= f32::EPSILON {
        return None;
    }
    Some(a + (n.cross(ab) * ac.length_squared() + ac.cross(n) * ab.length_squared()) / denom)
}

fn tessellate_arc(start: Vec3, end: Vec3, through: Vec3) -> Vec<Vec3> {
    let Some(center) = circumcenter(start, end, through) else {
        // Collinear handles collapse to the chord
        return vec![start, end];
    };
    let normal = (end - start).cross(through - start).normalize();
    let radius = center.distance(start);
    let u = (start - center) / radius;
    let v = normal.cross(u);
    let angle = |p: Vec3| {
        let d = p - center;
        d.dot(v).atan2(d.dot(u)).rem_euclid(TAU)
    };

    let end_angle = angle(end);
    let sweep = if angle(through) < end_angle {
        end_angle
    } else {
        end_angle - TAU
    };
    let segments = ((sweep.abs() / TAU) * CIRCLE_SEGMENTS as f32).ceil().max(2.0) as usize;

    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..segments {
        let t = sweep * i as f32 / segments as f32;
        points.push(center + (u * t.cos() + v * t.sin()) * radius);
    }
    points.push(end);
    points
}

fn tessellate_spline(points: &[Vec3]) -> Vec<Vec3> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity((points.len() - 1) * SPLINE_SAMPLES + 1);
    for i in 0..points.len() - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(points.len() - 1)];
        for s in 0..SPLINE_SAMPLES {
            let t = s as f32 / SPLINE_SAMPLES as f32;
            out.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    out.push(points[points.len() - 1]);
    out
}

fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}
