//! Snapping of sketch input to existing geometry and axis guides
//!
//! The snapper remembers the last few snap points the cursor came close to.
//! A later cursor position that lines up with one of them on screen, along
//! X or Y, is pulled onto that axis and a guide is reported. When both axes
//! line up at once the result is an anchor.
//!
//! Tolerances are measured in screen pixels so snapping behaves the same at
//! every zoom level. Exact equality is only used to recognize a point seen
//! in the previous frame.

use glam::{Vec2, Vec3};
use sk_cad::{CadKernel, CadResult};
use sk_renderer::RenderEngine;
use tracing::trace;
use uuid::Uuid;

use crate::config::SnapConfig;
use crate::event::{Anchor, Guide, GuideAxis, ViewportEvent};

/// A handle being dragged in the manipulation tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveHandle {
    pub element: Uuid,
    pub component: Uuid,
    /// Index into the element's handle list
    pub index: usize,
}

/// Snap points of every element in `sketch`.
///
/// Leaves out the last handle of `construction`, the element a tool is
/// drawing, and the handle under active drag.
pub fn collect_snap_points(
    kernel: &dyn CadKernel,
    sketch: Uuid,
    construction: Option<Uuid>,
    dragged: Option<&ActiveHandle>,
) -> CadResult<Vec<Vec3>> {
    let mut out = Vec::new();
    for element in kernel.get_sketch_elements(sketch)? {
        let mut points = kernel.get_snap_points(element)?;
        if construction == Some(element)
            && let Some(tail) = kernel.get_handles(element)?.last().copied()
        {
            points.retain(|p| *p != tail);
        }
        if let Some(handle) = dragged
            && handle.element == element
            && let Some(point) = kernel.get_handles(element)?.get(handle.index).copied()
        {
            points.retain(|p| *p != point);
        }
        out.extend(points);
    }
    Ok(out)
}

/// Snapping state carried across frames
#[derive(Debug, Default)]
pub struct Snapper {
    config: SnapConfig,
    guides: Vec<Guide>,
    last_snaps: Vec<Vec3>,
    anchor: Option<Anchor>,
}

impl Snapper {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Guides produced by the last snap
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    /// Remembered snap points, most recent first
    pub fn last_snaps(&self) -> &[Vec3] {
        &self.last_snaps
    }

    /// Forget everything and clear the overlay
    pub fn reset(&mut self, events: &mut Vec<ViewportEvent>) {
        self.guides.clear();
        self.anchor = None;
        self.last_snaps.clear();
        events.push(ViewportEvent::SnapGuidesUpdated {
            guides: Vec::new(),
            anchor: None,
        });
    }

    /// Adjust a cursor position.
    ///
    /// Returns the input unchanged when `enabled` is false. `snap_points`
    /// are the eligible points of the active sketch.
    pub fn snap(
        &mut self,
        enabled: bool,
        position: Vec3,
        screen: Vec2,
        renderer: &dyn RenderEngine,
        snap_points: &[Vec3],
        events: &mut Vec<ViewportEvent>,
    ) -> (Vec3, Vec2) {
        if !enabled {
            return (position, screen);
        }
        self.guides.clear();
        let position = self.snap_to_guides(position, renderer).unwrap_or(position);
        self.catch_snap_points(screen, renderer, snap_points);
        events.push(ViewportEvent::SnapGuidesUpdated {
            guides: self.guides.clone(),
            anchor: self.anchor.clone(),
        });
        (position, screen)
    }

    /// Remember the snap point closest to `screen`, if one is in range
    pub fn catch_snap_points(&mut self, screen: Vec2, renderer: &dyn RenderEngine, snap_points: &[Vec3]) {
        let mut closest = self.config.distance;
        let mut target = None;
        for point in snap_points {
            let Some(projected) = renderer.to_screen(*point) else {
                continue;
            };
            let dist = projected.distance(screen);
            if dist < closest {
                closest = dist;
                target = Some(*point);
            }
        }
        let Some(target) = target else {
            return;
        };
        if self.last_snaps.first() == Some(&target) {
            return;
        }
        trace!("Caught snap point {:?}", target);
        self.last_snaps.insert(0, target);
        self.last_snaps.truncate(self.config.max_references);
    }

    /// Align `position` with remembered snaps, returning `None` if no axis matched
    pub fn snap_to_guides(&mut self, position: Vec3, renderer: &dyn RenderEngine) -> Option<Vec3> {
        let screen = renderer.to_screen(position)?;
        let within = |test: Vec3| {
            renderer
                .to_screen(test)
                .is_some_and(|s| s.distance(screen) < self.config.distance)
        };
        let snap_x = self
            .last_snaps
            .iter()
            .find(|s| within(Vec3::new(s.x, position.y, position.z)))
            .copied();
        let snap_y = self
            .last_snaps
            .iter()
            .find(|s| within(Vec3::new(position.x, s.y, position.z)))
            .copied();

        let target = Vec3::new(
            snap_x.map_or(position.x, |s| s.x),
            snap_y.map_or(position.y, |s| s.y),
            position.z,
        );
        let target_screen = renderer.to_screen(target).unwrap_or(screen);
        for (snap, axis) in [(snap_x, GuideAxis::Vertical), (snap_y, GuideAxis::Horizontal)] {
            if let Some(snap) = snap
                && let Some(start) = renderer.to_screen(snap)
            {
                self.guides.push(guide(axis, start, target_screen));
            }
        }

        match (snap_x, snap_y) {
            (Some(_), Some(_)) => {
                if self.anchor.as_ref().is_none_or(|a| a.position != target) {
                    self.anchor = Some(Anchor {
                        id: format!("{}:{}:{}", target.x, target.y, target.z),
                        position: target,
                        screen: target_screen,
                    });
                }
                Some(target)
            }
            (None, None) => {
                self.anchor = None;
                None
            }
            _ => {
                self.anchor = None;
                Some(target)
            }
        }
    }
}

fn guide(axis: GuideAxis, start: Vec2, end: Vec2) -> Guide {
    let prefix = match axis {
        GuideAxis::Vertical => 'v',
        GuideAxis::Horizontal => 'h',
    };
    Guide {
        id: format!("{prefix}{:.1}:{:.1}", start.x, start.y),
        axis,
        start,
        end,
    }
}
