use glam::{Vec2, Vec3};
use uuid::Uuid;

use super::{Tool, ToolContext};
use crate::error::EditorResult;

/// Places spline control points; the last point follows the cursor
#[derive(Debug)]
pub struct SplineTool {
    component: Uuid,
    spline: Option<Uuid>,
}

impl SplineTool {
    pub fn new(component: Uuid) -> Self {
        Self {
            component,
            spline: None,
        }
    }

    pub fn active_spline(&self) -> Option<Uuid> {
        self.spline
    }
}

impl Tool for SplineTool {
    fn name(&self) -> &'static str {
        "Spline"
    }

    fn snapping_enabled(&self, _dragging: bool) -> bool {
        true
    }

    fn construction_element(&self) -> Option<Uuid> {
        self.spline
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        let spline = match self.spline {
            Some(spline) => {
                let mut points = ctx.kernel.get_handles(spline)?;
                if let Some(tail) = points.last_mut() {
                    *tail = pos;
                }
                points.push(pos);
                ctx.kernel.set_handles(spline, &points)?;
                spline
            }
            None => {
                let sketch = ctx.sketch(self.component)?;
                let spline = ctx.kernel.add_spline(sketch, &[pos, pos])?;
                self.spline = Some(spline);
                spline
            }
        };
        ctx.element_changed(spline, self.component)
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        let Some(spline) = self.spline else {
            return Ok(());
        };
        let mut points = ctx.kernel.get_handles(spline)?;
        if let Some(tail) = points.last_mut() {
            *tail = pos;
        }
        ctx.kernel.set_handles(spline, &points)?;
        ctx.element_changed(spline, self.component)
    }

    /// Drops the live tail. A spline left with a single point is removed.
    fn dispose(&mut self, ctx: &mut ToolContext) -> EditorResult<()> {
        let Some(spline) = self.spline.take() else {
            return Ok(());
        };
        let mut points = ctx.kernel.get_handles(spline)?;
        points.pop();
        if points.len() < 2 {
            return ctx.remove_element(spline, self.component);
        }
        ctx.kernel.set_handles(spline, &points)?;
        ctx.element_changed(spline, self.component)
    }
}
