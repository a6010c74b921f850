use glam::{Vec2, Vec3};
use tracing::debug;
use uuid::Uuid;

use super::{Tool, ToolContext};
use crate::error::EditorResult;

/// Draws chains of connected lines.
///
/// Each press ends the current line and starts the next one at the same
/// point. Pressing on a snap point of another element closes the loop and
/// ends the chain.
#[derive(Debug)]
pub struct LineTool {
    component: Uuid,
    line: Option<Uuid>,
}

impl LineTool {
    pub fn new(component: Uuid) -> Self {
        Self {
            component,
            line: None,
        }
    }

    /// Line whose end follows the cursor
    pub fn active_line(&self) -> Option<Uuid> {
        self.line
    }

    fn start(&mut self, ctx: &mut ToolContext, sketch: Uuid, pos: Vec3) -> EditorResult<()> {
        let line = ctx.kernel.add_line(sketch, pos, pos)?;
        ctx.element_changed(line, self.component)?;
        self.line = Some(line);
        Ok(())
    }

    fn closes_loop(ctx: &ToolContext, sketch: Uuid, line: Uuid, pos: Vec3) -> EditorResult<bool> {
        for element in ctx.kernel.get_sketch_elements(sketch)? {
            if element != line && ctx.kernel.get_snap_points(element)?.contains(&pos) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Tool for LineTool {
    fn name(&self) -> &'static str {
        "Line"
    }

    fn snapping_enabled(&self, _dragging: bool) -> bool {
        true
    }

    fn construction_element(&self) -> Option<Uuid> {
        self.line
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        let sketch = ctx.sketch(self.component)?;
        let Some(line) = self.line else {
            return self.start(ctx, sketch, pos);
        };

        let start = ctx.kernel.get_handles(line)?.first().copied().unwrap_or(pos);
        if start == pos {
            ctx.remove_element(line, self.component)?;
            self.line = None;
            return Ok(());
        }
        ctx.kernel.set_handles(line, &[start, pos])?;
        ctx.element_changed(line, self.component)?;

        if Self::closes_loop(ctx, sketch, line, pos)? {
            debug!("Closed line loop at {:?}", pos);
            self.line = None;
            return Ok(());
        }
        self.start(ctx, sketch, pos)
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        let Some(line) = self.line else {
            return Ok(());
        };
        let start = ctx.kernel.get_handles(line)?.first().copied().unwrap_or(pos);
        ctx.kernel.set_handles(line, &[start, pos])?;
        ctx.element_changed(line, self.component)
    }

    fn dispose(&mut self, ctx: &mut ToolContext) -> EditorResult<()> {
        if let Some(line) = self.line.take() {
            ctx.remove_element(line, self.component)?;
        }
        Ok(())
    }
}
