use glam::{Vec2, Vec3};
use uuid::Uuid;

use super::{Tool, ToolContext};
use crate::error::EditorResult;

/// Three-point arcs: start, end, then a point the arc passes through
#[derive(Debug)]
pub struct ArcTool {
    component: Uuid,
    arc: Option<Uuid>,
    start: Option<Vec3>,
    end: Option<Vec3>,
}

impl ArcTool {
    pub fn new(component: Uuid) -> Self {
        Self {
            component,
            arc: None,
            start: None,
            end: None,
        }
    }

    /// Points placed so far
    pub fn placed(&self) -> usize {
        self.start.iter().chain(self.end.iter()).count()
    }

    fn reset(&mut self) {
        self.arc = None;
        self.start = None;
        self.end = None;
    }
}

impl Tool for ArcTool {
    fn name(&self) -> &'static str {
        "Arc"
    }

    fn snapping_enabled(&self, _dragging: bool) -> bool {
        true
    }

    fn construction_element(&self) -> Option<Uuid> {
        self.arc
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        match (self.arc, self.start, self.end) {
            (Some(arc), Some(start), Some(end)) => {
                ctx.kernel.set_handles(arc, &[start, end, pos])?;
                ctx.element_changed(arc, self.component)?;
                self.reset();
            }
            (Some(arc), Some(start), None) => {
                ctx.kernel.set_handles(arc, &[start, pos, start.lerp(pos, 0.5)])?;
                ctx.element_changed(arc, self.component)?;
                self.end = Some(pos);
            }
            _ => {
                let sketch = ctx.sketch(self.component)?;
                let arc = ctx.kernel.add_arc(sketch, pos, pos, pos)?;
                ctx.element_changed(arc, self.component)?;
                self.arc = Some(arc);
                self.start = Some(pos);
            }
        }
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        let (Some(arc), Some(start), Some(end)) = (self.arc, self.start, self.end) else {
            return Ok(());
        };
        ctx.kernel.set_handles(arc, &[start, end, pos])?;
        ctx.element_changed(arc, self.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Fixture;
    use approx::assert_relative_eq;

    #[test]
    fn test_three_points_then_reset() {
        let mut fx = Fixture::new();
        let mut tool = ArcTool::new(fx.root());
        let (start, end, through) = (
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        );

        tool.mouse_down(&mut fx.ctx(), start, Vec2::ZERO).unwrap();
        assert_eq!(tool.placed(), 1);
        tool.mouse_move(&mut fx.ctx(), Vec3::ONE, Vec2::ZERO).unwrap();
        let arc = tool.construction_element().unwrap();
        assert_eq!(fx.handles(arc), vec![start, start, start]);

        tool.mouse_down(&mut fx.ctx(), end, Vec2::ZERO).unwrap();
        assert_eq!(tool.placed(), 2);
        tool.mouse_move(&mut fx.ctx(), Vec3::new(0.0, 1.0, 0.0), Vec2::ZERO).unwrap();
        assert_eq!(fx.handles(arc)[2], Vec3::new(0.0, 1.0, 0.0));

        tool.mouse_down(&mut fx.ctx(), through, Vec2::ZERO).unwrap();
        assert_eq!(tool.placed(), 0);
        assert!(tool.construction_element().is_none());
        assert_eq!(fx.handles(arc), vec![start, end, through]);
        assert_relative_eq!(fx.kernel.element(arc).unwrap().radius().unwrap(), 2.0, epsilon = 1e-5);

        // The next press starts a new arc
        tool.mouse_down(&mut fx.ctx(), Vec3::new(5.0, 5.0, 0.0), Vec2::ZERO).unwrap();
        assert_eq!(fx.elements().len(), 2);
    }
}
