use glam::{Vec2, Vec3};
use uuid::Uuid;

use super::{Tool, ToolContext};
use crate::error::EditorResult;

/// Center-radius circles: press for the center, move for the radius,
/// press again to finish
#[derive(Debug)]
pub struct CircleTool {
    component: Uuid,
    center: Option<Vec3>,
    circle: Option<Uuid>,
}

impl CircleTool {
    pub fn new(component: Uuid) -> Self {
        Self {
            component,
            center: None,
            circle: None,
        }
    }

    pub fn center(&self) -> Option<Vec3> {
        self.center
    }
}

impl Tool for CircleTool {
    fn name(&self) -> &'static str {
        "Circle"
    }

    fn snapping_enabled(&self, _dragging: bool) -> bool {
        true
    }

    fn construction_element(&self) -> Option<Uuid> {
        self.circle
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        if self.center.is_some() {
            self.center = None;
            self.circle = None;
            return Ok(());
        }
        let sketch = ctx.sketch(self.component)?;
        let circle = ctx.kernel.add_circle(sketch, pos, 1.0)?;
        ctx.element_changed(circle, self.component)?;
        self.center = Some(pos);
        self.circle = Some(circle);
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        let (Some(center), Some(circle)) = (self.center, self.circle) else {
            return Ok(());
        };
        ctx.kernel.set_handles(circle, &[center, pos])?;
        ctx.element_changed(circle, self.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Fixture;

    #[test]
    fn test_center_then_radius() {
        let mut fx = Fixture::new();
        let mut tool = CircleTool::new(fx.root());
        let center = Vec3::new(1.0, 1.0, 0.0);
        tool.mouse_down(&mut fx.ctx(), center, Vec2::ZERO).unwrap();
        let circle = tool.construction_element().unwrap();
        assert_eq!(fx.kernel.element(circle).unwrap().radius(), Some(1.0));

        tool.mouse_move(&mut fx.ctx(), Vec3::new(4.0, 5.0, 0.0), Vec2::ZERO).unwrap();
        assert_eq!(fx.kernel.element(circle).unwrap().radius(), Some(5.0));

        tool.mouse_down(&mut fx.ctx(), Vec3::new(4.0, 5.0, 0.0), Vec2::ZERO).unwrap();
        assert!(tool.center().is_none());
        assert_eq!(fx.elements(), vec![circle]);

        // Moving after finishing leaves the circle alone
        tool.mouse_move(&mut fx.ctx(), Vec3::ZERO, Vec2::ZERO).unwrap();
        assert_eq!(fx.kernel.element(circle).unwrap().radius(), Some(5.0));
    }
}
