use glam::{Vec2, Vec3};
use sk_renderer::ProxyCategory;
use uuid::Uuid;

use super::{Tool, ToolContext};
use crate::error::EditorResult;
use crate::event::Picked;

/// Tracks the curve under the cursor; cutting is done by the caller
#[derive(Debug)]
pub struct TrimTool {
    component: Uuid,
    target: Option<Uuid>,
}

impl TrimTool {
    pub fn new(component: Uuid) -> Self {
        Self {
            component,
            target: None,
        }
    }

    pub fn component(&self) -> Uuid {
        self.component
    }

    /// Curve last found under the cursor
    pub fn target(&self) -> Option<Uuid> {
        self.target
    }

    fn resolve(&mut self, ctx: &mut ToolContext, screen: Vec2) {
        self.target = match ctx.pick_at(screen, &[ProxyCategory::Curve]) {
            Some((_, Picked::Element(element))) => Some(element),
            _ => None,
        };
        ctx.render();
    }
}

impl Tool for TrimTool {
    fn name(&self) -> &'static str {
        "Trim"
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, _pos: Vec3, screen: Vec2) -> EditorResult<()> {
        self.resolve(ctx, screen);
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, _pos: Vec3, screen: Vec2) -> EditorResult<()> {
        self.resolve(ctx, screen);
        Ok(())
    }

    fn click(&mut self, ctx: &mut ToolContext, screen: Vec2) -> EditorResult<()> {
        self.resolve(ctx, screen);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Fixture;
    use sk_cad::CadKernel;

    #[test]
    fn test_tracks_curve_under_cursor() {
        let mut fx = Fixture::new();
        let root = fx.root();
        let sketch = fx.document.sketch_of(&fx.kernel, root).unwrap();
        let line = fx
            .kernel
            .add_line(sketch, Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0))
            .unwrap();
        fx.ctx().element_changed(line, root).unwrap();

        let mut tool = TrimTool::new(root);
        let on_line = fx.screen(Vec3::new(2.0, 0.0, 0.0));
        tool.mouse_move(&mut fx.ctx(), Vec3::ZERO, on_line).unwrap();
        assert_eq!(tool.target(), Some(line));

        let away = fx.screen(Vec3::new(2.0, 4.0, 0.0));
        tool.click(&mut fx.ctx(), away).unwrap();
        assert_eq!(tool.target(), None);
        assert_eq!(fx.elements(), vec![line]);
    }
}
