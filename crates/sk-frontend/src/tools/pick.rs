use glam::{Vec2, Vec3};
use sk_renderer::ProxyCategory;
use uuid::Uuid;

use super::{Highlighter, Tool, ToolContext};
use crate::error::EditorResult;
use crate::event::Picked;

/// What a [`PickTool`] picks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickKind {
    /// Sketch curves
    Object,
    /// Sketch regions
    Profile,
    Face,
    Plane,
}

impl PickKind {
    pub fn category(&self) -> ProxyCategory {
        match self {
            PickKind::Object => ProxyCategory::Curve,
            PickKind::Profile => ProxyCategory::Region,
            PickKind::Face => ProxyCategory::Face,
            PickKind::Plane => ProxyCategory::Plane,
        }
    }
}

/// Hands the topmost object of one category to a callback on press
pub struct PickTool {
    component: Uuid,
    kind: PickKind,
    highlighter: Highlighter,
    callback: Box<dyn FnMut(Picked)>,
}

impl PickTool {
    pub fn new(component: Uuid, kind: PickKind, callback: impl FnMut(Picked) + 'static) -> Self {
        Self {
            component,
            kind,
            highlighter: Highlighter::new(&[kind.category()]),
            callback: Box::new(callback),
        }
    }

    pub fn kind(&self) -> PickKind {
        self.kind
    }

    pub fn component(&self) -> Uuid {
        self.component
    }
}

impl Tool for PickTool {
    fn name(&self) -> &'static str {
        match self.kind {
            PickKind::Object => "Pick Object",
            PickKind::Profile => "Pick Profile",
            PickKind::Face => "Pick Face",
            PickKind::Plane => "Pick Plane",
        }
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, _pos: Vec3, screen: Vec2) -> EditorResult<()> {
        if let Some((_, picked)) = ctx.pick_at(screen, self.highlighter.filter()) {
            (self.callback)(picked);
        }
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, _pos: Vec3, screen: Vec2) -> EditorResult<()> {
        self.highlighter.hover(ctx, screen);
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut ToolContext) -> EditorResult<()> {
        self.highlighter.restore(ctx);
        Ok(())
    }
}
