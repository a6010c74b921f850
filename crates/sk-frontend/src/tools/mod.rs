//! Pointer-driven tools
//!
//! Every tool implements [`Tool`]. Shared behavior such as hover
//! highlighting lives in small capability structs the tools hold, not in
//! a base type.

mod arc;
mod chooser;
mod circle;
mod highlight;
mod line;
mod manipulation;
mod pick;
mod spline;
mod trim;

pub use arc::ArcTool;
pub use chooser::Chooser;
pub use circle::CircleTool;
pub use highlight::Highlighter;
pub use line::LineTool;
pub use manipulation::ManipulationTool;
pub use pick::{PickKind, PickTool};
pub use spline::SplineTool;
pub use trim::TrimTool;

use glam::{Vec2, Vec3};
use sk_cad::CadKernel;
use sk_core::Document;
use sk_renderer::{ProxyCategory, ProxyId, SceneSync};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::error::EditorResult;
use crate::event::{Picked, ViewportEvent};
use crate::snapping::ActiveHandle;

/// Everything a tool may touch while handling one event
pub struct ToolContext<'a> {
    pub kernel: &'a mut dyn CadKernel,
    pub document: &'a mut Document,
    pub sync: &'a mut SceneSync,
    pub events: &'a mut Vec<ViewportEvent>,
    pub active_handle: &'a mut Option<ActiveHandle>,
    pub config: &'a EditorConfig,
    /// Seconds, as passed to the last `tick`
    pub now: f64,
}

impl ToolContext<'_> {
    /// Primary sketch of a component
    pub fn sketch(&self, component: Uuid) -> EditorResult<Uuid> {
        Ok(self.document.sketch_of(&*self.kernel, component)?)
    }

    /// Reload one element after a tool edited it
    pub fn element_changed(&mut self, element: Uuid, component: Uuid) -> EditorResult<()> {
        self.sync.load_element(&*self.kernel, element, component)?;
        self.events
            .push(ViewportEvent::ElementChanged { element, component });
        Ok(())
    }

    /// Delete an element from the component's sketch and the scene
    pub fn remove_element(&mut self, element: Uuid, component: Uuid) -> EditorResult<()> {
        let sketch = self.sketch(component)?;
        self.kernel.remove_element(sketch, element)?;
        self.sync.unload_element(element, component);
        self.events.push(ViewportEvent::ComponentChanged(component));
        Ok(())
    }

    /// Re-pull a component from the kernel and rebuild its proxies
    pub fn component_changed(&mut self, component: Uuid) -> EditorResult<()> {
        self.sync
            .unload_tree(&mut *self.kernel, &*self.document, component, true)?;
        self.document.update(&mut *self.kernel, component)?;
        self.sync
            .load_tree(&mut *self.kernel, &mut *self.document, component, true)?;
        self.events.push(ViewportEvent::ComponentChanged(component));
        Ok(())
    }

    /// Proxies under the cursor, front to back
    pub fn objects_at(&self, screen: Vec2, filter: &[ProxyCategory]) -> Vec<ProxyId> {
        self.sync.renderer().objects_at_screen(screen, filter)
    }

    /// Topmost pickable object under the cursor
    pub fn pick_at(&self, screen: Vec2, filter: &[ProxyCategory]) -> Option<(ProxyId, Picked)> {
        self.objects_at(screen, filter)
            .into_iter()
            .find_map(|id| self.picked(id).map(|p| (id, p)))
    }

    /// Domain object shown by a proxy
    pub fn picked(&self, proxy: ProxyId) -> Option<Picked> {
        self.sync.tag(proxy).as_ref().and_then(Picked::from_tag)
    }

    pub fn render(&mut self) {
        self.sync.render();
    }
}

/// Input state machine bound to one component
#[allow(unused_variables)]
pub trait Tool {
    fn name(&self) -> &'static str;

    /// Whether pointer positions are snapped before reaching the tool
    fn snapping_enabled(&self, dragging: bool) -> bool {
        false
    }

    /// Element currently under construction, if any
    fn construction_element(&self) -> Option<Uuid> {
        None
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        Ok(())
    }

    fn mouse_up(&mut self, ctx: &mut ToolContext, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        Ok(())
    }

    fn click(&mut self, ctx: &mut ToolContext, screen: Vec2) -> EditorResult<()> {
        Ok(())
    }

    /// Leave no partially built entity behind. Called exactly once.
    fn dispose(&mut self, ctx: &mut ToolContext) -> EditorResult<()> {
        Ok(())
    }

    /// Pending disambiguation, if the tool is waiting on one
    fn chooser(&self) -> Option<&Chooser> {
        None
    }

    /// Answer the pending chooser; `None` cancels it
    fn resolve_choice(&mut self, ctx: &mut ToolContext, choice: Option<usize>) -> EditorResult<()> {
        Ok(())
    }
}

/// Tools that need nothing but the component they edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Manipulation,
    Line,
    Spline,
    Circle,
    Arc,
    Trim,
}

impl ToolKind {
    pub fn build(self, component: Uuid) -> Box<dyn Tool> {
        match self {
            ToolKind::Manipulation => Box::new(ManipulationTool::new(component)),
            ToolKind::Line => Box::new(LineTool::new(component)),
            ToolKind::Spline => Box::new(SplineTool::new(component)),
            ToolKind::Circle => Box::new(CircleTool::new(component)),
            ToolKind::Arc => Box::new(ArcTool::new(component)),
            ToolKind::Trim => Box::new(TrimTool::new(component)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Manipulation => "Select",
            ToolKind::Line => "Line",
            ToolKind::Spline => "Spline",
            ToolKind::Circle => "Circle",
            ToolKind::Arc => "Arc",
            ToolKind::Trim => "Trim",
        }
    }
}
