//! Viewport orchestration
//!
//! [`Viewport`] owns the kernel, the document, the scene synchronizer and
//! the current tool. Every pointer event goes through the same steps:
//!
//! 1. snap the position if the tool asks for it
//! 2. hand the event to the tool through a [`ToolContext`]
//! 3. rebuild the regions of the active component if the tool loaded or
//!    unloaded any of its elements
//!
//! Notifications for the view layer pile up in an event queue that the
//! caller drains with [`Viewport::take_events`].

use glam::{Vec2, Vec3};
use sk_cad::{CadError, CadKernel, ComponentHandle, TessellatedMesh};
use sk_core::{CoreError, Document};
use sk_renderer::{DisplayMode, FrameStats, RenderEngine, SceneSync};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::error::EditorResult;
use crate::event::ViewportEvent;
use crate::sketch_plane::SketchPlane;
use crate::snapping::{ActiveHandle, Snapper, collect_snap_points};
use crate::tools::{Chooser, ManipulationTool, Tool, ToolContext, ToolKind};

/// Interactive sketch viewport over a kernel `K`
pub struct Viewport<K: CadKernel> {
    kernel: K,
    document: Document,
    sync: SceneSync,
    snapper: Snapper,
    tool: Box<dyn Tool>,
    active_handle: Option<ActiveHandle>,
    events: Vec<ViewportEvent>,
    config: EditorConfig,
    /// Seconds, as passed to the last `tick`
    time: f64,
}

impl<K: CadKernel> Viewport<K> {
    /// Open the hierarchy under `root` and load it into `renderer`
    pub fn new(
        mut kernel: K,
        root: ComponentHandle,
        renderer: Box<dyn RenderEngine>,
        config: EditorConfig,
    ) -> EditorResult<Self> {
        let mut document = Document::new(&mut kernel, root)?;
        let mut sync = SceneSync::new(renderer, &config.renderer);
        let root = document.tree.root();
        sync.load_tree(&mut kernel, &mut document, root, true)?;
        sync.render();
        info!("Viewport ready on kernel {}", kernel.name());

        Ok(Self {
            kernel,
            document,
            sync,
            snapper: Snapper::new(config.snap.clone()),
            tool: Box::new(ManipulationTool::new(root)),
            active_handle: None,
            events: Vec::new(),
            config,
            time: 0.0,
        })
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Direct kernel access; call [`Viewport::component_changed`] after edits
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn sync(&self) -> &SceneSync {
        &self.sync
    }

    pub fn snapper(&self) -> &Snapper {
        &self.snapper
    }

    pub fn tool(&self) -> &dyn Tool {
        self.tool.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn active_handle(&self) -> Option<&ActiveHandle> {
        self.active_handle.as_ref()
    }

    /// Drain notifications for the view layer
    pub fn take_events(&mut self) -> Vec<ViewportEvent> {
        std::mem::take(&mut self.events)
    }

    /// Workplane of the active component's sketch
    pub fn sketch_plane(&self) -> EditorResult<SketchPlane> {
        let sketch = self.document.sketch_of(&self.kernel, self.document.active())?;
        Ok(SketchPlane::new(self.kernel.sketch_transform(sketch)?))
    }

    // ---- Pointer input, already on the sketch plane ----

    pub fn mouse_down(&mut self, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        let (pos, screen) = self.snap(pos, screen)?;
        self.dispatch(|tool, ctx| tool.mouse_down(ctx, pos, screen))
    }

    pub fn mouse_move(&mut self, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        let (pos, screen) = self.snap(pos, screen)?;
        self.dispatch(|tool, ctx| tool.mouse_move(ctx, pos, screen))
    }

    pub fn mouse_up(&mut self, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        let (pos, screen) = self.snap(pos, screen)?;
        self.dispatch(|tool, ctx| tool.mouse_up(ctx, pos, screen))
    }

    pub fn click(&mut self, screen: Vec2) -> EditorResult<()> {
        self.dispatch(|tool, ctx| tool.click(ctx, screen))
    }

    // ---- Pointer input in pixels ----

    pub fn pointer_down(&mut self, screen: Vec2) -> EditorResult<()> {
        match self.project(screen)? {
            Some(pos) => self.mouse_down(pos, screen),
            None => Ok(()),
        }
    }

    pub fn pointer_move(&mut self, screen: Vec2) -> EditorResult<()> {
        match self.project(screen)? {
            Some(pos) => self.mouse_move(pos, screen),
            None => Ok(()),
        }
    }

    pub fn pointer_up(&mut self, screen: Vec2) -> EditorResult<()> {
        match self.project(screen)? {
            Some(pos) => self.mouse_up(pos, screen),
            None => Ok(()),
        }
    }

    fn project(&self, screen: Vec2) -> EditorResult<Option<Vec3>> {
        let (origin, direction) = self.sync.renderer().screen_to_ray(screen);
        let hit = self.sketch_plane()?.intersect_ray(origin, direction);
        if hit.is_none() {
            warn!("Pointer ray at {:?} misses the sketch plane", screen);
        }
        Ok(hit)
    }

    // ---- Tools ----

    /// Replace the current tool, disposing the old one first
    pub fn set_tool(&mut self, tool: Box<dyn Tool>) -> EditorResult<()> {
        let disposed = self.dispatch(|old, ctx| old.dispose(ctx));
        info!("Tool {} -> {}", self.tool.name(), tool.name());
        self.tool = tool;
        self.active_handle = None;
        self.snapper.reset(&mut self.events);
        disposed
    }

    /// Switch to a tool bound to the active component
    pub fn select_tool(&mut self, kind: ToolKind) -> EditorResult<()> {
        let tool = kind.build(self.document.active());
        self.set_tool(tool)
    }

    /// Start dragging handle `index` of `element` in the active component
    pub fn begin_handle_drag(&mut self, element: Uuid, index: usize) -> EditorResult<()> {
        let component = self.document.active();
        let sketch = self.document.sketch_of(&self.kernel, component)?;
        if !self.kernel.get_sketch_elements(sketch)?.contains(&element) {
            return Err(CadError::ElementNotFound(element).into());
        }
        let count = self.kernel.get_handles(element)?.len();
        if index >= count {
            return Err(CadError::InvalidGeometry(format!(
                "handle {index} out of range for element with {count} handles"
            ))
            .into());
        }
        debug!("Dragging handle {} of {}", index, element);
        self.active_handle = Some(ActiveHandle {
            element,
            component,
            index,
        });
        Ok(())
    }

    pub fn end_handle_drag(&mut self) {
        self.active_handle = None;
    }

    /// Chooser the current tool is waiting on
    pub fn pending_chooser(&self) -> Option<&Chooser> {
        self.tool.chooser()
    }

    /// Answer the pending chooser; `None` cancels it
    pub fn resolve_chooser(&mut self, choice: Option<usize>) -> EditorResult<()> {
        self.dispatch(|tool, ctx| tool.resolve_choice(ctx, choice))
    }

    /// Advance the viewport clock, cancelling a chooser left open too long
    pub fn tick(&mut self, now: f64) -> EditorResult<()> {
        self.time = now;
        let expired = self
            .tool
            .chooser()
            .is_some_and(|c| c.is_expired(now, self.config.chooser_timeout));
        if expired {
            debug!("Chooser timed out");
            self.resolve_chooser(None)?;
        }
        Ok(())
    }

    // ---- Components and display ----

    /// Make `id` the component that receives tool input.
    ///
    /// The old tool is disposed while its component is still active, so
    /// whatever it reloads is swept away by the scene reload.
    pub fn set_active_component(&mut self, id: Uuid) -> EditorResult<()> {
        if !self.document.tree.contains(id) {
            return Err(CoreError::ComponentNotFound(id).into());
        }
        self.set_tool(Box::new(ManipulationTool::new(id)))?;
        self.document.set_active(id)?;
        self.sync.reload(&mut self.kernel, &mut self.document)?;
        self.sync.render();
        Ok(())
    }

    pub fn set_highlighted_component(&mut self, id: Option<Uuid>) -> EditorResult<()> {
        self.document.set_highlighted(id)?;
        self.sync.reload(&mut self.kernel, &mut self.document)?;
        self.sync.render();
        Ok(())
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> EditorResult<()> {
        self.sync
            .set_display_mode(&mut self.kernel, &mut self.document, mode)?;
        self.sync.render();
        Ok(())
    }

    /// Rebuild a component after the kernel changed underneath it
    pub fn component_changed(&mut self, component: Uuid) -> EditorResult<()> {
        self.dispatch(|_, ctx| ctx.component_changed(component))
    }

    pub fn preview_feature(&mut self, mesh: &TessellatedMesh) -> FrameStats {
        self.sync.preview_feature(mesh)
    }

    pub fn unpreview_feature(&mut self) -> FrameStats {
        self.sync.unpreview_feature()
    }

    /// Dispose the tool, drop every proxy and hand every lease back
    pub fn teardown(mut self) -> EditorResult<K> {
        self.dispatch(|tool, ctx| tool.dispose(ctx))?;
        let root = self.document.tree.root();
        self.sync
            .unload_tree(&mut self.kernel, &self.document, root, true)?;
        self.document.close(&mut self.kernel)?;
        info!("Viewport torn down");
        Ok(self.kernel)
    }

    // ---- Internals ----

    fn snap(&mut self, pos: Vec3, screen: Vec2) -> EditorResult<(Vec3, Vec2)> {
        if !self.tool.snapping_enabled(self.active_handle.is_some()) {
            return Ok((pos, screen));
        }
        let sketch = self.document.sketch_of(&self.kernel, self.document.active())?;
        let points = collect_snap_points(
            &self.kernel,
            sketch,
            self.tool.construction_element(),
            self.active_handle.as_ref(),
        )?;
        Ok(self.snapper.snap(
            true,
            pos,
            screen,
            self.sync.renderer(),
            &points,
            &mut self.events,
        ))
    }

    fn dispatch<F>(&mut self, f: F) -> EditorResult<()>
    where
        F: FnOnce(&mut dyn Tool, &mut ToolContext) -> EditorResult<()>,
    {
        let Self {
            kernel,
            document,
            sync,
            tool,
            active_handle,
            events,
            config,
            time,
            ..
        } = self;
        let mut ctx = ToolContext {
            kernel,
            document,
            sync,
            events,
            active_handle,
            config,
            now: *time,
        };
        let result = f(tool.as_mut(), &mut ctx);
        self.refresh_regions()?;
        result
    }

    /// Rebuild the active component's regions if its elements changed.
    ///
    /// Only the active component shows regions, so changes elsewhere are
    /// dropped.
    fn refresh_regions(&mut self) -> EditorResult<()> {
        let active = self.document.active();
        let touched = self
            .sync
            .take_events()
            .iter()
            .any(|event| event.component() == active);
        if touched {
            self.sync
                .update_regions(&mut self.kernel, &self.document, active)?;
        }
        Ok(())
    }
}
