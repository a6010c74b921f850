use glam::{Vec2, Vec3};
use sk_renderer::ProxyCategory;
use tracing::debug;
use uuid::Uuid;

use super::{Chooser, Highlighter, Tool, ToolContext};
use crate::error::EditorResult;
use crate::event::{Picked, ViewportEvent};

/// Selection and handle dragging.
///
/// A press over several overlapping objects opens a chooser and the tool
/// waits for [`Tool::resolve_choice`]. A new press while waiting cancels
/// the open chooser first.
#[derive(Debug)]
pub struct ManipulationTool {
    component: Uuid,
    highlighter: Highlighter,
    pick_any: bool,
    pending: Option<Chooser>,
}

impl ManipulationTool {
    pub fn new(component: Uuid) -> Self {
        Self::with_filter(component, &[ProxyCategory::Curve])
    }

    pub fn with_filter(component: Uuid, filter: &[ProxyCategory]) -> Self {
        Self {
            component,
            highlighter: Highlighter::new(filter),
            pick_any: false,
            pending: None,
        }
    }

    /// Take the topmost object instead of asking when objects overlap
    pub fn pick_any(mut self, pick_any: bool) -> Self {
        self.pick_any = pick_any;
        self
    }

    pub fn component(&self) -> Uuid {
        self.component
    }

    fn candidates(&self, ctx: &ToolContext, screen: Vec2) -> Vec<Picked> {
        let mut out: Vec<Picked> = Vec::new();
        for id in ctx.objects_at(screen, self.highlighter.filter()) {
            if let Some(picked) = ctx.picked(id)
                && !out.contains(&picked)
            {
                out.push(picked);
            }
        }
        out
    }

    fn select(&mut self, ctx: &mut ToolContext, picked: Picked) {
        self.highlighter.restore(ctx);
        match picked {
            Picked::Element(element) => ctx.sync.set_selected_element(Some(element)),
            _ => ctx.sync.set_selected_element(None),
        }
        debug!("Selected {:?}", picked);
        ctx.events.push(ViewportEvent::SelectionChanged(Some(picked)));
        ctx.render();
    }

    fn cancel_pending(&mut self, ctx: &mut ToolContext) {
        if self.pending.take().is_some() {
            ctx.events.push(ViewportEvent::ChooserClosed);
        }
    }
}

impl Tool for ManipulationTool {
    fn name(&self) -> &'static str {
        "Select"
    }

    fn snapping_enabled(&self, dragging: bool) -> bool {
        dragging
    }

    fn mouse_down(&mut self, ctx: &mut ToolContext, _pos: Vec3, screen: Vec2) -> EditorResult<()> {
        if ctx.active_handle.is_some() {
            return Ok(());
        }
        self.cancel_pending(ctx);

        let candidates = self.candidates(ctx, screen);
        if candidates.len() > 1 && !self.pick_any {
            debug!("{} candidates under cursor, asking", candidates.len());
            ctx.events.push(ViewportEvent::ChooserRequested {
                candidates: candidates.clone(),
            });
            self.pending = Some(Chooser::new(candidates, ctx.now));
        } else if let Some(first) = candidates.first().copied() {
            self.select(ctx, first);
        }
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut ToolContext, pos: Vec3, screen: Vec2) -> EditorResult<()> {
        if let Some(handle) = *ctx.active_handle {
            let mut handles = ctx.kernel.get_handles(handle.element)?;
            if let Some(slot) = handles.get_mut(handle.index) {
                *slot = pos;
                ctx.kernel.set_handles(handle.element, &handles)?;
                ctx.element_changed(handle.element, handle.component)?;
            }
            return Ok(());
        }
        if self.pending.is_none() {
            self.highlighter.hover(ctx, screen);
        }
        Ok(())
    }

    fn mouse_up(&mut self, ctx: &mut ToolContext, _pos: Vec3, _screen: Vec2) -> EditorResult<()> {
        if let Some(handle) = ctx.active_handle.take() {
            debug!("Finished dragging handle {} of {}", handle.index, handle.element);
        }
        Ok(())
    }

    fn click(&mut self, ctx: &mut ToolContext, screen: Vec2) -> EditorResult<()> {
        if self.pending.is_some() || ctx.pick_at(screen, self.highlighter.filter()).is_some() {
            ctx.render();
            return Ok(());
        }
        ctx.sync.set_selected_element(None);
        ctx.events.push(ViewportEvent::SelectionChanged(None));
        ctx.render();
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut ToolContext) -> EditorResult<()> {
        self.highlighter.restore(ctx);
        self.cancel_pending(ctx);
        Ok(())
    }

    fn chooser(&self) -> Option<&Chooser> {
        self.pending.as_ref()
    }

    fn resolve_choice(&mut self, ctx: &mut ToolContext, choice: Option<usize>) -> EditorResult<()> {
        let Some(chooser) = self.pending.take() else {
            return Ok(());
        };
        ctx.events.push(ViewportEvent::ChooserClosed);
        if let Some(picked) = choice.and_then(|i| chooser.get(i)) {
            self.select(ctx, picked);
        }
        Ok(())
    }
}
