use glam::Vec2;
use sk_renderer::{MaterialKind, ProxyCategory, ProxyId};

use super::ToolContext;
use crate::event::ViewportEvent;

/// Hover highlighting for a set of pickable categories.
///
/// The hovered proxy gets its category's highlight material; the previous
/// material comes back when the hover moves on.
#[derive(Debug)]
pub struct Highlighter {
    filter: Vec<ProxyCategory>,
    hovered: Option<(ProxyId, MaterialKind)>,
}

impl Highlighter {
    pub fn new(filter: &[ProxyCategory]) -> Self {
        Self {
            filter: filter.to_vec(),
            hovered: None,
        }
    }

    pub fn filter(&self) -> &[ProxyCategory] {
        &self.filter
    }

    pub fn hovered(&self) -> Option<ProxyId> {
        self.hovered.map(|(id, _)| id)
    }

    /// Highlight the topmost object under `screen`
    pub fn hover(&mut self, ctx: &mut ToolContext, screen: Vec2) {
        let top = ctx.pick_at(screen, &self.filter);
        if top.map(|(id, _)| id) == self.hovered() {
            return;
        }
        self.restore(ctx);
        if let Some((id, _)) = top
            && let Some(category) = ctx.sync.tag(id).map(|t| t.category)
            && let Some(material) = MaterialKind::highlight_for(category)
            && let Some(previous) = ctx.sync.renderer_mut().set_material(id, material)
        {
            self.hovered = Some((id, previous));
        }
        ctx.events
            .push(ViewportEvent::HighlightChanged(top.map(|(_, picked)| picked)));
        ctx.render();
    }

    /// Put the hovered proxy's material back
    pub fn restore(&mut self, ctx: &mut ToolContext) {
        if let Some((id, material)) = self.hovered.take() {
            ctx.sync.renderer_mut().set_material(id, material);
        }
    }
}
