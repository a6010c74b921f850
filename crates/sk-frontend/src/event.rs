//! Notifications produced for the view layer

use glam::{Vec2, Vec3};
use sk_cad::FaceId;
use sk_renderer::{ProxySource, ProxyTag};
use uuid::Uuid;

/// Domain object resolved from a render proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Picked {
    /// Sketch element
    Element(Uuid),
    /// Sketch region of a component
    Region { region: Uuid, component: Option<Uuid> },
    /// Solid face
    Face(FaceId),
    /// Construction plane
    Plane(Uuid),
}

impl Picked {
    /// Map a proxy tag back to the entity it shows
    pub fn from_tag(tag: &ProxyTag) -> Option<Self> {
        match tag.source {
            ProxySource::Element(id) => Some(Picked::Element(id)),
            ProxySource::Region(region) => Some(Picked::Region {
                region,
                component: tag.component,
            }),
            ProxySource::Face(face) => Some(Picked::Face(face)),
            ProxySource::Plane(id) => Some(Picked::Plane(id)),
            ProxySource::Edge(_) | ProxySource::Preview => None,
        }
    }

    /// Short label for choosers
    pub fn label(&self) -> String {
        let short = |id: &Uuid| id.simple().to_string()[..8].to_string();
        match self {
            Picked::Element(id) => format!("Curve {}", short(id)),
            Picked::Region { region, .. } => format!("Profile {}", short(region)),
            Picked::Face(face) => format!("Face {} of {}", face.index, short(&face.solid_id)),
            Picked::Plane(id) => format!("Plane {}", short(id)),
        }
    }
}

/// Axis a guide aligns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    /// X snapped, drawn vertically
    Vertical,
    /// Y snapped, drawn horizontally
    Horizontal,
}

/// Screen-space alignment segment between a remembered snap and the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    /// Stable id derived from the start point
    pub id: String,
    pub axis: GuideAxis,
    pub start: Vec2,
    pub end: Vec2,
}

/// Position where both axes snap at once
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Stable id derived from the position
    pub id: String,
    pub position: Vec3,
    pub screen: Vec2,
}

/// Events emitted by the viewport for the view layer to consume
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    SelectionChanged(Option<Picked>),
    HighlightChanged(Option<Picked>),
    ElementChanged { element: Uuid, component: Uuid },
    ComponentChanged(Uuid),
    SnapGuidesUpdated {
        guides: Vec<Guide>,
        anchor: Option<Anchor>,
    },
    /// Several objects overlap under the cursor
    ChooserRequested { candidates: Vec<Picked> },
    ChooserClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_renderer::ProxyCategory;

    #[test]
    fn test_from_tag() {
        let id = Uuid::new_v4();
        let owner = Some(Uuid::new_v4());
        let tag = ProxyTag::new(ProxyCategory::Region, ProxySource::Region(id), owner);
        assert_eq!(
            Picked::from_tag(&tag),
            Some(Picked::Region {
                region: id,
                component: owner
            })
        );

        let edge = ProxyTag::new(
            ProxyCategory::Wireframe,
            ProxySource::Edge(sk_cad::EdgeId::new(id, 0)),
            owner,
        );
        assert_eq!(Picked::from_tag(&edge), None);
    }

    #[test]
    fn test_label() {
        let id = Uuid::new_v4();
        let label = Picked::Element(id).label();
        assert!(label.starts_with("Curve "));
        assert_eq!(label.len(), "Curve ".len() + 8);
    }
}
