//! Render proxies: scene objects derived from one kernel entity each

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sk_cad::{EdgeId, FaceId};
use uuid::Uuid;

use super::bounds::BoundingBox;
use crate::vertex::{LineVertex, MeshVertex};

/// Scene-assigned proxy identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyId(pub u64);

/// What a proxy depicts. Tools filter hit tests by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyCategory {
    /// Sketch element line
    Curve,
    /// Sketch region fill
    Region,
    /// Solid face mesh
    Face,
    /// Solid edge line
    Wireframe,
    /// Construction plane quad
    Plane,
    /// Feature preview mesh
    Preview,
}

impl ProxyCategory {
    /// Tie-break rank when two hits share the same depth; lower wins
    pub fn pick_priority(&self) -> u8 {
        match self {
            ProxyCategory::Curve => 0,
            ProxyCategory::Wireframe => 1,
            ProxyCategory::Region => 2,
            ProxyCategory::Face => 3,
            ProxyCategory::Plane => 4,
            ProxyCategory::Preview => 5,
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            ProxyCategory::Curve => "curve",
            ProxyCategory::Region => "region",
            ProxyCategory::Face => "face",
            ProxyCategory::Wireframe => "wireframe",
            ProxyCategory::Plane => "plane",
            ProxyCategory::Preview => "preview",
        }
    }
}

/// Back-reference to the entity a proxy was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxySource {
    /// Sketch element id
    Element(Uuid),
    /// Solid face
    Face(FaceId),
    /// Solid edge
    Edge(EdgeId),
    /// Sketch region id
    Region(Uuid),
    /// Construction helper id
    Plane(Uuid),
    /// Transient preview geometry
    Preview,
}

/// Category, source and owning component of a proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyTag {
    /// Proxy category
    pub category: ProxyCategory,
    /// Source entity
    pub source: ProxySource,
    /// Owning component, if any
    pub component: Option<Uuid>,
}

impl ProxyTag {
    /// Create a tag
    pub fn new(category: ProxyCategory, source: ProxySource, component: Option<Uuid>) -> Self {
        Self {
            category,
            source,
            component,
        }
    }
}

/// Named materials; the renderer maps them to shading parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Face of the active component
    Surface,
    /// Face of a component both active and highlighted
    HighlightSurface,
    /// Face of a highlighted, inactive component; also feature previews
    PreviewAddSurface,
    /// Face of an inactive component
    GhostSurface,
    /// Edge of the active component
    Wire,
    /// Edge of an inactive component
    GhostWire,
    /// Edge of a highlighted component, or the selected curve
    SelectionLine,
    /// Sketch curve
    Line,
    /// Hovered sketch curve
    HighlightLine,
    /// Region fill
    Region,
    /// Hovered region
    HighlightRegion,
    /// Construction plane
    Plane,
    /// Hovered construction plane
    HighlightPlane,
}

impl MaterialKind {
    /// Material for a face given the owning component's state
    pub fn for_face(is_active: bool, is_highlighted: bool) -> Self {
        match (is_active, is_highlighted) {
            (true, true) => MaterialKind::HighlightSurface,
            (true, false) => MaterialKind::Surface,
            (false, true) => MaterialKind::PreviewAddSurface,
            (false, false) => MaterialKind::GhostSurface,
        }
    }

    /// Material for a solid edge given the owning component's state
    pub fn for_edge(is_active: bool, is_highlighted: bool) -> Self {
        if is_highlighted {
            MaterialKind::SelectionLine
        } else if is_active {
            MaterialKind::Wire
        } else {
            MaterialKind::GhostWire
        }
    }

    /// Hover material for a category, if it has one
    pub fn highlight_for(category: ProxyCategory) -> Option<Self> {
        match category {
            ProxyCategory::Curve => Some(MaterialKind::HighlightLine),
            ProxyCategory::Region => Some(MaterialKind::HighlightRegion),
            ProxyCategory::Face => Some(MaterialKind::HighlightSurface),
            ProxyCategory::Plane => Some(MaterialKind::HighlightPlane),
            ProxyCategory::Wireframe | ProxyCategory::Preview => None,
        }
    }
}

/// Vertex data of a proxy
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyGeometry {
    /// Indexed triangle mesh
    Mesh {
        /// Vertices
        vertices: Vec<MeshVertex>,
        /// Triangle indices
        indices: Vec<u32>,
    },
    /// Polyline
    Line {
        /// Points in order
        points: Vec<LineVertex>,
    },
}

impl ProxyGeometry {
    /// Raw vertex bytes as they would be uploaded
    pub fn vertex_bytes(&self) -> &[u8] {
        match self {
            ProxyGeometry::Mesh { vertices, .. } => bytemuck::cast_slice(vertices),
            ProxyGeometry::Line { points } => bytemuck::cast_slice(points),
        }
    }

    /// All vertex positions
    pub fn positions(&self) -> Vec<Vec3> {
        match self {
            ProxyGeometry::Mesh { vertices, .. } => {
                vertices.iter().map(|v| Vec3::from(v.position)).collect()
            }
            ProxyGeometry::Line { points } => {
                points.iter().map(|v| Vec3::from(v.position)).collect()
            }
        }
    }
}

/// A renderable object
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProxy {
    /// Vertex data
    pub geometry: ProxyGeometry,
    /// Current material
    pub material: MaterialKind,
    /// Category and back-references
    pub tag: ProxyTag,
    /// World-space bounds
    pub bounds: BoundingBox,
}

impl RenderProxy {
    /// Build a proxy, computing its bounds
    pub fn new(geometry: ProxyGeometry, material: MaterialKind, tag: ProxyTag) -> Self {
        let bounds = BoundingBox::from_points(geometry.positions());
        Self {
            geometry,
            material,
            tag,
            bounds,
        }
    }
}
