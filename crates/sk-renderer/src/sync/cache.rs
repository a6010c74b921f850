//! Per-component proxy bookkeeping

use sk_cad::RegionHandle;
use uuid::Uuid;

use crate::scene::ProxyId;

/// A region proxy together with the region lease it displays
#[derive(Debug)]
pub struct RegionProxy {
    /// Scene proxy
    pub proxy: ProxyId,
    /// Kernel region
    pub region: RegionHandle,
}

/// Proxies created for one component
#[derive(Debug, Default)]
pub struct ProxyCache {
    /// Sketch element ids with a curve proxy
    pub curves: Vec<Uuid>,
    /// Face meshes
    pub faces: Vec<ProxyId>,
    /// Edge lines
    pub wireframe: Vec<ProxyId>,
    /// Construction plane quads
    pub planes: Vec<ProxyId>,
    /// Region fills
    pub regions: Vec<RegionProxy>,
}

impl ProxyCache {
    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
            && self.faces.is_empty()
            && self.wireframe.is_empty()
            && self.planes.is_empty()
            && self.regions.is_empty()
    }
}
