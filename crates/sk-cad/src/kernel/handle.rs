//! Lease handles for kernel-owned entities
//!
//! A handle is a lease on a kernel entity. Handles are deliberately neither
//! `Clone` nor `Copy`: releasing one through the kernel consumes it, so the
//! same lease cannot be freed twice from safe code.

use std::fmt;
use std::marker::PhantomData;

use uuid::Uuid;

/// Marker for component leases
#[derive(Debug)]
pub enum ComponentKind {}
/// Marker for solid leases
#[derive(Debug)]
pub enum SolidKind {}
/// Marker for sketch leases
#[derive(Debug)]
pub enum SketchKind {}
/// Marker for construction helper leases
#[derive(Debug)]
pub enum HelperKind {}
/// Marker for region leases
#[derive(Debug)]
pub enum RegionKind {}

/// A lease on one kernel entity.
///
/// `id` identifies the entity, `slot` identifies this particular lease.
/// Two leases may point at the same entity.
pub struct Handle<K> {
    id: Uuid,
    slot: u64,
    _kind: PhantomData<K>,
}

impl<K> Handle<K> {
    /// Mint a handle. Only kernels should call this.
    pub fn new(id: Uuid, slot: u64) -> Self {
        Self {
            id,
            slot,
            _kind: PhantomData,
        }
    }

    /// Entity id the lease refers to
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Kernel-side lease slot
    pub fn slot(&self) -> u64 {
        self.slot
    }
}

impl<K> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Lease on an assembly component
pub type ComponentHandle = Handle<ComponentKind>;
/// Lease on a solid body
pub type SolidHandle = Handle<SolidKind>;
/// Lease on a sketch
pub type SketchHandle = Handle<SketchKind>;
/// Lease on a construction plane or axis
pub type HelperHandle = Handle<HelperKind>;

/// A computed sketch region.
///
/// Regions flagged `no_free` are borrowed: the kernel keeps ownership and
/// the holder must not release them.
#[derive(Debug)]
pub struct RegionHandle {
    handle: Handle<RegionKind>,
    no_free: bool,
}

impl RegionHandle {
    /// Region owned by the receiver
    pub fn owned(id: Uuid, slot: u64) -> Self {
        Self {
            handle: Handle::new(id, slot),
            no_free: false,
        }
    }

    /// Region borrowed from the kernel
    pub fn borrowed(id: Uuid, slot: u64) -> Self {
        Self {
            handle: Handle::new(id, slot),
            no_free: true,
        }
    }

    /// Region id
    pub fn id(&self) -> Uuid {
        self.handle.id()
    }

    /// Kernel-side lease slot
    pub fn slot(&self) -> u64 {
        self.handle.slot()
    }

    /// Whether the holder must not release this region
    pub fn no_free(&self) -> bool {
        self.no_free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_accessors() {
        let id = Uuid::new_v4();
        let handle: SolidHandle = Handle::new(id, 7);
        assert_eq!(handle.id(), id);
        assert_eq!(handle.slot(), 7);
    }

    #[test]
    fn test_region_ownership_flag() {
        let id = Uuid::new_v4();
        assert!(!RegionHandle::owned(id, 1).no_free());
        assert!(RegionHandle::borrowed(id, 1).no_free());
    }
}
