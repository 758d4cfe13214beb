//! Links and the link-like capability.
//!
//! A link never owns its endpoints. Distances are recomputed from the
//! endpoints' live positions on every call; a link whose endpoint has been
//! dropped is infinitely long and therefore never in range.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::{Error, GroundStation, Node, NodeId, Result, Satellite};

/// Concrete link variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    InterSatellite,
    Ground,
}

/// A candidate connection between two nodes.
pub trait Link: Send + Sync + fmt::Debug {
    fn endpoints(&self) -> (NodeId, NodeId);

    fn kind(&self) -> LinkKind;

    /// Current length. Recomputed on every call.
    fn distance(&self) -> f64;

    fn is_established(&self) -> bool;

    fn set_established(&self, established: bool);

    /// Capability check: the ISL behind this handle, if it is one.
    fn into_isl(self: Arc<Self>) -> Option<Arc<IslLink>> {
        None
    }
}

/// Link identity: two handles refer to the same link object.
pub fn same_link(a: &Arc<dyn Link>, b: &Arc<dyn Link>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn distance_between(a: Option<Arc<dyn Node>>, b: Option<Arc<dyn Node>>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a.position().distance(&b.position()),
        _ => f64::INFINITY,
    }
}

/// An inter-satellite link.
pub struct IslLink {
    node1: NodeId,
    node2: NodeId,
    sat1: Weak<Satellite>,
    sat2: Weak<Satellite>,
    established: AtomicBool,
}

impl IslLink {
    /// Create a link between two distinct satellites.
    pub fn new(a: &Arc<Satellite>, b: &Arc<Satellite>) -> Result<Arc<Self>> {
        if a.id() == b.id() {
            return Err(Error::SelfLink(a.id()));
        }
        Ok(Arc::new(Self {
            node1: a.id(),
            node2: b.id(),
            sat1: Arc::downgrade(a),
            sat2: Arc::downgrade(b),
            established: AtomicBool::new(false),
        }))
    }

    /// Whether `id` is one of the two endpoints.
    pub fn connects(&self, id: NodeId) -> bool {
        self.node1 == id || self.node2 == id
    }

    /// The endpoint with this id, if it still exists.
    pub fn satellite(&self, id: NodeId) -> Option<Arc<Satellite>> {
        if id == self.node1 {
            self.sat1.upgrade()
        } else if id == self.node2 {
            self.sat2.upgrade()
        } else {
            None
        }
    }

    /// The endpoint opposite `id`.
    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if id == self.node1 {
            Some(self.node2)
        } else if id == self.node2 {
            Some(self.node1)
        } else {
            None
        }
    }
}

impl Link for IslLink {
    fn endpoints(&self) -> (NodeId, NodeId) {
        (self.node1, self.node2)
    }

    fn kind(&self) -> LinkKind {
        LinkKind::InterSatellite
    }

    fn distance(&self) -> f64 {
        distance_between(
            self.sat1.upgrade().map(|s| s as Arc<dyn Node>),
            self.sat2.upgrade().map(|s| s as Arc<dyn Node>),
        )
    }

    fn is_established(&self) -> bool {
        self.established.load(Ordering::Acquire)
    }

    fn set_established(&self, established: bool) {
        self.established.store(established, Ordering::Release);
    }

    fn into_isl(self: Arc<Self>) -> Option<Arc<IslLink>> {
        Some(self)
    }
}

impl fmt::Debug for IslLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IslLink")
            .field("node1", &self.node1)
            .field("node2", &self.node2)
            .field("established", &self.is_established())
            .finish()
    }
}

/// A satellite to ground-station link.
pub struct GroundLink {
    satellite: NodeId,
    station: NodeId,
    sat: Weak<Satellite>,
    ground: Weak<GroundStation>,
    established: AtomicBool,
}

impl GroundLink {
    /// Link a satellite to a ground station.
    pub fn new(satellite: &Arc<Satellite>, station: &Arc<GroundStation>) -> Arc<Self> {
        Arc::new(Self {
            satellite: satellite.id(),
            station: station.id(),
            sat: Arc::downgrade(satellite),
            ground: Arc::downgrade(station),
            established: AtomicBool::new(false),
        })
    }
}

impl Link for GroundLink {
    fn endpoints(&self) -> (NodeId, NodeId) {
        (self.satellite, self.station)
    }

    fn kind(&self) -> LinkKind {
        LinkKind::Ground
    }

    fn distance(&self) -> f64 {
        distance_between(
            self.sat.upgrade().map(|s| s as Arc<dyn Node>),
            self.ground.upgrade().map(|g| g as Arc<dyn Node>),
        )
    }

    fn is_established(&self) -> bool {
        self.established.load(Ordering::Acquire)
    }

    fn set_established(&self, established: bool) {
        self.established.store(established, Ordering::Release);
    }
}

impl fmt::Debug for GroundLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroundLink")
            .field("satellite", &self.satellite)
            .field("station", &self.station)
            .field("established", &self.is_established())
            .finish()
    }
}
