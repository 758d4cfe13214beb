//! Node handles and the node-like capability.
//!
//! Nodes are owned by the [`Constellation`](crate::Constellation) registry.
//! Everything else refers to them by [`NodeId`] or through a `Weak` handle.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{IslMstProtocol, LinkProtocol, ProtocolConfig, Vector};

/// A non-owning node handle.
///
/// Ordered, so sets and maps of nodes always iterate the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl NodeId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Concrete node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Satellite,
    GroundStation,
}

/// Anything with an identity and a live position.
pub trait Node: Send + Sync + fmt::Debug {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    fn kind(&self) -> NodeKind;

    /// Current position. Read fresh on every call.
    fn position(&self) -> Vector;

    /// Capability check: the satellite behind this handle, if it is one.
    fn into_satellite(self: Arc<Self>) -> Option<Arc<Satellite>> {
        None
    }
}

/// A moving node that maintains its own link topology.
pub struct Satellite {
    id: NodeId,
    name: String,
    position: RwLock<Vector>,
    protocol: IslMstProtocol,
}

impl Satellite {
    /// Create a satellite whose protocol is already mounted on it.
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        position: Vector,
        config: ProtocolConfig,
    ) -> Arc<Self> {
        let satellite = Arc::new(Self {
            id,
            name: name.into(),
            position: RwLock::new(position),
            protocol: IslMstProtocol::new(config),
        });
        satellite.protocol.mount(satellite.clone());
        satellite
    }

    /// Move the satellite. The next `update_links` will recompute.
    pub fn set_position(&self, position: Vector) {
        *self.position.write() = position;
    }

    /// The link protocol this satellite owns.
    pub fn protocol(&self) -> &IslMstProtocol {
        &self.protocol
    }
}

impl Node for Satellite {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Satellite
    }

    fn position(&self) -> Vector {
        *self.position.read()
    }

    fn into_satellite(self: Arc<Self>) -> Option<Arc<Satellite>> {
        Some(self)
    }
}

impl fmt::Debug for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Satellite")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &*self.position.read())
            .finish_non_exhaustive()
    }
}

/// A fixed node on the ground. Not part of the ISL topology.
#[derive(Debug, Clone)]
pub struct GroundStation {
    id: NodeId,
    name: String,
    position: Vector,
}

impl GroundStation {
    /// Create a fixed ground node.
    pub fn new(id: NodeId, name: impl Into<String>, position: Vector) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: name.into(),
            position,
        })
    }
}

impl Node for GroundStation {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> NodeKind {
        NodeKind::GroundStation
    }

    fn position(&self) -> Vector {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satellite_is_mounted_on_creation() {
        let sat = Satellite::new(NodeId(1), "sat-1", Vector::ZERO, ProtocolConfig::default());
        assert!(sat.protocol().is_mounted());
    }

    #[test]
    fn set_position_is_visible() {
        let sat = Satellite::new(NodeId(1), "sat-1", Vector::ZERO, ProtocolConfig::default());
        sat.set_position(Vector::new(1.0, 2.0, 3.0));
        assert_eq!(sat.position(), Vector::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn capability_check_by_variant() {
        let sat: Arc<dyn Node> =
            Satellite::new(NodeId(1), "sat-1", Vector::ZERO, ProtocolConfig::default());
        let station: Arc<dyn Node> = GroundStation::new(NodeId(2), "gs-1", Vector::ZERO);

        assert_eq!(sat.kind(), NodeKind::Satellite);
        assert_eq!(station.kind(), NodeKind::GroundStation);
        assert!(sat.into_satellite().is_some());
        assert!(station.into_satellite().is_none());
    }

    #[test]
    fn node_id_ordering() {
        let mut ids = vec![NodeId(3), NodeId(1), NodeId(2)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
