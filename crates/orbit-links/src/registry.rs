//! Node registry.
//!
//! The constellation owns every node. Satellites, links and protocols refer
//! back into it only through [`NodeId`]s and weak handles.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::{
    Error, GroundLink, GroundStation, IslLink, LinkProtocol, Node, NodeId, ProtocolConfig,
    Result, Satellite, Vector,
};

/// Owner of all nodes taking part in the link topology.
#[derive(Debug)]
pub struct Constellation {
    config: ProtocolConfig,
    satellites: BTreeMap<NodeId, Arc<Satellite>>,
    stations: BTreeMap<NodeId, Arc<GroundStation>>,
    next_id: u64,
}

impl Constellation {
    /// Create an empty registry. Every satellite gets a protocol using `config`.
    ///
    /// `config` is not validated here; see [`Constellation::try_new`].
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            satellites: BTreeMap::new(),
            stations: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Validate `config`, then create an empty registry.
    pub fn try_new(config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Configuration shared by every satellite's protocol.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a satellite with a mounted protocol.
    pub fn add_satellite(&mut self, name: impl Into<String>, position: Vector) -> Arc<Satellite> {
        let id = self.allocate_id();
        let satellite = Satellite::new(id, name, position, self.config);
        self.satellites.insert(id, satellite.clone());
        satellite
    }

    /// Add a ground station. It takes part in no ISL protocol.
    pub fn add_ground_station(
        &mut self,
        name: impl Into<String>,
        position: Vector,
    ) -> Arc<GroundStation> {
        let id = self.allocate_id();
        let station = GroundStation::new(id, name, position);
        self.stations.insert(id, station.clone());
        station
    }

    /// Look up a satellite by id.
    pub fn satellite(&self, id: NodeId) -> Option<&Arc<Satellite>> {
        self.satellites.get(&id)
    }

    /// Look up a ground station by id.
    pub fn ground_station(&self, id: NodeId) -> Option<&Arc<GroundStation>> {
        self.stations.get(&id)
    }

    /// Satellites in id order.
    pub fn satellites(&self) -> impl Iterator<Item = &Arc<Satellite>> {
        self.satellites.values()
    }

    /// Number of satellites.
    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    fn require(&self, id: NodeId) -> Result<&Arc<Satellite>> {
        self.satellites.get(&id).ok_or(Error::UnknownNode(id))
    }

    /// Create a candidate ISL and register it with both endpoints.
    ///
    /// Both protocols share the same link object, so either side's frontier
    /// expansion sees it and established flags agree.
    pub fn link(&self, a: NodeId, b: NodeId) -> Result<Arc<IslLink>> {
        let (sat_a, sat_b) = (self.require(a)?, self.require(b)?);
        let link = IslLink::new(sat_a, sat_b)?;
        sat_a.protocol().add_link(link.clone());
        sat_b.protocol().add_link(link.clone());
        Ok(link)
    }

    /// Candidate links for every satellite pair currently within `max`.
    ///
    /// Pairs are visited in ascending id order.
    pub fn link_within_range(&self, max: f64) -> Result<Vec<Arc<IslLink>>> {
        let ids: Vec<NodeId> = self.satellites.keys().copied().collect();
        let mut links = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                let distance = self.require(a)?.position().distance(&self.require(b)?.position());
                if distance <= max {
                    links.push(self.link(a, b)?);
                }
            }
        }
        debug!("Registered {} candidate links within {}", links.len(), max);
        Ok(links)
    }

    /// Create a satellite to ground link. The ISL protocols ignore it.
    pub fn ground_link(&self, satellite: NodeId, station: NodeId) -> Result<Arc<GroundLink>> {
        let sat = self.require(satellite)?;
        let station = self
            .stations
            .get(&station)
            .ok_or(Error::UnknownNode(station))?;
        Ok(GroundLink::new(sat, station))
    }

    /// Run `update_links` on every satellite in id order.
    ///
    /// Returns the total number of established links across all satellites.
    pub fn update_all(&self) -> Result<usize> {
        let mut total = 0;
        for satellite in self.satellites.values() {
            total += satellite.protocol().update_links()?.len();
        }
        Ok(total)
    }
}

impl Default for Constellation {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Link;

    #[test]
    fn ids_are_sequential_across_node_kinds() {
        let mut mesh = Constellation::default();
        let a = mesh.add_satellite("a", Vector::ZERO);
        let gs = mesh.add_ground_station("gs", Vector::ZERO);
        let b = mesh.add_satellite("b", Vector::ZERO);

        assert_eq!(a.id(), NodeId(0));
        assert_eq!(gs.id(), NodeId(1));
        assert_eq!(b.id(), NodeId(2));
        assert_eq!(mesh.len(), 2);
        assert!(mesh.satellite(gs.id()).is_none());
        assert!(mesh.ground_station(gs.id()).is_some());
    }

    #[test]
    fn try_new_rejects_invalid_range() {
        let bad = ProtocolConfig::default().with_max_distance(f64::NAN);
        assert!(matches!(Constellation::try_new(bad), Err(Error::InvalidConfig(_))));

        let config = ProtocolConfig::default().with_max_distance(10.0);
        let mesh = Constellation::try_new(config).unwrap();
        assert_eq!(mesh.config().max_isl_distance, 10.0);
    }

    #[test]
    fn link_registers_with_both_endpoints() {
        let mut mesh = Constellation::default();
        let a = mesh.add_satellite("a", Vector::ZERO);
        let b = mesh.add_satellite("b", Vector::new(1.0, 0.0, 0.0));
        let link = mesh.link(a.id(), b.id()).unwrap();

        for sat in [&a, &b] {
            let candidates = sat.protocol().candidate_links();
            assert_eq!(candidates.len(), 1);
            assert!(Arc::ptr_eq(&candidates[0], &link));
        }
    }

    #[test]
    fn link_to_unknown_node_fails() {
        let mut mesh = Constellation::default();
        let a = mesh.add_satellite("a", Vector::ZERO);
        assert_eq!(
            mesh.link(a.id(), NodeId(42)).unwrap_err(),
            Error::UnknownNode(NodeId(42))
        );
        assert_eq!(mesh.link(a.id(), a.id()).unwrap_err(), Error::SelfLink(a.id()));
        assert!(a.protocol().candidate_links().is_empty());
    }

    #[test]
    fn link_within_range_filters_pairs() {
        let mut mesh = Constellation::default();
        mesh.add_satellite("a", Vector::ZERO);
        mesh.add_satellite("b", Vector::new(5.0, 0.0, 0.0));
        mesh.add_satellite("c", Vector::new(100.0, 0.0, 0.0));

        let links = mesh.link_within_range(10.0).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].endpoints(), (NodeId(0), NodeId(1)));
    }

    #[test]
    fn ground_link_is_rejected_by_isl_protocol() {
        let mut mesh = Constellation::default();
        let a = mesh.add_satellite("a", Vector::ZERO);
        let gs = mesh.add_ground_station("gs", Vector::new(0.0, 0.0, -1.0));
        let link = mesh.ground_link(a.id(), gs.id()).unwrap();

        assert!(!a.protocol().add_link(link));
        assert!(mesh.ground_link(gs.id(), a.id()).is_err());
    }

    #[test]
    fn update_all_counts_established_links() {
        let mut mesh = Constellation::new(ProtocolConfig::default().with_max_distance(10.0));
        mesh.add_satellite("a", Vector::ZERO);
        mesh.add_satellite("b", Vector::new(3.0, 0.0, 0.0));
        mesh.add_satellite("c", Vector::new(6.0, 0.0, 0.0));
        mesh.link_within_range(10.0).unwrap();

        // Every satellite knows both others and builds a 2-edge tree.
        assert_eq!(mesh.update_all().unwrap(), 6);
    }
}
