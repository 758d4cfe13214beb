//! Orbit Link Topology
//!
//! Maintains a minimum-cost inter-satellite link (ISL) topology among moving
//! satellites whose pairwise reachability changes as they orbit.
//!
//! # Model
//!
//! Every [`Satellite`] owns one [`IslMstProtocol`]. Candidate [`IslLink`]s are
//! registered with the protocols of both endpoints. On each tick an external
//! scheduler calls [`LinkProtocol::update_links`]; when the owning satellite
//! has moved since the last pass the protocol regrows a minimum spanning tree
//! over the candidate links that lie within the configured maximum range:
//!
//! 1. Seed a priority queue with the local in-range candidates
//! 2. Repeatedly take the shortest link that reaches an unvisited satellite
//! 3. Expand the frontier with that satellite's own in-range candidates
//! 4. Flip the established flag on links that entered or left the tree
//!
//! When the satellite has not moved the previous tree is returned untouched.
//!
//! # Ownership
//!
//! The [`Constellation`] registry owns every node. Links and protocols only
//! hold [`NodeId`] handles and weak references, so the reference graph between
//! satellites never keeps a node alive.

mod config;
mod error;
mod link;
mod node;
mod protocol;
mod queue;
mod registry;
mod signal;
mod vector;

pub use config::{ProtocolConfig, DEFAULT_MAX_ISL_DISTANCE};
pub use error::{Error, Result};
pub use link::{same_link, GroundLink, IslLink, Link, LinkKind};
pub use node::{GroundStation, Node, NodeId, NodeKind, Satellite};
pub use protocol::{IslMstProtocol, LinkProtocol};
pub use queue::LinkPriorityQueue;
pub use registry::Constellation;
pub use signal::ReadySignal;
pub use vector::Vector;
