//! Satellite-centric MST link protocol.
//!
//! Each satellite runs one [`IslMstProtocol`]. The protocol keeps every
//! candidate ISL it has been told about and, on demand, grows a minimum
//! spanning tree outward from its own satellite with Prim's algorithm:
//!
//! ```text
//! visited = {owner}
//! queue   = { l ∈ candidates | l.distance ≤ max }
//! while |tree| < |universe| - 1 and queue ≠ ∅:
//!     l = queue.pop_min()
//!     if both endpoints visited: skip
//!     n = the unvisited endpoint
//!     queue += { m ∈ n.candidates | m.distance ≤ max, m not closed }
//!     tree  += l;  visited += n
//! ```
//!
//! The tree is only regrown when the owning satellite has moved. A cache hit
//! returns the previous tree without touching any link.
//!
//! # Locking
//!
//! All MST state (established set, visited set, queue, cached position) sits
//! behind one mutex that `update_links` holds for the whole pass. The
//! candidate list has its own lock, taken only to append or to copy out. A
//! recomputation reads neighbouring satellites' candidate lists while holding
//! its own state lock; since candidate locks are never held across another
//! acquisition, two neighbours recomputing at the same time cannot deadlock.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::{
    Error, IslLink, LinkPriorityQueue, Link, Node, NodeId, ProtocolConfig, ReadySignal,
    Result, Satellite, Vector,
};

/// A link-topology strategy mounted on one node.
///
/// Routing layers consume any strategy through this trait. Boundary methods
/// return `false` when handed a node or link variant the strategy does not
/// manage; such calls change nothing.
pub trait LinkProtocol: Send + Sync {
    /// Bind to the owning node. The first accepted mount wins.
    fn mount(&self, node: Arc<dyn Node>) -> bool;

    /// Register a candidate link.
    fn add_link(&self, link: Arc<dyn Link>) -> bool;

    /// Force a link into the established set without recomputing.
    fn connect_link(&self, link: Arc<dyn Link>) -> bool;

    /// Remove one instance of a link from the established set.
    ///
    /// Returns whether an entry was removed.
    fn disconnect_link(&self, link: &Arc<dyn Link>) -> bool;

    fn connect_satellite(&self, node: Arc<dyn Node>) -> Result<()>;

    fn disconnect_satellite(&self, node: Arc<dyn Node>) -> Result<()>;

    /// Recompute the topology if the owner moved. Returns the established set.
    fn update_links(&self) -> Result<Vec<Arc<dyn Link>>>;

    /// Copy of every candidate link.
    fn links(&self) -> Vec<Arc<dyn Link>>;

    /// Copy of the established links.
    fn established(&self) -> Vec<Arc<dyn Link>>;
}

#[derive(Debug, Default)]
struct MstState {
    owner: Option<Weak<Satellite>>,
    established: Vec<Arc<IslLink>>,
    /// Distinct endpoints seen in the candidate list on the last pass.
    universe: BTreeSet<NodeId>,
    visited: HashSet<NodeId>,
    queue: LinkPriorityQueue<Arc<IslLink>>,
    /// `None` until the first pass so that any starting position misses.
    position: Option<Vector>,
    passes: u64,
}

/// Minimum spanning tree ISL protocol.
#[derive(Debug)]
pub struct IslMstProtocol {
    config: ProtocolConfig,
    candidates: RwLock<Vec<Arc<IslLink>>>,
    state: Mutex<MstState>,
    ready: ReadySignal,
}

fn as_dyn(links: &[Arc<IslLink>]) -> Vec<Arc<dyn Link>> {
    links.iter().map(|l| l.clone() as Arc<dyn Link>).collect()
}

impl IslMstProtocol {
    /// Create an unmounted protocol.
    ///
    /// `config` is taken as given. A NaN or negative range establishes
    /// nothing; use [`IslMstProtocol::try_new`] to reject it up front.
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            config,
            candidates: RwLock::new(Vec::new()),
            state: Mutex::new(MstState::default()),
            ready: ReadySignal::new(),
        }
    }

    /// Like [`IslMstProtocol::new`], but fails on an invalid `config`.
    pub fn try_new(config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Configuration fixed at construction.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Whether a satellite has been mounted. Stays true after the owner drops.
    pub fn is_mounted(&self) -> bool {
        self.state.lock().owner.is_some()
    }

    /// Signal raised after every recomputation.
    pub fn ready(&self) -> &ReadySignal {
        &self.ready
    }

    /// Number of MST passes run so far. Cache hits do not count.
    pub fn recompute_count(&self) -> u64 {
        self.state.lock().passes
    }

    /// Forget the cached position so the next `update_links` recomputes.
    pub fn invalidate(&self) {
        self.state.lock().position = None;
    }

    /// Typed copy of the candidate list.
    pub fn candidate_links(&self) -> Vec<Arc<IslLink>> {
        self.candidates.read().clone()
    }

    /// Typed copy of the established set.
    pub fn established_links(&self) -> Vec<Arc<IslLink>> {
        self.state.lock().established.clone()
    }

    fn recompute(&self, state: &mut MstState, owner: &Arc<Satellite>) -> Vec<Arc<IslLink>> {
        let candidates = self.candidate_links();
        state.universe.clear();
        for link in &candidates {
            let (a, b) = link.endpoints();
            state.universe.insert(a);
            state.universe.insert(b);
        }

        state.visited.clear();
        state.visited.insert(owner.id());
        state.queue.clear();

        for link in &candidates {
            let distance = link.distance();
            if self.config.in_range(distance) {
                state.queue.enqueue(link.clone(), distance);
            }
        }

        let target = state.universe.len().saturating_sub(1);
        let mut tree = Vec::with_capacity(target);

        while tree.len() < target {
            let Some(link) = state.queue.dequeue() else {
                break;
            };

            let (a, b) = link.endpoints();
            let reached = match (state.visited.contains(&a), state.visited.contains(&b)) {
                (true, true) | (false, false) => continue,
                (false, true) => a,
                (true, false) => b,
            };

            if let Some(satellite) = link.satellite(reached) {
                for next in satellite.protocol().candidate_links() {
                    let (c, d) = next.endpoints();
                    if state.visited.contains(&c) && state.visited.contains(&d) {
                        continue;
                    }
                    let distance = next.distance();
                    if self.config.in_range(distance) {
                        state.queue.enqueue(next, distance);
                    }
                }
            }

            tree.push(link);
            state.visited.insert(reached);
        }

        tree
    }
}

impl Default for IslMstProtocol {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}

impl LinkProtocol for IslMstProtocol {
    fn mount(&self, node: Arc<dyn Node>) -> bool {
        let id = node.id();
        let Some(satellite) = node.into_satellite() else {
            debug!("Ignoring mount of non-satellite node {}", id);
            return false;
        };

        let mut state = self.state.lock();
        if state.owner.is_some() {
            return false;
        }
        state.owner = Some(Arc::downgrade(&satellite));
        true
    }

    fn add_link(&self, link: Arc<dyn Link>) -> bool {
        let kind = link.kind();
        match link.into_isl() {
            Some(isl) => {
                self.candidates.write().push(isl);
                true
            }
            None => {
                debug!("Ignoring candidate link of kind {:?}", kind);
                false
            }
        }
    }

    fn connect_link(&self, link: Arc<dyn Link>) -> bool {
        let Some(isl) = link.into_isl() else {
            return false;
        };
        trace!("Connecting link {:?}", isl.endpoints());
        self.state.lock().established.push(isl);
        true
    }

    fn disconnect_link(&self, link: &Arc<dyn Link>) -> bool {
        let Some(isl) = link.clone().into_isl() else {
            return false;
        };

        let mut state = self.state.lock();
        match state.established.iter().position(|l| Arc::ptr_eq(l, &isl)) {
            Some(index) => {
                state.established.remove(index);
                trace!("Disconnected link {:?}", isl.endpoints());
                true
            }
            None => false,
        }
    }

    fn connect_satellite(&self, _node: Arc<dyn Node>) -> Result<()> {
        Err(Error::Unsupported {
            operation: "ConnectSatellite",
        })
    }

    fn disconnect_satellite(&self, _node: Arc<dyn Node>) -> Result<()> {
        Err(Error::Unsupported {
            operation: "DisconnectSatellite",
        })
    }

    fn update_links(&self) -> Result<Vec<Arc<dyn Link>>> {
        let mut state = self.state.lock();

        let owner = state
            .owner
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(Error::NotMounted)?;

        let position = owner.position();
        if state.position == Some(position) {
            self.ready.try_take();
            trace!("Topology for {} unchanged at {}", owner.id(), position);
            return Ok(as_dyn(&state.established));
        }
        state.position = Some(position);

        let tree = self.recompute(&mut state, &owner);
        state.passes += 1;

        let in_tree: HashSet<*const IslLink> = tree.iter().map(Arc::as_ptr).collect();
        for link in &tree {
            link.set_established(true);
        }
        for link in &state.established {
            if !in_tree.contains(&Arc::as_ptr(link)) {
                link.set_established(false);
            }
        }
        state.established = tree;

        debug!(
            "MST pass {} for {}: {} candidates, {} reachable, {} established",
            state.passes,
            owner.id(),
            self.candidates.read().len(),
            state.universe.len(),
            state.established.len()
        );

        self.ready.notify();
        Ok(as_dyn(&state.established))
    }

    fn links(&self) -> Vec<Arc<dyn Link>> {
        as_dyn(&self.candidates.read())
    }

    fn established(&self) -> Vec<Arc<dyn Link>> {
        as_dyn(&self.state.lock().established)
    }
}
