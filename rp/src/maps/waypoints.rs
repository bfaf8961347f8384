//! Waypoint ordering policy

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Place;

/// How places are ordered before directions are requested
///
/// Only the identity ordering exists: the planner's visit order is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointPolicy {
    #[default]
    Identity,
}

impl WaypointPolicy {
    /// Positions of `places` in the order they should be visited
    pub fn order(&self, places: &[Place]) -> Vec<usize> {
        debug!(policy = ?self, place_count = places.len(), "WaypointPolicy::order: called");
        match self {
            WaypointPolicy::Identity => (0..places.len()).collect(),
        }
    }

    /// Reorder `places` according to the policy
    pub fn apply(&self, places: Vec<Place>) -> Vec<Place> {
        let order = self.order(&places);
        let mut slots: Vec<Option<Place>> = places.into_iter().map(Some).collect();
        order.into_iter().filter_map(|i| slots.get_mut(i).and_then(Option::take)).collect()
    }
}
