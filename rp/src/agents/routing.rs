//! Routing agent: verify travel between the places of a course

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Agent, AgentError, Capability};
use crate::domain::Place;
use crate::maps::{DirectionsProvider, RouteSummary, TravelMode, WaypointPolicy};

/// Places in visit order and how to travel between them
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInput {
    pub places: Vec<Place>,
    pub mode: TravelMode,
}

/// Orders waypoints and asks the directions provider for the route
pub struct RoutingAgent {
    directions: Arc<dyn DirectionsProvider>,
    policy: WaypointPolicy,
}

impl RoutingAgent {
    pub fn new(directions: Arc<dyn DirectionsProvider>) -> Self {
        Self {
            directions,
            policy: WaypointPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: WaypointPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl Agent for RoutingAgent {
    type Input = RouteInput;
    type Output = RouteSummary;

    fn capability(&self) -> Capability {
        Capability::Route
    }

    fn validate_input(&self, input: &RouteInput) -> Result<(), AgentError> {
        if input.places.is_empty() {
            return Err(AgentError::invalid(Capability::Route, "at least one place is required"));
        }
        Ok(())
    }

    async fn execute(&self, input: RouteInput) -> Result<RouteSummary, AgentError> {
        debug!(place_count = input.places.len(), mode = %input.mode, policy = ?self.policy, "RoutingAgent::execute: called");
        let ordered = self.policy.apply(input.places);
        Ok(self.directions.route(&ordered, input.mode).await?)
    }
}
