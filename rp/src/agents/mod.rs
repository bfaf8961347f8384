//! Pipeline agents
//!
//! Each stage of the pipeline is an agent with one capability. An agent
//! validates its input before executing; `run` does both.

mod error;
mod planning;
mod routing;
mod search;

pub use error::AgentError;
pub use planning::{PlanInput, PlanningAgent};
pub use routing::{RouteInput, RoutingAgent};
pub use search::{SearchAgent, SearchInput};

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

/// What an agent contributes to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Search,
    Plan,
    Route,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Search => "search",
            Capability::Plan => "plan",
            Capability::Route => "route",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pipeline stage
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + Sync + 'static;
    type Output: Send + 'static;

    fn capability(&self) -> Capability;

    /// Reject input the agent cannot work with, before any I/O
    fn validate_input(&self, input: &Self::Input) -> Result<(), AgentError>;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, AgentError>;

    /// Validate, then execute
    async fn run(&self, input: Self::Input) -> Result<Self::Output, AgentError> {
        debug!(capability = %self.capability(), "Agent::run: called");
        self.validate_input(&input)?;
        self.execute(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Echo {
        executed: AtomicBool,
    }

    #[async_trait]
    impl Agent for Echo {
        type Input = String;
        type Output = String;

        fn capability(&self) -> Capability {
            Capability::Search
        }

        fn validate_input(&self, input: &String) -> Result<(), AgentError> {
            if input.is_empty() {
                return Err(AgentError::invalid(Capability::Search, "empty"));
            }
            Ok(())
        }

        async fn execute(&self, input: String) -> Result<String, AgentError> {
            self.executed.store(true, Ordering::SeqCst);
            Ok(input.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_run_validates_before_execute() {
        let agent = Echo {
            executed: AtomicBool::new(false),
        };
        assert!(agent.run(String::new()).await.is_err());
        assert!(!agent.executed.load(Ordering::SeqCst));

        assert_eq!(agent.run("seoul".to_string()).await.unwrap(), "SEOUL");
        assert!(agent.executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_capability_names() {
        assert_eq!(Capability::Search.to_string(), "search");
        assert_eq!(Capability::Plan.to_string(), "plan");
        assert_eq!(Capability::Route.to_string(), "route");
    }
}
