//! RoutePick - multi-agent travel itinerary planner
//!
//! A request names a theme and a location. Three agents run in sequence:
//! search finds and ranks candidate places, planning asks a language model
//! to pick and order a course, and routing verifies travel between the
//! stops. Finished courses are held in an in-memory task registry and
//! served over HTTP with a map and a chat assistant.
//!
//! # Modules
//!
//! - [`planner`] - Recovery and repair of the language model's plan JSON
//! - [`agents`] - Search, planning and routing agents
//! - [`pipeline`] - Runs the agents for one task
//! - [`registry`] - Task registry actor with TTL eviction
//! - [`server`] - HTTP endpoints
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod agents;
pub mod chat;
pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod maps;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod registry;
pub mod search;
pub mod server;

pub use config::Config;
pub use domain::{Course, Place, TaskEntry, TaskId, TripRequest};
pub use pipeline::{Pipeline, PipelineError};
pub use registry::{TaskRegistry, TaskStore};
