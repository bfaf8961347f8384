//! Domain types for RoutePick
//!
//! Places, parsed plans, courses, trip requests and task entries.

mod course;
mod place;
mod request;
mod task;

pub use course::{Course, ParsedPlan, WeatherRecord};
pub use place::{Coordinates, Place, assign_indices};
pub use request::{PipelineInput, SavedPlace, TimeConstraints, TripRequest, UserPreferences};
pub use task::{TaskEntry, TaskId};
