//! Pipeline orchestrator
//!
//! Runs Search, Plan and the optional Route stage strictly in sequence for
//! one task and records the outcome in the task registry.

use std::sync::Arc;

use eyre::{Context, Result};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::agents::{Agent, AgentError, PlanInput, PlanningAgent, RouteInput, RoutingAgent, SearchAgent, SearchInput};
use crate::config::Config;
use crate::domain::{Course, PipelineInput, Place, SavedPlace, TaskEntry, TaskId, assign_indices};
use crate::llm::create_client;
use crate::maps::{GoogleMapsClient, TravelMode};
use crate::prompts::PromptLoader;
use crate::registry::{EntryUpdate, RegistryError, TaskStore};
use crate::search::{GooglePlacesClient, TavilyClient};

/// Errors that end a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Place search failed: {0}")]
    SearchFailure(String),

    #[error("No places found for '{0}'")]
    NoCandidates(String),

    #[error("Course planning failed: {0}")]
    Plan(AgentError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Task registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// The three agents wired together
pub struct Pipeline {
    search: SearchAgent,
    planning: PlanningAgent,
    routing: Option<RoutingAgent>,
    registry: Arc<dyn TaskStore>,
    default_mode: TravelMode,
}

impl Pipeline {
    pub fn new(search: SearchAgent, planning: PlanningAgent, registry: Arc<dyn TaskStore>) -> Self {
        Self {
            search,
            planning,
            routing: None,
            registry,
            default_mode: TravelMode::Transit,
        }
    }

    /// Verify the planned course with the directions provider
    pub fn with_routing(mut self, routing: RoutingAgent) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Mode used when the transportation preference names none
    pub fn with_default_mode(mut self, mode: TravelMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Build the production pipeline from configuration
    pub fn from_config(config: &Config, registry: Arc<dyn TaskStore>) -> Result<Self> {
        debug!("Pipeline::from_config: called");
        let llm = create_client(&config.llm).context("Failed to create LLM client")?;
        let places = GooglePlacesClient::from_config(&config.maps).context("Failed to create places client")?;
        let web = TavilyClient::from_config(&config.search).context("Failed to create web search client")?;
        let maps = Arc::new(GoogleMapsClient::from_config(&config.maps).context("Failed to create maps client")?);
        let default_mode = config
            .maps
            .default_mode
            .parse::<TravelMode>()
            .context("Invalid maps default-mode")?;

        let prompts = Arc::new(PromptLoader::new(&config.planner.prompt_dir));
        let search = SearchAgent::new(Arc::new(places), config.search.clone()).with_web_search(Arc::new(web));
        let planning = PlanningAgent::new(llm, prompts, config.planner.clone(), config.llm.max_tokens)
            .with_weather(maps.clone());

        let mut pipeline = Self::new(search, planning, registry).with_default_mode(default_mode);
        if config.maps.verify_route {
            pipeline = pipeline.with_routing(RoutingAgent::new(maps));
        }
        Ok(pipeline)
    }

    /// Run every stage for one request
    pub async fn run(&self, input: PipelineInput) -> Result<Course, PipelineError> {
        info!(theme = %input.theme, location = %input.location, "Pipeline::run: called");

        let search_input = SearchInput {
            theme: input.theme.clone(),
            location: input.location.clone(),
        };
        let found = match self.search.run(search_input.clone()).await {
            Ok(places) => places,
            Err(e @ AgentError::InvalidInput { .. }) => return Err(e.into()),
            Err(e) => return Err(PipelineError::SearchFailure(e.to_string())),
        };
        if found.is_empty() {
            return Err(PipelineError::NoCandidates(search_input.query()));
        }

        let places = merge_saved_places(found, input.saved_places);
        let transportation = input.preferences.transportation.clone();
        let mut course = self
            .planning
            .run(PlanInput {
                places,
                preferences: input.preferences,
                time_constraints: input.time_constraints,
            })
            .await
            .map_err(PipelineError::Plan)?;

        if let Some(routing) = &self.routing {
            let mode = TravelMode::from_preference(&transportation, self.default_mode);
            self.verify_route(routing, &mut course, mode).await;
        }

        if !input.location.trim().is_empty() {
            course.location = Some(input.location);
        }

        info!(
            places = course.places.len(),
            routed = course.route.is_some(),
            "Pipeline::run: course ready"
        );
        Ok(course)
    }

    /// Attach a route when enough places can be located
    async fn verify_route(&self, routing: &RoutingAgent, course: &mut Course, mode: TravelMode) {
        let ordered: Vec<Place> = course.visit_order().into_iter().cloned().collect();
        let located = ordered.iter().filter(|p| p.coordinates.is_some()).count();
        if located < 2 {
            debug!(located, "Pipeline::verify_route: fewer than two located places, skipping");
            return;
        }

        match routing.run(RouteInput { places: ordered, mode }).await {
            Ok(route) => {
                info!(
                    mode = %route.mode,
                    total_duration_secs = route.total_duration_secs,
                    "Pipeline::verify_route: route verified"
                );
                course.route = Some(route);
            }
            Err(e) => warn!(error = %e, "Pipeline::verify_route: route verification failed, keeping course"),
        }
    }

    /// Create a pending task and run the pipeline for it in the background
    ///
    /// The returned id can be polled immediately. A panic inside the run is
    /// recorded as a failed task.
    pub async fn submit(self: &Arc<Self>, input: PipelineInput) -> Result<TaskId, PipelineError> {
        let id = TaskId::generate();
        debug!(%id, "Pipeline::submit: called");
        self.registry.create(id.clone(), TaskEntry::pending()).await?;

        let pipeline = Arc::clone(self);
        let task_id = id.clone();
        tokio::spawn(async move {
            let worker = {
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move { pipeline.run(input).await })
            };
            let outcome = match worker.await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("Pipeline worker crashed: {}", e)),
            };
            pipeline.record(&task_id, outcome).await;
        });

        info!(%id, "Pipeline::submit: task started");
        Ok(id)
    }

    async fn record(&self, id: &TaskId, outcome: Result<Course, String>) {
        let update: EntryUpdate = match outcome {
            Ok(course) => {
                info!(%id, "Pipeline::record: task succeeded");
                Box::new(move |entry| entry.succeed(course))
            }
            Err(message) => {
                error!(%id, error = %message, "Pipeline::record: task failed");
                Box::new(move |entry| entry.fail(message))
            }
        };
        if let Err(e) = self.registry.update(id, update).await {
            error!(%id, error = %e, "Pipeline::record: could not store task outcome");
        }
    }
}

/// Fold the user's saved places into the search candidates
///
/// A candidate with the same name is flagged as saved and keeps its search
/// data; other saved places are appended. Indices are reassigned.
pub fn merge_saved_places(mut places: Vec<Place>, saved: Vec<SavedPlace>) -> Vec<Place> {
    for saved_place in saved {
        if saved_place.name.trim().is_empty() {
            continue;
        }
        match places.iter_mut().find(|p| p.same_name(&saved_place.name)) {
            Some(existing) => {
                existing.is_saved_place = true;
                if existing.coordinates.is_none() {
                    existing.coordinates = saved_place.coordinates;
                }
            }
            None => places.push(saved_place.into_place()),
        }
    }
    assign_indices(&mut places);
    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlannerConfig, RegistryConfig, SearchConfig};
    use crate::domain::{Coordinates, UserPreferences};
    use crate::llm::client::mock::MockLlmClient;
    use crate::maps::{DirectionsProvider, MapsError, RouteSummary};
    use crate::registry::TaskRegistry;
    use crate::search::{SearchError, SearchProvider};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedPlaces(Result<Vec<Place>, u16>);

    #[async_trait]
    impl SearchProvider for FixedPlaces {
        async fn search_places(&self, _query: &str) -> Result<Vec<Place>, SearchError> {
            match &self.0 {
                Ok(places) => Ok(places.clone()),
                Err(status) => Err(SearchError::Http {
                    status: *status,
                    message: "down".to_string(),
                }),
            }
        }
    }

    struct FailingDirections;

    #[async_trait]
    impl DirectionsProvider for FailingDirections {
        async fn route(&self, places: &[Place], _mode: TravelMode) -> Result<RouteSummary, MapsError> {
            Err(MapsError::NoRoute {
                from: places[0].name.clone(),
                to: places[1].name.clone(),
            })
        }
    }

    fn candidates() -> Vec<Place> {
        vec![
            Place::new("Leeum Museum").with_rating(4.6, Some(2000)).with_coordinates(37.538, 126.999),
            Place::new("Namsan Tower").with_rating(4.5, Some(9000)).with_coordinates(37.551, 126.988),
        ]
    }

    fn pipeline(search: Result<Vec<Place>, u16>, llm: Arc<MockLlmClient>) -> Pipeline {
        let search = SearchAgent::new(Arc::new(FixedPlaces(search)), SearchConfig::default());
        let planning = PlanningAgent::new(
            llm,
            Arc::new(PromptLoader::embedded_only()),
            PlannerConfig::default(),
            1000,
        );
        let registry = TaskRegistry::spawn(&RegistryConfig::default());
        Pipeline::new(search, planning, Arc::new(registry))
    }

    fn input() -> PipelineInput {
        PipelineInput {
            theme: "art".to_string(),
            location: "Seoul".to_string(),
            preferences: UserPreferences::for_theme("art", "Seoul"),
            time_constraints: None,
            saved_places: vec![],
        }
    }

    #[test]
    fn test_merge_flags_matching_saved_place() {
        let saved = vec![
            SavedPlace {
                name: "leeum museum".to_string(),
                ..Default::default()
            },
            SavedPlace {
                name: "Hidden Bar".to_string(),
                coordinates: Some(Coordinates::new(37.5, 127.0)),
                ..Default::default()
            },
            SavedPlace::default(),
        ];
        let merged = merge_saved_places(candidates(), saved);

        assert_eq!(merged.len(), 3);
        assert!(merged[0].is_saved_place);
        assert_eq!(merged[0].rating, Some(4.6));
        assert!(!merged[1].is_saved_place);
        assert_eq!(merged[2].name, "Hidden Bar");
        assert!(merged[2].is_saved_place);
        assert_eq!(merged[2].index, 2);
    }

    #[tokio::test]
    async fn test_run_merges_location() {
        let llm = Arc::new(MockLlmClient::with_text(
            r#"{"selected_places":[0,1],"sequence":[1,0],"course_description":"Art walk"}"#,
        ));
        let course = pipeline(Ok(candidates()), llm).run(input()).await.unwrap();
        assert_eq!(course.location.as_deref(), Some("Seoul"));
        assert_eq!(course.sequence, vec![1, 0]);
        assert!(course.route.is_none());
    }

    #[tokio::test]
    async fn test_search_failure_stops_before_planning() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let err = pipeline(Err(503), llm.clone()).run(input()).await.unwrap_err();
        assert!(matches!(err, PipelineError::SearchFailure(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_candidates() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let err = pipeline(Ok(vec![]), llm).run(input()).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoCandidates(ref q) if q == "art Seoul"));
    }

    #[tokio::test]
    async fn test_route_failure_keeps_course() {
        let llm = Arc::new(MockLlmClient::with_text(r#"{"selected_places":[0,1]}"#));
        let pipeline = pipeline(Ok(candidates()), llm).with_routing(RoutingAgent::new(Arc::new(FailingDirections)));
        let course = pipeline.run(input()).await.unwrap();
        assert_eq!(course.places.len(), 2);
        assert!(course.route.is_none());
    }

    #[tokio::test]
    async fn test_submit_records_failure() {
        let llm = Arc::new(MockLlmClient::with_text("no json here"));
        let pipeline = Arc::new(pipeline(Ok(candidates()), llm));
        let id = pipeline.submit(input()).await.unwrap();

        let mut entry = pipeline.registry.get(&id).await.unwrap().unwrap();
        for _ in 0..200 {
            if entry.done {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            entry = pipeline.registry.get(&id).await.unwrap().unwrap();
        }
        assert!(entry.done);
        assert!(!entry.success);
        assert!(entry.error.unwrap().contains("Course planning failed"));
    }
}
