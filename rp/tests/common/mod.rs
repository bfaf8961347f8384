//! Fakes for the external providers

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use routepick::agents::{PlanningAgent, RoutingAgent, SearchAgent};
use routepick::config::{PlannerConfig, RegistryConfig, SearchConfig};
use routepick::domain::{Place, TaskEntry, TaskId, WeatherRecord};
use routepick::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use routepick::maps::{DirectionsProvider, MapsError, RouteLeg, RouteSummary, TravelMode, WeatherProvider};
use routepick::pipeline::Pipeline;
use routepick::prompts::PromptLoader;
use routepick::registry::{TaskRegistry, TaskStore};
use routepick::search::{SearchError, SearchProvider};

/// LLM answering every request with the same text
pub struct ScriptedLlm {
    text: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn answering(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        match &self.text {
            Some(text) => Ok(CompletionResponse::text(text.clone())),
            None => Err(LlmError::ApiError {
                status: 503,
                message: "overloaded".to_string(),
            }),
        }
    }
}

/// Place search returning a fixed list
pub struct FixedPlaces(pub Vec<Place>);

#[async_trait]
impl SearchProvider for FixedPlaces {
    async fn search_places(&self, _query: &str) -> Result<Vec<Place>, SearchError> {
        Ok(self.0.clone())
    }
}

/// Directions where every leg is fifteen minutes and two kilometres
pub struct StraightLines;

#[async_trait]
impl DirectionsProvider for StraightLines {
    async fn route(&self, places: &[Place], mode: TravelMode) -> Result<RouteSummary, MapsError> {
        let legs = places
            .windows(2)
            .map(|pair| RouteLeg {
                from: pair[0].name.clone(),
                to: pair[1].name.clone(),
                duration_secs: 900,
                distance_m: 2000,
            })
            .collect();
        Ok(RouteSummary::from_legs(mode, places.iter().map(|p| p.index).collect(), legs))
    }
}

/// Always sunny
pub struct Sunny;

#[async_trait]
impl WeatherProvider for Sunny {
    async fn weather(&self, _lat: f64, _lng: f64, date: Option<&str>) -> Result<WeatherRecord, MapsError> {
        Ok(WeatherRecord {
            temperature: Some(21.5),
            condition: "Clear".to_string(),
            date: date.map(str::to_string),
        })
    }
}

/// Candidates around Seongsu, all rated and located
pub fn seongsu_places() -> Vec<Place> {
    vec![
        Place::new("Seoul Forest")
            .with_category("park")
            .with_rating(4.6, Some(12000))
            .with_coordinates(37.5444, 127.0374),
        Place::new("Daelim Changgo")
            .with_category("cafe")
            .with_rating(4.4, Some(3100))
            .with_coordinates(37.5417, 127.0565),
        Place::new("Under Stand Avenue")
            .with_category("gallery")
            .with_rating(4.2, Some(800))
            .with_coordinates(37.5438, 127.0441),
    ]
}

/// Pipeline over fakes, sharing one registry with the caller
pub fn pipeline(places: Vec<Place>, llm: Arc<ScriptedLlm>) -> (Arc<Pipeline>, TaskRegistry) {
    let registry = TaskRegistry::spawn(&RegistryConfig::default());
    let search = SearchAgent::new(Arc::new(FixedPlaces(places)), SearchConfig::default());
    let planning = PlanningAgent::new(
        llm,
        Arc::new(PromptLoader::embedded_only()),
        PlannerConfig::default(),
        1500,
    )
    .with_weather(Arc::new(Sunny));
    let pipeline = Pipeline::new(search, planning, Arc::new(registry.clone()))
        .with_routing(RoutingAgent::new(Arc::new(StraightLines)));
    (Arc::new(pipeline), registry)
}

/// Poll until the task is done
pub async fn wait_for_done(registry: &TaskRegistry, id: &TaskId) -> TaskEntry {
    for _ in 0..400 {
        if let Some(entry) = registry.get(id).await.unwrap() {
            if entry.done {
                return entry;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("task {} never finished", id);
}
