//! Planning agent: ask the LLM for a course and validate its answer

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{Agent, AgentError, Capability};
use crate::config::PlannerConfig;
use crate::domain::{Course, Place, TimeConstraints, UserPreferences, WeatherRecord};
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason};
use crate::maps::WeatherProvider;
use crate::planner::{PlanError, build_course, format_places_for_prompt, prepare_candidates, validate_plan_response};
use crate::prompts::{CoursePromptContext, PromptLoader};

/// Candidates plus the preferences that shape the course
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub places: Vec<Place>,
    pub preferences: UserPreferences,
    pub time_constraints: Option<TimeConstraints>,
}

/// Turns a candidate pool into a validated course
pub struct PlanningAgent {
    llm: Arc<dyn LlmClient>,
    weather: Option<Arc<dyn WeatherProvider>>,
    prompts: Arc<PromptLoader>,
    config: PlannerConfig,
    max_tokens: u32,
}

impl PlanningAgent {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, config: PlannerConfig, max_tokens: u32) -> Self {
        debug!(max_places = config.max_places, max_tokens, "PlanningAgent::new: called");
        Self {
            llm,
            weather: None,
            prompts,
            config,
            max_tokens,
        }
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Weather for the first candidate, looked up once for the whole course
    ///
    /// Failures only cost the weather hints.
    async fn lookup_weather(&self, places: &[Place], visit_date: &str) -> Option<WeatherRecord> {
        let provider = self.weather.as_ref()?;
        let date = visit_date.split_whitespace().next()?;
        let Some(coords) = places.first().and_then(|p| p.coordinates) else {
            debug!("PlanningAgent::lookup_weather: first place has no coordinates");
            return None;
        };

        match provider.weather(coords.lat, coords.lng, Some(date)).await {
            Ok(record) => {
                info!(temperature = ?record.temperature, condition = %record.condition, "PlanningAgent::lookup_weather: weather found");
                Some(record)
            }
            Err(e) => {
                warn!(error = %e, "PlanningAgent::lookup_weather: weather lookup failed, continuing without it");
                None
            }
        }
    }
}

#[async_trait]
impl Agent for PlanningAgent {
    type Input = PlanInput;
    type Output = Course;

    fn capability(&self) -> Capability {
        Capability::Plan
    }

    fn validate_input(&self, input: &PlanInput) -> Result<(), AgentError> {
        if input.places.is_empty() {
            return Err(AgentError::invalid(Capability::Plan, "no places to plan with"));
        }
        if input.preferences.theme.trim().is_empty() {
            return Err(AgentError::invalid(Capability::Plan, "theme is required"));
        }
        Ok(())
    }

    async fn execute(&self, input: PlanInput) -> Result<Course, AgentError> {
        debug!(place_count = input.places.len(), theme = %input.preferences.theme, "PlanningAgent::execute: called");
        let candidates = prepare_candidates(input.places, self.config.max_places);
        let weather = self.lookup_weather(&candidates, &input.preferences.visit_date).await;

        let context = CoursePromptContext::new(format_places_for_prompt(&candidates), &input.preferences)
            .with_time_constraints(input.time_constraints)
            .with_weather(weather.as_ref().map(WeatherRecord::summary));
        let system_prompt = self
            .prompts
            .course_prompt(&context)
            .map_err(|e| AgentError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(format!(
                "Design a \"{}\" course in {}. Reply with the JSON object only.",
                input.preferences.theme, input.preferences.location
            ))],
            max_tokens: self.max_tokens,
            temperature: None,
        };

        let response = self.llm.complete(request).await?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!("PlanningAgent::execute: planner response was cut off at the token limit");
        }
        let text = response.text_content().ok_or(PlanError::EmptyResponse)?;

        let validated = validate_plan_response(text, &candidates, self.config.fallback_count)?;
        let course = build_course(validated.plan, &candidates, weather.as_ref());
        info!(
            selected = course.places.len(),
            rung = ?validated.rung,
            "PlanningAgent::execute: course planned"
        );
        Ok(course)
    }
}
