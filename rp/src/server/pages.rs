//! HTML page for a finished course

use eyre::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Course, TaskId, WeatherRecord};

const CHAT_MAP: &str = include_str!("../../templates/chat_map.hbs");

/// One stop in visit order
#[derive(Debug, Serialize)]
struct Stop {
    name: String,
    category: String,
    address: String,
    duration: Option<u32>,
    weather: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatMapContext<'a> {
    task_id: &'a str,
    location: Option<&'a str>,
    course_description: &'a str,
    route_summary: Option<String>,
    stops: Vec<Stop>,
    course_json: String,
    maps_api_key: &'a str,
}

/// Serialize for embedding inside a `<script>` element
fn script_json(course: &Course) -> Result<String> {
    let json = serde_json::to_string(course).context("Failed to serialize course")?;
    Ok(json.replace('<', "\\u003c").replace('>', "\\u003e").replace('&', "\\u0026"))
}

/// Renders the map and chat page
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string("chat_map", CHAT_MAP)
            .context("Failed to register chat_map template")?;
        Ok(Self { handlebars })
    }

    pub fn chat_map(&self, id: &TaskId, course: &Course, maps_api_key: &str) -> Result<String> {
        debug!(%id, places = course.places.len(), "PageRenderer::chat_map: called");
        let stops = course
            .visit_order()
            .into_iter()
            .map(|place| Stop {
                name: place.name.clone(),
                category: place.category.clone(),
                address: place.address.clone(),
                duration: course.duration_for(place.index),
                weather: course.weather_info.get(&place.index).map(WeatherRecord::label),
            })
            .collect();
        let route_summary = course.route.as_ref().map(|r| {
            format!(
                "{} legs by {}, {} min, {:.1} km",
                r.legs.len(),
                r.mode,
                r.total_duration_secs / 60,
                r.total_distance_m as f64 / 1000.0
            )
        });

        let context = ChatMapContext {
            task_id: id.as_str(),
            location: course.location.as_deref(),
            course_description: &course.course_description,
            route_summary,
            stops,
            course_json: script_json(course)?,
            maps_api_key,
        };
        self.handlebars
            .render("chat_map", &context)
            .context("Failed to render chat_map page")
    }
}
