//! CLI command definitions and course output

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::debug;

use crate::domain::{Course, TripRequest};

/// RoutePick - multi-agent travel itinerary planner
#[derive(Parser)]
#[command(name = "rp", about = "Plan a themed travel course with search, an LLM and maps", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to listen on, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Plan one course in the foreground and print it
    Plan(PlanArgs),
}

#[derive(Debug, clap::Args)]
pub struct PlanArgs {
    /// Theme of the trip, e.g. "rainy day date"
    #[arg(short, long)]
    pub theme: String,

    /// City or neighbourhood
    #[arg(short = 'L', long)]
    pub location: String,

    #[arg(long)]
    pub group_size: Option<String>,

    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<String>,

    /// Free text such as "afternoon"
    #[arg(long)]
    pub visit_time: Option<String>,

    /// How to get around; repeatable
    #[arg(long = "transport")]
    pub transport: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl PlanArgs {
    /// Shape the arguments like a request from the frontend
    pub fn to_trip_request(&self) -> TripRequest {
        TripRequest {
            theme: self.theme.clone(),
            location: self.location.clone(),
            group_size: self.group_size.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            visit_time: self.visit_time.clone(),
            transportation: self.transport.clone(),
            ..Default::default()
        }
    }
}

/// Output format for planned courses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the log file lives
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("routepick")
        .join("logs")
        .join("routepick.log")
}

/// Human-readable course listing
pub fn format_course(course: &Course) -> String {
    debug!(places = course.places.len(), "format_course: called");
    let mut out = String::new();
    let title = match &course.location {
        Some(location) => format!("Course in {}", location),
        None => "Course".to_string(),
    };
    out.push_str(&format!("{}\n", title.bold()));
    if !course.course_description.is_empty() {
        out.push_str(&format!("{}\n", course.course_description));
    }
    out.push('\n');

    for (step, place) in course.visit_order().into_iter().enumerate() {
        let mut line = format!("{:>2}. {}", step + 1, place.name.green().bold());
        if !place.category.is_empty() {
            line.push_str(&format!(" ({})", place.category.dimmed()));
        }
        if place.is_saved_place {
            line.push_str(&format!(" {}", "saved".yellow()));
        }
        if let Some(minutes) = course.duration_for(place.index) {
            line.push_str(&format!(" - {} min", minutes));
        }
        out.push_str(&line);
        out.push('\n');
        if let Some(weather) = course.weather_info.get(&place.index) {
            out.push_str(&format!("    {}\n", weather.label().cyan()));
        }
    }

    if let Some(route) = &course.route {
        out.push_str(&format!(
            "\n{} {} min, {:.1} km by {}\n",
            "Route:".bold(),
            route.total_duration_secs / 60,
            route.total_distance_m as f64 / 1000.0,
            route.mode
        ));
    }
    if let Some(reasoning) = &course.reasoning {
        out.push_str(&format!("\n{}\n", reasoning.dimmed()));
    }
    out
}
