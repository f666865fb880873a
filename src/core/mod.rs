pub mod collector;
pub mod engine;
pub mod pipeline;
pub mod prompt;
pub mod publisher;
pub mod renderer;
pub mod summarizer;

pub use crate::domain::model::{AggregatedReport, Briefing, FeedEntry, FeedSource, RunOutcome};
pub use crate::domain::ports::{Clock, Pipeline, Storage};
pub use crate::utils::error::Result;
