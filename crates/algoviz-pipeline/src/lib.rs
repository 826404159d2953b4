//! Render pipeline for narrated algorithm videos.
//!
//! [`RenderCoordinator`] turns one [`algoviz_models::Approach`] into one
//! published video: narration, animation script, speech, render, mux. Every
//! exit path removes the job's transient files.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod job;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod store;

pub use config::PipelineConfig;
pub use coordinator::{RenderCoordinator, RenderOutcome, RenderStages};
pub use error::{PipelineError, PipelineResult};
pub use job::RenderJob;
pub use layout::StorageLayout;
pub use logging::JobLogger;
pub use store::PublishedStore;
