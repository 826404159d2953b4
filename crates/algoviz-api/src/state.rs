//! Application state.

use std::sync::Arc;

use algoviz_llm::{ApproachAnalyzer, GeminiClient, TextGenerator};
use algoviz_pipeline::{PipelineConfig, PublishedStore, RenderCoordinator, RenderStages};
use tracing::{info, warn};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<PipelineConfig>,
    pub analyzer: ApproachAnalyzer,
    pub coordinator: RenderCoordinator,
    pub store: PublishedStore,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_env()?);
        let pipeline = PipelineConfig::from_env();

        for tool in [&pipeline.python, &pipeline.manim, &pipeline.ffmpeg] {
            match tool.check() {
                Ok(path) => info!(tool = %tool, path = %path.display(), "Found external tool"),
                Err(e) => warn!(error = %e, "External tool missing; renders will fail"),
            }
        }

        let stages = RenderStages::from_config(&pipeline);
        Self::from_parts(config, generator, stages, pipeline).await
    }

    /// Assemble state from explicit parts and create the storage roots.
    pub async fn from_parts(
        config: ApiConfig,
        generator: Arc<dyn TextGenerator>,
        stages: RenderStages,
        pipeline: PipelineConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let layout = pipeline.layout();
        layout.ensure_roots().await?;
        info!(data_dir = %pipeline.data_dir.display(), "Storage roots ready");

        let store = PublishedStore::new(layout.videos_root());
        let coordinator = RenderCoordinator::new(Arc::clone(&generator), stages, layout);

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            analyzer: ApproachAnalyzer::new(generator),
            coordinator,
            store,
        })
    }
}
