use std::sync::Arc;

use crate::config::Config;
use crate::db::RecordSink;
use crate::pipeline::PrescriptionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: PrescriptionPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: PrescriptionPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
        }
    }

    /// Record store, when persistence is enabled.
    pub fn records(&self) -> Option<&Arc<dyn RecordSink>> {
        self.pipeline.sink()
    }
}
