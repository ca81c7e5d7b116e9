use std::sync::Arc;

use crate::application::{ChatService, RagService};
use crate::domain::IndexReport;
use crate::infrastructure::{AppConfig, Pipeline};

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub rag: Arc<RagService>,
    pub report: Arc<IndexReport>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pipeline: &Pipeline) -> Self {
        Self {
            chat: pipeline.chat.clone(),
            rag: pipeline.rag.clone(),
            report: pipeline.report.clone(),
            config: pipeline.config.clone(),
        }
    }
}

impl From<Pipeline> for AppState {
    fn from(pipeline: Pipeline) -> Self {
        Self::new(&pipeline)
    }
}
