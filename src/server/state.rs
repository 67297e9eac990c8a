use axum::extract::FromRef;

use crate::analysis::AnalysisPipeline;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedPipeline = Arc<AnalysisPipeline>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub pipeline: GuardedPipeline,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, pipeline: GuardedPipeline) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            pipeline,
            hash: env!("BUILD_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedPipeline {
    fn from_ref(input: &ServerState) -> Self {
        input.pipeline.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
