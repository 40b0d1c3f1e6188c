use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;

use super::orchestrator::AnalysisOrchestrator;
use super::types::{AnalysisResult, AnalyzeOptions};
use crate::error::AppError;

/// One unit of work for the analysis service.
#[derive(Clone)]
pub struct AnalysisRequest {
    pub image: Arc<Vec<u8>>,
    pub prompt: String,
    pub options: AnalyzeOptions,
}

/// Tower wrapper so callers drive analyses with readiness semantics and can
/// stack the usual middleware (timeouts, concurrency limits) on top.
#[derive(Clone)]
pub struct AnalysisService {
    orchestrator: Arc<AnalysisOrchestrator>,
}

impl AnalysisService {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

impl Service<AnalysisRequest> for AnalysisService {
    type Response = AnalysisResult;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AnalysisRequest) -> Self::Future {
        let orchestrator = Arc::clone(&self.orchestrator);
        Box::pin(async move {
            orchestrator
                .analyze(&request.image, &request.prompt, request.options)
                .await
        })
    }
}
