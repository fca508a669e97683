//! Shared types for the API layer.

use std::sync::Arc;

use crate::pipeline::{LlmClient, PdfExtractor, PdfTextExtractor, RegimenExtractor};
use crate::session::SessionRegistry;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// Holds the session table plus the document pipeline. The extractor and
/// the chat path share one LLM client, so both talk to the same endpoint
/// with the same credential.
#[derive(Clone)]
pub struct ApiContext {
    pub registry: Arc<SessionRegistry>,
    pub pdf: Arc<dyn PdfExtractor + Send + Sync>,
    pub extractor: Arc<RegimenExtractor>,
    pub llm: Arc<dyn LlmClient + Send + Sync>,
}

impl ApiContext {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            pdf: Arc::new(PdfTextExtractor),
            extractor: Arc::new(RegimenExtractor::new(llm.clone())),
            llm,
        }
    }
}
