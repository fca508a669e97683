//! Orchestrates one extraction: prompt → LLM → parse.

use std::sync::Arc;

use serde_json::Value;

use super::llm::{LlmClient, LlmError};
use super::parser::parse_fragment;
use super::prompt::build_extraction_prompt;
use crate::config;

/// Runs the document-to-fragment pipeline against a configured LLM.
/// No retry: one call, one parse attempt, then the result stands.
pub struct RegimenExtractor {
    llm: Arc<dyn LlmClient + Send + Sync>,
}

impl RegimenExtractor {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self { llm }
    }

    /// Extract a regimen fragment from document text.
    ///
    /// `Err` is a failed LLM call; `Ok(None)` is a completion with no
    /// parseable JSON object in it. Either way the caller surfaces a
    /// notice and the session state stays as it was. The completion text
    /// itself is discarded unlogged.
    pub fn extract(&self, document_text: &str) -> Result<Option<Value>, LlmError> {
        let prompt = build_extraction_prompt(document_text);

        tracing::info!(
            document_chars = document_text.len(),
            "requesting regimen extraction"
        );
        let response = self.llm.complete(&prompt, config::EXTRACTION_MAX_TOKENS)?;

        let fragment = parse_fragment(&response);
        match &fragment {
            Some(_) => tracing::info!("extraction response parsed"),
            None => tracing::warn!(
                response_chars = response.len(),
                "extraction response held no JSON object"
            ),
        }
        Ok(fragment)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
