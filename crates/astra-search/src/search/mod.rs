//! Search pipeline: format the prompt, call the completion service once,
//! interpret the reply.

pub mod interpreter;
pub mod prompt;

pub use interpreter::{dedupe_sources, interpret, parse_graph_directive, split_suggestions};
pub use prompt::{filter_clauses, format_search_prompt};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::llm::{CompletionError, CompletionProvider, CompletionRequest};
use crate::types::{SearchFilters, SearchResult};

/// A validated search: non-empty query, filter selection and system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub system_prompt: String,
}

impl SearchRequest {
    pub fn new(
        query: &str,
        filters: SearchFilters,
        system_prompt: &str,
    ) -> Result<Self, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self {
            query: query.to_string(),
            filters,
            system_prompt: system_prompt.to_string(),
        })
    }

    /// Web search is always requested; an empty system prompt is not sent.
    pub fn completion_request(&self) -> CompletionRequest {
        CompletionRequest {
            prompt: format_search_prompt(&self.query, &self.filters),
            system_instruction: (!self.system_prompt.is_empty())
                .then(|| self.system_prompt.clone()),
            web_search: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// A newer search was issued before this one finished
    #[error("superseded by a newer search")]
    Superseded,
}

impl SearchError {
    /// Text shown to the user in place of a result
    pub fn user_message(&self) -> String {
        format!(
            "An error occurred while searching. Please check the logs for details. Error: {}",
            self
        )
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out increasing tokens so late replies can be recognised and dropped.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

impl RequestTracker {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

pub struct SearchEngine {
    provider: Arc<dyn CompletionProvider>,
    tracker: RequestTracker,
}

impl SearchEngine {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            tracker: RequestTracker::default(),
        }
    }

    pub fn provider(&self) -> &dyn CompletionProvider {
        self.provider.as_ref()
    }

    /// Run one search. Service failures come back as [`SearchError::Completion`].
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        system_prompt: &str,
    ) -> Result<SearchResult, SearchError> {
        let request = SearchRequest::new(query, *filters, system_prompt)?;
        self.execute(&request).await
    }

    /// Like [`search`](Self::search), but a reply that arrives after a newer
    /// search was started is discarded with [`SearchError::Superseded`].
    /// A rejected query does not count as a newer search.
    pub async fn search_latest(
        &self,
        query: &str,
        filters: &SearchFilters,
        system_prompt: &str,
    ) -> Result<SearchResult, SearchError> {
        let request = SearchRequest::new(query, *filters, system_prompt)?;
        let token = self.tracker.issue();
        let outcome = self.execute(&request).await;

        if !self.tracker.is_latest(token) {
            tracing::debug!(query = %request.query, "Discarding stale search response");
            return Err(SearchError::Superseded);
        }
        outcome
    }

    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        let completion_request = request.completion_request();

        tracing::info!(
            query = %request.query,
            date_range = %request.filters.date_range,
            sort_by = %request.filters.sort_by,
            source_type = %request.filters.source_type,
            "Searching"
        );

        let completion = self
            .provider
            .complete(&completion_request)
            .await
            .map_err(|e| {
                tracing::error!(query = %request.query, error = %e, "Completion request failed");
                SearchError::Completion(e)
            })?;

        let result = interpret(&request.query, &completion);
        let kind = match &result {
            SearchResult::Text { .. } => "text",
            SearchResult::Graph { .. } => "graph",
        };
        tracing::info!(
            kind,
            sources = result.sources().len(),
            suggestions = result.suggestions().len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Search completed"
        );

        Ok(result)
    }
}
