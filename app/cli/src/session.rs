//! Search session state: what the front-end shows and how user events change it

use astra_search::navigation::{fragment_for_query, query_from_fragment};
use astra_search::{
    FilterUpdate, KeyValueStore, SearchEngine, SearchFilters, SearchHistory, SearchResult,
    SystemPromptStore, DEFAULT_SYSTEM_PROMPT,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Showing(SearchResult),
    Failed(String),
}

pub struct SearchSession {
    engine: Arc<SearchEngine>,
    history: SearchHistory<Arc<dyn KeyValueStore>>,
    prompts: SystemPromptStore<Arc<dyn KeyValueStore>>,
    filters: SearchFilters,
    system_prompt: String,
    current_query: Option<String>,
    fragment: String,
    history_items: Vec<String>,
    state: ViewState,
}

impl SearchSession {
    pub fn new(engine: Arc<SearchEngine>, store: Arc<dyn KeyValueStore>) -> Self {
        let history = SearchHistory::new(store.clone());
        let prompts = SystemPromptStore::new(store);
        let history_items = history.read();
        let system_prompt = prompts.read();

        Self {
            engine,
            history,
            prompts,
            filters: SearchFilters::default(),
            system_prompt,
            current_query: None,
            fragment: String::new(),
            history_items,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn current_query(&self) -> Option<&str> {
        self.current_query.as_deref()
    }

    /// Address fragment for the current query, without the leading `#`
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn history(&self) -> &[String] {
        &self.history_items
    }

    /// A query typed by the user. Blank input is ignored.
    pub async fn submit(&mut self, query: &str) -> &ViewState {
        let query = query.trim();
        if query.is_empty() {
            return &self.state;
        }

        self.fragment = fragment_for_query(query);
        self.start(query.to_string()).await
    }

    /// A navigation event carrying an address fragment.
    ///
    /// Re-opening the query already shown does nothing; a fragment without a
    /// query resets the view.
    pub async fn navigate(&mut self, fragment: &str) -> &ViewState {
        match query_from_fragment(fragment) {
            Some(query) if self.current_query.as_deref() == Some(query.as_str()) => &self.state,
            Some(query) => {
                self.fragment = fragment.trim_start_matches('#').to_string();
                self.start(query).await
            }
            None => {
                self.current_query = None;
                self.fragment.clear();
                self.state = ViewState::Idle;
                &self.state
            }
        }
    }

    pub async fn update_filters(&mut self, update: FilterUpdate) -> &ViewState {
        self.filters.apply(update);
        self.rerun().await
    }

    pub async fn set_system_prompt(&mut self, prompt: &str) -> &ViewState {
        self.prompts.update(prompt);
        self.system_prompt = prompt.to_string();
        self.rerun().await
    }

    pub async fn reset_system_prompt(&mut self) -> &ViewState {
        self.set_system_prompt(DEFAULT_SYSTEM_PROMPT).await
    }

    pub async fn refresh(&mut self) -> &ViewState {
        self.rerun().await
    }

    /// Submit the `index`-th suggestion of the result on screen.
    pub async fn use_suggestion(&mut self, index: usize) -> Option<&ViewState> {
        let suggestion = match &self.state {
            ViewState::Showing(result) => result.suggestions().get(index)?.clone(),
            _ => return None,
        };
        Some(self.submit(&suggestion).await)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_items.clear();
    }

    async fn start(&mut self, query: String) -> &ViewState {
        self.history_items = self.history.insert(&query);
        self.current_query = Some(query);
        self.run().await
    }

    async fn rerun(&mut self) -> &ViewState {
        if self.current_query.is_none() {
            return &self.state;
        }
        self.run().await
    }

    async fn run(&mut self) -> &ViewState {
        let Some(query) = self.current_query.clone() else {
            return &self.state;
        };

        let outcome = self
            .engine
            .search_latest(&query, &self.filters, &self.system_prompt)
            .await;

        match outcome {
            Ok(result) => self.state = ViewState::Showing(result),
            Err(e) if e.is_superseded() => {}
            Err(e) => self.state = ViewState::Failed(e.user_message()),
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astra_search::{
        Completion, CompletionError, CompletionProvider, CompletionRequest, DateRange,
        MemoryStore, ProviderInfo, SourceType, HISTORY_KEY, SYSTEM_PROMPT_KEY,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Pops canned replies in order; records every request
    #[derive(Default)]
    struct FakeProvider {
        replies: Mutex<Vec<Result<String, u16>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl FakeProvider {
        fn with_replies(replies: Vec<Result<&str, u16>>) -> Arc<Self> {
            let mut replies: Vec<Result<String, u16>> = replies
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().len()
        }

        fn last_request(&self) -> CompletionRequest {
            self.requests.lock().last().cloned().expect("no request recorded")
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<Completion, CompletionError> {
            self.requests.lock().push(request.clone());
            match self.replies.lock().pop() {
                Some(Ok(text)) => Ok(Completion {
                    text,
                    citations: Vec::new(),
                }),
                Some(Err(status)) => Err(CompletionError::Service {
                    status,
                    body: "backend unavailable".to_string(),
                }),
                None => Ok(Completion {
                    text: "default answer".to_string(),
                    citations: Vec::new(),
                }),
            }
        }

        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "Fake".into(),
                model: "fake".into(),
            }
        }
    }

    fn session(provider: Arc<FakeProvider>) -> (Arc<MemoryStore>, SearchSession) {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(SearchEngine::new(provider));
        let session = SearchSession::new(engine, store.clone());
        (store, session)
    }

    #[tokio::test]
    async fn test_submit_records_history_and_fragment() {
        let provider = FakeProvider::with_replies(vec![Ok("Paris.\nSuggestions:\n- paris")]);
        let (store, mut session) = session(provider.clone());

        let state = session.submit("  capital of France ").await.clone();
        match state {
            ViewState::Showing(result) => assert_eq!(result.text(), "Paris."),
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(session.current_query(), Some("capital of France"));
        assert_eq!(session.fragment(), "q=capital%20of%20France");
        assert_eq!(session.history(), &["capital of France".to_string()]);
        assert!(store.get(HISTORY_KEY).unwrap().is_some());
        assert_eq!(
            provider.last_request().system_instruction.as_deref(),
            Some(DEFAULT_SYSTEM_PROMPT)
        );
    }

    #[tokio::test]
    async fn test_blank_submit_is_ignored() {
        let provider = FakeProvider::with_replies(vec![]);
        let (_, mut session) = session(provider.clone());

        assert_eq!(session.submit("   ").await, &ViewState::Idle);
        assert_eq!(provider.request_count(), 0);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_shown_as_error_state() {
        let provider = FakeProvider::with_replies(vec![Err(503)]);
        let (_, mut session) = session(provider);

        match session.submit("anything").await {
            ViewState::Failed(message) => {
                assert!(message.starts_with("An error occurred"));
                assert!(message.contains("503"));
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_filter_change_reruns_current_query() {
        let provider = FakeProvider::with_replies(vec![Ok("first"), Ok("second")]);
        let (_, mut session) = session(provider.clone());

        session
            .update_filters(FilterUpdate {
                source_type: Some(SourceType::Academic),
                ..Default::default()
            })
            .await;
        assert_eq!(provider.request_count(), 0);

        session.submit("dark matter").await;
        let state = session
            .update_filters(FilterUpdate {
                date_range: Some(DateRange::Year),
                ..Default::default()
            })
            .await
            .clone();

        assert_eq!(provider.request_count(), 2);
        let prompt = provider.last_request().prompt;
        assert!(prompt.contains("from the past year"));
        assert!(prompt.contains("from academic sources"));
        assert!(matches!(state, ViewState::Showing(ref r) if r.text() == "second"));
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_navigation_skips_current_query() {
        let provider = FakeProvider::with_replies(vec![]);
        let (_, mut session) = session(provider.clone());

        session.navigate("#q=rust%20lifetimes").await;
        assert_eq!(session.current_query(), Some("rust lifetimes"));
        assert_eq!(provider.request_count(), 1);

        session.navigate("#q=rust%20lifetimes").await;
        assert_eq!(provider.request_count(), 1);

        session.navigate("#").await;
        assert_eq!(session.state(), &ViewState::Idle);
        assert_eq!(session.current_query(), None);
        assert_eq!(session.history(), &["rust lifetimes".to_string()]);

        session.navigate("#q=%E0%A4%A").await;
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_system_prompt_changes_persist_and_rerun() {
        let provider = FakeProvider::with_replies(vec![]);
        let (store, mut session) = session(provider.clone());

        session.set_system_prompt("Answer in French.").await;
        assert_eq!(provider.request_count(), 0);
        assert_eq!(
            store.get(SYSTEM_PROMPT_KEY).unwrap().as_deref(),
            Some("Answer in French.")
        );

        session.submit("weather").await;
        session.set_system_prompt("").await;
        assert_eq!(provider.request_count(), 2);
        assert_eq!(provider.last_request().system_instruction, None);

        session.reset_system_prompt().await;
        assert_eq!(store.get(SYSTEM_PROMPT_KEY).unwrap(), None);
        assert_eq!(session.system_prompt(), DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_use_suggestion_submits_it() {
        let provider = FakeProvider::with_replies(vec![
            Ok("Answer.\nSuggestions:\n- better query\n- other query"),
            Ok("Refined answer."),
        ]);
        let (_, mut session) = session(provider.clone());

        session.submit("bad qeury").await;
        assert!(session.use_suggestion(5).await.is_none());

        let state = session.use_suggestion(0).await.cloned();
        assert!(matches!(state, Some(ViewState::Showing(ref r)) if r.text() == "Refined answer."));
        assert_eq!(session.current_query(), Some("better query"));
        assert_eq!(
            session.history(),
            &["better query".to_string(), "bad qeury".to_string()]
        );
    }

    #[tokio::test]
    async fn test_clear_history() {
        let provider = FakeProvider::with_replies(vec![]);
        let (store, mut session) = session(provider);

        session.submit("one").await;
        session.clear_history();
        assert!(session.history().is_empty());
        assert_eq!(store.get(HISTORY_KEY).unwrap(), None);
    }
}
