pub mod config;
pub mod history;
pub mod llm;
pub mod navigation;
pub mod search;
pub mod storage;
pub mod system_prompt;
pub mod types;

// Re-export primary types for convenience
pub use config::{AstraConfig, CompletionConfig};
pub use history::{SearchHistory, HISTORY_KEY, MAX_HISTORY_ITEMS};
pub use llm::{
    Completion, CompletionError, CompletionProvider, CompletionRequest, GeminiProvider,
    GenerationConfig, ProviderInfo,
};
pub use search::{RequestToken, RequestTracker, SearchEngine, SearchError, SearchRequest};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use system_prompt::{SystemPromptStore, DEFAULT_SYSTEM_PROMPT, SYSTEM_PROMPT_KEY};
pub use types::{
    plot_expression, DateRange, FilterUpdate, ParseFilterError, SearchFilters, SearchResult,
    SortBy, SourceType, WebSource,
};

// Re-export common types
pub use anyhow::{Error, Result};
