//! Persisted system prompt (the instruction text sent with every search)
//!
//! Key absence means "use [`DEFAULT_SYSTEM_PROMPT`]". A stored empty string is
//! kept as-is and means "send no system instruction".

use crate::storage::KeyValueStore;

pub const SYSTEM_PROMPT_KEY: &str = "astra-system-prompt";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are Astra, a large language model trained by NarsAI-Labs.";

pub struct SystemPromptStore<S> {
    store: S,
}

impl<S: KeyValueStore> SystemPromptStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn read(&self) -> String {
        match self.store.get(SYSTEM_PROMPT_KEY) {
            Ok(Some(prompt)) => prompt,
            Ok(None) => DEFAULT_SYSTEM_PROMPT.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read system prompt, using default");
                DEFAULT_SYSTEM_PROMPT.to_string()
            }
        }
    }

    pub fn write(&self, prompt: &str) {
        if let Err(e) = self.store.set(SYSTEM_PROMPT_KEY, prompt) {
            tracing::warn!(error = %e, "Could not save system prompt");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.delete(SYSTEM_PROMPT_KEY) {
            tracing::warn!(error = %e, "Could not clear system prompt");
        }
    }

    /// Store a user edit. Choosing the default text clears the override so later
    /// reads keep following the built-in default.
    pub fn update(&self, prompt: &str) {
        if prompt == DEFAULT_SYSTEM_PROMPT {
            self.clear();
        } else {
            self.write(prompt);
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self.store.get(SYSTEM_PROMPT_KEY), Ok(None))
    }
}
