//! One-shot subcommands: search, open, history and prompt management

use anyhow::{bail, Result};
use astra_search::navigation::query_from_fragment;
use astra_search::{
    FilterUpdate, KeyValueStore, SearchHistory, SystemPromptStore, DEFAULT_SYSTEM_PROMPT,
};
use std::io::Write;
use std::sync::Arc;

use crate::render;
use crate::session::{SearchSession, ViewState};

#[derive(Debug, Clone, PartialEq)]
pub enum PromptCommand {
    Show,
    Set(String),
    Reset,
}

/// Run one search with the given filters and print the result.
pub async fn search(
    session: &mut SearchSession,
    query: &str,
    filters: FilterUpdate,
    out: &mut impl Write,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("query must not be empty");
    }

    // No query is active yet, so this only records the selection
    session.update_filters(filters).await;
    let state = session.submit(query).await;
    finish(state, out)
}

/// Resolve a `#q=...` fragment and search for it.
pub async fn open(session: &mut SearchSession, fragment: &str, out: &mut impl Write) -> Result<()> {
    if query_from_fragment(fragment).is_none() {
        bail!("'{}' does not name a query (expected #q=...)", fragment);
    }
    let state = session.navigate(fragment).await;
    finish(state, out)
}

fn finish(state: &ViewState, out: &mut impl Write) -> Result<()> {
    match state {
        ViewState::Failed(message) => bail!("{}", message),
        state => {
            render::render_state(out, state)?;
            Ok(())
        }
    }
}

pub fn history(store: Arc<dyn KeyValueStore>, clear: bool, out: &mut impl Write) -> Result<()> {
    let history = SearchHistory::new(store);
    if clear {
        history.clear();
        writeln!(out, "Search history cleared.")?;
        return Ok(());
    }
    render::render_history(out, &history.read())?;
    Ok(())
}

pub fn prompt(
    store: Arc<dyn KeyValueStore>,
    command: PromptCommand,
    out: &mut impl Write,
) -> Result<()> {
    let prompts = SystemPromptStore::new(store);
    match command {
        PromptCommand::Show => {}
        PromptCommand::Set(text) => prompts.update(&text),
        PromptCommand::Reset => prompts.clear(),
    }

    let current = prompts.read();
    if current == DEFAULT_SYSTEM_PROMPT {
        writeln!(out, "System prompt (default): {}", current)?;
    } else if current.is_empty() {
        writeln!(out, "System prompt: (none)")?;
    } else {
        writeln!(out, "System prompt: {}", current)?;
    }
    Ok(())
}
