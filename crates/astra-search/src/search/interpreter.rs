//! Turns a raw completion into a display-ready [`SearchResult`]

use std::collections::HashSet;

use crate::llm::Completion;
use crate::types::{SearchResult, WebSource};

pub const GRAPH_MARKER: &str = "GRAPH::";
pub const SUGGESTIONS_MARKER: &str = "Suggestions:";

pub fn interpret(query: &str, completion: &Completion) -> SearchResult {
    if let Some(equations) = parse_graph_directive(&completion.text) {
        return SearchResult::Graph {
            text: format!("Graph for: {}", query),
            equations,
        };
    }

    let (text, suggestions) = split_suggestions(&completion.text);
    SearchResult::Text {
        text,
        sources: dedupe_sources(&completion.citations),
        suggestions,
    }
}

/// Equations of a `GRAPH::` reply, or `None` when the reply is prose.
pub fn parse_graph_directive(raw: &str) -> Option<Vec<String>> {
    let rest = raw.strip_prefix(GRAPH_MARKER)?;
    Some(
        rest.split(',')
            .map(str::trim)
            .filter(|eq| !eq.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Split a trailing suggestions block off the answer.
///
/// Only the last marker counts, and it is ignored when nothing precedes it; in
/// that case the whole reply is the answer.
pub fn split_suggestions(raw: &str) -> (String, Vec<String>) {
    let Some(index) = raw.rfind(SUGGESTIONS_MARKER) else {
        return (raw.to_string(), Vec::new());
    };

    let answer = raw[..index].trim();
    if answer.is_empty() {
        return (raw.to_string(), Vec::new());
    }

    let suggestions = raw[index + SUGGESTIONS_MARKER.len()..]
        .trim()
        .lines()
        .map(str::trim)
        .map(|line| line.strip_prefix("- ").map(str::trim).unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    (answer.to_string(), suggestions)
}

/// Drop sources without a URI and keep the first entry for each URI.
pub fn dedupe_sources(citations: &[WebSource]) -> Vec<WebSource> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for source in citations {
        if source.uri.is_empty() || !seen.insert(source.uri.as_str()) {
            continue;
        }
        sources.push(source.clone());
    }
    sources
}
