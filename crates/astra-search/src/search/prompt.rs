//! Prompt formatting for search queries
//!
//! The completion service is steered with a fixed instruction block: plotting
//! requests must come back as a single `GRAPH::` line, everything else as text
//! with LaTeX math, optionally closed by a `Suggestions:` block.

use crate::types::{DateRange, SearchFilters, SortBy, SourceType};

const SPECIAL_INSTRUCTIONS: &str = r#"SPECIAL INSTRUCTIONS:
1. If the query is a request to plot one or more mathematical functions or graphs (e.g., "graph y = x^2", "plot sin(x) and cos(x)"), your ENTIRE response MUST be in the following format and nothing else:
GRAPH::y=x^2,y=sin(x)
(Replace the equations with the exact mathematical expressions from the query, separated by commas).
2. For all other queries, provide a helpful text-based answer. Use LaTeX for mathematical formulas using $$ for display math and $ for inline math.
3. If you think a regular text query is misspelled or could be improved, please provide a few alternative search queries at the end of your answer. Format the suggestions like this:
Suggestions:
- suggestion 1
- suggestion 2"#;

/// Natural-language clauses for every non-default filter, in date, sort, source order.
pub fn filter_clauses(filters: &SearchFilters) -> Vec<String> {
    let mut clauses = Vec::new();

    if filters.date_range != DateRange::All {
        clauses.push(format!("from the past {}", filters.date_range));
    }
    if filters.sort_by == SortBy::Date {
        clauses.push("sorted by most recent date".to_string());
    }
    if filters.source_type != SourceType::All {
        clauses.push(format!("from {} sources", filters.source_type));
    }

    clauses
}

/// Build the prompt sent to the completion service for `query`.
pub fn format_search_prompt(query: &str, filters: &SearchFilters) -> String {
    let clauses = filter_clauses(filters);
    let filter_instructions = if clauses.is_empty() {
        String::new()
    } else {
        format!(" Apply the following search filters: {}.", clauses.join(", "))
    };

    format!(
        "Answer the following query: \"{}\".{}\n\n{}",
        query, filter_instructions, SPECIAL_INSTRUCTIONS
    )
}
