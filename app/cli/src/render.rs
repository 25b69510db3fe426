//! Plain-text rendering of session state

use astra_search::{plot_expression, SearchFilters, SearchResult, WebSource};
use std::io::{self, Write};

use crate::session::ViewState;

pub fn render_state(out: &mut impl Write, state: &ViewState) -> io::Result<()> {
    match state {
        ViewState::Idle => Ok(()),
        ViewState::Showing(result) => render_result(out, result),
        ViewState::Failed(message) => writeln!(out, "{}", message),
    }
}

pub fn render_result(out: &mut impl Write, result: &SearchResult) -> io::Result<()> {
    match result {
        SearchResult::Text {
            text,
            sources,
            suggestions,
        } => {
            writeln!(out, "{}", text)?;

            if !sources.is_empty() {
                writeln!(out, "\nSources:")?;
                for (i, source) in sources.iter().enumerate() {
                    writeln!(out, "  [{}] {}", i + 1, source_label(source))?;
                }
            }

            if !suggestions.is_empty() {
                writeln!(out, "\nRelated searches:")?;
                for (i, suggestion) in suggestions.iter().enumerate() {
                    writeln!(out, "  ({}) {}", i + 1, suggestion)?;
                }
            }
            Ok(())
        }
        SearchResult::Graph { text, equations } => {
            writeln!(out, "{}", text)?;
            for equation in equations {
                let expression = plot_expression(equation);
                if expression == equation.as_str() {
                    writeln!(out, "  {}", equation)?;
                } else {
                    writeln!(out, "  {}  (plot: {})", equation, expression)?;
                }
            }
            Ok(())
        }
    }
}

pub fn render_history(out: &mut impl Write, history: &[String]) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(out, "No search history.");
    }
    for (i, query) in history.iter().enumerate() {
        writeln!(out, "{:>3}. {}", i + 1, query)?;
    }
    Ok(())
}

pub fn render_filters(out: &mut impl Write, filters: &SearchFilters) -> io::Result<()> {
    writeln!(
        out,
        "Filters: date={} sort={} source={}",
        filters.date_range, filters.sort_by, filters.source_type
    )
}

fn source_label(source: &WebSource) -> String {
    if source.title.is_empty() {
        source.uri.clone()
    } else {
        format!("{} - {}", source.title, source.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(state: &ViewState) -> String {
        let mut out = Vec::new();
        render_state(&mut out, state).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_text_result() {
        let state = ViewState::Showing(SearchResult::Text {
            text: "Paris is the capital.".into(),
            sources: vec![
                WebSource::new("https://a.example", "Encyclopedia"),
                WebSource::new("https://b.example", ""),
            ],
            suggestions: vec!["france overview".into()],
        });

        let text = rendered(&state);
        assert!(text.starts_with("Paris is the capital.\n"));
        assert!(text.contains("  [1] Encyclopedia - https://a.example\n"));
        assert!(text.contains("  [2] https://b.example\n"));
        assert!(text.contains("  (1) france overview\n"));
    }

    #[test]
    fn test_render_graph_result() {
        let state = ViewState::Showing(SearchResult::Graph {
            text: "Graph for: plot".into(),
            equations: vec!["y=x^2".into(), "sin(x)".into()],
        });

        let text = rendered(&state);
        assert!(text.contains("  y=x^2  (plot: x^2)\n"));
        assert!(text.contains("  sin(x)\n"));
    }

    #[test]
    fn test_render_idle_and_failure() {
        assert_eq!(rendered(&ViewState::Idle), "");
        assert_eq!(rendered(&ViewState::Failed("boom".into())), "boom\n");
    }

    #[test]
    fn test_render_history() {
        let mut out = Vec::new();
        render_history(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No search history.\n");

        let mut out = Vec::new();
        render_history(&mut out, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  1. a\n  2. b\n");
    }
}
