use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a filter value is not one of the accepted words.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} '{value}' (expected one of: {expected})")]
pub struct ParseFilterError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Day,
    Week,
    Month,
    Year,
}

impl DateRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for DateRange {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ParseFilterError {
                field: "date range",
                value: s.to_string(),
                expected: "all, day, week, month, year",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Relevance,
    Date,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Date => "date",
        }
    }
}

impl FromStr for SortBy {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "date" => Ok(Self::Date),
            _ => Err(ParseFilterError {
                field: "sort order",
                value: s.to_string(),
                expected: "relevance, date",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    All,
    News,
    Academic,
    Blogs,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::News => "news",
            Self::Academic => "academic",
            Self::Blogs => "blogs",
        }
    }
}

impl FromStr for SourceType {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "news" => Ok(Self::News),
            "academic" => Ok(Self::Academic),
            "blogs" => Ok(Self::Blogs),
            _ => Err(ParseFilterError {
                field: "source type",
                value: s.to_string(),
                expected: "all, news, academic, blogs",
            }),
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(DateRange, SortBy, SourceType);

/// Active filter selection. Lives for the session only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub date_range: DateRange,
    pub sort_by: SortBy,
    pub source_type: SourceType,
}

impl SearchFilters {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Merge a partial update, leaving unspecified fields as they are.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(date_range) = update.date_range {
            self.date_range = date_range;
        }
        if let Some(sort_by) = update.sort_by {
            self.sort_by = sort_by;
        }
        if let Some(source_type) = update.source_type {
            self.source_type = source_type;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub date_range: Option<DateRange>,
    pub sort_by: Option<SortBy>,
    pub source_type: Option<SourceType>,
}

impl FilterUpdate {
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.sort_by.is_none() && self.source_type.is_none()
    }
}

/// A web reference reported as grounding for an answer. Identity is the URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WebSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

impl WebSource {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Display-ready outcome of one search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchResult {
    /// Prose answer with its grounding sources and optional alternative queries
    Text {
        text: String,
        sources: Vec<WebSource>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        suggestions: Vec<String>,
    },

    /// Raw expressions to hand to a plotter
    Graph {
        text: String,
        equations: Vec<String>,
    },
}

impl SearchResult {
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } | Self::Graph { text, .. } => text,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::Text { suggestions, .. } => suggestions,
            Self::Graph { .. } => &[],
        }
    }

    pub fn sources(&self) -> &[WebSource] {
        match self {
            Self::Text { sources, .. } => sources,
            Self::Graph { .. } => &[],
        }
    }
}

/// Expression a plotter should evaluate for `equation`.
///
/// Accepts both `x^2` and `y = x^2`; for the latter the right-hand side is used.
pub fn plot_expression(equation: &str) -> &str {
    match equation.split_once('=') {
        Some((_, rhs)) => rhs.trim(),
        None => equation.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters() {
        let filters = SearchFilters::default();
        assert_eq!(filters.date_range, DateRange::All);
        assert_eq!(filters.sort_by, SortBy::Relevance);
        assert_eq!(filters.source_type, SourceType::All);
        assert!(filters.is_default());
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("Week".parse::<DateRange>().unwrap(), DateRange::Week);
        assert_eq!("date".parse::<SortBy>().unwrap(), SortBy::Date);
        assert_eq!(" academic ".parse::<SourceType>().unwrap(), SourceType::Academic);

        let err = "fortnight".parse::<DateRange>().unwrap_err();
        assert_eq!(err.field, "date range");
        assert!(err.to_string().contains("fortnight"));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut filters = SearchFilters::default();
        filters.apply(FilterUpdate {
            sort_by: Some(SortBy::Date),
            ..Default::default()
        });
        assert_eq!(filters.sort_by, SortBy::Date);
        assert_eq!(filters.date_range, DateRange::All);
        assert!(!filters.is_default());

        filters.apply(FilterUpdate::default());
        assert_eq!(filters.sort_by, SortBy::Date);
    }

    #[test]
    fn test_result_serializes_with_type_tag() {
        let result = SearchResult::Graph {
            text: "Graph for: plot x".to_string(),
            equations: vec!["x".to_string()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "graph");
        assert_eq!(json["equations"][0], "x");

        let filters = serde_json::to_value(SearchFilters::default()).unwrap();
        assert_eq!(filters["dateRange"], "all");
        assert_eq!(filters["sourceType"], "all");
    }

    #[test]
    fn test_plot_expression() {
        assert_eq!(plot_expression("y = x^2"), "x^2");
        assert_eq!(plot_expression(" sin(x) "), "sin(x)");
        assert_eq!(plot_expression("y=cos(x)"), "cos(x)");
    }
}
