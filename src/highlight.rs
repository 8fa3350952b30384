use std::collections::HashSet;

use ratatui::style::Style;
use ratatui::text::Span;
use regex::{Regex, RegexBuilder};

use crate::filter::FilterState;

/// Case-insensitive alternation of the search terms, longest first so
/// overlapping terms mark the wider match.
pub fn build_highlight_regex(terms: &[String]) -> Option<Regex> {
    let mut seen = HashSet::new();
    let mut unique: Vec<&str> = terms
        .iter()
        .map(|term| term.trim())
        .filter(|term| !term.is_empty() && seen.insert(term.to_lowercase()))
        .collect();
    if unique.is_empty() {
        return None;
    }
    unique.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = unique
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

pub fn filter_regex(filter: &FilterState) -> Option<Regex> {
    build_highlight_regex(&filter.query_terms())
}

/// Splits `text` into spans, styling every match of `regex` with `hit`.
pub fn highlight_spans(text: &str, regex: Option<&Regex>, hit: Style, base: Style) -> Vec<Span<'static>> {
    let Some(re) = regex else {
        return vec![Span::styled(text.to_string(), base)];
    };
    let mut spans = Vec::new();
    let mut last = 0;
    for mat in re.find_iter(text) {
        if mat.start() > last {
            spans.push(Span::styled(text[last..mat.start()].to_string(), base));
        }
        spans.push(Span::styled(mat.as_str().to_string(), hit));
        last = mat.end();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::styled(text[last..].to_string(), base));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn texts(spans: &[Span<'static>]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn longer_terms_win_and_duplicates_collapse() {
        let regex =
            build_highlight_regex(&["love".into(), "lovely".into(), "LOVE".into()]).expect("regex");
        let found: Vec<_> = regex.find_iter("Lovely love").map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["Lovely", "love"]);
    }

    #[test]
    fn empty_query_has_no_regex() {
        assert!(filter_regex(&FilterState::default()).is_none());
        let filter = FilterState {
            query: "   ".into(),
            ..FilterState::default()
        };
        assert!(filter_regex(&filter).is_none());
    }

    #[test]
    fn spans_mark_matches_and_keep_the_rest() {
        let filter = FilterState {
            query: "rain".into(),
            ..FilterState::default()
        };
        let regex = filter_regex(&filter);
        let hit = Style::default().add_modifier(Modifier::BOLD);
        let spans = highlight_spans("Rain on the rainy roof", regex.as_ref(), hit, Style::default());
        assert_eq!(texts(&spans), vec!["Rain", " on the ", "rain", "y roof"]);
        assert_eq!(spans[0].style, hit);
        assert_eq!(spans[1].style, Style::default());
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let regex = build_highlight_regex(&["(x)".into()]).expect("regex");
        assert!(regex.is_match("kiss (x)"));
        assert!(!regex.is_match("x"));
    }
}
