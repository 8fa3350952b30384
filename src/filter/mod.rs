use indexmap::IndexSet;

use crate::content::Letter;

/// Desk filters. An empty string means "no constraint" on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub theme: String,
    pub occasion: String,
    pub query: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.theme.is_empty() && self.occasion.is_empty() && self.query.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.theme.clear();
        self.occasion.clear();
        self.query.clear();
    }

    pub fn matches(&self, letter: &Letter) -> bool {
        tag_matches(&self.theme, letter.theme.as_deref())
            && tag_matches(&self.occasion, letter.occasion.as_deref())
            && self.query_matches(letter)
    }

    /// Whitespace separated search terms, lowercased.
    pub fn query_terms(&self) -> Vec<String> {
        self.query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    pub fn chips(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if !self.theme.is_empty() {
            chips.push(format!("theme:{}", self.theme));
        }
        if !self.occasion.is_empty() {
            chips.push(format!("occasion:{}", self.occasion));
        }
        if !self.query.trim().is_empty() {
            chips.push(format!("search:{}", self.query.trim()));
        }
        chips
    }

    fn query_matches(&self, letter: &Letter) -> bool {
        let terms = self.query_terms();
        if terms.is_empty() {
            return true;
        }
        let haystack = format!(
            "{}\n{}\n{}",
            letter.title,
            letter.preview.as_deref().unwrap_or_default(),
            letter.source
        )
        .to_lowercase();
        terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

fn tag_matches(filter: &str, value: Option<&str>) -> bool {
    filter.is_empty() || value == Some(filter)
}

/// Positions in `letters` that pass `filter`, in their original order.
pub fn visible_indices(letters: &[Letter], filter: &FilterState) -> Vec<usize> {
    letters
        .iter()
        .enumerate()
        .filter(|(_, letter)| filter.matches(letter))
        .map(|(idx, _)| idx)
        .collect()
}

/// Next value when stepping a filter through `"" -> each value -> ""`.
pub fn next_facet(current: &str, values: &IndexSet<String>) -> String {
    if current.is_empty() {
        return values.first().cloned().unwrap_or_default();
    }
    match values.get_index_of(current) {
        Some(idx) => values.get_index(idx + 1).cloned().unwrap_or_default(),
        None => String::new(),
    }
}
