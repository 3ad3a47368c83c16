//! Line search and selection state.

use std::collections::BTreeSet;

use crate::domain::{Line, Transportation};

/// Free-text line search plus a multi-select of lines.
///
/// An empty selection means "show everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    search_text: String,
    selected: BTreeSet<Line>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search text.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Replace the search text.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Currently selected lines.
    pub fn selected(&self) -> &BTreeSet<Line> {
        &self.selected
    }

    /// Whether `line` is selected.
    pub fn is_selected(&self, line: &Line) -> bool {
        self.selected.contains(line)
    }

    /// Select `line` if unselected, unselect it otherwise.
    ///
    /// Returns whether the line is selected afterwards.
    pub fn toggle(&mut self, line: Line) -> bool {
        if self.selected.remove(&line) {
            false
        } else {
            self.selected.insert(line);
            true
        }
    }

    /// Unselect every line.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Lines whose name contains the search text, ignoring case.
    pub fn visible_lines<'a, I>(&self, lines: I) -> Vec<&'a Line>
    where
        I: IntoIterator<Item = &'a Line>,
    {
        let needle = self.search_text.to_lowercase();
        lines
            .into_iter()
            .filter(|line| needle.is_empty() || line.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Vehicles on a selected line, or all vehicles if nothing is selected.
    pub fn visible_vehicles<'a>(&self, vehicles: &'a [Transportation]) -> Vec<&'a Transportation> {
        vehicles
            .iter()
            .filter(|v| self.selected.is_empty() || self.selected.contains(&v.line))
            .collect()
    }
}

/// The distinct lines present in `vehicles`.
pub fn distinct_lines<'a, I>(vehicles: I) -> BTreeSet<Line>
where
    I: IntoIterator<Item = &'a Transportation>,
{
    vehicles.into_iter().map(|v| v.line.clone()).collect()
}
