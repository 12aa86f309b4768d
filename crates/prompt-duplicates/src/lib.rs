//! Duplicate-flag review mode: groups repeated flag categories, tracks
//! which groups/entries are selected, and applies keep/delete mutations.

use std::collections::HashMap;

use prompt_match::{find_duplicates, MatchResult};
use prompt_text::{rebuild_command, tokenize, Token};

/// One category's set of token indices flagged as duplicates of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub category: String,
    pub indices: Vec<usize>,
    pub selected: bool,
    pub current_index: usize,
}

impl DuplicateGroup {
    /// The token index currently focused within this group.
    pub fn current_result_index(&self) -> usize {
        self.indices[self.current_index]
    }
}

/// Walks and mutates a command line's duplicate-flag groups.
#[derive(Debug, Clone, Default)]
pub struct DuplicatesMode {
    groups: Vec<DuplicateGroup>,
    current_group: usize,
}

impl DuplicatesMode {
    /// Build groups from a matcher's results, in first-seen category order.
    pub fn from_matches(results: &[MatchResult]) -> Self {
        let grouped = find_duplicates(results);

        let mut order: Vec<String> = Vec::new();
        for result in results {
            if grouped.contains_key(&result.category) && !order.contains(&result.category) {
                order.push(result.category.clone());
            }
        }

        let groups = order
            .into_iter()
            .map(|category| {
                let mut indices = grouped[&category].clone();
                indices.sort_unstable();
                DuplicateGroup {
                    category,
                    indices,
                    selected: false,
                    current_index: 0,
                }
            })
            .collect();

        Self {
            groups,
            current_group: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    pub fn current_group(&self) -> Option<&DuplicateGroup> {
        self.groups.get(self.current_group)
    }

    pub fn selected_groups(&self) -> Vec<&DuplicateGroup> {
        self.groups.iter().filter(|g| g.selected).collect()
    }

    pub fn move_next(&mut self) {
        if let Some(group) = self.groups.get_mut(self.current_group) {
            if group.current_index + 1 < group.indices.len() {
                group.current_index += 1;
            }
        }
    }

    pub fn move_prev(&mut self) {
        if let Some(group) = self.groups.get_mut(self.current_group) {
            group.current_index = group.current_index.saturating_sub(1);
        }
    }

    pub fn next_group(&mut self) {
        if !self.groups.is_empty() {
            self.current_group = (self.current_group + 1) % self.groups.len();
        }
    }

    pub fn prev_group(&mut self) {
        if !self.groups.is_empty() {
            self.current_group = (self.current_group + self.groups.len() - 1) % self.groups.len();
        }
    }

    pub fn select_group(&mut self) {
        if let Some(group) = self.groups.get_mut(self.current_group) {
            group.selected = true;
        }
    }

    pub fn deselect_group(&mut self) {
        if let Some(group) = self.groups.get_mut(self.current_group) {
            group.selected = false;
        }
    }

    pub fn select_all(&mut self) {
        for group in &mut self.groups {
            group.selected = true;
        }
    }

    pub fn deselect_all(&mut self) {
        for group in &mut self.groups {
            group.selected = false;
        }
    }

    fn target_groups(&self) -> Vec<usize> {
        let selected: Vec<usize> = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.selected)
            .map(|(i, _)| i)
            .collect();

        if selected.is_empty() {
            if self.groups.is_empty() {
                Vec::new()
            } else {
                vec![self.current_group]
            }
        } else {
            selected
        }
    }

    /// Indices to delete in order to keep only each target group's current
    /// entry.
    fn keep_current_deletions(&self) -> Vec<usize> {
        let mut deletions = Vec::new();
        for &group_idx in &self.target_groups() {
            let group = &self.groups[group_idx];
            let keep = group.current_result_index();
            deletions.extend(group.indices.iter().copied().filter(|&idx| idx != keep));
        }
        deletions
    }

    /// Indices to delete in order to keep only each target group's first
    /// entry.
    fn keep_first_deletions(&self) -> Vec<usize> {
        let mut deletions = Vec::new();
        for &group_idx in &self.target_groups() {
            let group = &self.groups[group_idx];
            let keep = group.indices[0];
            deletions.extend(group.indices.iter().copied().filter(|&idx| idx != keep));
        }
        deletions
    }

    /// Just the currently focused entry, if its group has more than one
    /// member (a lone survivor can't be deleted out of its own group).
    fn delete_current_deletions(&self) -> Vec<usize> {
        match self.current_group() {
            Some(group) if group.indices.len() >= 2 => vec![group.current_result_index()],
            _ => Vec::new(),
        }
    }

    /// Rebuild the command line keeping only each target group's current
    /// entry, dropping the other duplicates.
    pub fn keep_current(&self, tokens: &[Token]) -> String {
        delete_indices(tokens, &self.keep_current_deletions())
    }

    /// Rebuild the command line keeping only each target group's first
    /// entry.
    pub fn keep_first(&self, tokens: &[Token]) -> String {
        delete_indices(tokens, &self.keep_first_deletions())
    }

    /// Delete just the focused entry of the current group, if doing so
    /// would still leave at least one member.
    pub fn delete_current(&self, tokens: &[Token]) -> String {
        delete_indices(tokens, &self.delete_current_deletions())
    }

    /// Re-derive groups from a freshly re-matched command line, carrying
    /// forward each category's `selected` flag by name.
    pub fn refresh(&mut self, results: &[MatchResult]) {
        let previous_selection: HashMap<String, bool> =
            self.groups.iter().map(|g| (g.category.clone(), g.selected)).collect();

        let mut next = Self::from_matches(results);
        for group in &mut next.groups {
            if let Some(&was_selected) = previous_selection.get(&group.category) {
                group.selected = was_selected;
            }
        }
        next.current_group = next.current_group.min(next.groups.len().saturating_sub(1));

        *self = next;
    }

    pub fn get_highlighted_indices(&self) -> Vec<usize> {
        self.groups.iter().flat_map(|g| g.indices.iter().copied()).collect()
    }

    pub fn get_current_index(&self) -> Option<usize> {
        self.current_group().map(|g| g.current_result_index())
    }

    pub fn get_selected_indices(&self) -> Vec<usize> {
        self.selected_groups()
            .into_iter()
            .flat_map(|g| g.indices.iter().copied())
            .collect()
    }
}

/// Rebuild a command line from `tokens`, dropping every index in `deleted`.
fn delete_indices(tokens: &[Token], deleted: &[usize]) -> String {
    let kept: Vec<Token> = tokens
        .iter()
        .enumerate()
        .filter(|(idx, _)| !deleted.contains(idx))
        .map(|(_, token)| token.clone())
        .collect();
    rebuild_command(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_match::{FlagRule, Matcher};

    fn matches_for(text: &str) -> (Vec<Token>, Vec<MatchResult>) {
        let patterns = vec![r"-(I)(.*)".to_string()];
        let rules = [FlagRule {
            category: "Includes",
            patterns: &patterns,
        }];
        let matcher = Matcher::new(&rules);
        let tokens = tokenize(text);
        let matches = matcher.match_tokens(&tokens);
        (tokens, matches)
    }

    #[test]
    fn builds_one_group_per_duplicate_category() {
        let (_, matches) = matches_for("gcc -Ia -Ib -Ic main.c");
        let mode = DuplicatesMode::from_matches(&matches);
        assert_eq!(mode.groups().len(), 1);
        assert_eq!(mode.groups()[0].indices, vec![1, 2, 3]);
    }

    #[test]
    fn keep_current_drops_all_but_focused() {
        let (tokens, matches) = matches_for("gcc -Ia -Ib -Ic main.c");
        let mut mode = DuplicatesMode::from_matches(&matches);
        mode.move_next(); // focus index 2 (-Ib)
        let result = mode.keep_current(&tokens);
        assert_eq!(result, "gcc -Ib main.c");
    }

    #[test]
    fn keep_first_drops_all_but_first() {
        let (tokens, matches) = matches_for("gcc -Ia -Ib -Ic main.c");
        let mode = DuplicatesMode::from_matches(&matches);
        let result = mode.keep_first(&tokens);
        assert_eq!(result, "gcc -Ia main.c");
    }

    #[test]
    fn delete_current_requires_at_least_two_members() {
        let (tokens, matches) = matches_for("gcc -Ia main.c");
        let mode = DuplicatesMode::from_matches(&matches);
        assert!(mode.is_empty());
        let result = mode.delete_current(&tokens);
        assert_eq!(result, rebuild_command(&tokens));
    }

    #[test]
    fn refresh_preserves_selection_by_category_name() {
        let (_, matches) = matches_for("gcc -Ia -Ib main.c");
        let mut mode = DuplicatesMode::from_matches(&matches);
        mode.select_group();
        assert!(mode.groups()[0].selected);

        let (_, matches2) = matches_for("gcc -Ia -Ib -Ic main.c");
        mode.refresh(&matches2);
        assert!(mode.groups()[0].selected);
        assert_eq!(mode.groups()[0].indices.len(), 3);
    }
}
