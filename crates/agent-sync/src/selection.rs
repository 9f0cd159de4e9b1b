//! Compact index selection syntax: `1-3,5,7-9`.
//!
//! Indices are 1-based positions in a list shown to the operator. Parsing is
//! all-or-nothing: one bad token rejects the whole input.

use std::collections::BTreeSet;

use crate::error::SyncError;

/// Deduplicated, ascending, 1-based indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet(Vec<usize>);

impl SelectionSet {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Items at the selected positions, in ascending index order.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        self.0
            .iter()
            .filter_map(|i| i.checked_sub(1).and_then(|i| items.get(i)))
            .collect()
    }
}

/// Operator answer to a selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Quit,
    All,
    Indices(SelectionSet),
}

/// Parse `q`, `a`, or range syntax against a list of `bound` items. A
/// selection that picks nothing is a quit.
pub fn parse_choice(input: &str, bound: usize) -> Result<Choice, SyncError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("q") {
        return Ok(Choice::Quit);
    }
    if trimmed.eq_ignore_ascii_case("a") {
        return Ok(Choice::All);
    }
    let set = parse_selection(trimmed, bound)?;
    if set.is_empty() {
        return Ok(Choice::Quit);
    }
    Ok(Choice::Indices(set))
}

/// Parse comma-separated indices and inclusive ranges, validated against
/// `1..=bound`. Empty input yields an empty set.
pub fn parse_selection(input: &str, bound: usize) -> Result<SelectionSet, SyncError> {
    let mut picked: BTreeSet<i64> = BTreeSet::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((start, end)) = token.split_once('-') {
            let start = parse_index(input, start)?;
            let end = parse_index(input, end)?;
            if start > end {
                return Err(SyncError::invalid_selection(
                    input,
                    format!("range {start}-{end} is reversed"),
                ));
            }
            if start < 1 || end > bound as i64 {
                return Err(out_of_bounds(input, bound));
            }
            picked.extend(start..=end);
        } else {
            picked.insert(parse_index(input, token)?);
        }
    }

    if let (Some(&lo), Some(&hi)) = (picked.first(), picked.last())
        && (lo < 1 || hi > bound as i64)
    {
        return Err(out_of_bounds(input, bound));
    }

    Ok(SelectionSet(picked.into_iter().map(|i| i as usize).collect()))
}

fn parse_index(input: &str, part: &str) -> Result<i64, SyncError> {
    let part = part.trim();
    part.parse::<i64>()
        .map_err(|_| SyncError::invalid_selection(input, format!("'{part}' is not a number")))
}

fn out_of_bounds(input: &str, bound: usize) -> SyncError {
    SyncError::invalid_selection(input, format!("indices must be between 1 and {bound}"))
}
