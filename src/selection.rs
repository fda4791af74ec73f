use anyhow::{anyhow, Result};
use std::collections::HashMap;

/// Per-page checkbox state for a batch of uploaded files, keyed by
/// `(file_index, page_index)`, both zero-based.
///
/// Pages without an entry count as selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    checked: HashMap<(usize, usize), bool>,
}

impl PageSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, file_index: usize, page_index: usize, selected: bool) {
        self.checked.insert((file_index, page_index), selected);
    }

    pub fn deselect(&mut self, file_index: usize, page_index: usize) {
        self.set(file_index, page_index, false);
    }

    pub fn is_selected(&self, file_index: usize, page_index: usize) -> bool {
        self.checked
            .get(&(file_index, page_index))
            .copied()
            .unwrap_or(true)
    }

    /// Keep only the pages of `file_index` that are still ticked, preserving order
    pub fn apply(&self, file_index: usize, pages: &[usize]) -> Vec<usize> {
        pages
            .iter()
            .copied()
            .filter(|&page| self.is_selected(file_index, page))
            .collect()
    }

    /// Number of explicitly unticked pages
    pub fn deselected_count(&self) -> usize {
        self.checked.values().filter(|selected| !**selected).count()
    }

    /// Build a selection from "FILE:PAGE" entries (1-based, as shown to the user)
    pub fn from_deselections<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut selection = Self::new();
        for entry in entries {
            let (file_index, page_index) = parse_deselection(entry.as_ref())?;
            selection.deselect(file_index, page_index);
        }
        Ok(selection)
    }
}

/// Parse "FILE:PAGE" with 1-based numbers into a zero-based key
pub fn parse_deselection(s: &str) -> Result<(usize, usize)> {
    let (file, page) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid page selection {:?}: expected FILE:PAGE", s))?;

    let parse = |part: &str| -> Result<usize> {
        match part.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(anyhow!(
                "Invalid page selection {:?}: numbers must be >= 1",
                s
            )),
        }
    };

    Ok((parse(file)?, parse(page)?))
}
