//! Usage statistics over saved phrases

use crate::catalog;
use crate::symbol::{Sentence, Symbol};
use std::collections::HashSet;

/// Summary of how the symbol vocabulary is being used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageStats {
    pub total_phrases: usize,
    /// Mean symbols per phrase, rounded to one decimal
    pub avg_length: f64,
    /// Distinct symbol ids used
    pub unique_vocab: usize,
    /// Uses per category display name
    pub category_usage: Tally,
    /// Uses per symbol name
    pub symbol_usage: Tally,
}

/// Counts per name, in the order names were first seen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn bump(&mut self, name: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((name.to_string(), 1)),
        }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest counts first; equal counts keep first-seen order
    pub fn top(&self, n: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

impl UsageStats {
    /// Compute statistics for `phrases`
    ///
    /// Symbols are matched against the built-in catalog and `custom` to find
    /// their category; symbols found in neither only count toward symbol
    /// usage.
    pub fn compute(phrases: &[Sentence], custom: &[Symbol]) -> Self {
        if phrases.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total_phrases: phrases.len(),
            ..Default::default()
        };
        let mut vocab = HashSet::new();
        let mut total_symbols = 0usize;

        for symbol in phrases.iter().flatten() {
            total_symbols += 1;
            vocab.insert(symbol.id.as_str());

            if let Some(known) = catalog::resolve(&symbol.id, custom) {
                let name = catalog::category_name(&known.category);
                stats.category_usage.bump(name);
            }
            stats.symbol_usage.bump(&symbol.name);
        }

        let avg = total_symbols as f64 / stats.total_phrases as f64;
        stats.avg_length = (avg * 10.0).round() / 10.0;
        stats.unique_vocab = vocab.len();
        stats
    }

    /// Most used categories, highest first
    pub fn top_categories(&self, n: usize) -> Vec<(&str, usize)> {
        self.category_usage.top(n)
    }

    /// Most used symbols, highest first
    pub fn top_symbols(&self, n: usize) -> Vec<(&str, usize)> {
        self.symbol_usage.top(n)
    }
}
