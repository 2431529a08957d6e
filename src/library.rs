//! The user's custom symbols

use crate::symbol::Symbol;
use log::{debug, info};
use std::time::{SystemTime, UNIX_EPOCH};

/// Ordered collection of custom symbols
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolLibrary {
    symbols: Vec<Symbol>,
}

impl SymbolLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap symbols loaded from storage
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Create a custom symbol and append it
    ///
    /// Ids are `custom-<millis>`, bumped until unique within the library.
    pub fn add(&mut self, name: &str, image_url: &str) -> Symbol {
        let mut stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let mut id = format!("custom-{}", stamp);
        while self.get(&id).is_some() {
            stamp += 1;
            id = format!("custom-{}", stamp);
        }

        let symbol = Symbol::custom(&id, name, image_url);
        info!("Added custom symbol {} ({})", symbol.id, symbol.name);
        self.symbols.push(symbol.clone());
        symbol
    }

    /// Replace the symbol with the same id; returns false if there is none
    pub fn update(&mut self, updated: Symbol) -> bool {
        match self.symbols.iter_mut().find(|s| s.id == updated.id) {
            Some(slot) => {
                debug!("Updated custom symbol {}", updated.id);
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Remove a symbol by id
    pub fn delete(&mut self, id: &str) -> Option<Symbol> {
        let pos = self.symbols.iter().position(|s| s.id == id)?;
        debug!("Deleted custom symbol {}", id);
        Some(self.symbols.remove(pos))
    }

    /// Move the symbol at `from` to `to`
    pub fn reorder(&mut self, from: usize, to: usize) {
        self.symbols = crate::symbol::moved(&self.symbols, from, to);
    }

    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_creates_custom_symbol() {
        let mut library = SymbolLibrary::new();
        let first = library.add("Vovó", "data:image/png;base64,AA");
        let second = library.add("Vovô", "data:image/png;base64,BB");

        assert!(first.id.starts_with("custom-"));
        assert_ne!(first.id, second.id);
        assert!(first.is_custom);
        assert_eq!(first.category, "custom");
        assert_eq!(first.spoken_text(), "Vovó");
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn test_update_keeps_id() {
        let mut library = SymbolLibrary::new();
        let symbol = library.add("Gato", "img");

        let mut edited = symbol.clone();
        edited.name = "Gatinho".into();
        edited.speech_text = Some("gatinho".into());
        assert!(library.update(edited));
        assert_eq!(library.get(&symbol.id).unwrap().spoken_text(), "gatinho");

        assert!(!library.update(Symbol::custom("missing", "x", "y")));
    }

    #[test]
    fn test_delete_and_reorder() {
        let mut library = SymbolLibrary::from_symbols(vec![
            Symbol::custom("a", "A", ""),
            Symbol::custom("b", "B", ""),
            Symbol::custom("c", "C", ""),
        ]);

        library.reorder(0, 2);
        let ids: Vec<_> = library.symbols().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        assert_eq!(library.delete("c").unwrap().name, "C");
        assert!(library.delete("c").is_none());
        assert_eq!(library.len(), 2);
    }
}
