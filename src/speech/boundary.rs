//! Character-offset to unit mapping
//!
//! Engines report progress as a character offset into the utterance text.
//! A boundary table, built once per utterance, turns that offset back into
//! the index of the symbol or word being spoken. Offsets are counted in
//! `char`s, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Maximal runs of non-whitespace
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").expect("valid word pattern"));

/// Sorted, non-overlapping character ranges, one per unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryTable {
    ranges: Vec<Range<usize>>,
}

impl BoundaryTable {
    /// Join unit texts with single spaces and record where each unit starts
    ///
    /// Each unit owns the range from its own start up to the next unit's
    /// start, so the separating space belongs to the unit before it. The
    /// last unit owns the rest of the text.
    pub fn for_units<'a, I>(texts: I) -> (String, Self)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut joined = String::new();
        let mut starts = Vec::new();
        let mut cursor = 0;

        for (i, text) in texts.into_iter().enumerate() {
            if i > 0 {
                joined.push(' ');
                cursor += 1;
            }
            starts.push(cursor);
            joined.push_str(text);
            cursor += text.chars().count();
        }

        let ranges = starts
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = starts.get(i + 1).copied().unwrap_or(cursor);
                start..end
            })
            .collect();

        (joined, Self { ranges })
    }

    /// One range per word: start inclusive, end exclusive
    ///
    /// Whitespace between words belongs to no unit.
    pub fn for_words(text: &str) -> Self {
        let mut ranges = Vec::new();
        // Byte offsets from the regex are converted to char offsets as we go
        let mut byte_pos = 0;
        let mut char_pos = 0;

        for m in WORD.find_iter(text) {
            char_pos += text[byte_pos..m.start()].chars().count();
            let start = char_pos;
            char_pos += m.as_str().chars().count();
            byte_pos = m.end();
            ranges.push(start..char_pos);
        }

        Self { ranges }
    }

    /// Index of the unit owning `char_index`, if any
    ///
    /// Picks the greatest start not past the offset, then checks the offset
    /// is inside that unit's range.
    pub fn unit_at(&self, char_index: usize) -> Option<usize> {
        let after = self.ranges.partition_point(|r| r.start <= char_index);
        let idx = after.checked_sub(1)?;
        if self.ranges[idx].contains(&char_index) {
            Some(idx)
        } else {
            None
        }
    }

    /// Character start offsets of every unit
    pub fn starts(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| r.start).collect()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_offsets() {
        let (text, table) = BoundaryTable::for_units(["hello", "abc", "goodbye"]);
        assert_eq!(text, "hello abc goodbye");
        assert_eq!(table.starts(), vec![0, 6, 10]);

        assert_eq!(table.unit_at(0), Some(0));
        assert_eq!(table.unit_at(5), Some(0)); // separating space
        assert_eq!(table.unit_at(7), Some(1));
        assert_eq!(table.unit_at(11), Some(2));
        assert_eq!(table.unit_at(16), Some(2));
        assert_eq!(table.unit_at(17), None);
    }

    #[test]
    fn test_unit_offsets_count_chars() {
        let (text, table) = BoundaryTable::for_units(["não", "água"]);
        assert_eq!(text, "não água");
        assert_eq!(table.starts(), vec![0, 4]);
        assert_eq!(table.unit_at(4), Some(1));
    }

    #[test]
    fn test_empty_unit_owns_its_separator() {
        let (text, table) = BoundaryTable::for_units(["a", "", "b"]);
        assert_eq!(text, "a  b");
        assert_eq!(table.starts(), vec![0, 2, 3]);
        assert_eq!(table.unit_at(2), Some(1));

        let (_, table) = BoundaryTable::for_units(["", "b"]);
        assert_eq!(table.unit_at(0), Some(0));
        assert_eq!(table.unit_at(1), Some(1));

        // A trailing empty unit owns nothing
        let (_, table) = BoundaryTable::for_units(["a", ""]);
        assert_eq!(table.ranges(), &[0..2, 2..2]);
        assert_eq!(table.unit_at(2), None);
    }

    #[test]
    fn test_no_units() {
        let (text, table) = BoundaryTable::for_units(std::iter::empty::<&str>());
        assert!(text.is_empty());
        assert!(table.is_empty());
        assert_eq!(table.unit_at(0), None);
    }

    #[test]
    fn test_words() {
        let table = BoundaryTable::for_words("  eu quero\tágua ");
        assert_eq!(table.ranges(), &[2..4, 5..10, 11..15]);

        assert_eq!(table.unit_at(0), None);
        assert_eq!(table.unit_at(2), Some(0));
        assert_eq!(table.unit_at(4), None); // gap
        assert_eq!(table.unit_at(9), Some(1));
        assert_eq!(table.unit_at(12), Some(2));
        assert_eq!(table.unit_at(15), None);
    }

    #[test]
    fn test_words_blank_text() {
        assert!(BoundaryTable::for_words(" \n\t").is_empty());
    }
}
