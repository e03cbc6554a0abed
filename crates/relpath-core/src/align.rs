//! Alignment of two tokenizations of the same sentence.
//!
//! The same text may be tokenized differently by different tools, e.g.
//! `["The", "rock-hard", "cake"]` and `["The", "rock", "-", "hard", "cake"]`.
//! [`align`] maps every position of the first sequence to the positions of the
//! second one that cover the same characters. All positions are 1-based.

use crate::error::{AlignmentDefect, PathError, TokenSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered multimap from positions in sequence A to positions in sequence B.
///
/// Keys iterate in ascending order and every value list is ascending. The map
/// remembers both sequence lengths so that callers can check [`is_total`] and
/// [`is_surjective`] before trusting it.
///
/// [`is_total`]: AlignmentMap::is_total
/// [`is_surjective`]: AlignmentMap::is_surjective
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentMap {
    len_a: usize,
    len_b: usize,
    lookup: BTreeMap<usize, Vec<usize>>,
}

impl AlignmentMap {
    /// Create an empty map between sequences of the given lengths.
    pub fn new(len_a: usize, len_b: usize) -> Self {
        Self {
            len_a,
            len_b,
            lookup: BTreeMap::new(),
        }
    }

    fn push(&mut self, a: usize, b: usize) {
        let targets = self.lookup.entry(a).or_default();
        if targets.last() != Some(&b) {
            targets.push(b);
        }
    }

    pub fn len_a(&self) -> usize {
        self.len_a
    }

    pub fn len_b(&self) -> usize {
        self.len_b
    }

    /// Number of mapped A positions.
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// B positions aligned with A position `a`.
    pub fn get(&self, a: usize) -> Option<&[usize]> {
        self.lookup.get(&a).map(Vec::as_slice)
    }

    pub fn first(&self, a: usize) -> Option<usize> {
        self.get(a).and_then(|b| b.first().copied())
    }

    pub fn last(&self, a: usize) -> Option<usize> {
        self.get(a).and_then(|b| b.last().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.lookup.iter().map(|(a, b)| (*a, b.as_slice()))
    }

    /// A positions with no counterpart in B.
    pub fn missing(&self) -> Vec<usize> {
        (1..=self.len_a)
            .filter(|a| !self.lookup.contains_key(a))
            .collect()
    }

    /// B positions that no A position reaches.
    pub fn uncovered(&self) -> Vec<usize> {
        let mut covered = vec![false; self.len_b];
        for b in self.lookup.values().flatten() {
            if let Some(slot) = b.checked_sub(1).and_then(|i| covered.get_mut(i)) {
                *slot = true;
            }
        }
        covered
            .iter()
            .enumerate()
            .filter(|(_, seen)| !**seen)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Every A position is mapped.
    pub fn is_total(&self) -> bool {
        self.missing().is_empty()
    }

    /// Every B position is reached by some A position.
    pub fn is_surjective(&self) -> bool {
        self.uncovered().is_empty()
    }

    /// Check totality, then surjectivity.
    pub fn validate(&self) -> Result<(), PathError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(AlignmentDefect::NotTotal { missing }.into());
        }
        let uncovered = self.uncovered();
        if !uncovered.is_empty() {
            return Err(AlignmentDefect::NotSurjective { uncovered }.into());
        }
        Ok(())
    }

    /// Map an A span onto B: first B position of its start, last of its end.
    pub fn map_span(&self, span: TokenSpan) -> Result<TokenSpan, PathError> {
        let start = self.first(span.start);
        let end = self.last(span.end);
        match (start, end) {
            (Some(start), Some(end)) => Ok(TokenSpan::new(start, end)),
            _ => {
                let missing = [span.start, span.end]
                    .into_iter()
                    .filter(|a| self.get(*a).is_none())
                    .collect::<Vec<_>>();
                Err(AlignmentDefect::NotTotal { missing }.into())
            }
        }
    }

    /// The B to A direction of the same correspondence.
    pub fn inverse(&self) -> Self {
        let mut inverse = Self::new(self.len_b, self.len_a);
        for (a, targets) in &self.lookup {
            for b in targets {
                inverse.push(*b, *a);
            }
        }
        inverse
    }
}

/// Remove `piece` from the front of `rest`. Empty pieces never match, so
/// prefix consumption always makes progress.
fn strip_piece<'a>(rest: &'a str, piece: &str) -> Option<&'a str> {
    if piece.is_empty() {
        return None;
    }
    rest.strip_prefix(piece)
}

/// Align two tokenizations of the same text.
///
/// Greedy single pass with one cursor per sequence. At each step, in order:
/// 1. identical tokens map 1:1;
/// 2. B tokens that spell out the current A token piece by piece all map to it;
/// 3. A tokens that spell out the current B token piece by piece all map to it;
/// 4. otherwise both cursors jump to the next B token equal to some A token at
///    or after the A cursor, dropping what lies in between.
///
/// Never fails. On malformed input the map may be partial, so check
/// [`AlignmentMap::validate`] before trusting it.
pub fn align<A: AsRef<str>, B: AsRef<str>>(list_a: &[A], list_b: &[B]) -> AlignmentMap {
    let mut map = AlignmentMap::new(list_a.len(), list_b.len());
    let mut index_a = 0;
    let mut index_b = 0;

    while index_a < list_a.len() && index_b < list_b.len() {
        let word_a = list_a[index_a].as_ref();
        let word_b = list_b[index_b].as_ref();

        if word_a == word_b {
            map.push(index_a + 1, index_b + 1);
            index_a += 1;
            index_b += 1;
            continue;
        }

        // B is finer: several B tokens make up the current A token.
        let mut rest = word_a;
        let mut consumed = false;
        while index_b < list_b.len() && !rest.is_empty() {
            let Some(remaining) = strip_piece(rest, list_b[index_b].as_ref()) else {
                break;
            };
            map.push(index_a + 1, index_b + 1);
            rest = remaining;
            consumed = true;
            index_b += 1;
        }
        if consumed {
            index_a += 1;
            continue;
        }

        // A is finer: several A tokens make up the current B token.
        let mut rest = word_b;
        while index_a < list_a.len() && !rest.is_empty() {
            let Some(remaining) = strip_piece(rest, list_a[index_a].as_ref()) else {
                break;
            };
            map.push(index_a + 1, index_b + 1);
            rest = remaining;
            consumed = true;
            index_a += 1;
        }
        if consumed {
            index_b += 1;
            continue;
        }

        match resync(list_a, list_b, index_a, index_b) {
            Some((next_a, next_b)) => {
                tracing::debug!(
                    "alignment resynchronized at A{} / B{}",
                    next_a + 1,
                    next_b + 1
                );
                index_a = next_a;
                index_b = next_b;
            }
            None => index_b = list_b.len(),
        }
    }

    map
}

/// First B position (from `index_b`) whose token equals an A token at or
/// after `index_a`, scanning B in order and A in order for each B token.
fn resync<A: AsRef<str>, B: AsRef<str>>(
    list_a: &[A],
    list_b: &[B],
    index_a: usize,
    index_b: usize,
) -> Option<(usize, usize)> {
    list_b[index_b..].iter().enumerate().find_map(|(offset_b, word_b)| {
        list_a[index_a..]
            .iter()
            .position(|word_a| word_a.as_ref() == word_b.as_ref())
            .map(|offset_a| (index_a + offset_a, index_b + offset_b))
    })
}
