//! Price Window - counted multiset of observed prices
//!
//! Each observation occupies its own slot: two additions of the same price
//! need two removals before the price leaves the window.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use trailstop_core::Price;

/// Which of the engine's two windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowSide {
    Up,
    Down,
}

impl fmt::Display for WindowSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSide::Up => write!(f, "up"),
            WindowSide::Down => write!(f, "down"),
        }
    }
}

/// Ordered multiset of prices
///
/// Uses BTreeMap price -> count so min/max are the first/last keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceWindow {
    counts: BTreeMap<Price, usize>,
    len: usize,
}

impl PriceWindow {
    /// Create a new empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one instance of `price`
    pub fn add(&mut self, price: Price) {
        *self.counts.entry(price).or_insert(0) += 1;
        self.len += 1;
    }

    /// Remove exactly one instance of `price`
    ///
    /// Returns false (and changes nothing) when no instance is held.
    pub fn remove_one(&mut self, price: Price) -> bool {
        let Some(count) = self.counts.get_mut(&price) else {
            return false;
        };

        *count -= 1;
        if *count == 0 {
            self.counts.remove(&price);
        }
        self.len -= 1;
        true
    }

    /// Lowest held price
    pub fn min(&self) -> Result<Price> {
        self.counts
            .keys()
            .next()
            .copied()
            .ok_or(EngineError::EmptyWindow)
    }

    /// Highest held price
    pub fn max(&self) -> Result<Price> {
        self.counts
            .keys()
            .next_back()
            .copied()
            .ok_or(EngineError::EmptyWindow)
    }

    /// Number of held instances (duplicates counted)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Same as `len`
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of instances of `price`
    pub fn count(&self, price: Price) -> usize {
        self.counts.get(&price).copied().unwrap_or(0)
    }

    pub fn contains(&self, price: Price) -> bool {
        self.counts.contains_key(&price)
    }

    /// All instances in ascending order, duplicates repeated
    pub fn iter(&self) -> impl Iterator<Item = Price> + '_ {
        self.counts
            .iter()
            .flat_map(|(price, count)| std::iter::repeat_n(*price, *count))
    }
}

impl FromIterator<Price> for PriceWindow {
    fn from_iter<I: IntoIterator<Item = Price>>(iter: I) -> Self {
        let mut window = PriceWindow::new();
        for price in iter {
            window.add(price);
        }
        window
    }
}
