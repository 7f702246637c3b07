//! Shared aggregation building blocks: ordered group accumulators, aggregate
//! tables, peak records and the stable argmax they rely on.

use std::{collections::HashMap, hash::Hash};

use serde::Serialize;

/// Index of the largest measure. Ties resolve to the earliest position.
pub fn stable_argmax<I>(measures: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, measure) in measures.into_iter().enumerate() {
        match best {
            Some((_, current)) if measure <= current => {}
            _ => best = Some((index, measure)),
        }
    }
    best.map(|(index, _)| index)
}

/// Sums measures per key, remembering the order keys were first seen.
#[derive(Debug, Clone)]
pub struct GroupedSums<K> {
    positions: HashMap<K, usize>,
    entries: Vec<(K, f64)>,
}

impl<K> Default for GroupedSums<K> {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> GroupedSums<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, measure: f64) {
        match self.positions.get(&key) {
            Some(&position) => self.entries[position].1 += measure,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, measure));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows in first-seen order.
    pub fn into_table(self) -> AggregateTable<K> {
        AggregateTable {
            rows: self
                .entries
                .into_iter()
                .map(|(key, measure)| AggregateRow { key, measure })
                .collect(),
        }
    }
}

impl<K: Clone + Eq + Hash + Ord> GroupedSums<K> {
    /// Rows ordered by key.
    pub fn into_sorted_table(self) -> AggregateTable<K> {
        let mut table = self.into_table();
        table.rows.sort_by(|a, b| a.key.cmp(&b.key));
        table
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    pub key: K,
    pub measure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateTable<K> {
    rows: Vec<AggregateRow<K>>,
}

impl<K> Default for AggregateTable<K> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<K> AggregateTable<K> {
    pub fn rows(&self) -> &[AggregateRow<K>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.measure).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregateRow<K>> {
        self.rows.iter()
    }
}

impl<K: Clone> AggregateTable<K> {
    /// Maximum-measure row, first occurrence on ties. `None` for an empty table.
    pub fn peak(&self) -> Option<PeakRecord<K>> {
        let index = stable_argmax(self.rows.iter().map(|row| row.measure))?;
        let row = &self.rows[index];
        Some(PeakRecord {
            key: row.key.clone(),
            measure: row.measure,
        })
    }
}

impl<K> FromIterator<(K, f64)> for AggregateTable<K> {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self {
            rows: iter
                .into_iter()
                .map(|(key, measure)| AggregateRow { key, measure })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakRecord<K> {
    pub key: K,
    pub measure: f64,
}

/// Result of a time-series aggregation. `NoValidData` means no row survived
/// date coercion, so neither totals nor a peak exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum SeriesOutcome<T> {
    Ready(T),
    NoValidData,
}

impl<T> SeriesOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            SeriesOutcome::Ready(value) => Some(value),
            SeriesOutcome::NoValidData => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            SeriesOutcome::Ready(value) => Some(value),
            SeriesOutcome::NoValidData => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SeriesOutcome::Ready(_))
    }
}
