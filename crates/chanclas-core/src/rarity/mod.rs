//! Per-period rarity tables.
//!
//! Each issuance period ships one JSON file, `period_{id}.json`, mapping a
//! layer directory name to an ordered array of `{file, weight}` options.
//! Option order matters: it is the cumulative-sampling order inside the
//! trait selector, so tables are parsed order-preserving and never sorted.
//!
//! [`RarityLoader`] memoizes tables per period for the process lifetime.
//! Concurrent first access to the same period converges to a single load
//! by holding the map entry while reading the file.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

use crate::types::{Layer, PeriodId, TraitOption};

/// Errors loading or validating a rarity table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RarityError {
    /// No table file exists for the period.
    #[error("No rarity table for period {period}")]
    NotFound { period: PeriodId },

    /// The table file could not be read.
    #[error("Failed to read rarity table for period {period}: {message}")]
    Io { period: PeriodId, message: String },

    /// The table file is not valid JSON of the expected shape.
    #[error("Malformed rarity table for period {period}: {message}")]
    Malformed { period: PeriodId, message: String },

    /// A table key does not name a known layer directory.
    #[error("Unknown layer '{name}' in rarity table for period {period}")]
    UnknownLayer { period: PeriodId, name: String },

    /// An option carries a weight that is negative or not finite.
    #[error("Invalid weight {weight} for '{file}' in period {period}")]
    InvalidWeight { period: PeriodId, file: String, weight: String },
}

/// Immutable per-period mapping from layer to its ordered trait options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RarityTable {
    layers: HashMap<Layer, Vec<TraitOption>>,
}

impl RarityTable {
    /// Builds a table from already-validated entries. Used directly by
    /// tests; production tables come from [`RarityLoader`].
    #[must_use]
    pub fn from_entries(entries: Vec<(Layer, Vec<TraitOption>)>) -> Self {
        Self { layers: entries.into_iter().collect() }
    }

    /// Ordered options for one layer, or `None` if the table has no entry
    /// for it (an absent layer contributes nothing and consumes no draw).
    #[must_use]
    pub fn options(&self, layer: Layer) -> Option<&[TraitOption]> {
        self.layers.get(&layer).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Memoizing rarity table loader with a load-once guarantee per period.
pub struct RarityLoader {
    rarity_dir: PathBuf,
    tables: DashMap<PeriodId, Arc<RarityTable>>,
}

impl RarityLoader {
    #[must_use]
    pub fn new(rarity_dir: impl Into<PathBuf>) -> Self {
        Self { rarity_dir: rarity_dir.into(), tables: DashMap::new() }
    }

    /// Returns the table for a period, loading it on first access.
    ///
    /// The entry guard is held across the file read, so two callers racing
    /// on the same period's first access produce exactly one load; the
    /// loser observes the winner's table. Failed loads are not cached, so
    /// a fixed table file becomes visible on the next request.
    ///
    /// # Errors
    ///
    /// Returns [`RarityError`] if the file is missing, unreadable, or
    /// fails validation.
    pub fn load(&self, period: PeriodId) -> Result<Arc<RarityTable>, RarityError> {
        if let Some(table) = self.tables.get(&period) {
            return Ok(Arc::clone(&table));
        }

        match self.tables.entry(period) {
            Entry::Occupied(occupied) => Ok(Arc::clone(occupied.get())),
            Entry::Vacant(vacant) => {
                let table = Arc::new(self.read_table(period)?);
                vacant.insert(Arc::clone(&table));
                tracing::info!(period, "rarity table loaded");
                Ok(table)
            }
        }
    }

    fn read_table(&self, period: PeriodId) -> Result<RarityTable, RarityError> {
        let path = self.rarity_dir.join(format!("period_{period}.json"));

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RarityError::NotFound { period });
            }
            Err(e) => {
                return Err(RarityError::Io { period, message: e.to_string() });
            }
        };

        // serde_json maps preserve insertion order only with indexmap;
        // parse into Value and walk the object to keep option order and
        // reject unknown keys explicitly.
        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| RarityError::Malformed { period, message: e.to_string() })?;

        let object = parsed.as_object().ok_or_else(|| RarityError::Malformed {
            period,
            message: "top-level value must be an object".to_string(),
        })?;

        let mut layers = HashMap::with_capacity(object.len());
        for (name, options_value) in object {
            let layer = Layer::from_dir_name(name).ok_or_else(|| RarityError::UnknownLayer {
                period,
                name: name.clone(),
            })?;

            let options: Vec<TraitOption> = serde_json::from_value(options_value.clone())
                .map_err(|e| RarityError::Malformed {
                    period,
                    message: format!("layer '{name}': {e}"),
                })?;

            for option in &options {
                if !option.weight.is_finite() || option.weight < 0.0 {
                    return Err(RarityError::InvalidWeight {
                        period,
                        file: option.file.clone(),
                        weight: option.weight.to_string(),
                    });
                }
            }

            layers.insert(layer, options);
        }

        Ok(RarityTable { layers })
    }
}
