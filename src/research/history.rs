//! Records the trajectory of a bundle method run.
use serde::{Deserialize, Serialize};

use super::observer::{
    IterationRecord,
    Observer,
};
use crate::error::Result;

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

const HEADER: &str = "Iteration,Value,MinValue,MinLower,Gap,Time\n";


/// One row of a [`History`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The iteration number.
    pub iteration: usize,
    /// `L(w_{t-1})`.
    pub value: f64,
    /// The smallest observed objective value.
    pub min_value: f64,
    /// The optimal value of the master problem.
    pub min_lower: f64,
    /// `min_value - min_lower`.
    pub gap: f64,
    /// Milliseconds since the start of the run.
    pub elapsed_millis: u128,
    /// The iterate `w_t`.
    pub weights: Vec<f64>,
}


/// An [`Observer`] that keeps every iteration in memory.
/// 
/// ```
/// use structsvm::BundleMethod;
/// use structsvm::research::History;
/// 
/// let oracle = |w: &[f64]| (w[0].abs(), vec![w[0].signum()]);
/// let mut bundle = BundleMethod::init(oracle, 1);
/// let mut history = History::new();
/// let outcome = bundle.optimize_with(Some(10), &mut history).unwrap();
/// 
/// assert_eq!(history.len(), outcome.iterations);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}


impl History {
    /// Constructs an empty history.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }


    /// Returns the recorded iterations.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries[..]
    }


    /// Returns the number of recorded iterations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }


    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }


    /// Returns the last recorded iteration.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }


    /// Writes the history to `filename` as CSV,
    /// one line per iteration (the iterates are omitted).
    pub fn write_csv<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let mut file = File::create(filename)?;
        file.write_all(HEADER.as_bytes())?;
        for entry in &self.entries {
            let line = format!(
                "{},{},{},{},{},{}\n",
                entry.iteration,
                entry.value,
                entry.min_value,
                entry.min_lower,
                entry.gap,
                entry.elapsed_millis,
            );
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }


    /// Serializes the history as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}


impl Observer for History {
    fn start(&mut self, _name: &str, _info: &[(&str, String)]) {
        self.entries.clear();
    }


    fn observe(&mut self, record: &IterationRecord<'_>) {
        self.entries.push(HistoryEntry {
            iteration: record.iteration,
            value: record.value,
            min_value: record.min_value,
            min_lower: record.min_lower,
            gap: record.gap,
            elapsed_millis: record.elapsed_millis,
            weights: record.weights.to_vec(),
        });
    }
}
