//! Tools to watch and record the behavior of the bundle method.
pub mod observer;
pub mod progress;
pub mod history;

pub use observer::{
    IterationRecord,
    Observer,
    Silent,
};
pub use progress::ProgressPrinter;
pub use history::{
    History,
    HistoryEntry,
};
