//! The bundle method and its master problem.
pub mod bundle_method;
pub mod hyperplane;
pub mod outcome;

mod master_problem;

pub use bundle_method::BundleMethod;
pub use hyperplane::Hyperplane;
pub use outcome::{
    BundleOutcome,
    Termination,
};
