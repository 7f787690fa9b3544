#![warn(missing_docs)]

//! 
//! A crate that trains structured SVMs
//! with the bundle method for regularized risk minimization.
//! 
//! The crate consists of two layers.
//! 
//! - The bundle method
//!     [`BundleMethod`] minimizes `λ/2 |w|² + L(w)`
//!     for any convex `L` given by a [`ValueGradient`] oracle.
//!     It approximates `L` from below by the maximum of
//!     supporting hyperplanes and stops once the gap between
//!     the best observed value and the lower bound drops below `ε`.
//! 
//! 
//! - The structured hinge loss
//!     [`SoftMarginLoss`] is the oracle of a structured SVM
//!     over binary outputs under linear constraints.
//!     Each call solves one loss-augmented inference
//!     with a cost function [`LinearCost`],
//!     the Hamming distance to the ground truth by default.
//! 
//! The quadratic master problem and the binary inference problem
//! are solved by the backends in [`solver`].
//! By default, both run on `clarabel`.
//! With the `extended` feature, Gurobi backends are available.
//! 
//! # Example
//! ```
//! use structsvm::prelude::*;
//! 
//! // Three outputs, exactly one of which is on.
//! let choose_one = (0..3).fold(
//!     LinearConstraint::new(Relation::Equal, 1f64),
//!     |c, i| c.coefficient(i, 1f64),
//! );
//! let features = vec![
//!     vec![1f64, 0f64, 0f64],
//!     vec![0f64, 1f64, 0f64],
//!     vec![0f64, 0f64, 1f64],
//! ];
//! let loss = SoftMarginLoss::builder(features, vec![0f64, 1f64, 0f64])
//!     .constraints(LinearConstraints::from_iter([choose_one]))
//!     .build()
//!     .unwrap();
//! 
//! let mut bundle = BundleMethod::new(loss, 3, 0.1, 1e-6);
//! let outcome = bundle.optimize(Some(100)).unwrap();
//! 
//! // The ground truth has the lowest energy.
//! let w = &outcome.weights;
//! assert!(w[1] < w[0] && w[1] < w[2]);
//! ```

pub mod common;
pub mod error;
pub mod oracle;
pub mod solver;
pub mod bundle;
pub mod loss;
pub mod research;
pub mod prelude;


pub use error::{
    Error,
    Result,
    SolverError,
};
pub use oracle::ValueGradient;
pub use bundle::{
    BundleMethod,
    BundleOutcome,
    Hyperplane,
    Termination,
};
pub use loss::{
    LinearCost,
    SoftMarginLoss,
};


/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
