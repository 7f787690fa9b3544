//! Exports the bundle method, the structured hinge loss,
//! and the types needed to describe feasible outputs.
//! 
pub use crate::bundle::{
    BundleMethod,
    BundleOutcome,
    Termination,
};


pub use crate::loss::{
    LinearCost,
    SoftMarginLoss,
};


pub use crate::oracle::ValueGradient;


pub use crate::solver::{
    LinearConstraint,
    LinearConstraints,
    Relation,
};


pub use crate::research::{
    History,
    Observer,
    ProgressPrinter,
};
