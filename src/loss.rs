//! The structured hinge loss and its cost functions.
pub mod linear_cost;
pub mod soft_margin_loss;

pub use linear_cost::LinearCost;
pub use soft_margin_loss::{
    SoftMarginLoss,
    SoftMarginLossBuilder,
};
