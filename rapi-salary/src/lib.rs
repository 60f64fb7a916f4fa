//! Starting-salary prediction for vocational training graduates.
//!
//! A request runs through a fixed pipeline: normalize and one-hot encode the
//! form input against the deployed [`schema::FeatureSchema`], standardize
//! with the fitted [`scaler::StandardScaler`], and evaluate the fitted
//! [`model::LinearModel`].

pub mod artifacts;
pub mod config;
pub mod error;
pub mod linear_backend;
pub mod model;
pub mod preprocess;
pub mod scaler;
pub mod schema;
pub mod server;

pub use error::{Result, SalaryError};
