//! # Feature: Priority Estimation
//!
//! Derives a priority label and an on-time completion probability from task fields.
//! Invoked for prediction requests only; it does not feed the send-time scheduler.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod estimator;

pub use estimator::PriorityEstimator;
