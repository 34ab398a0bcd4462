//! HTTP handlers

pub mod health;
pub mod predict;
pub mod baselines;
pub mod reports;
pub mod model;
