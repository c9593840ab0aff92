//! HTTP Route Handlers

pub mod analytics;
pub mod model;
pub mod predictions;
