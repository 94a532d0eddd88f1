//! Decision engine library for the utility-driven autoscaler
//!
//! This crate provides the core functionality for:
//! - Windowed metric aggregation and bucketed utility scoring
//! - Deterministic configuration selection with one-cycle hysteresis
//! - Per-service sample logs and persisted control state
//! - The sampling and decision cycle loops
//! - Health checks and observability

pub mod actuator;
pub mod catalog;
pub mod controller;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod sampler;
pub mod source;
pub mod store;

pub use error::EngineError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ScalerMetrics, StructuredLogger};
