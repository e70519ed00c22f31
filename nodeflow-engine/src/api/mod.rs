//! HTTP API for workflow evaluation.
//!
//! This module provides an HTTP API for:
//! - Evaluating workflows (`POST /run-flow`) and validating them (`POST /validate`)
//! - Listing registered node types
//! - Inspecting recent evaluations
//! - Health and status endpoints
//!
//! # Architecture
//!
//! Pure Hyper 1.x over HTTP/1. The router is generic over the request body,
//! so handlers can be exercised with in-memory bodies.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                     ApiServer                      │
//! │  ┌──────────┐   ┌────────────┐   ┌─────────────┐   │
//! │  │  router  │───│  handlers  │───│  AppState   │   │
//! │  └──────────┘   └────────────┘   └─────────────┘   │
//! │                       │                            │
//! │                       ▼                            │
//! │               EvaluationEngine                     │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use nodeflow_engine::api::{ApiServer, ServerConfig};
//! use nodeflow_engine::engine::{EngineConfig, EvaluationEngine};
//! use std::sync::Arc;
//!
//! let engine = EvaluationEngine::new(Arc::new(registry), EngineConfig::default());
//! let server = ApiServer::new(ServerConfig::new("0.0.0.0", 8080), engine);
//! server.run().await?;
//! ```

mod error;
pub mod handlers;
mod request;
mod response;
mod router;
mod server;
mod state;

pub use error::ApiError;
pub use request::{DocumentFormat, DEADLINE_HEADER};
pub use router::{route, API_PREFIX};
pub use server::{ApiServer, ServerConfig};
pub use state::{AppState, EvaluationCounters, EvaluationHistory, EvaluationRecord};
