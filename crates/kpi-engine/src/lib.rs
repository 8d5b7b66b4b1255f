//! # Vantage KPI Engine
//!
//! This crate derives the business-metric snapshot for the admin dashboard
//! from the raw back-office entities (contracts, products, users, KYC
//! records). It is the single place where financial KPIs are defined.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems. It depends only on `core-types` and the assumption
//!   knobs in `configuration`.
//! - **Stateless Calculation:** The `KpiEngine` is a stateless calculator. It
//!   takes one full `EntitySnapshot` plus an explicit reference instant and
//!   produces a `KpiSnapshot`. No ambient clock, no caching, no partial
//!   results: identical inputs always yield an identical snapshot.
//! - **Defensive Arithmetic:** Incomplete records (dangling product ids,
//!   malformed amounts, empty collections) degrade to defined fallbacks.
//!   They never abort the aggregation.
//!
//! ## Public API
//!
//! - `KpiEngine`: The main struct that contains the calculation logic.
//! - `EntitySnapshot`: One full read of the four entity collections.
//! - `KpiSnapshot`: The nested result structure served to the dashboard.
//! - `KpiError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod snapshot;

// Re-export the key components to create a clean, public-facing API.
pub use engine::KpiEngine;
pub use error::KpiError;
pub use snapshot::{
    BusinessHealth, ClientKpis, EntitySnapshot, FinancialKpis, HealthStatus, KpiSnapshot,
    MonthlyEvolutionPoint, OperationalKpis, PartnerKpis, StrategicKpis, TopClient, TopPartner,
};
