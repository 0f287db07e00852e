//! Classgate: ingress class resolution and event filtering
//!
//! Decides whether an Ingress-like object belongs to an ingress class, and
//! whether a watch event for it should reach a class-scoped reconciler.

pub mod apis;
pub mod config;
pub mod error;
