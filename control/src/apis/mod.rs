//! Kubernetes API integrations
//!
//! This module contains the ingress class decision layer and the watchers
//! built on top of it.

pub mod ingress;
pub mod metrics;
