//! Ingress class support
//!
//! - annotations: class annotation keys per kind
//! - resource: closed set of recognized kinds
//! - class_matcher: class membership, emptiness and default-class checks
//! - predicate: watch event filter
//! - discovery: resource type existence probe
//! - ingress / ingress_class: watcher and default-class lookup

pub mod annotations;
pub mod class_matcher;
pub mod discovery;
#[allow(clippy::module_inception)]
pub mod ingress;
pub mod ingress_class;
pub mod predicate;
pub mod resource;
