//! Event filter for ingress class controllers
//!
//! [`ClassPredicate`] decides whether a watch event should reach the
//! reconciler. It only sees the object, never the cluster, so it cannot tell
//! whether our class is the default one. Classless objects are therefore
//! always let through and the reconciler settles default membership.

use super::class_matcher::{
    is_ingress_class_annotation_configured, is_ingress_class_empty,
    is_ingress_class_spec_configured,
};
use super::resource::ClassedResource;

/// A watch event as seen by the filter
#[derive(Debug)]
pub enum ResourceEvent<'a, K: ?Sized> {
    Create(&'a K),
    Update { old: &'a K, new: &'a K },
    Delete(&'a K),
    /// Resync / initial list
    Generic(&'a K),
}

impl<'a, K: ?Sized> ResourceEvent<'a, K> {
    /// Event label (metrics, logs)
    pub fn name(&self) -> &'static str {
        match self {
            ResourceEvent::Create(_) => "create",
            ResourceEvent::Update { .. } => "update",
            ResourceEvent::Delete(_) => "delete",
            ResourceEvent::Generic(_) => "generic",
        }
    }

    /// The object the event is about (the new snapshot for updates)
    pub fn object(&self) -> &'a K {
        match *self {
            ResourceEvent::Create(obj)
            | ResourceEvent::Delete(obj)
            | ResourceEvent::Generic(obj)
            | ResourceEvent::Update { new: obj, .. } => obj,
        }
    }
}

/// Stateless ingress class filter
///
/// ## Example
///
/// ```ignore
/// let predicate = ClassPredicate::new("kong", true, true);
///
/// if predicate.evaluate(&ResourceEvent::Update { old: &before, new: &after }) {
///     // enqueue for reconciliation
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPredicate {
    class_name: String,
    check_annotations: bool,
    check_spec: bool,
}

impl ClassPredicate {
    pub fn new(class_name: impl Into<String>, check_annotations: bool, check_spec: bool) -> Self {
        Self {
            class_name: class_name.into(),
            check_annotations,
            check_spec,
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Single-object check shared by create, delete and generic events
    pub fn accepts<R>(&self, obj: &R) -> bool
    where
        R: ClassedResource + ?Sized,
    {
        if self.check_annotations && is_ingress_class_annotation_configured(obj, &self.class_name)
        {
            return true;
        }
        if self.check_spec && is_ingress_class_spec_configured(obj, &self.class_name) {
            return true;
        }
        // Might belong to us if we're the default class; the reconciler decides
        is_ingress_class_empty(obj)
    }

    pub fn create<R: ClassedResource + ?Sized>(&self, obj: &R) -> bool {
        self.accepts(obj)
    }

    pub fn delete<R: ClassedResource + ?Sized>(&self, obj: &R) -> bool {
        self.accepts(obj)
    }

    pub fn generic<R: ClassedResource + ?Sized>(&self, obj: &R) -> bool {
        self.accepts(obj)
    }

    /// Objects moving into or out of our class must both be queued
    pub fn update<R: ClassedResource + ?Sized>(&self, old: &R, new: &R) -> bool {
        self.accepts(old) || self.accepts(new)
    }

    pub fn evaluate<R: ClassedResource + ?Sized>(&self, event: &ResourceEvent<'_, R>) -> bool {
        match *event {
            ResourceEvent::Create(obj) => self.create(obj),
            ResourceEvent::Update { old, new } => self.update(old, new),
            ResourceEvent::Delete(obj) => self.delete(obj),
            ResourceEvent::Generic(obj) => self.generic(obj),
        }
    }
}
