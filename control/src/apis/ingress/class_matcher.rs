//! Ingress class membership decisions
//!
//! Pure functions over already-fetched objects. The caller supplies
//! `is_default` fresh on every call: whether a class is the cluster default
//! lives on the IngressClass objects, not here.
//!
//! Precedence: structured `spec.ingressClassName` > class annotation >
//! classless-falls-to-default.

use super::annotations::{
    annotation_key_for, DEFAULT_INGRESS_CLASS_KEY, DEFAULT_INGRESS_CLASS_VALUE,
    INGRESS_CLASS_KEY, KNATIVE_INGRESS_CLASS_KEY,
};
use super::resource::{ClassedObject, ClassedResource};

/// Does the object's class annotation name `class_name`?
///
/// An object without the annotation belongs to the default class.
pub fn matches_class<R>(obj: &R, class_name: &str, is_default: bool) -> bool
where
    R: ClassedResource + ?Sized,
{
    let obj = obj.classed();
    match obj.annotation(annotation_key_for(&obj)) {
        Some(declared) => declared == class_name,
        None => is_default,
    }
}

/// Like [`matches_class`], but honours `spec.ingressClassName` on
/// `networking.k8s.io/v1` Ingress first
pub fn matches_ingress_class_name<R>(obj: &R, class_name: &str, is_default: bool) -> bool
where
    R: ClassedResource + ?Sized,
{
    let obj = obj.classed();

    if let ClassedObject::Ingress {
        class_name: spec_class,
        ..
    } = obj
    {
        match spec_class {
            Some(declared) if declared == class_name => return true,
            // An explicit class for someone else wins over any default
            Some(declared) if !declared.is_empty() => return false,
            Some(_) => {}
            None => {
                if is_default
                    && !obj.has_annotation(INGRESS_CLASS_KEY)
                    && !obj.has_annotation(KNATIVE_INGRESS_CLASS_KEY)
                {
                    return true;
                }
            }
        }
    }

    matches_class(&obj, class_name, is_default)
}

/// Is this IngressClass annotated as the cluster default?
///
/// Only the literal `"true"` counts.
pub fn is_default_ingress_class<R>(obj: &R) -> bool
where
    R: ClassedResource + ?Sized,
{
    match obj.classed() {
        class @ ClassedObject::IngressClass { .. } => {
            class.annotation(DEFAULT_INGRESS_CLASS_KEY) == Some(DEFAULT_INGRESS_CLASS_VALUE)
        }
        _ => false,
    }
}

/// Does either class annotation (standard or Knative) name `class_name`?
///
/// NOTE: the `kubernetes.io/ingress.class` annotation is deprecated upstream
/// in favour of `spec.ingressClassName`.
pub fn is_ingress_class_annotation_configured<R>(obj: &R, class_name: &str) -> bool
where
    R: ClassedResource + ?Sized,
{
    let obj = obj.classed();
    [INGRESS_CLASS_KEY, KNATIVE_INGRESS_CLASS_KEY]
        .iter()
        .any(|key| obj.annotation(key) == Some(class_name))
}

/// Does the structured `spec.ingressClassName` equal `class_name`?
///
/// False for kinds without the field.
pub fn is_ingress_class_spec_configured<R>(obj: &R, class_name: &str) -> bool
where
    R: ClassedResource + ?Sized,
{
    obj.classed().spec_class_name() == Some(class_name)
}

/// True if the object declares no ingress class at all
pub fn is_ingress_class_empty<R>(obj: &R) -> bool
where
    R: ClassedResource + ?Sized,
{
    match obj.classed() {
        ingress @ ClassedObject::Ingress { class_name, .. } => {
            !ingress.has_annotation(INGRESS_CLASS_KEY) && class_name.is_none()
        }
        other => {
            !other.has_annotation(INGRESS_CLASS_KEY)
                && !other.has_annotation(KNATIVE_INGRESS_CLASS_KEY)
        }
    }
}
