//! Ingress class annotation keys
//!
//! Before `spec.ingressClassName` existed, objects declared their class with
//! an annotation. Knative uses its own key for the same purpose.

use super::resource::ClassedObject;

/// Standard (deprecated) ingress class annotation
pub const INGRESS_CLASS_KEY: &str = "kubernetes.io/ingress.class";

/// Knative Serving's ingress class annotation
pub const KNATIVE_INGRESS_CLASS_KEY: &str = "networking.knative.dev/ingress.class";

/// Marks an IngressClass as the cluster default
pub const DEFAULT_INGRESS_CLASS_KEY: &str = "ingressclass.kubernetes.io/is-default-class";

/// The only value of [`DEFAULT_INGRESS_CLASS_KEY`] that means "default"
pub const DEFAULT_INGRESS_CLASS_VALUE: &str = "true";

/// Annotation key an object uses to declare its class
pub fn annotation_key_for(obj: &ClassedObject<'_>) -> &'static str {
    match obj {
        ClassedObject::KnativeIngress { .. } => KNATIVE_INGRESS_CLASS_KEY,
        _ => INGRESS_CLASS_KEY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_knative_uses_knative_key() {
        let meta = ObjectMeta::default();
        let obj = ClassedObject::KnativeIngress { meta: &meta };
        assert_eq!(annotation_key_for(&obj), KNATIVE_INGRESS_CLASS_KEY);
    }

    #[test]
    fn test_everything_else_uses_standard_key() {
        let meta = ObjectMeta::default();
        let objects = [
            ClassedObject::Ingress {
                meta: &meta,
                class_name: None,
            },
            ClassedObject::LegacyIngress {
                meta: &meta,
                class_name: Some("kong"),
            },
            ClassedObject::IngressClass { meta: &meta },
            ClassedObject::Other { meta: &meta },
        ];

        for obj in &objects {
            assert_eq!(
                annotation_key_for(obj),
                INGRESS_CLASS_KEY,
                "{} should use the standard key",
                obj.kind_label()
            );
        }
    }
}
