//! Ingress-like resources understood by the class matcher
//!
//! Every object that can claim an ingress class is projected onto
//! [`ClassedObject`], a borrowed view over its metadata and (for Ingress
//! kinds) the structured `spec.ingressClassName` field. Kind dispatch is an
//! explicit `match` over that closed set; anything we don't recognize lands
//! in [`ClassedObject::Other`].

use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

// =============================================================================
// Legacy and third-party Ingress schemas
// =============================================================================

/// `networking.k8s.io/v1beta1` Ingress (served until Kubernetes 1.22)
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize)]
#[kube(
    group = "networking.k8s.io",
    version = "v1beta1",
    kind = "Ingress",
    plural = "ingresses",
    root = "NetworkingV1beta1Ingress",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct NetworkingV1beta1IngressSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<serde_json::Value>,
}

/// `extensions/v1beta1` Ingress (served until Kubernetes 1.22)
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize)]
#[kube(
    group = "extensions",
    version = "v1beta1",
    kind = "Ingress",
    plural = "ingresses",
    root = "ExtensionsV1beta1Ingress",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionsV1beta1IngressSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<serde_json::Value>,
}

/// Knative Serving's internal Ingress
///
/// Declares its class only through the `networking.knative.dev/ingress.class`
/// annotation, never through the spec.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize)]
#[kube(
    group = "networking.internal.knative.dev",
    version = "v1alpha1",
    kind = "Ingress",
    plural = "ingresses",
    root = "KnativeIngress",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct KnativeIngressSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_option: Option<String>,
}

// =============================================================================
// ClassedObject
// =============================================================================

/// Borrowed view of an object for ingress class decisions
#[derive(Debug, Clone, Copy)]
pub enum ClassedObject<'a> {
    /// `networking.k8s.io/v1` Ingress
    Ingress {
        meta: &'a ObjectMeta,
        class_name: Option<&'a str>,
    },
    /// `networking.k8s.io/v1beta1` or `extensions/v1beta1` Ingress
    LegacyIngress {
        meta: &'a ObjectMeta,
        class_name: Option<&'a str>,
    },
    /// `networking.internal.knative.dev/v1alpha1` Ingress
    KnativeIngress { meta: &'a ObjectMeta },
    /// `networking.k8s.io/v1` IngressClass
    IngressClass { meta: &'a ObjectMeta },
    /// Anything else carrying object metadata
    Other { meta: &'a ObjectMeta },
}

impl<'a> ClassedObject<'a> {
    pub fn meta(&self) -> &'a ObjectMeta {
        match *self {
            ClassedObject::Ingress { meta, .. }
            | ClassedObject::LegacyIngress { meta, .. }
            | ClassedObject::KnativeIngress { meta }
            | ClassedObject::IngressClass { meta }
            | ClassedObject::Other { meta } => meta,
        }
    }

    /// Value of an annotation, if set
    pub fn annotation(&self, key: &str) -> Option<&'a str> {
        self.meta()
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(key))
            .map(String::as_str)
    }

    #[inline]
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotation(key).is_some()
    }

    /// The structured `spec.ingressClassName`, for kinds that have one
    ///
    /// `Some("")` is distinct from `None`: the field is set, just empty.
    pub fn spec_class_name(&self) -> Option<&'a str> {
        match *self {
            ClassedObject::Ingress { class_name, .. }
            | ClassedObject::LegacyIngress { class_name, .. } => class_name,
            _ => None,
        }
    }

    /// Short kind label (metrics, logs)
    pub fn kind_label(&self) -> &'static str {
        match self {
            ClassedObject::Ingress { .. } => "ingress",
            ClassedObject::LegacyIngress { .. } => "legacy_ingress",
            ClassedObject::KnativeIngress { .. } => "knative_ingress",
            ClassedObject::IngressClass { .. } => "ingress_class",
            ClassedObject::Other { .. } => "other",
        }
    }
}

// =============================================================================
// ClassedResource
// =============================================================================

/// Objects that can be inspected for ingress class membership
pub trait ClassedResource {
    fn classed(&self) -> ClassedObject<'_>;
}

impl<'a> ClassedResource for ClassedObject<'a> {
    fn classed(&self) -> ClassedObject<'_> {
        *self
    }
}

impl ClassedResource for Ingress {
    fn classed(&self) -> ClassedObject<'_> {
        ClassedObject::Ingress {
            meta: &self.metadata,
            class_name: self
                .spec
                .as_ref()
                .and_then(|spec| spec.ingress_class_name.as_deref()),
        }
    }
}

impl ClassedResource for NetworkingV1beta1Ingress {
    fn classed(&self) -> ClassedObject<'_> {
        ClassedObject::LegacyIngress {
            meta: &self.metadata,
            class_name: self.spec.ingress_class_name.as_deref(),
        }
    }
}

impl ClassedResource for ExtensionsV1beta1Ingress {
    fn classed(&self) -> ClassedObject<'_> {
        ClassedObject::LegacyIngress {
            meta: &self.metadata,
            class_name: self.spec.ingress_class_name.as_deref(),
        }
    }
}

impl ClassedResource for KnativeIngress {
    fn classed(&self) -> ClassedObject<'_> {
        ClassedObject::KnativeIngress {
            meta: &self.metadata,
        }
    }
}

impl ClassedResource for IngressClass {
    fn classed(&self) -> ClassedObject<'_> {
        ClassedObject::IngressClass {
            meta: &self.metadata,
        }
    }
}

impl ClassedResource for ObjectMeta {
    fn classed(&self) -> ClassedObject<'_> {
        ClassedObject::Other { meta: self }
    }
}

/// Untyped objects are dispatched on `apiVersion`/`kind`
impl ClassedResource for DynamicObject {
    fn classed(&self) -> ClassedObject<'_> {
        let meta = &self.metadata;
        let type_meta = self
            .types
            .as_ref()
            .map(|types| (types.api_version.as_str(), types.kind.as_str()));

        match type_meta {
            Some(("networking.k8s.io/v1", "Ingress")) => ClassedObject::Ingress {
                meta,
                class_name: dynamic_spec_class_name(&self.data),
            },
            Some(("networking.k8s.io/v1beta1" | "extensions/v1beta1", "Ingress")) => {
                ClassedObject::LegacyIngress {
                    meta,
                    class_name: dynamic_spec_class_name(&self.data),
                }
            }
            Some(("networking.internal.knative.dev/v1alpha1", "Ingress")) => {
                ClassedObject::KnativeIngress { meta }
            }
            Some(("networking.k8s.io/v1", "IngressClass")) => ClassedObject::IngressClass { meta },
            _ => ClassedObject::Other { meta },
        }
    }
}

/// `spec.ingressClassName` from an untyped body; JSON null counts as unset
fn dynamic_spec_class_name(data: &serde_json::Value) -> Option<&str> {
    data.get("spec")?
        .get("ingressClassName")?
        .as_str()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use k8s_openapi::api::networking::v1::IngressSpec;
    use kube::core::{ApiResource, GroupVersionKind};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn meta_with(annotations: &[(&str, &str)]) -> ObjectMeta {
        ObjectMeta {
            name: Some("demo".to_string()),
            namespace: Some("default".to_string()),
            annotations: Some(
                annotations
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    fn dynamic(group: &str, version: &str, kind: &str, data: serde_json::Value) -> DynamicObject {
        let gvk = GroupVersionKind::gvk(group, version, kind);
        let resource = ApiResource::from_gvk(&gvk);
        let mut obj = DynamicObject::new("demo", &resource).within("default");
        obj.data = data;
        obj
    }

    #[test]
    fn test_ingress_v1_view_carries_spec_class() {
        let ingress = Ingress {
            metadata: meta_with(&[]),
            spec: Some(IngressSpec {
                ingress_class_name: Some("kong".to_string()),
                ..Default::default()
            }),
            status: None,
        };

        let view = ingress.classed();
        assert!(matches!(view, ClassedObject::Ingress { .. }));
        assert_eq!(view.spec_class_name(), Some("kong"));
        assert_eq!(view.kind_label(), "ingress");
    }

    #[test]
    fn test_ingress_without_spec_has_no_class() {
        let ingress = Ingress {
            metadata: meta_with(&[]),
            spec: None,
            status: None,
        };
        assert_eq!(ingress.classed().spec_class_name(), None);
    }

    #[test]
    fn test_empty_spec_class_is_distinct_from_unset() {
        let ingress = Ingress {
            metadata: meta_with(&[]),
            spec: Some(IngressSpec {
                ingress_class_name: Some(String::new()),
                ..Default::default()
            }),
            status: None,
        };
        assert_eq!(ingress.classed().spec_class_name(), Some(""));
    }

    #[test]
    fn test_legacy_ingress_views() {
        let mut networking = NetworkingV1beta1Ingress::new(
            "demo",
            NetworkingV1beta1IngressSpec {
                ingress_class_name: Some("legacy".to_string()),
                ..Default::default()
            },
        );
        networking.metadata.namespace = Some("default".to_string());
        let extensions =
            ExtensionsV1beta1Ingress::new("demo", ExtensionsV1beta1IngressSpec::default());

        assert!(matches!(networking.classed(), ClassedObject::LegacyIngress { .. }));
        assert_eq!(networking.classed().spec_class_name(), Some("legacy"));
        assert!(matches!(extensions.classed(), ClassedObject::LegacyIngress { .. }));
        assert_eq!(extensions.classed().spec_class_name(), None);
    }

    #[test]
    fn test_derived_resource_identities() {
        use kube::Resource;

        assert_eq!(NetworkingV1beta1Ingress::api_version(&()), "networking.k8s.io/v1beta1");
        assert_eq!(ExtensionsV1beta1Ingress::api_version(&()), "extensions/v1beta1");
        assert_eq!(
            KnativeIngress::api_version(&()),
            "networking.internal.knative.dev/v1alpha1"
        );
        for (kind, plural) in [
            (NetworkingV1beta1Ingress::kind(&()), NetworkingV1beta1Ingress::plural(&())),
            (ExtensionsV1beta1Ingress::kind(&()), ExtensionsV1beta1Ingress::plural(&())),
            (KnativeIngress::kind(&()), KnativeIngress::plural(&())),
        ] {
            assert_eq!(kind, "Ingress");
            assert_eq!(plural, "ingresses");
        }
    }

    #[test]
    fn test_knative_ingress_has_no_spec_class() {
        let mut knative = KnativeIngress::new("demo", KnativeIngressSpec::default());
        knative.metadata = meta_with(&[("networking.knative.dev/ingress.class", "kourier")]);

        let view = knative.classed();
        assert!(matches!(view, ClassedObject::KnativeIngress { .. }));
        assert_eq!(view.spec_class_name(), None);
        assert_eq!(
            view.annotation("networking.knative.dev/ingress.class"),
            Some("kourier")
        );
    }

    #[test]
    fn test_missing_annotations_map_reads_as_absent() {
        let meta = ObjectMeta::default();
        let view = meta.classed();
        assert!(matches!(view, ClassedObject::Other { .. }));
        assert!(!view.has_annotation("kubernetes.io/ingress.class"));
    }

    #[test]
    fn test_dynamic_object_dispatch() {
        let v1 = dynamic(
            "networking.k8s.io",
            "v1",
            "Ingress",
            json!({"spec": {"ingressClassName": "kong"}}),
        );
        assert!(matches!(v1.classed(), ClassedObject::Ingress { .. }));
        assert_eq!(v1.classed().spec_class_name(), Some("kong"));

        let legacy = dynamic("extensions", "v1beta1", "Ingress", json!({"spec": {}}));
        assert!(matches!(legacy.classed(), ClassedObject::LegacyIngress { .. }));

        let knative = dynamic(
            "networking.internal.knative.dev",
            "v1alpha1",
            "Ingress",
            json!({}),
        );
        assert!(matches!(knative.classed(), ClassedObject::KnativeIngress { .. }));

        let class = dynamic("networking.k8s.io", "v1", "IngressClass", json!({}));
        assert!(matches!(class.classed(), ClassedObject::IngressClass { .. }));

        let tcp = dynamic("configuration.konghq.com", "v1beta1", "TCPIngress", json!({}));
        assert!(matches!(tcp.classed(), ClassedObject::Other { .. }));
    }

    #[test]
    fn test_dynamic_null_class_name_is_unset() {
        let obj = dynamic(
            "networking.k8s.io",
            "v1",
            "Ingress",
            json!({"spec": {"ingressClassName": null}}),
        );
        assert_eq!(obj.classed().spec_class_name(), None);
    }
}
