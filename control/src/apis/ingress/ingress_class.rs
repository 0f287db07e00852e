//! IngressClass lookup
//!
//! Whether our class is the cluster default is mutable cluster state, so it
//! is read fresh for every decision that needs it.

use super::class_matcher::is_default_ingress_class;
use k8s_openapi::api::networking::v1::IngressClass;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use tracing::{debug, warn};

/// Resolves the default flag for one IngressClass
#[derive(Clone)]
pub struct IngressClassResolver {
    client: Client,
    class_name: String,
}

impl IngressClassResolver {
    pub fn new(client: Client, class_name: impl Into<String>) -> Self {
        Self {
            client,
            class_name: class_name.into(),
        }
    }

    /// Is our IngressClass currently marked as the cluster default?
    ///
    /// A missing IngressClass is not the default.
    pub async fn is_default(&self) -> Result<bool, kube::Error> {
        let api: Api<IngressClass> = Api::all(self.client.clone());
        let classes = api.list(&ListParams::default()).await?;
        let defaults = default_class_names(&classes.items);

        if defaults.len() > 1 {
            warn!(
                "Multiple default IngressClasses found: {}",
                defaults.join(", ")
            );
        }

        let is_default = defaults.iter().any(|name| *name == self.class_name);
        debug!("IngressClass {} default={}", self.class_name, is_default);
        Ok(is_default)
    }
}

/// Names of all IngressClasses annotated as default
pub fn default_class_names(classes: &[IngressClass]) -> Vec<String> {
    classes
        .iter()
        .filter(|class| is_default_ingress_class(*class))
        .map(|class| class.name_any())
        .collect()
}
