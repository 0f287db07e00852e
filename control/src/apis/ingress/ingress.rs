//! Ingress watcher
//!
//! Watches Ingress-like resources, runs every event through the class filter
//! and claims the objects that belong to our IngressClass.
//!
//! Watch events carry only the current object, so a reflector store keeps the
//! last seen snapshot: an `Apply` for an object already in the store is an
//! update from that snapshot.

use super::class_matcher::matches_ingress_class_name;
use super::ingress_class::IngressClassResolver;
use super::predicate::{ClassPredicate, ResourceEvent};
use super::resource::ClassedResource;
use crate::apis::metrics::{record_filter_decision, record_ingress_reconciliation};
use crate::config::ControllerConfig;
use crate::error::ClassgateError;
use futures::StreamExt;
use k8s_openapi::NamespaceResourceScope;
use kube::api::Api;
use kube::runtime::reflector::{self, ObjectRef, Store};
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reconciliation outcome for a single object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Claimed,
    Ignored,
}

impl Claim {
    pub fn as_str(&self) -> &'static str {
        match self {
            Claim::Claimed => "claimed",
            Claim::Ignored => "ignored",
        }
    }
}

/// Decide ownership once the default flag is known
pub fn claim_for<R>(obj: &R, class_name: &str, is_default: bool) -> Claim
where
    R: ClassedResource + ?Sized,
{
    if matches_ingress_class_name(obj, class_name, is_default) {
        Claim::Claimed
    } else {
        Claim::Ignored
    }
}

/// Last stored snapshot of the object an `Apply` event is about
///
/// Must be called before the event is applied to the store.
pub fn previous_snapshot<K>(store: &Store<K>, event: &watcher::Event<K>) -> Option<Arc<K>>
where
    K: Resource<DynamicType = ()> + Clone + 'static,
{
    match event {
        watcher::Event::Apply(obj) => store.get(&ObjectRef::from_obj(obj)),
        _ => None,
    }
}

/// Map a watch event onto the filter's event model
///
/// `Apply` is an update when a previous snapshot exists and a create
/// otherwise. Objects replayed by the initial list or a relist are generic.
pub fn resource_event<'a, K>(
    event: &'a watcher::Event<K>,
    previous: Option<&'a K>,
) -> Option<ResourceEvent<'a, K>> {
    match event {
        watcher::Event::Apply(obj) => Some(match previous {
            Some(old) => ResourceEvent::Update { old, new: obj },
            None => ResourceEvent::Create(obj),
        }),
        watcher::Event::InitApply(obj) => Some(ResourceEvent::Generic(obj)),
        watcher::Event::Delete(obj) => Some(ResourceEvent::Delete(obj)),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}

/// Ingress reconciler, generic over the Ingress schema being watched
pub struct IngressReconciler<K> {
    client: Client,
    namespace: Option<String>,
    predicate: ClassPredicate,
    classes: IngressClassResolver,
    _kind: PhantomData<fn() -> K>,
}

impl<K> IngressReconciler<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ClassedResource
        + Clone
        + DeserializeOwned
        + Debug
        + Send
        + Sync
        + 'static,
{
    pub fn new(client: Client, config: &ControllerConfig) -> Self {
        Self {
            classes: IngressClassResolver::new(client.clone(), &config.ingress_class_name),
            client,
            namespace: config.watch_namespace.clone(),
            predicate: ClassPredicate::new(
                &config.ingress_class_name,
                config.check_annotations,
                config.check_spec,
            ),
            _kind: PhantomData,
        }
    }

    fn api(&self) -> Api<K> {
        match &self.namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    /// Start the watch loop; returns only when the watch stream ends
    ///
    /// Watch errors are logged and the watcher backs off and retries.
    pub async fn run(self) {
        let (store, mut writer) = reflector::store::<K>();
        let mut events = watcher(self.api(), watcher::Config::default())
            .default_backoff()
            .boxed();

        info!(
            "Starting {} watcher ({}) for IngressClass {}",
            K::kind(&()),
            K::api_version(&()),
            self.predicate.class_name()
        );

        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    let previous = previous_snapshot(&store, &event);
                    if let Some(resource_event) = resource_event(&event, previous.as_deref()) {
                        self.dispatch(resource_event).await;
                    }
                    writer.apply_watcher_event(&event);
                }
                Err(e) => {
                    warn!("{} watcher error: {}", K::kind(&()), e);
                }
            }
        }

        warn!("{} watch stream ended", K::kind(&()));
    }

    async fn dispatch(&self, event: ResourceEvent<'_, K>) {
        let obj = event.object();
        let namespace = obj.namespace().unwrap_or_else(|| "default".to_string());
        let name = obj.name_any();

        let accepted = self.predicate.evaluate(&event);
        record_filter_decision(obj.classed().kind_label(), event.name(), accepted);

        if !accepted {
            debug!(
                "{} {}/{} ({}) is not for IngressClass {}, skipping",
                K::kind(&()),
                namespace,
                name,
                event.name(),
                self.predicate.class_name()
            );
            return;
        }

        if matches!(event, ResourceEvent::Delete(_)) {
            info!("{} {}/{} deleted, releasing", K::kind(&()), namespace, name);
            return;
        }

        let start = Instant::now();
        let result = match self.reconcile(obj).await {
            Ok(claim) => claim.as_str(),
            Err(e) => {
                warn!(
                    "Failed to reconcile {} {}/{}: {}",
                    K::kind(&()),
                    namespace,
                    name,
                    e
                );
                "error"
            }
        };
        record_ingress_reconciliation(&namespace, start.elapsed().as_secs_f64(), result);
    }

    /// Settle class membership, resolving default-class ownership live
    async fn reconcile(&self, obj: &K) -> Result<Claim, ClassgateError> {
        let is_default = self.classes.is_default().await?;
        let claim = claim_for(obj, self.predicate.class_name(), is_default);

        match claim {
            Claim::Claimed => info!(
                "{} {}/{} belongs to IngressClass {} (default={})",
                K::kind(&()),
                obj.namespace().unwrap_or_default(),
                obj.name_any(),
                self.predicate.class_name(),
                is_default
            ),
            Claim::Ignored => debug!(
                "{} {}/{} does not belong to IngressClass {} (default={}), ignoring",
                K::kind(&()),
                obj.namespace().unwrap_or_default(),
                obj.name_any(),
                self.predicate.class_name(),
                is_default
            ),
        }

        Ok(claim)
    }
}
