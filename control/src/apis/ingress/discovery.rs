//! Resource type existence checks
//!
//! Answers "does the API server serve this group/version/resource?" so the
//! controller only watches CRDs that are installed. A missing mapping is an
//! ordinary `false`; any other discovery failure is surfaced to the caller.

use crate::error::ClassgateError;
use async_trait::async_trait;
use kube::core::{GroupVersion, GroupVersionKind};
use kube::discovery::oneshot;
use kube::{Client, Resource};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// A group/version/resource triple (`resource` is the plural name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceType {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl ResourceType {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }

    /// Resource type of a statically typed kind
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self::new(K::group(&()), K::version(&()), K::plural(&()))
    }

    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::gv(&self.group, &self.version)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}.{}", self.resource, self.version, self.group)
        }
    }
}

/// REST mapping failures
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("no matches for resource {0}")]
    NoMatch(ResourceType),

    #[error("discovery failed: {0}")]
    Discovery(#[from] kube::Error),
}

/// Resolves a resource type to the kind that serves it
#[async_trait]
pub trait RestMapper: Send + Sync {
    async fn kind_for(&self, resource: &ResourceType) -> Result<GroupVersionKind, MappingError>;
}

/// Returns `Ok(false)` only when the mapper reports no match
pub async fn resource_kind_exists<M>(
    mapper: &M,
    resource: &ResourceType,
) -> Result<bool, ClassgateError>
where
    M: RestMapper + ?Sized,
{
    match mapper.kind_for(resource).await {
        Ok(gvk) => {
            debug!("{} is served as kind {}", resource, gvk.kind);
            Ok(true)
        }
        Err(MappingError::NoMatch(_)) => {
            debug!("{} is not served by the API server", resource);
            Ok(false)
        }
        Err(MappingError::Discovery(e)) => Err(ClassgateError::Discovery(e)),
    }
}

/// [`RestMapper`] backed by the API server's discovery endpoints
#[derive(Clone)]
pub struct DiscoveryMapper {
    client: Client,
}

impl DiscoveryMapper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RestMapper for DiscoveryMapper {
    async fn kind_for(&self, resource: &ResourceType) -> Result<GroupVersionKind, MappingError> {
        let group = match oneshot::pinned_group(&self.client, &resource.group_version()).await {
            Ok(group) => group,
            // group/version not served at all
            Err(kube::Error::Api(response)) if response.code == 404 => {
                return Err(MappingError::NoMatch(resource.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        group
            .versioned_resources(&resource.version)
            .into_iter()
            .find(|(api_resource, _)| api_resource.plural == resource.resource)
            .map(|(api_resource, _)| {
                GroupVersionKind::gvk(
                    &api_resource.group,
                    &api_resource.version,
                    &api_resource.kind,
                )
            })
            .ok_or_else(|| MappingError::NoMatch(resource.clone()))
    }
}
