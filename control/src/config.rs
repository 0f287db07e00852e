//! Configuration for the classgate controller
//!
//! Defaults are overridden from `CLASSGATE_*` environment variables.

use crate::error::ClassgateError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Controller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// IngressClass this controller claims
    #[serde(default = "default_ingress_class_name")]
    pub ingress_class_name: String,

    /// Namespace to watch (all namespaces when unset)
    #[serde(default)]
    pub watch_namespace: Option<String>,

    /// Match the legacy `kubernetes.io/ingress.class` annotations
    #[serde(default = "default_true")]
    pub check_annotations: bool,

    /// Match `spec.ingressClassName`
    #[serde(default = "default_true")]
    pub check_spec: bool,

    /// Also watch Knative Ingresses (if the CRD is installed)
    #[serde(default)]
    pub enable_knative: bool,

    /// Discovery configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// API discovery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    /// Upper bound on a single CRD existence probe in seconds (default: 10s)
    #[serde(default = "default_discovery_timeout")]
    pub timeout_secs: u64,
}

fn default_discovery_timeout() -> u64 {
    10
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_discovery_timeout(),
        }
    }
}

fn default_ingress_class_name() -> String {
    "classgate".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ingress_class_name: default_ingress_class_name(),
            watch_namespace: None,
            check_annotations: default_true(),
            check_spec: default_true(),
            enable_knative: false,
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ClassgateError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClassgateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("CLASSGATE_INGRESS_CLASS") {
            if val.is_empty() {
                return Err(ClassgateError::Config(
                    "CLASSGATE_INGRESS_CLASS must not be empty".to_string(),
                ));
            }
            config.ingress_class_name = val;
        }

        if let Some(val) = lookup("CLASSGATE_WATCH_NAMESPACE") {
            config.watch_namespace = Some(val).filter(|ns| !ns.is_empty());
        }

        if let Some(val) = lookup("CLASSGATE_CHECK_ANNOTATIONS") {
            config.check_annotations = parse_var("CLASSGATE_CHECK_ANNOTATIONS", &val)?;
        }

        if let Some(val) = lookup("CLASSGATE_CHECK_SPEC") {
            config.check_spec = parse_var("CLASSGATE_CHECK_SPEC", &val)?;
        }

        if let Some(val) = lookup("CLASSGATE_ENABLE_KNATIVE") {
            config.enable_knative = parse_var("CLASSGATE_ENABLE_KNATIVE", &val)?;
        }

        if let Some(val) = lookup("CLASSGATE_DISCOVERY_TIMEOUT_SECS") {
            config.discovery.timeout_secs = parse_var("CLASSGATE_DISCOVERY_TIMEOUT_SECS", &val)?;
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ClassgateError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ClassgateError::Config(format!("Invalid {} '{}': {}", key, value, e)))
}
