use anyhow::Result;
use classgate::apis::ingress::discovery::{resource_kind_exists, DiscoveryMapper, ResourceType};
use classgate::apis::ingress::ingress::IngressReconciler;
use classgate::apis::ingress::resource::KnativeIngress;
use classgate::config::ControllerConfig;
use classgate::error::ClassgateError;
use k8s_openapi::api::networking::v1::Ingress;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Classgate controller
///
/// Watches Ingresses (and optionally Knative Ingresses) and claims those that
/// belong to the configured IngressClass.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (needed for Kubernetes TLS client)
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok(); // Ignore error if already installed

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ControllerConfig::from_env()?;

    info!("Classgate ingress class controller");
    info!("   IngressClass: {}", config.ingress_class_name);
    info!(
        "   Namespace: {}",
        config.watch_namespace.as_deref().unwrap_or("<all>")
    );
    info!(
        "   Checks: annotations={} spec={}",
        config.check_annotations, config.check_spec
    );

    let client = kube::Client::try_default().await?;
    let mut controller_handles: Vec<JoinHandle<()>> = vec![];

    // Ingress controller (networking.k8s.io/v1)
    let ingress_reconciler = IngressReconciler::<Ingress>::new(client.clone(), &config);
    controller_handles.push(tokio::spawn(ingress_reconciler.run()));

    // Knative Ingress controller, only if the CRD is served
    if config.enable_knative {
        let mapper = DiscoveryMapper::new(client.clone());
        let knative = ResourceType::of::<KnativeIngress>();
        let timeout = Duration::from_secs(config.discovery.timeout_secs);

        let installed = tokio::time::timeout(timeout, resource_kind_exists(&mapper, &knative))
            .await
            .map_err(|_| ClassgateError::Timeout(timeout, knative.to_string()))??;

        if installed {
            let knative_reconciler =
                IngressReconciler::<KnativeIngress>::new(client.clone(), &config);
            controller_handles.push(tokio::spawn(knative_reconciler.run()));
        } else {
            warn!("{} is not installed, Knative Ingress support disabled", knative);
        }
    }

    info!("✅ Ingress controllers started ({})", controller_handles.len());
    info!("Press Ctrl-C to exit.");

    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Cleanup: abort controller tasks
    for handle in controller_handles {
        handle.abort();
    }

    Ok(())
}
