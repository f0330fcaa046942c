//! Kubernetes-backed `ClusterStatusSource`.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use kubepulse_core::*;

use crate::convert::{node_status, pod_status};

/// Reads node and pod status from the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStatusSource {
    client: Client,
    /// Deadline for each list request.
    timeout: Duration,
}

impl KubeStatusSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Build a client from an explicit kubeconfig, or from the default
    /// chain (KUBECONFIG, ~/.kube/config, in-cluster service account).
    pub async fn connect(kubeconfig: Option<&Path>, timeout: Duration) -> anyhow::Result<Self> {
        let client = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("reading kubeconfig {}", path.display()))?;
                let config =
                    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                        .await
                        .context("loading kubeconfig")?;
                Client::try_from(config).context("creating Kubernetes client")?
            }
            None => Client::try_default()
                .await
                .context("creating Kubernetes client from default config")?,
        };

        let version = tokio::time::timeout(timeout, client.apiserver_version())
            .await
            .map_err(|_| anyhow::anyhow!("API server did not answer within {timeout:?}"))?
            .context("querying API server version")?;
        info!(version = %version.git_version, "connected to Kubernetes cluster");

        Ok(Self::new(client, timeout))
    }

    /// List every object of kind `K` across all namespaces, bounded by the
    /// configured timeout.
    async fn list_all<K>(&self, resource: Resource) -> Result<Vec<K>, QueryError>
    where
        K: kube::Resource + Clone + DeserializeOwned + fmt::Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let list = tokio::time::timeout(self.timeout, api.list(&ListParams::default()))
            .await
            .map_err(|_| QueryError::Timeout {
                resource,
                timeout: self.timeout,
            })?
            .map_err(|e| query_error(resource, e))?;
        debug!(%resource, count = list.items.len(), "listed");
        Ok(list.items)
    }
}

#[async_trait]
impl ClusterStatusSource for KubeStatusSource {
    async fn list_nodes(&self) -> Result<Vec<NodeStatus>, QueryError> {
        let nodes: Vec<Node> = self.list_all(Resource::Nodes).await?;
        Ok(nodes.iter().map(node_status).collect())
    }

    async fn list_pods(&self) -> Result<Vec<PodStatus>, QueryError> {
        let pods: Vec<Pod> = self.list_all(Resource::Pods).await?;
        Ok(pods.iter().map(pod_status).collect())
    }
}

fn query_error(resource: Resource, e: kube::Error) -> QueryError {
    match e {
        kube::Error::SerdeError(e) => QueryError::Malformed {
            resource,
            message: e.to_string(),
        },
        other => QueryError::Api {
            resource,
            message: other.to_string(),
        },
    }
}
