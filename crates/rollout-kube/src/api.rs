//! Cluster control through the Kubernetes API
//!
//! Same contract as the kubectl adapter, without needing kubectl installed.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use std::path::Path;

use crate::collaborator::ClusterControl;
use crate::error::{OrchestrationError, Result};

/// Namespace and context queries against the API server
#[derive(Clone)]
pub struct KubeApiCluster {
    client: kube::Client,
    context: String,
}

impl KubeApiCluster {
    /// Connect using an explicit kubeconfig or the default lookup
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => Kubeconfig::read_from(path),
            None => Kubeconfig::read(),
        }
        .map_err(|e| OrchestrationError::Connectivity(e.to_string()))?;

        let context = config.current_context.clone().ok_or_else(|| {
            OrchestrationError::Connectivity("kubeconfig has no current context".to_string())
        })?;

        let client_config =
            kube::Config::from_custom_kubeconfig(config, &KubeConfigOptions::default())
                .await
                .map_err(|e| OrchestrationError::Connectivity(e.to_string()))?;
        let client = kube::Client::try_from(client_config)?;

        Ok(Self { client, context })
    }

    /// Wrap an existing client
    pub fn with_client(client: kube::Client, context: impl Into<String>) -> Self {
        Self {
            client,
            context: context.into(),
        }
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl ClusterControl for KubeApiCluster {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(self.namespaces().get_opt(name).await?.is_some())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        match self
            .namespaces()
            .create(&PostParams::default(), &namespace)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = OrchestrationError::from(e);
                // Created concurrently by someone else
                if err.is_conflict() { Ok(()) } else { Err(err) }
            }
        }
    }

    async fn current_context(&self) -> Result<String> {
        self.client
            .apiserver_version()
            .await
            .map_err(|e| OrchestrationError::Connectivity(e.to_string()))?;
        Ok(self.context.clone())
    }
}
