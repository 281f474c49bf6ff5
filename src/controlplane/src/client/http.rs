/// HTTP implementation of `ClusterClient` against a Kubernetes-style API.
use super::{ClientError, ClusterClient, ResourceKind, ResourceManifest, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub struct HttpClusterClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClusterClient {
    /// Build a client for the given API endpoint. `insecure` skips TLS
    /// verification for clusters with self-signed certificates.
    pub fn new(endpoint: impl Into<String>, token: Option<String>, insecure: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = endpoint.into();
        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn object_url(&self, kind: ResourceKind, namespace: &str, name: &str) -> String {
        format!(
            "{}{}/namespaces/{}/{}/{}",
            self.base_url,
            kind.api_prefix(),
            namespace,
            kind.collection(),
            name
        )
    }

    fn collection_url(&self, kind: ResourceKind, namespace: &str) -> String {
        format!(
            "{}{}/namespaces/{}/{}",
            self.base_url,
            kind.api_prefix(),
            namespace,
            kind.collection()
        )
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Replace an existing object: fetch its resourceVersion and PUT the
    /// desired spec carrying it, as the API requires for updates.
    async fn replace(&self, manifest: &ResourceManifest) -> Result<()> {
        let url = self.object_url(manifest.kind, &manifest.namespace, &manifest.name);

        let live: Value = self
            .request(Method::GET, &url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut desired = manifest.body.clone();
        if let Some(version) = live.pointer("/metadata/resourceVersion") {
            if let Some(metadata) = desired.get_mut("metadata").and_then(Value::as_object_mut) {
                metadata.insert("resourceVersion".to_string(), version.clone());
            }
        }

        let response = self
            .request(Method::PUT, &url)
            .json(&desired)
            .send()
            .await?;
        check_response(response, manifest.kind, &manifest.name).await
    }
}

#[async_trait]
impl ClusterClient for HttpClusterClient {
    async fn apply(&self, manifest: &ResourceManifest) -> Result<()> {
        let url = self.collection_url(manifest.kind, &manifest.namespace);
        let response = self
            .request(Method::POST, &url)
            .json(&manifest.body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(
                "[ClusterClient] {} {}/{} exists, replacing",
                manifest.kind,
                manifest.namespace,
                manifest.name
            );
            return self.replace(manifest).await;
        }

        check_response(response, manifest.kind, &manifest.name).await
    }

    async fn delete(&self, kind: ResourceKind, name: &str, namespace: &str) -> Result<()> {
        let url = self.object_url(kind, namespace, name);
        let response = self.request(Method::DELETE, &url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(
                "[ClusterClient] {} {}/{} already absent",
                kind,
                namespace,
                name
            );
            return Ok(());
        }

        check_response(response, kind, name).await
    }

    async fn count_ready(&self, label_selector: &str, namespace: &str) -> Result<usize> {
        let url = format!("{}/api/v1/namespaces/{}/pods", self.base_url, namespace);
        let list: Value = self
            .request(Method::GET, &url)
            .query(&[("labelSelector", label_selector)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let ready = list
            .get("items")
            .and_then(Value::as_array)
            .map(|pods| pods.iter().filter(|pod| pod_is_ready(pod)).count())
            .unwrap_or(0);

        Ok(ready)
    }
}

/// A pod is ready when its Ready condition reports "True".
fn pod_is_ready(pod: &Value) -> bool {
    pod.pointer("/status/conditions")
        .and_then(Value::as_array)
        .map(|conditions| {
            conditions.iter().any(|condition| {
                condition.get("type").and_then(Value::as_str) == Some("Ready")
                    && condition.get("status").and_then(Value::as_str) == Some("True")
            })
        })
        .unwrap_or(false)
}

async fn check_response(response: reqwest::Response, kind: ResourceKind, name: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        kind: kind.as_str().to_string(),
        name: name.to_string(),
        status: status.as_u16(),
        message,
    })
}
