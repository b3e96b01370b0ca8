use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// Registration payload sent to the proxy on startup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Registration {
    /// Human-readable name for the application.
    pub name: String,
    /// Callback URL on which forwarded requests will be received.
    pub callback: String,
}

pub struct ProxyClient {
    client: Client,
    proxy_url: String,
}

impl ProxyClient {
    pub fn new(proxy_url: &str) -> Self {
        Self {
            client: Client::new(),
            proxy_url: proxy_url.to_string(),
        }
    }

    /// Register an upstream with the proxy. Registering an existing name
    /// replaces its callback.
    pub async fn register(
        &self,
        name: &str,
        callback: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let resp = self
            .client
            .put(format!("{}/register", self.proxy_url))
            .json(&Registration {
                name: name.to_string(),
                callback: callback.to_string(),
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(format!("Proxy returned error status {}: {}", status, text).into());
        }

        Ok(())
    }

    /// Perform a request through the proxy (fanned out to every upstream).
    pub async fn proxy_get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}{}", self.proxy_url, path))
            .send()
            .await
    }
}
