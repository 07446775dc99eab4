//! HTTP prober for the videobridge statistics endpoint.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::config::ColibriConfig;
use crate::stats::StatsDocument;

/// Probe failure taxonomy.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Connection, TLS, or timeout failure talking to the videobridge.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not a valid statistics document.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Issues single GET requests against the configured statistics URL.
pub struct Prober {
    client: Client,
    url: String,
}

impl Prober {
    /// Build a prober from the upstream endpoint configuration.
    pub fn new(config: &ColibriConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.max_idle_connections)
            .timeout(Duration::from_secs(config.timeout_secs))
            // Internal videobridge deployments often run on self-signed
            // certificates; validation is skipped only when configured.
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Fetch and decode one statistics document.
    ///
    /// The full body is read before decoding; a malformed payload yields a
    /// [`ProbeError::Decode`] and no partial document. No retry happens
    /// here, that is the calling strategy's business.
    pub async fn probe(&self) -> Result<StatsDocument, ProbeError> {
        let response = self.client.get(&self.url).send().await?;
        let body = response.bytes().await?;
        let doc = serde_json::from_slice(&body)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::routing::get;

    /// Spin up a local stub videobridge serving a fixed stats body.
    async fn serve_stats(body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route("/colibri/stats", get(move || async move { body }));

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}/colibri/stats", addr)
    }

    fn config_for(url: String) -> ColibriConfig {
        ColibriConfig {
            url,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_probe_decodes_document() {
        let url = serve_stats(
            r#"{"threads": 4, "conferences": 2, "participants": 9,
                "conference_sizes": [0, 1, 1, 0]}"#,
        )
        .await;

        let prober = Prober::new(&config_for(url)).unwrap();
        let doc = prober.probe().await.unwrap();

        assert_eq!(doc.threads, 4.0);
        assert_eq!(doc.conferences, 2.0);
        assert_eq!(doc.participants, 9.0);
        assert_eq!(doc.conference_sizes, vec![0, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_probe_malformed_body_is_decode_error() {
        let url = serve_stats("this is not json").await;

        let prober = Prober::new(&config_for(url)).unwrap();
        let err = prober.probe().await.unwrap_err();

        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_probe_schema_mismatch_is_decode_error() {
        let url = serve_stats(r#"{"conference_sizes": "surprise"}"#).await;

        let prober = Prober::new(&config_for(url)).unwrap();
        let err = prober.probe().await.unwrap_err();

        assert!(matches!(err, ProbeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_probe_refused_connection_is_transport_error() {
        // Bind and immediately drop to find a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = Prober::new(&config_for(format!("http://{}/colibri/stats", addr))).unwrap();
        let err = prober.probe().await.unwrap_err();

        assert!(matches!(err, ProbeError::Transport(_)));
    }
}
