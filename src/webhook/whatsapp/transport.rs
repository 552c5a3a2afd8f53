//! HTTP transport used by the WhatsApp client
//!
//! The client only needs "POST these JSON bytes with this bearer token and
//! give me back the status and raw body". Keeping that behind a trait lets the
//! client run against an in-memory transport in tests.

use async_trait::async_trait;
use std::time::Duration;

/// Status code and untouched body of a Graph API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `body` as `application/json` to `url`
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: Vec<u8>,
    ) -> anyhow::Result<RawResponse>;
}

pub type ImplHttpTransport = Box<dyn HttpTransport>;

/// [`HttpTransport`] backed by a `reqwest` client with a request timeout
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer_token: &str,
        body: Vec<u8>,
    ) -> anyhow::Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
pub mod stub {
    //! In-memory transports for tests

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub url: String,
        pub bearer_token: String,
        pub body: serde_json::Value,
    }

    /// Answers every call with the same canned response and records the call
    #[derive(Clone)]
    pub struct StubTransport {
        pub response: RawResponse,
        pub calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    impl StubTransport {
        pub fn new(status: u16, body: &str) -> Self {
            Self {
                response: RawResponse {
                    status,
                    body: body.to_string(),
                },
                calls: Arc::default(),
            }
        }

        pub fn ok() -> Self {
            Self::new(
                200,
                r#"{"messaging_product":"whatsapp","contacts":[{"input":"16505551234","wa_id":"16505551234"}],"messages":[{"id":"wamid.OK"}]}"#,
            )
        }

        pub fn recorded(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn post_json(
            &self,
            url: &str,
            bearer_token: &str,
            body: Vec<u8>,
        ) -> anyhow::Result<RawResponse> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                bearer_token: bearer_token.to_string(),
                body: serde_json::from_slice(&body)?,
            });
            Ok(self.response.clone())
        }
    }

    /// Fails every call as if the connection could not be established;
    /// counts how many calls were attempted
    #[derive(Clone, Default)]
    pub struct FailingTransport {
        pub attempts: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl HttpTransport for FailingTransport {
        async fn post_json(&self, _: &str, _: &str, _: Vec<u8>) -> anyhow::Result<RawResponse> {
            *self.attempts.lock().unwrap() += 1;
            anyhow::bail!("connection refused")
        }
    }

    /// Never answers; counts how many calls were started
    #[derive(Clone, Default)]
    pub struct PendingTransport {
        pub started: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl HttpTransport for PendingTransport {
        async fn post_json(&self, _: &str, _: &str, _: Vec<u8>) -> anyhow::Result<RawResponse> {
            *self.started.lock().unwrap() += 1;
            std::future::pending().await
        }
    }
}
