//! Backend client. The trait keeps the session testable with a stub;
//! the HTTP implementation is the production path.

use std::future::Future;
use std::time::Duration;

use crate::config::{INTERVIEW_ENDPOINT, TRIAGE_ENDPOINT};

use super::types::{
    InterviewRequest, InterviewResponse, RemoteTriageRequest, RemoteTriageResponse,
};
use super::RemoteError;

/// A remote reasoning backend.
pub trait TriageBackend: Send + Sync {
    /// Full-case triage: narrative in, ranked differentials out.
    fn triage(
        &self,
        request: RemoteTriageRequest,
    ) -> impl Future<Output = Result<RemoteTriageResponse, RemoteError>> + Send;

    /// One step of the sequential interview.
    fn interview(
        &self,
        request: InterviewRequest,
    ) -> impl Future<Output = Result<InterviewResponse, RemoteError>> + Send;
}

/// Production backend over HTTP.
pub struct HttpTriageBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTriageBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, RemoteError>
    where
        Req: serde::Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

impl TriageBackend for HttpTriageBackend {
    async fn triage(
        &self,
        request: RemoteTriageRequest,
    ) -> Result<RemoteTriageResponse, RemoteError> {
        tracing::debug!(url = %self.base_url, "sending remote triage request");
        self.post_json(TRIAGE_ENDPOINT, &request).await
    }

    async fn interview(
        &self,
        request: InterviewRequest,
    ) -> Result<InterviewResponse, RemoteError> {
        tracing::debug!(url = %self.base_url, goal = ?request.goal, "sending interview request");
        self.post_json(INTERVIEW_ENDPOINT, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let backend =
            HttpTriageBackend::new("http://localhost:8787/", Duration::from_secs(120)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8787");
    }

    #[test]
    fn backend_trait_is_object_free_but_generic_friendly() {
        fn _accepts_backend<B: TriageBackend>(_b: &B) {}
        let _: fn(&HttpTriageBackend) = _accepts_backend;
    }
}
