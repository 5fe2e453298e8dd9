//! Interception dispatcher.
//!
//! [`FallbackClient`] wraps any [`HttpTransport`] and keeps its call contract.
//! Successful calls pass through untouched. When the backend is unreachable,
//! or answers 404 on a recognized booking/payment path, the request is
//! classified and answered by a synthetic handler against the local record
//! store. Everything else is returned to the caller as it came.
//!
//! There is exactly one synthesis attempt per failed call and no retry.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use configs::{FallbackConfig, UnclassifiedPolicy};
use models::{ApiRequest, ApiResponse, Endpoint};
use service::handlers::{placeholder_response, SyntheticHandlers};
use service::{RecordStore, ServiceError};
use tracing::{debug, error, warn};

use crate::classifier::classify;
use crate::observability::{
    MASKED_FAILURES_TOTAL, PROPAGATED_TOTAL, REQUESTS_TOTAL, REQUEST_DURATION, SYNTHESIZED_TOTAL,
};
use crate::transport::{HttpTransport, TransportError};

/// How a failed call is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response; the transport could not connect.
    Unreachable,
    /// 404 from the backend on a recognized path.
    NotFoundEligible,
    /// Anything else; surfaced unchanged.
    Other,
}

impl FailureKind {
    fn label(&self) -> &'static str {
        match self {
            FailureKind::Unreachable => "unreachable",
            FailureKind::NotFoundEligible => "not_found",
            FailureKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    pub enabled: bool,
    pub unclassified: UnclassifiedPolicy,
    /// A 404 is only answered locally when the request path contains one of these.
    pub recognized_paths: Vec<String>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::from(&FallbackConfig::default())
    }
}

impl From<&FallbackConfig> for FallbackPolicy {
    fn from(cfg: &FallbackConfig) -> Self {
        Self {
            enabled: cfg.enabled,
            unclassified: cfg.unclassified,
            recognized_paths: cfg.recognized_paths.clone(),
        }
    }
}

impl FallbackPolicy {
    pub fn classify_failure(&self, err: &TransportError, path: &str) -> FailureKind {
        match err {
            TransportError::Unreachable(_) => FailureKind::Unreachable,
            TransportError::Status(resp)
                if resp.status == 404 && self.recognized_paths.iter().any(|p| path.contains(p.as_str())) =>
            {
                FailureKind::NotFoundEligible
            }
            _ => FailureKind::Other,
        }
    }
}

/// Decorator that answers eligible failures locally.
pub struct FallbackClient<T> {
    inner: T,
    handlers: SyntheticHandlers,
    policy: FallbackPolicy,
}

impl<T: HttpTransport> FallbackClient<T> {
    pub fn new(inner: T, store: Arc<RecordStore>, policy: FallbackPolicy) -> Self {
        Self { inner, handlers: SyntheticHandlers::new(store), policy }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        self.handlers.store()
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn recover(&self, req: &ApiRequest, err: TransportError) -> Result<ApiResponse, TransportError> {
        let kind = self.policy.classify_failure(&err, &req.path);
        if !self.policy.enabled || kind == FailureKind::Other {
            PROPAGATED_TOTAL.with_label_values(&["other"]).inc();
            return Err(err);
        }
        MASKED_FAILURES_TOTAL.with_label_values(&[kind.label()]).inc();

        let endpoint = classify(req.method, &req.path);
        debug!(method = %req.method, path = %req.path, failure = kind.label(), handler = %endpoint, "classified failed request");
        if !endpoint.is_classified() {
            return self.unclassified(req, err);
        }

        let payload = match req.json_body() {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %req.path, error = %e, "request body is not JSON; surfacing original error");
                PROPAGATED_TOTAL.with_label_values(&["malformed"]).inc();
                return Err(err);
            }
        };

        match self.handlers.handle(&endpoint, payload).await {
            Ok(Some(resp)) => {
                warn!(
                    method = %req.method,
                    path = %req.path,
                    failure = kind.label(),
                    handler = %endpoint,
                    status = resp.status,
                    original = %err,
                    "backend unavailable; answered with a local response"
                );
                SYNTHESIZED_TOTAL.with_label_values(&[endpoint.name()]).inc();
                Ok(resp)
            }
            Ok(None) => self.unclassified(req, err),
            Err(ServiceError::Validation(msg)) => {
                warn!(path = %req.path, handler = %endpoint, reason = %msg, "payload rejected; surfacing original error");
                PROPAGATED_TOTAL.with_label_values(&["malformed"]).inc();
                Err(err)
            }
            Err(e) => {
                error!(path = %req.path, handler = %endpoint, error = %e, "local storage failed while synthesizing");
                PROPAGATED_TOTAL.with_label_values(&["storage"]).inc();
                Err(TransportError::Storage(e))
            }
        }
    }

    fn unclassified(&self, req: &ApiRequest, err: TransportError) -> Result<ApiResponse, TransportError> {
        match self.policy.unclassified {
            UnclassifiedPolicy::Placeholder => {
                warn!(method = %req.method, path = %req.path, original = %err, "no local handler; answering with placeholder");
                SYNTHESIZED_TOTAL.with_label_values(&[Endpoint::Unclassified.name()]).inc();
                placeholder_response().map_err(TransportError::Storage)
            }
            UnclassifiedPolicy::Propagate => {
                debug!(method = %req.method, path = %req.path, "no local handler; surfacing original error");
                PROPAGATED_TOTAL.with_label_values(&["unclassified"]).inc();
                Err(err)
            }
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for FallbackClient<T> {
    async fn send(&self, req: &ApiRequest) -> Result<ApiResponse, TransportError> {
        REQUESTS_TOTAL.inc();
        let started = Instant::now();
        let result = match self.inner.send(req).await {
            Ok(resp) => Ok(resp),
            Err(err) => self.recover(req, err).await,
        };
        REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
        result
    }
}
