//! Resilient HTTP client.
//!
//! # Responsibilities
//! - Send a request with a per-attempt deadline
//! - Treat non-2xx responses as failures
//! - Retry with linear backoff
//! - Park a replay of the call in the failed operation queue when the
//!   retries run out while offline

use std::sync::Arc;

use futures_util::future::BoxFuture;
use reqwest::{Request, Response};

use crate::config::{FetchConfig, SiteConfig};
use crate::errors::api::{ApiErrorHandler, ErrorInfo};
use crate::errors::reporter::ErrorReporter;
use crate::fetch::error::FetchError;
use crate::fetch::options::{FetchOptions, RequestBody};
use crate::network::connectivity::ConnectivityWatch;
use crate::observability::metrics;
use crate::resilience::queue::{BoxError, FailedOperationQueue, Operation, OperationFuture};
use crate::resilience::retries::retry_if;
use crate::resilience::timeouts::with_timeout;

/// Context object for all network work: HTTP client, replay queue,
/// connectivity and error handling.
#[derive(Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    queue: Arc<FailedOperationQueue>,
    connectivity: ConnectivityWatch,
    errors: ApiErrorHandler,
    defaults: FetchConfig,
}

impl SiteClient {
    pub fn new(
        config: &SiteConfig,
        queue: Arc<FailedOperationQueue>,
        connectivity: ConnectivityWatch,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            queue,
            errors: ApiErrorHandler::new(reporter, connectivity.clone(), config.user_agent.clone()),
            connectivity,
            defaults: config.fetch.clone(),
        })
    }

    pub fn queue(&self) -> &Arc<FailedOperationQueue> {
        &self.queue
    }

    pub fn connectivity(&self) -> &ConnectivityWatch {
        &self.connectivity
    }

    pub fn errors(&self) -> &ApiErrorHandler {
        &self.errors
    }

    pub fn defaults(&self) -> &FetchConfig {
        &self.defaults
    }

    /// Options pre-filled from the configured defaults.
    pub fn options(&self) -> FetchOptions {
        FetchOptions::from_config(&self.defaults)
    }

    /// Fetch `resource`, retrying per `options`.
    ///
    /// When every attempt fails while offline, a replay of this exact call is
    /// queued under `Fetch: <resource>` before the error is returned. A request
    /// that cannot be built fails after one attempt and is never queued.
    pub async fn fetch(&self, resource: &str, options: FetchOptions) -> Result<Response, FetchError> {
        let policy = options.retry_policy();
        let options_ref = &options;

        let result = retry_if(
            &policy,
            move |attempt| self.attempt(resource, options_ref, attempt),
            FetchError::is_retryable,
        )
        .await;

        match result {
            Ok(response) => Ok(response),
            Err(e) => {
                let queued = e.is_retryable() && !self.connectivity.is_online();
                if queued {
                    self.queue
                        .enqueue(self.replay_operation(resource, options), format!("Fetch: {}", resource));
                }
                metrics::record_fetch_exhausted(queued);
                tracing::error!(resource, queued, error = %e, "Fetch failed after all attempts");
                Err(e)
            }
        }
    }

    /// Fetch with the configured defaults.
    pub async fn get(&self, resource: &str) -> Result<Response, FetchError> {
        self.fetch(resource, self.options()).await
    }

    /// Report a failed call; see [`ApiErrorHandler::handle`].
    pub fn handle_api_error(
        &self,
        error: &(dyn std::error::Error + 'static),
        context: &str,
        show_to_user: bool,
    ) -> ErrorInfo {
        self.errors.handle(error, context, show_to_user)
    }

    async fn attempt(
        &self,
        resource: &str,
        options: &FetchOptions,
        attempt: u32,
    ) -> Result<Response, FetchError> {
        let outcome = match self.build_request(resource, options) {
            Ok(request) => match with_timeout(options.timeout, self.http.execute(request)).await {
                Err(timed_out) => Err(FetchError::Timeout {
                    after: timed_out.after,
                }),
                Ok(Err(e)) => Err(FetchError::from(e)),
                Ok(Ok(response)) => {
                    let status = response.status();
                    if status.is_success() {
                        Ok(response)
                    } else {
                        Err(FetchError::Status {
                            status: status.as_u16(),
                            reason: status.canonical_reason().unwrap_or_default().to_string(),
                        })
                    }
                }
            },
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(response) => {
                tracing::debug!(resource, attempt, status = %response.status(), "Fetch succeeded");
                metrics::record_fetch_attempt("ok");
            }
            Err(e) => {
                tracing::warn!(resource, attempt, error = %e, "Fetch attempt failed");
                metrics::record_fetch_attempt(e.outcome_label());
            }
        }

        outcome
    }

    fn build_request(&self, resource: &str, options: &FetchOptions) -> Result<Request, FetchError> {
        let mut builder = self.http.request(options.method.clone(), resource);

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &options.body {
            None => builder,
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes.clone()),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            Some(RequestBody::Json(value)) => builder.json(value),
        };

        builder
            .build()
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))
    }

    fn replay_operation(&self, resource: &str, options: FetchOptions) -> Operation {
        let client = self.clone();
        let resource = resource.to_string();
        Arc::new(move || replay_fetch(client.clone(), resource.clone(), options.clone()))
    }
}

fn replay_fetch(client: SiteClient, resource: String, options: FetchOptions) -> OperationFuture {
    let replay: BoxFuture<'static, Result<(), BoxError>> = Box::pin(async move {
        client
            .fetch(&resource, options)
            .await
            .map(|_| ())
            .map_err(|e| -> BoxError { Box::new(e) })
    });
    replay
}
