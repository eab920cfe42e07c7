//! Form submission with error handling.

use std::time::Duration;

use reqwest::Method;

use crate::errors::reporter::AlertKind;
use crate::fetch::client::SiteClient;
use crate::fetch::error::FetchError;
use crate::fetch::options::RequestBody;

#[derive(Debug, Clone)]
pub struct FormOptions {
    /// Per-attempt deadline; `None` uses the configured form timeout.
    pub timeout: Option<Duration>,
    pub success_message: String,
    /// Whether the caller should clear the form after success.
    pub reset_on_success: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            success_message: "Form submitted successfully!".to_string(),
            reset_on_success: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormOutcome {
    /// Decoded JSON reply.
    pub reply: serde_json::Value,
    /// The form should be reset.
    pub reset: bool,
}

impl SiteClient {
    /// Submit url-encoded `fields` to `action` through the resilient fetch path.
    ///
    /// `method` defaults to POST. On success a success banner is shown; on
    /// failure the error is reported as a "Form submission" API error and
    /// returned.
    pub async fn submit_form(
        &self,
        action: &str,
        method: Option<Method>,
        fields: Vec<(String, String)>,
        options: FormOptions,
    ) -> Result<FormOutcome, FetchError> {
        let fetch_options = self
            .options()
            .method(method.unwrap_or(Method::POST))
            .body(RequestBody::Form(fields))
            .timeout(options.timeout.unwrap_or_else(|| self.defaults().form_timeout()));

        let result = async {
            let response = self.fetch(action, fetch_options).await?;
            let reply: serde_json::Value = response.json().await?;
            Ok::<_, FetchError>(reply)
        }
        .await;

        match result {
            Ok(reply) => {
                tracing::info!(action, "Form submitted");
                self.errors()
                    .reporter()
                    .show(&options.success_message, AlertKind::Success);
                Ok(FormOutcome {
                    reply,
                    reset: options.reset_on_success,
                })
            }
            Err(e) => {
                self.handle_api_error(&e, "Form submission", true);
                Err(e)
            }
        }
    }
}
