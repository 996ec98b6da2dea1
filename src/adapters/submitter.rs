use crate::config::toml_config::SubmissionConfig;
use crate::domain::model::SubmissionDraft;
use crate::domain::ports::FormSubmitter;
use crate::utils::error::{ReferralError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;

/// Posts the draft as `application/x-www-form-urlencoded` to the
/// facility's intake form.
pub struct HttpFormSubmitter {
    client: Client,
    config: SubmissionConfig,
}

impl HttpFormSubmitter {
    pub fn new(config: SubmissionConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn form_fields<'a>(&'a self, draft: &'a SubmissionDraft) -> Vec<(&'a str, &'a str)> {
        let fields = &self.config.fields;
        let vitals = draft.vitals();
        vec![
            (fields.patient_name.as_str(), draft.patient_name()),
            (fields.blood_pressure.as_str(), vitals.blood_pressure.as_str()),
            (fields.temperature.as_str(), vitals.temperature.as_str()),
            (fields.pulse_rate.as_str(), vitals.pulse_rate.as_str()),
            (fields.oxygen_saturation.as_str(), vitals.oxygen_saturation.as_str()),
            (fields.respiratory_rate.as_str(), vitals.respiratory_rate.as_str()),
            (fields.summary.as_str(), draft.summary()),
        ]
    }
}

#[async_trait]
impl FormSubmitter for HttpFormSubmitter {
    async fn submit(&self, endpoint: &str, draft: &SubmissionDraft) -> Result<()> {
        validate_url("facility.submission_endpoint", endpoint)?;

        let fields = self.form_fields(draft);
        let max_attempts = self.config.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            tracing::debug!(
                "Submitting form to {} (attempt {}/{})",
                endpoint,
                attempt,
                max_attempts
            );

            let error = match self.client.post(endpoint).form(&fields).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                // 4xx 重送也不會成功
                Ok(response) if response.status().is_client_error() => {
                    return Err(ReferralError::SubmissionError {
                        endpoint: endpoint.to_string(),
                        message: format!("rejected with status {}", response.status()),
                    });
                }
                Ok(response) => ReferralError::SubmissionError {
                    endpoint: endpoint.to_string(),
                    message: format!("responded with status {}", response.status()),
                },
                Err(e) => ReferralError::HttpError(e),
            };

            if attempt >= max_attempts {
                return Err(error);
            }

            tracing::warn!(
                "⚠️ Submission attempt {}/{} failed: {}; retrying in {:?}",
                attempt,
                max_attempts,
                error,
                self.config.retry_delay()
            );
            tokio::time::sleep(self.config.retry_delay()).await;
        }
    }
}
