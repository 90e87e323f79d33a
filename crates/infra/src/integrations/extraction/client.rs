//! Extraction service HTTP client
//!
//! Submits an audio asset and returns the service's transcript, summary,
//! and raw deadlines. The service authenticates with a bearer token; a
//! non-2xx response carries a `{ "message": … }` JSON body that is surfaced
//! verbatim as the error.

use echodue_domain::constants::{EXTRACTION_FALLBACK_ERROR, EXTRACTION_FILE_FIELD};
use echodue_domain::{EchoDueError, ExtractionOutput, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Client for the audio extraction service.
pub struct ExtractionClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ExtractionClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: Client::new() }
    }

    /// Submit an audio file for processing.
    ///
    /// # Errors
    /// `Network` when the request cannot be sent, `Provider` with the
    /// service's message for non-2xx responses, `InvalidInput` when the
    /// success body cannot be parsed.
    pub async fn process_audio(
        &self,
        bearer_token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ExtractionOutput> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(EXTRACTION_FILE_FIELD, part);

        debug!(file_name, "submitting audio for extraction");

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(bearer_token)
            .multipart(form)
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| EXTRACTION_FALLBACK_ERROR.to_string());

            warn!(%status, message, "extraction service rejected the upload");
            return Err(InfraError(EchoDueError::Provider(message)).into());
        }

        let output: ExtractionOutput = response.json().await.map_err(|e| {
            InfraError(EchoDueError::InvalidInput(format!(
                "failed to parse extraction response: {e}"
            )))
        })?;

        debug!(deadlines = output.deadlines.len(), "extraction completed");
        Ok(output)
    }
}
