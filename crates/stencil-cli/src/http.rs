//! Blocking HTTP implementation of [`StencilService`].

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use stencil_core::{
    ClientConfig, ConfigError, FormField, ServiceError, StencilRequest, StencilResponse,
    StencilService,
};

/// Sends stencil requests with `reqwest`'s blocking client.
///
/// The request runs to completion inside `generate`, so there is never
/// anything in flight for [`StencilService::cancel`] to abort.
pub struct HttpService {
    client: Client,
    endpoint: String,
    timeout_ms: u32,
}

impl HttpService {
    /// Create a client for the endpoint and timeout in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the endpoint is not an
    /// absolute `http(s)` URL or the client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        if !is_absolute_http(&config.endpoint) {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be an absolute http(s) URL, got {:?}",
                config.endpoint
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(u64::from(config.timeout_ms)))
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    fn send(&self, form: Form) -> Result<StencilResponse, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().map_err(|e| self.classify(&e))?.to_vec();

        Ok(StencilResponse { bytes, mime })
    }

    fn classify(&self, err: &reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.timeout_ms)
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

impl StencilService for HttpService {
    #[allow(clippy::future_not_send)] // the request shares the image through an Rc
    async fn generate(&self, request: &StencilRequest) -> Result<StencilResponse, ServiceError> {
        let form = build_form(request)?;
        log::debug!("POST {}", self.endpoint);
        self.send(form)
    }
}

fn build_form(request: &StencilRequest) -> Result<Form, ServiceError> {
    let mut form = Form::new();
    for field in request.fields() {
        form = match field {
            FormField::File {
                name,
                filename,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.to_vec())
                    .file_name(filename.to_owned())
                    .mime_str(mime)
                    .map_err(|e| ServiceError::Request(e.to_string()))?;
                form.part(name, part)
            }
            FormField::Text { name, value } => form.text(name, value),
        };
    }
    Ok(form)
}

fn is_absolute_http(endpoint: &str) -> bool {
    let lower = endpoint.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_absolute_http_endpoints_are_usable() {
        assert!(is_absolute_http("http://localhost:5000/generate-stencil"));
        assert!(is_absolute_http("HTTPS://example.com/generate-stencil"));
        assert!(!is_absolute_http("/generate-stencil"));
        assert!(!is_absolute_http("ftp://example.com/generate-stencil"));
    }

    #[test]
    fn relative_endpoint_is_a_config_error() {
        let config = ClientConfig::default();
        assert!(matches!(HttpService::new(&config), Err(ConfigError::Invalid(_))));
    }
}
