//! Email delivery transport
//!
//! The delivery collaborator is reached through a single
//! `deliver(credentials, request)` call. The production transport posts to
//! the EmailJS REST endpoint.

use super::{EmailCredentials, EmailRequest};
use crate::{error::GENERIC_DELIVERY_FAILURE, DateQuestError, Result};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default EmailJS send endpoint
pub const EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Template parameter holding the attachment data URL
pub const ATTACHMENT_PARAM: &str = "ticket_image";

/// External email delivery collaborator
pub trait DeliveryTransport: Send + Sync {
    /// Deliver one request; exactly one outbound call per invocation
    fn deliver(
        &self,
        credentials: &EmailCredentials,
        request: &EmailRequest,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// EmailJS REST transport
#[derive(Debug, Clone)]
pub struct EmailJsTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl EmailJsTransport {
    /// Create a transport for the public EmailJS endpoint
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_endpoint(EMAILJS_ENDPOINT, timeout)
    }

    /// Create a transport posting to a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DateQuestError::DeliveryError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Build the JSON body EmailJS expects
    pub fn payload(credentials: &EmailCredentials, request: &EmailRequest) -> Value {
        let mut params = Map::new();
        params.insert("to_email".to_string(), Value::from(request.recipient.as_str()));
        params.insert("subject".to_string(), Value::from(request.subject.as_str()));
        for (name, value) in &request.body_fields {
            params.insert(name.clone(), Value::from(value.as_str()));
        }
        if let Some(attachment) = &request.attachment {
            params.insert(ATTACHMENT_PARAM.to_string(), Value::from(attachment.data_url()));
        }

        json!({
            "service_id": credentials.service_id,
            "template_id": credentials.template_id,
            "user_id": credentials.public_key,
            "template_params": Value::Object(params),
        })
    }
}

impl DeliveryTransport for EmailJsTransport {
    async fn deliver(&self, credentials: &EmailCredentials, request: &EmailRequest) -> Result<()> {
        let body = Self::payload(credentials, request);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| DateQuestError::DeliveryError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        warn!(%status, detail = %detail, "email delivery rejected");
        Err(DateQuestError::DeliveryError(failure_detail(&detail)))
    }
}

/// Best-available failure text: the collaborator's detail, or the
/// generic fallback when it said nothing useful
pub fn failure_detail(detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        GENERIC_DELIVERY_FAILURE.to_string()
    } else {
        detail.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::Attachment;
    use std::collections::BTreeMap;

    fn credentials() -> EmailCredentials {
        EmailCredentials {
            public_key: "pk".to_string(),
            service_id: "svc".to_string(),
            template_id: "tpl".to_string(),
        }
    }

    fn request(attachment: Option<Attachment>) -> EmailRequest {
        let body_fields: BTreeMap<String, String> = [
            ("date_title", "Evening at Tank Bund"),
            ("date_time", "Friday, 6:30 PM"),
            ("date_location", "Tank Bund, Hussain Sagar"),
            ("date_note", "Sunset"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        EmailRequest {
            recipient: "x@y.com".to_string(),
            subject: "Our Date Ticket".to_string(),
            body_fields,
            attachment,
        }
    }

    #[test]
    fn test_payload_shape() {
        let body = EmailJsTransport::payload(&credentials(), &request(None));
        assert_eq!(body["service_id"], "svc");
        assert_eq!(body["template_id"], "tpl");
        assert_eq!(body["user_id"], "pk");

        let params = &body["template_params"];
        assert_eq!(params["to_email"], "x@y.com");
        assert_eq!(params["date_title"], "Evening at Tank Bund");
        assert_eq!(params["date_note"], "Sunset");
        assert!(params.get(ATTACHMENT_PARAM).is_none());
    }

    #[test]
    fn test_payload_with_attachment() {
        let attachment = Attachment::jpeg(vec![0xFF, 0xD8, 0xFF], 2, 1);
        let body = EmailJsTransport::payload(&credentials(), &request(Some(attachment)));
        let url = body["template_params"][ATTACHMENT_PARAM].as_str().unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_failure_detail_fallback() {
        assert_eq!(failure_detail("  "), GENERIC_DELIVERY_FAILURE);
        assert_eq!(failure_detail("The template ID is invalid"), "The template ID is invalid");
    }
}
