//! Ticket emailer
//!
//! Validates the recipient, compresses the captured ticket into a small
//! JPEG, and hands the request to the delivery collaborator. At most one
//! submission is in flight per emailer.

pub mod compress;
pub mod transport;
pub mod validate;

pub use compress::{compress, compress_with, CompressedImage, CompressionOptions};
pub use transport::{DeliveryTransport, EmailJsTransport};
pub use validate::validate_address;

use crate::config::{EmailSettings, ENV_PUBLIC_KEY, ENV_SERVICE_ID, ENV_TEMPLATE_ID};
use crate::models::DateOption;
use crate::ticket::{ImageFetcher, TicketExporter};
use crate::{DateQuestError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Credentials for the delivery collaborator, validated once at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    pub public_key: String,
    pub service_id: String,
    pub template_id: String,
}

impl EmailCredentials {
    /// Take credentials from settings; any missing or blank value is a
    /// configuration error naming every missing variable
    pub fn from_settings(settings: &EmailSettings) -> Result<Self> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let public_key = present(&settings.public_key);
        let service_id = present(&settings.service_id);
        let template_id = present(&settings.template_id);

        match (public_key, service_id, template_id) {
            (Some(public_key), Some(service_id), Some(template_id)) => Ok(Self {
                public_key,
                service_id,
                template_id,
            }),
            (public_key, service_id, template_id) => {
                let missing: Vec<&str> = [
                    (public_key.is_none(), ENV_PUBLIC_KEY),
                    (service_id.is_none(), ENV_SERVICE_ID),
                    (template_id.is_none(), ENV_TEMPLATE_ID),
                ]
                .into_iter()
                .filter_map(|(missing, name)| missing.then_some(name))
                .collect();
                Err(DateQuestError::ConfigError(format!(
                    "missing email credentials: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// An encoded image attached to the email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Attachment {
    /// JPEG attachment
    pub fn jpeg(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            mime: "image/jpeg".to_string(),
            bytes,
            width,
            height,
        }
    }

    /// `data:` URL carrying the bytes as base64
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl From<CompressedImage> for Attachment {
    fn from(image: CompressedImage) -> Self {
        Attachment::jpeg(image.bytes, image.width, image.height)
    }
}

/// One outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    pub recipient: String,
    pub subject: String,
    pub body_fields: BTreeMap<String, String>,
    pub attachment: Option<Attachment>,
}

impl EmailRequest {
    /// Build a request for `selection`; the recipient must validate
    pub fn for_selection(
        recipient: &str,
        subject: &str,
        selection: &DateOption,
        attachment: Option<Attachment>,
    ) -> Result<Self> {
        if !validate_address(recipient) {
            return Err(DateQuestError::ValidationError(format!(
                "'{}' is not a valid email address",
                recipient
            )));
        }

        let body_fields = [
            ("date_title", &selection.title),
            ("date_time", &selection.time),
            ("date_location", &selection.location),
            ("date_note", &selection.note),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

        Ok(Self {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body_fields,
            attachment,
        })
    }
}

/// What a successful delivery reports back to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub recipient: String,
    /// Attachment size, or `None` when sent without the ticket image
    pub attachment_bytes: Option<usize>,
}

/// Clears the in-flight flag when the submission ends, however it ends
struct SendGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SendGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self { flag })
            .map_err(|_| DateQuestError::Busy("an email is already being sent".to_string()))
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sends date tickets through a delivery transport
#[derive(Debug)]
pub struct Emailer<T> {
    credentials: EmailCredentials,
    transport: T,
    subject: String,
    max_attachment_kb: u32,
    sending: AtomicBool,
}

impl<T: DeliveryTransport> Emailer<T> {
    /// Create an emailer; fails if any credential is missing
    pub fn new(settings: &EmailSettings, transport: T, max_attachment_kb: u32) -> Result<Self> {
        let credentials = EmailCredentials::from_settings(settings)?;
        Ok(Self {
            credentials,
            transport,
            subject: settings.subject.clone(),
            max_attachment_kb,
            sending: AtomicBool::new(false),
        })
    }

    /// Check whether a submission is in flight
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Subject used for outgoing requests
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Send a prepared request. Rejected with `Busy` while another
    /// submission is outstanding.
    pub async fn send(&self, request: EmailRequest) -> Result<DeliveryReceipt> {
        let _guard = SendGuard::acquire(&self.sending)?;
        self.deliver(request).await
    }

    /// Validate, capture, compress and send the ticket for `selection`.
    ///
    /// A failed capture is logged and the email goes out without the
    /// attachment.
    pub async fn submit_ticket<F: ImageFetcher>(
        &self,
        exporter: &TicketExporter<F>,
        recipient: &str,
        selection: &DateOption,
    ) -> Result<DeliveryReceipt> {
        let recipient = recipient.trim();
        // Validate before anything else touches the network
        EmailRequest::for_selection(recipient, &self.subject, selection, None)?;

        let _guard = SendGuard::acquire(&self.sending)?;

        let attachment = match exporter.capture_jpeg(selection, self.max_attachment_kb).await {
            Ok(jpeg) if jpeg.is_empty() => {
                warn!("ticket capture was empty, sending without attachment");
                None
            }
            Ok(jpeg) => {
                if !jpeg.within_budget {
                    warn!(size = jpeg.len(), "attachment still over budget, sending best effort");
                }
                Some(Attachment::from(jpeg))
            }
            Err(err) => {
                warn!(error = %err, "ticket capture failed, sending without attachment");
                None
            }
        };

        let request = EmailRequest::for_selection(recipient, &self.subject, selection, attachment)?;
        self.deliver(request).await
    }

    async fn deliver(&self, request: EmailRequest) -> Result<DeliveryReceipt> {
        let receipt = DeliveryReceipt {
            recipient: request.recipient.clone(),
            attachment_bytes: request.attachment.as_ref().map(|a| a.bytes.len()),
        };

        match self.transport.deliver(&self.credentials, &request).await {
            Ok(()) => {
                info!(recipient = %receipt.recipient, attached = receipt.attachment_bytes.is_some(), "ticket emailed");
                Ok(receipt)
            }
            Err(DateQuestError::DeliveryError(detail)) => {
                Err(DateQuestError::DeliveryError(transport::failure_detail(&detail)))
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn settings() -> EmailSettings {
        EmailSettings {
            public_key: Some("pk".to_string()),
            service_id: Some("svc".to_string()),
            template_id: Some("tpl".to_string()),
            ..EmailSettings::default()
        }
    }

    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl DeliveryTransport for CountingTransport {
        async fn deliver(&self, _: &EmailCredentials, _: &EmailRequest) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(detail) => Err(DateQuestError::DeliveryError(detail.clone())),
                None => Ok(()),
            }
        }
    }

    /// Blocks every delivery until released
    struct GatedTransport {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        calls: AtomicUsize,
    }

    impl DeliveryTransport for GatedTransport {
        async fn deliver(&self, _: &EmailCredentials, _: &EmailRequest) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    #[test]
    fn test_missing_credentials_are_config_errors() {
        let mut partial = settings();
        partial.service_id = None;
        partial.template_id = Some("  ".to_string());

        let err = EmailCredentials::from_settings(&partial).unwrap_err();
        match err {
            DateQuestError::ConfigError(msg) => {
                assert!(msg.contains(ENV_SERVICE_ID));
                assert!(msg.contains(ENV_TEMPLATE_ID));
                assert!(!msg.contains(ENV_PUBLIC_KEY));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let emailer = Emailer::new(&EmailSettings::default(), CountingTransport::default(), 30);
        assert!(matches!(emailer, Err(DateQuestError::ConfigError(_))));
    }

    #[test]
    fn test_request_body_fields_come_from_selection() {
        let option = catalog().remove(1);
        let request = EmailRequest::for_selection("x@y.com", "Subject", &option, None).unwrap();
        assert_eq!(request.body_fields.len(), 4);
        assert_eq!(request.body_fields["date_title"], option.title);
        assert_eq!(request.body_fields["date_time"], option.time);
        assert_eq!(request.body_fields["date_location"], option.location);
        assert_eq!(request.body_fields["date_note"], option.note);
    }

    #[test]
    fn test_request_rejects_invalid_recipient() {
        let option = catalog().remove(0);
        let result = EmailRequest::for_selection("x@y", "Subject", &option, None);
        assert!(matches!(result, Err(DateQuestError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_send_success_and_failure_detail() {
        let option = catalog().remove(0);
        let emailer = Emailer::new(&settings(), CountingTransport::default(), 30).unwrap();
        let request = EmailRequest::for_selection("x@y.com", "s", &option, None).unwrap();
        let receipt = emailer.send(request.clone()).await.unwrap();
        assert_eq!(receipt.recipient, "x@y.com");
        assert_eq!(receipt.attachment_bytes, None);
        assert!(!emailer.is_sending());

        let failing = CountingTransport {
            fail_with: Some(String::new()),
            ..CountingTransport::default()
        };
        let emailer = Emailer::new(&settings(), failing, 30).unwrap();
        let err = emailer.send(request).await.unwrap_err();
        match err {
            DateQuestError::DeliveryError(msg) => {
                assert_eq!(msg, crate::error::GENERIC_DELIVERY_FAILURE)
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // The flag is cleared after a failure so the user can retry
        assert!(!emailer.is_sending());
    }

    #[tokio::test]
    async fn test_second_send_while_in_flight_is_rejected() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let transport = GatedTransport {
            entered: entered.clone(),
            release: release.clone(),
            calls: AtomicUsize::new(0),
        };
        let emailer = Arc::new(Emailer::new(&settings(), transport, 30).unwrap());
        let option = catalog().remove(0);
        let request = EmailRequest::for_selection("x@y.com", "s", &option, None).unwrap();

        let first = {
            let emailer = emailer.clone();
            let request = request.clone();
            tokio::spawn(async move { emailer.send(request).await })
        };
        entered.notified().await;
        assert!(emailer.is_sending());

        let second = emailer.send(request).await;
        assert!(matches!(second, Err(DateQuestError::Busy(_))));

        release.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(emailer.transport.calls.load(Ordering::SeqCst), 1);
        assert!(!emailer.is_sending());
    }

    #[test]
    fn test_attachment_from_compressed_image() {
        let image = CompressedImage {
            bytes: vec![1, 2, 3],
            width: 10,
            height: 5,
            quality: 80,
            within_budget: true,
        };
        let attachment = Attachment::from(image);
        assert_eq!(attachment.mime, "image/jpeg");
        assert_eq!((attachment.width, attachment.height), (10, 5));
        assert_eq!(attachment.data_url(), "data:image/jpeg;base64,AQID");
    }
}
