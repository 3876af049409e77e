//! Contact form submission.
//!
//! A submission is validated field by field, then inserted into the
//! [`ContactRecords`] store exactly once. While one submission from a sender
//! is in flight, a second one from the same sender is rejected. Failures are
//! terminal: nothing is retried and the visitor resubmits by hand.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use diwan_core::{Email, Localized};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{ContactMessageId, ContactRecords, NewContactMessage, RepositoryError};

pub const NAME_MIN_CHARS: usize = 2;
pub const SUBJECT_MIN_CHARS: usize = 5;
pub const MESSAGE_MIN_CHARS: usize = 10;

/// Shown after a message was stored.
pub const SENT_MESSAGE: Localized<&str> = Localized::new(
    "Your message has been sent! We'll get back to you soon.",
    "تم إرسال رسالتك! سنعاود الاتصال بك قريبًا.",
);

/// Shown when the record store could not take the message.
pub const FAILED_MESSAGE: Localized<&str> = Localized::new(
    "Your message could not be sent. Please try again.",
    "تعذر إرسال رسالتك. يرجى المحاولة مرة أخرى.",
);

/// Shown when the same sender already has a submission in flight.
pub const IN_FLIGHT_MESSAGE: Localized<&str> = Localized::new(
    "Your previous message is still being sent.",
    "لا تزال رسالتك السابقة قيد الإرسال.",
);

/// Raw contact form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

/// One invalid field with its bilingual message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: ContactField,
    pub message: Localized<&'static str>,
}

/// Every invalid field of a rejected form, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("contact form has {} invalid field(s)", .fields.len())]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn has(&self, field: ContactField) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }
}

impl ContactForm {
    /// Validate every field, collecting all failures.
    ///
    /// Values are trimmed before length checks; lengths count characters, so
    /// Arabic input is measured the same way as English.
    ///
    /// # Errors
    ///
    /// Returns `ValidationErrors` listing each invalid field.
    pub fn validate(&self) -> Result<NewContactMessage, ValidationErrors> {
        let mut fields = Vec::new();

        let name = self.name.trim();
        if name.chars().count() < NAME_MIN_CHARS {
            fields.push(FieldError {
                field: ContactField::Name,
                message: Localized::new(
                    "Name must be at least 2 characters.",
                    "يجب أن يتكون الاسم من حرفين على الأقل.",
                ),
            });
        }

        let email = Email::parse(self.email.trim());
        if email.is_err() {
            fields.push(FieldError {
                field: ContactField::Email,
                message: Localized::new(
                    "Please enter a valid email address.",
                    "يرجى إدخال عنوان بريد إلكتروني صالح.",
                ),
            });
        }

        let subject = self.subject.trim();
        if subject.chars().count() < SUBJECT_MIN_CHARS {
            fields.push(FieldError {
                field: ContactField::Subject,
                message: Localized::new(
                    "Subject must be at least 5 characters.",
                    "يجب أن يتكون الموضوع من 5 أحرف على الأقل.",
                ),
            });
        }

        let message = self.message.trim();
        if message.chars().count() < MESSAGE_MIN_CHARS {
            fields.push(FieldError {
                field: ContactField::Message,
                message: Localized::new(
                    "Message must be at least 10 characters.",
                    "يجب أن تتكون الرسالة من 10 أحرف على الأقل.",
                ),
            });
        }

        match email {
            Ok(email) if fields.is_empty() => Ok(NewContactMessage {
                name: name.to_owned(),
                email,
                subject: subject.to_owned(),
                message: message.to_owned(),
            }),
            _ => Err(ValidationErrors { fields }),
        }
    }
}

/// Errors from submitting a contact form.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Another submission from the same sender has not resolved yet.
    #[error("a submission from this sender is already in flight")]
    InFlight,

    #[error("failed to store contact message: {0}")]
    Records(#[from] RepositoryError),
}

/// Submission state of one sender's form, reported with a 409.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactSubmission {
    Idle,
    Submitting,
}

/// Result of a stored submission.
#[derive(Debug, Clone, Serialize)]
pub struct ContactReceipt {
    pub id: ContactMessageId,
    pub message: Localized<&'static str>,
}

/// Validates and stores contact messages.
pub struct ContactService {
    records: Arc<dyn ContactRecords>,
    in_flight: Mutex<HashSet<String>>,
}

impl ContactService {
    #[must_use]
    pub fn new(records: Arc<dyn ContactRecords>) -> Self {
        Self {
            records,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The underlying record store (readiness checks).
    #[must_use]
    pub fn records(&self) -> &dyn ContactRecords {
        self.records.as_ref()
    }

    /// Validate `form` and insert it once.
    ///
    /// # Errors
    ///
    /// - `ContactError::Validation` if any field is invalid (nothing is sent)
    /// - `ContactError::InFlight` if the sender's previous submission is
    ///   still pending
    /// - `ContactError::Records` if the insert fails; it is not retried
    pub async fn submit(&self, form: &ContactForm) -> Result<ContactReceipt, ContactError> {
        let message = form.validate()?;
        let _permit = self.begin(&message.email)?;

        let id = self.records.insert(message).await?;
        tracing::info!(id = %id, "Contact message received");

        Ok(ContactReceipt {
            id,
            message: SENT_MESSAGE,
        })
    }

    fn begin(&self, email: &Email) -> Result<SubmissionPermit<'_>, ContactError> {
        let key = sender_key(email);
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| RepositoryError::Unavailable("submission guard poisoned".to_owned()))?;
        if !in_flight.insert(key.clone()) {
            return Err(ContactError::InFlight);
        }
        Ok(SubmissionPermit { service: self, key })
    }
}

/// Returns the sender to `Idle` when dropped, whatever the outcome.
struct SubmissionPermit<'a> {
    service: &'a ContactService,
    key: String,
}

impl Drop for SubmissionPermit<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.service.in_flight.lock() {
            in_flight.remove(&self.key);
        }
    }
}

fn sender_key(email: &Email) -> String {
    email.as_str().to_lowercase()
}
