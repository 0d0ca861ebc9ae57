//! Contact form validation and sanitizing.
//!
//! Pure functions, shared by the form state machine in [`crate::submission`]
//! and the relay endpoint in [`crate::server`]. The same limits and messages
//! are rendered into the page as [`ValidationRules`] so the browser script
//! enforces them before any request is made.
//!
//! ## Rules
//!
//! | Field   | Required | Min | Max  | Other                     |
//! |---------|----------|-----|------|---------------------------|
//! | name    | yes      | 2   | 100  |                           |
//! | email   | yes      |     | 254  | `local@domain.tld` syntax |
//! | subject | no       |     | 200  |                           |
//! | message | yes      | 10  | 5000 |                           |
//!
//! Lengths are counted in characters after trimming.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
/// RFC 5321 path limit.
pub const EMAIL_MAX_LEN: usize = 254;
pub const SUBJECT_MAX_LEN: usize = 200;
pub const MESSAGE_MIN_LEN: usize = 10;
pub const MESSAGE_MAX_LEN: usize = 5000;

/// Raw form state as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactFormData {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Hidden field. Humans never see it; naive bots fill it in.
    pub honeypot: String,
}

impl ContactFormData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the honeypot caught something.
    pub fn is_spam(&self) -> bool {
        !self.honeypot.trim().is_empty()
    }

    /// The body that goes over the wire. The honeypot is dropped.
    pub fn to_payload(&self) -> ContactPayload {
        ContactPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        }
    }
}

/// JSON body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

/// Identifies a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
    Honeypot,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
            Field::Honeypot => "honeypot",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

/// Per-field results. `subject` is only checked when the visitor typed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormValidation {
    pub name: ValidationResult,
    pub email: ValidationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<ValidationResult>,
    pub message: ValidationResult,
}

impl FormValidation {
    /// Present fields in display order.
    pub fn fields(&self) -> Vec<(Field, &ValidationResult)> {
        let mut fields = vec![(Field::Name, &self.name), (Field::Email, &self.email)];
        if let Some(subject) = &self.subject {
            fields.push((Field::Subject, subject));
        }
        fields.push((Field::Message, &self.message));
        fields
    }

    /// First error message of every invalid field, in display order.
    pub fn first_errors(&self) -> Vec<(Field, String)> {
        self.fields()
            .into_iter()
            .filter_map(|(field, result)| result.first_error().map(|e| (field, e.to_string())))
            .collect()
    }
}

pub fn validate_contact_form(data: &ContactFormData) -> FormValidation {
    let subject = data.subject.trim();
    FormValidation {
        name: validate_name(&data.name),
        email: validate_email(&data.email),
        subject: (!subject.is_empty()).then(|| validate_subject(subject)),
        message: validate_message(&data.message),
    }
}

pub fn is_form_valid(validation: &FormValidation) -> bool {
    validation.fields().iter().all(|(_, result)| result.is_valid)
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn validate_name(name: &str) -> ValidationResult {
    let name = name.trim();
    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(messages::NAME_REQUIRED.to_string());
    } else if char_len(name) < NAME_MIN_LEN {
        errors.push(messages::NAME_TOO_SHORT.to_string());
    } else if char_len(name) > NAME_MAX_LEN {
        errors.push(messages::NAME_TOO_LONG.to_string());
    }
    ValidationResult::from_errors(errors)
}

fn validate_email(email: &str) -> ValidationResult {
    let email = email.trim();
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push(messages::EMAIL_REQUIRED.to_string());
    } else if char_len(email) > EMAIL_MAX_LEN {
        errors.push(messages::EMAIL_TOO_LONG.to_string());
    } else if !is_email_address(email) {
        errors.push(messages::EMAIL_INVALID.to_string());
    }
    ValidationResult::from_errors(errors)
}

/// `validator`'s HTML5-style check, plus a dotted domain: `jane@localhost`
/// is a legal address but never a useful reply-to for a portfolio contact.
fn is_email_address(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    match email.rsplit_once('@') {
        Some((_, domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
        }
        None => false,
    }
}

fn validate_subject(subject: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if char_len(subject.trim()) > SUBJECT_MAX_LEN {
        errors.push(messages::SUBJECT_TOO_LONG.to_string());
    }
    ValidationResult::from_errors(errors)
}

fn validate_message(message: &str) -> ValidationResult {
    let message = message.trim();
    let mut errors = Vec::new();
    if message.is_empty() {
        errors.push(messages::MESSAGE_REQUIRED.to_string());
    } else if char_len(message) < MESSAGE_MIN_LEN {
        errors.push(messages::MESSAGE_TOO_SHORT.to_string());
    } else if char_len(message) > MESSAGE_MAX_LEN {
        errors.push(messages::MESSAGE_TOO_LONG.to_string());
    }
    ValidationResult::from_errors(errors)
}

// =============================================================================
// Sanitizing
// =============================================================================

/// Make form data safe to drop into the provider's email template.
///
/// - `<` and `>` are removed from every field.
/// - Control characters are removed; the message keeps `\n` and `\t`.
/// - Line breaks in single-line fields become spaces (no header injection).
/// - `\r\n` and lone `\r` in the message become `\n`.
/// - Every field is trimmed.
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize_form_data(data: &ContactFormData) -> ContactFormData {
    ContactFormData {
        name: sanitize_line(&data.name),
        email: sanitize_line(&data.email),
        subject: sanitize_line(&data.subject),
        message: sanitize_multiline(&data.message),
        honeypot: sanitize_line(&data.honeypot),
    }
}

fn sanitize_line(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();
    cleaned.trim().to_string()
}

fn sanitize_multiline(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = normalized
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    cleaned.trim().to_string()
}

// =============================================================================
// Rules exported to the browser
// =============================================================================

pub mod messages {
    pub const NAME_REQUIRED: &str = "Name is required";
    pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
    pub const NAME_TOO_LONG: &str = "Name must be at most 100 characters";
    pub const EMAIL_REQUIRED: &str = "Email is required";
    pub const EMAIL_TOO_LONG: &str = "Email must be at most 254 characters";
    pub const EMAIL_INVALID: &str = "Please enter a valid email address";
    pub const SUBJECT_TOO_LONG: &str = "Subject must be at most 200 characters";
    pub const MESSAGE_REQUIRED: &str = "Message is required";
    pub const MESSAGE_TOO_SHORT: &str = "Message must be at least 10 characters";
    pub const MESSAGE_TOO_LONG: &str = "Message must be at most 5000 characters";
    /// Shown for spam, network and relay failures alike.
    pub const SUBMIT_FAILED: &str = "Failed to send message. Please try again or email me directly.";
    pub const SUBMIT_SUCCEEDED: &str = "Message sent successfully! I'll get back to you soon.";
}

/// Limits and messages serialized into the contact form's `data-rules`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRules {
    pub name_min: usize,
    pub name_max: usize,
    pub email_max: usize,
    pub subject_max: usize,
    pub message_min: usize,
    pub message_max: usize,
    pub messages: RuleMessages,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleMessages {
    pub name_required: &'static str,
    pub name_too_short: &'static str,
    pub name_too_long: &'static str,
    pub email_required: &'static str,
    pub email_too_long: &'static str,
    pub email_invalid: &'static str,
    pub subject_too_long: &'static str,
    pub message_required: &'static str,
    pub message_too_short: &'static str,
    pub message_too_long: &'static str,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            name_min: NAME_MIN_LEN,
            name_max: NAME_MAX_LEN,
            email_max: EMAIL_MAX_LEN,
            subject_max: SUBJECT_MAX_LEN,
            message_min: MESSAGE_MIN_LEN,
            message_max: MESSAGE_MAX_LEN,
            messages: RuleMessages {
                name_required: messages::NAME_REQUIRED,
                name_too_short: messages::NAME_TOO_SHORT,
                name_too_long: messages::NAME_TOO_LONG,
                email_required: messages::EMAIL_REQUIRED,
                email_too_long: messages::EMAIL_TOO_LONG,
                email_invalid: messages::EMAIL_INVALID,
                subject_too_long: messages::SUBJECT_TOO_LONG,
                message_required: messages::MESSAGE_REQUIRED,
                message_too_short: messages::MESSAGE_TOO_SHORT,
                message_too_long: messages::MESSAGE_TOO_LONG,
            },
        }
    }
}

impl ValidationRules {
    pub fn to_json(&self) -> String {
        // Only strings and integers: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, subject: &str, message: &str) -> ContactFormData {
        ContactFormData {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            honeypot: String::new(),
        }
    }

    fn valid_form() -> ContactFormData {
        form(
            "Jane Doe",
            "jane@example.com",
            "Hi",
            "Hello there, interested in working together.",
        )
    }

    #[test]
    fn valid_form_passes() {
        let validation = validate_contact_form(&valid_form());
        assert!(is_form_valid(&validation));
        assert!(validation.first_errors().is_empty());
    }

    #[test]
    fn empty_name_is_invalid() {
        for name in ["", "   ", "\t\n"] {
            let mut data = valid_form();
            data.name = name.to_string();
            let validation = validate_contact_form(&data);
            assert!(!validation.name.is_valid, "name {name:?} should be invalid");
            assert_eq!(validation.name.first_error(), Some(messages::NAME_REQUIRED));
        }
    }

    #[test]
    fn name_length_bounds() {
        let mut data = valid_form();
        data.name = "J".to_string();
        assert!(!validate_contact_form(&data).name.is_valid);

        data.name = "x".repeat(NAME_MAX_LEN);
        assert!(validate_contact_form(&data).name.is_valid);

        data.name = "x".repeat(NAME_MAX_LEN + 1);
        let validation = validate_contact_form(&data);
        assert_eq!(validation.name.first_error(), Some(messages::NAME_TOO_LONG));
    }

    #[test]
    fn too_long_messages_name_the_inclusive_limit() {
        for (message, max) in [
            (messages::NAME_TOO_LONG, NAME_MAX_LEN),
            (messages::EMAIL_TOO_LONG, EMAIL_MAX_LEN),
            (messages::SUBJECT_TOO_LONG, SUBJECT_MAX_LEN),
            (messages::MESSAGE_TOO_LONG, MESSAGE_MAX_LEN),
        ] {
            assert!(message.ends_with(&format!("at most {max} characters")), "{message}");
        }

        let mut data = valid_form();
        data.message = "m".repeat(MESSAGE_MAX_LEN);
        assert!(validate_contact_form(&data).message.is_valid);
    }

    #[test]
    fn email_without_at_or_domain_is_invalid() {
        for email in ["bad", "jane.example.com", "jane@", "@example.com", "jane@example", "jane@example."] {
            let mut data = valid_form();
            data.email = email.to_string();
            let validation = validate_contact_form(&data);
            assert!(!validation.email.is_valid, "email {email:?} should be invalid");
        }
    }

    #[test]
    fn email_accepts_common_addresses() {
        for email in ["jane@example.com", "jane.doe+work@mail.example.co.uk", " jane@example.com "] {
            let mut data = valid_form();
            data.email = email.to_string();
            assert!(validate_contact_form(&data).email.is_valid, "email {email:?} should be valid");
        }
    }

    #[test]
    fn missing_email_reports_required() {
        let mut data = valid_form();
        data.email = String::new();
        let validation = validate_contact_form(&data);
        assert_eq!(validation.email.first_error(), Some(messages::EMAIL_REQUIRED));
    }

    #[test]
    fn short_message_is_invalid() {
        for message in ["hi", "123456789", "  short  "] {
            let mut data = valid_form();
            data.message = message.to_string();
            let validation = validate_contact_form(&data);
            assert!(!validation.message.is_valid, "message {message:?} should be invalid");
            assert_eq!(validation.message.first_error(), Some(messages::MESSAGE_TOO_SHORT));
        }
    }

    #[test]
    fn message_length_counts_characters_not_bytes() {
        let mut data = valid_form();
        // 10 characters, 20 bytes
        data.message = "éééééééééé".to_string();
        assert!(validate_contact_form(&data).message.is_valid);
    }

    #[test]
    fn subject_is_optional() {
        let mut data = valid_form();
        data.subject = "   ".to_string();
        let validation = validate_contact_form(&data);
        assert!(validation.subject.is_none());
        assert!(is_form_valid(&validation));
    }

    #[test]
    fn long_subject_is_invalid() {
        let mut data = valid_form();
        data.subject = "s".repeat(SUBJECT_MAX_LEN + 1);
        let validation = validate_contact_form(&data);
        assert!(!validation.subject.as_ref().unwrap().is_valid);
        assert!(!is_form_valid(&validation));
    }

    #[test]
    fn bad_form_reports_name_email_and_message() {
        let data = form("", "bad", "", "hi");
        let validation = validate_contact_form(&data);
        assert!(!is_form_valid(&validation));

        let fields: Vec<Field> = validation.first_errors().into_iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec![Field::Name, Field::Email, Field::Message]);
    }

    #[test]
    fn sanitize_strips_markup_and_trims() {
        let data = form("  <b>Jane</b> ", "jane@example.com\r\nBcc: x@y.z", "Hi <there>", "  <script>x</script> hello  ");
        let clean = sanitize_form_data(&data);
        assert_eq!(clean.name, "bJane/b");
        assert_eq!(clean.email, "jane@example.com  Bcc: x@y.z");
        assert_eq!(clean.subject, "Hi there");
        assert_eq!(clean.message, "scriptx/script hello");
    }

    #[test]
    fn sanitize_keeps_message_line_breaks() {
        let mut data = valid_form();
        data.message = "line one\r\nline two\rline three\u{0007}\n\tindented".to_string();
        let clean = sanitize_form_data(&data);
        assert_eq!(clean.message, "line one\nline two\nline three\n\tindented");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            valid_form(),
            form(" <<a>> \n", "\r\n x@y.z \t", "\u{0000}sub>ject<", "\r\n body \r\n\r\n <> \t"),
            form("", "", "", ""),
            form("Zoë Ünal", "zoe@example.com", "Grüße", "Hallo,\n\nwie geht's?"),
        ];
        for data in inputs {
            let once = sanitize_form_data(&data);
            let twice = sanitize_form_data(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn payload_drops_honeypot() {
        let mut data = valid_form();
        data.honeypot = "http://spam.example".to_string();
        assert!(data.is_spam());
        let json = serde_json::to_value(data.to_payload()).unwrap();
        assert!(json.get("honeypot").is_none());
        assert_eq!(json["name"], "Jane Doe");
    }

    #[test]
    fn whitespace_honeypot_is_not_spam() {
        let mut data = valid_form();
        data.honeypot = "  ".to_string();
        assert!(!data.is_spam());
    }

    #[test]
    fn rules_json_carries_limits_and_messages() {
        let json: serde_json::Value = serde_json::from_str(&ValidationRules::default().to_json()).unwrap();
        assert_eq!(json["message_min"], MESSAGE_MIN_LEN);
        assert_eq!(json["messages"]["email_invalid"], messages::EMAIL_INVALID);
    }
}
