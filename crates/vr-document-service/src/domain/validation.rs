//! # Validation & Normalisation
//!
//! Field rules applied before every write.
//!
//! | Field | Rule |
//! |-------|------|
//! | title | trimmed, 1..=100 code points, reserved characters escaped |
//! | description | trimmed, at most 500 code points, reserved characters escaped |
//! | document_type | absent means `Default`, unknown codes rejected |
//! | expires_at / date | required, the zero instant counts as unset |
//!
//! Lengths are measured on the trimmed text before escaping.

use crate::domain::value_objects::{DocumentFields, DocumentInput, DocumentType};
use chrono::Datelike;
use shared_types::Timestamp;
use thiserror::Error;

/// Maximum title length in code points.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum description length in code points.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Reserved characters and the references they are stored as.
const RESERVED: [(char, &str); 7] = [
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('(', "&#40;"),
    (')', "&#41;"),
    (';', "&#59;"),
    ('\\', "&#92;"),
    ('/', "&#47;"),
];

/// A violated field rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Title empty after trimming.
    #[error("title is required")]
    TitleRequired,

    /// Title longer than [`MAX_TITLE_CHARS`].
    #[error("title is {len} characters, maximum is {max}")]
    TitleTooLong { len: usize, max: usize },

    /// Description longer than [`MAX_DESCRIPTION_CHARS`].
    #[error("description is {len} characters, maximum is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    /// Expiration date missing or zero.
    #[error("expiration date is required")]
    ExpiresAtRequired,

    /// Type code outside the known catalogue.
    #[error("unknown document type code {0}")]
    UnknownDocumentType(i64),

    /// Notification date missing or zero.
    #[error("notification date is required")]
    DateRequired,
}

/// Normalise and validate a submitted document.
pub fn normalize_document(input: &DocumentInput) -> Result<DocumentFields, ValidationError> {
    let title = input.title.trim();
    let title_len = title.chars().count();
    if title_len == 0 {
        return Err(ValidationError::TitleRequired);
    }
    if title_len > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong {
            len: title_len,
            max: MAX_TITLE_CHARS,
        });
    }

    let description = input.description.trim();
    let description_len = description.chars().count();
    if description_len > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong {
            len: description_len,
            max: MAX_DESCRIPTION_CHARS,
        });
    }

    let document_type = match input.document_type {
        None => DocumentType::Default,
        Some(code) => {
            DocumentType::from_code(code).ok_or(ValidationError::UnknownDocumentType(code))?
        }
    };

    let expires_at = required_instant(input.expires_at).ok_or(ValidationError::ExpiresAtRequired)?;

    Ok(DocumentFields {
        document_type,
        title: escape_reserved(title),
        description: escape_reserved(description),
        expires_at,
    })
}

/// Validate a notification date.
pub fn validate_notification_date(date: Option<Timestamp>) -> Result<Timestamp, ValidationError> {
    required_instant(date).ok_or(ValidationError::DateRequired)
}

/// `None`, the Unix epoch and year-one instants all count as unset.
fn required_instant(value: Option<Timestamp>) -> Option<Timestamp> {
    value.filter(|ts| ts.timestamp() != 0 && ts.year() > 1)
}

/// Escape `< > ( ) ; \ /` as HTML character references.
///
/// Idempotent: the references this function emits are copied unchanged
/// when they already appear in the input. Any other `&name;` sequence is
/// plain text and its `;` is escaped.
#[must_use]
pub fn escape_reserved(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if c == '&' {
            if let Some(reference) = emitted_reference(rest) {
                out.push_str(reference);
                rest = &rest[reference.len()..];
                continue;
            }
        }
        match RESERVED.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, reference)) => out.push_str(reference),
            None => out.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// The escaped reference at the start of `s`, if any.
fn emitted_reference(s: &str) -> Option<&'static str> {
    RESERVED
        .iter()
        .map(|(_, reference)| *reference)
        .find(|reference| s.starts_with(reference))
}
