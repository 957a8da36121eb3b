//! # Value Objects
//!
//! Document classification codes and the raw field sets callers submit.

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;
use std::fmt;

/// Classification tag of a document.
///
/// Wire and storage representation is the stable integer code.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum DocumentType {
    #[default]
    Default = 0,
    Passport = 1,
    InternalPassport = 2,
    ForeignPassport = 3,
    IdentityCard = 4,
    DrivingLicense = 5,
    HuntingLicense = 6,
    FirearmsLicense = 7,
    MedicalInsurance = 8,
    PropertyInsurance = 9,
    VehicleInsurance = 10,
    PersonalInsurance = 11,
    Visa = 12,
    StudentVisa = 13,
    WorkPermit = 14,
    ResidencePermit = 15,
    CreditCard = 16,
    Certificate = 17,
    VaccinationCertificate = 18,
    WarrantyCertificate = 19,
    Coupon = 20,
    TravelCard = 21,
    Other = 255,
}

impl DocumentType {
    /// Every known type, in code order.
    pub const ALL: [DocumentType; 23] = [
        Self::Default,
        Self::Passport,
        Self::InternalPassport,
        Self::ForeignPassport,
        Self::IdentityCard,
        Self::DrivingLicense,
        Self::HuntingLicense,
        Self::FirearmsLicense,
        Self::MedicalInsurance,
        Self::PropertyInsurance,
        Self::VehicleInsurance,
        Self::PersonalInsurance,
        Self::Visa,
        Self::StudentVisa,
        Self::WorkPermit,
        Self::ResidencePermit,
        Self::CreditCard,
        Self::Certificate,
        Self::VaccinationCertificate,
        Self::WarrantyCertificate,
        Self::Coupon,
        Self::TravelCard,
        Self::Other,
    ];

    /// Look up a type by its integer code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| i64::from(t.code()) == code)
    }

    /// The stable integer code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Document",
            Self::Passport => "Passport",
            Self::InternalPassport => "Internal passport",
            Self::ForeignPassport => "Foreign passport",
            Self::IdentityCard => "Identity card",
            Self::DrivingLicense => "Driving license",
            Self::HuntingLicense => "Hunting license",
            Self::FirearmsLicense => "Firearms license",
            Self::MedicalInsurance => "Medical insurance",
            Self::PropertyInsurance => "Property insurance",
            Self::VehicleInsurance => "Vehicle insurance",
            Self::PersonalInsurance => "Personal insurance",
            Self::Visa => "Visa",
            Self::StudentVisa => "Student visa",
            Self::WorkPermit => "Work permit",
            Self::ResidencePermit => "Residence permit",
            Self::CreditCard => "Credit card",
            Self::Certificate => "Certificate",
            Self::VaccinationCertificate => "Vaccination certificate",
            Self::WarrantyCertificate => "Warranty certificate",
            Self::Coupon => "Coupon",
            Self::TravelCard => "Travel card",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<DocumentType> for u8 {
    fn from(value: DocumentType) -> Self {
        value.code()
    }
}

/// Rejected document type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownDocumentType(pub i64);

impl fmt::Display for UnknownDocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown document type code {}", self.0)
    }
}

impl TryFrom<u8> for DocumentType {
    type Error = UnknownDocumentType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(value)).ok_or(UnknownDocumentType(i64::from(value)))
    }
}

/// Document fields as submitted by a caller, before normalisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Raw title.
    pub title: String,
    /// Raw type code. `None` selects [`DocumentType::Default`].
    #[serde(default)]
    pub document_type: Option<i64>,
    /// Raw description.
    #[serde(default)]
    pub description: String,
    /// Expiration instant. `None` is rejected by validation.
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

impl DocumentInput {
    /// Input with a title and expiration date; other fields at their defaults.
    #[must_use]
    pub fn new(title: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            title: title.into(),
            expires_at: Some(expires_at),
            ..Self::default()
        }
    }

    /// Set the type code.
    #[must_use]
    pub fn with_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(i64::from(document_type.code()));
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Document fields after normalisation and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFields {
    pub document_type: DocumentType,
    pub title: String,
    pub description: String,
    pub expires_at: Timestamp,
}

/// Which quota was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuotaScope {
    /// Documents owned by one user.
    DocumentsPerUser,
    /// Notifications attached to one document.
    NotificationsPerDocument,
}

impl fmt::Display for QuotaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentsPerUser => f.write_str("documents per user"),
            Self::NotificationsPerDocument => f.write_str("notifications per document"),
        }
    }
}
