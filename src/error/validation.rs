//! Field-level validation errors
//!
//! Validation errors are created at the validation boundary and are always
//! canonical. Forms check which field failed through [`ValidationErrorKind`]
//! and [`InputElement`] instead of matching on `error_id` strings.

use std::fmt::{Display, Formatter};

use serde_json::Value;
use thiserror::Error;

use crate::error::{ErrorDetails, InfoMap};

/// Input element a validation error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputElement {
    CardNumber,
    Cvv,
    ExpiryDate,
    CardholderName,
    PostalCode,
    FirstName,
    LastName,
    AddressLine1,
    AddressLine2,
    City,
    State,
    CountryCode,
    PhoneNumber,
    OtpCode,
    BankId,
    RetailOutlet,
    Unknown,
}

impl InputElement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CardNumber => "CARD_NUMBER",
            Self::Cvv => "CVV",
            Self::ExpiryDate => "EXPIRY_DATE",
            Self::CardholderName => "CARDHOLDER_NAME",
            Self::PostalCode => "POSTAL_CODE",
            Self::FirstName => "FIRST_NAME",
            Self::LastName => "LAST_NAME",
            Self::AddressLine1 => "ADDRESS_LINE_1",
            Self::AddressLine2 => "ADDRESS_LINE_2",
            Self::City => "CITY",
            Self::State => "STATE",
            Self::CountryCode => "COUNTRY_CODE",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::OtpCode => "OTP_CODE",
            Self::BankId => "BANK_ID",
            Self::RetailOutlet => "RETAIL_OUTLET",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for InputElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which validation rule rejected the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    InvalidCardholderName,
    InvalidCardNumber,
    InvalidCvv,
    InvalidExpiryMonth,
    InvalidExpiryYear,
    InvalidExpiryDate,
    InvalidPostalCode,
    InvalidFirstName,
    InvalidLastName,
    InvalidAddress,
    InvalidCity,
    InvalidState,
    InvalidCountry,
    InvalidPhoneNumber,
    InvalidOtpCode,
    InvalidBankId,
    InvalidRetailOutlet,
    InvalidRawData,
    VaultedPaymentMethodAdditionalDataMismatch,
}

impl ValidationErrorKind {
    pub fn error_id(self) -> &'static str {
        match self {
            Self::InvalidCardholderName => "invalid-cardholder-name",
            Self::InvalidCardNumber => "invalid-card-number",
            Self::InvalidCvv => "invalid-cvv",
            Self::InvalidExpiryMonth => "invalid-expiry-month",
            Self::InvalidExpiryYear => "invalid-expiry-year",
            Self::InvalidExpiryDate => "invalid-expiry-date",
            Self::InvalidPostalCode => "invalid-postal-code",
            Self::InvalidFirstName => "invalid-first-name",
            Self::InvalidLastName => "invalid-last-name",
            Self::InvalidAddress => "invalid-address",
            Self::InvalidCity => "invalid-city",
            Self::InvalidState => "invalid-state",
            Self::InvalidCountry => "invalid-country",
            Self::InvalidPhoneNumber => "invalid-phone-number",
            Self::InvalidOtpCode => "invalid-otp-code",
            Self::InvalidBankId => "invalid-bank-id",
            Self::InvalidRetailOutlet => "invalid-retail-outlet",
            Self::InvalidRawData => "invalid-raw-data",
            Self::VaultedPaymentMethodAdditionalDataMismatch => {
                "vaulted-payment-method-additional-data-mismatch"
            }
        }
    }

    /// Element the rule validates
    pub fn input_element(self) -> InputElement {
        match self {
            Self::InvalidCardholderName => InputElement::CardholderName,
            Self::InvalidCardNumber => InputElement::CardNumber,
            Self::InvalidCvv => InputElement::Cvv,
            Self::InvalidExpiryMonth | Self::InvalidExpiryYear | Self::InvalidExpiryDate => {
                InputElement::ExpiryDate
            }
            Self::InvalidPostalCode => InputElement::PostalCode,
            Self::InvalidFirstName => InputElement::FirstName,
            Self::InvalidLastName => InputElement::LastName,
            Self::InvalidAddress => InputElement::AddressLine1,
            Self::InvalidCity => InputElement::City,
            Self::InvalidState => InputElement::State,
            Self::InvalidCountry => InputElement::CountryCode,
            Self::InvalidPhoneNumber => InputElement::PhoneNumber,
            Self::InvalidOtpCode => InputElement::OtpCode,
            Self::InvalidBankId => InputElement::BankId,
            Self::InvalidRetailOutlet => InputElement::RetailOutlet,
            Self::InvalidRawData | Self::VaultedPaymentMethodAdditionalDataMismatch => {
                InputElement::Unknown
            }
        }
    }
}

/// A rejected input value with the message shown next to the field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    kind: ValidationErrorKind,
    element: InputElement,
    message: String,
}

macro_rules! validation_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ValidationErrorKind::$kind, message)
            }
        )*
    };
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            element: kind.input_element(),
            message: message.into(),
        }
    }

    /// Attach the error to a different element than the rule's default
    pub fn with_element(mut self, element: InputElement) -> Self {
        self.element = element;
        self
    }

    validation_constructors! {
        invalid_cardholder_name => InvalidCardholderName,
        invalid_card_number => InvalidCardNumber,
        invalid_cvv => InvalidCvv,
        invalid_expiry_month => InvalidExpiryMonth,
        invalid_expiry_year => InvalidExpiryYear,
        invalid_expiry_date => InvalidExpiryDate,
        invalid_postal_code => InvalidPostalCode,
        invalid_first_name => InvalidFirstName,
        invalid_last_name => InvalidLastName,
        invalid_address => InvalidAddress,
        invalid_city => InvalidCity,
        invalid_state => InvalidState,
        invalid_country => InvalidCountry,
        invalid_phone_number => InvalidPhoneNumber,
        invalid_otp_code => InvalidOtpCode,
        invalid_bank_id => InvalidBankId,
        invalid_retail_outlet => InvalidRetailOutlet,
        invalid_raw_data => InvalidRawData,
    }

    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    pub fn element(&self) -> InputElement {
        self.element
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ErrorDetails for ValidationError {
    fn error_id(&self) -> String {
        self.kind.error_id().to_string()
    }

    fn variant_info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        info.insert("inputElement".into(), Value::from(self.element.as_str()));
        info.insert("message".into(), Value::from(self.message.as_str()));
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_id_ignores_message_text() {
        let short = ValidationError::invalid_cvv("CVV must be 3 or 4 digits");
        let other = ValidationError::invalid_cvv("Bad CVV");

        assert_eq!(short.error_id(), "invalid-cvv");
        assert_eq!(other.error_id(), "invalid-cvv");
    }

    #[test]
    fn test_field_tag_is_derived_from_kind() {
        let error = ValidationError::invalid_expiry_month("Month must be 01-12");

        assert_eq!(error.kind(), ValidationErrorKind::InvalidExpiryMonth);
        assert_eq!(error.element(), InputElement::ExpiryDate);
        assert_eq!(error.to_string(), "Month must be 01-12");
    }

    #[test]
    fn test_with_element_overrides_tag() {
        let error =
            ValidationError::invalid_address("Required").with_element(InputElement::AddressLine2);
        assert_eq!(error.element(), InputElement::AddressLine2);
        assert_eq!(error.error_id(), "invalid-address");
    }
}
