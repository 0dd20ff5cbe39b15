//! Validation schemas for invoice form submissions.
//!
//! `CreateInvoice` and `UpdateInvoice` accept the same three user-submitted
//! fields. `id` and `date` are never read from the form: the id comes from
//! the request path and the date is assigned on insert.

use crate::models::{FieldErrors, FormData, InvoiceChanges, InvoiceStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

pub const CUSTOMER_ID_FIELD: &str = "customerId";
pub const AMOUNT_FIELD: &str = "amount";
pub const STATUS_FIELD: &str = "status";

pub const CUSTOMER_ID_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";

/// Outcome of checking a submission against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Success(InvoiceChanges),
    Failure {
        field_errors: FieldErrors,
        summary: String,
    },
}

/// Fields accepted when creating an invoice.
#[derive(Debug, Clone, Validate)]
pub struct CreateInvoice {
    #[validate(custom(function = "validate_customer_id"))]
    pub customer_id: String,
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

/// Fields accepted when updating an invoice.
#[derive(Debug, Clone, Validate)]
pub struct UpdateInvoice {
    #[validate(custom(function = "validate_customer_id"))]
    pub customer_id: String,
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

/// Shared parsing for the invoice schemas.
pub trait InvoiceSchema: Validate + Sized {
    fn from_form(form: &FormData) -> Self;

    /// Borrow `(customer_id, amount, status)` as submitted.
    fn fields(&self) -> (&str, &str, &str);

    /// Validate and coerce without failing: the result says which.
    fn safe_parse(form: &FormData) -> ValidationResult {
        let schema = Self::from_form(form);
        let validation = schema.validate();
        let (customer_id, amount, status) = schema.fields();

        match (validation, amount_in_cents(amount), InvoiceStatus::from_str(status)) {
            (Ok(()), Some(amount_in_cents), Ok(status)) => {
                ValidationResult::Success(InvoiceChanges {
                    customer_id: customer_id.to_string(),
                    amount_in_cents,
                    status,
                })
            }
            (validation, ..) => {
                let errors = validation.err().unwrap_or_else(ValidationErrors::new);
                ValidationResult::Failure {
                    summary: errors.to_string(),
                    field_errors: field_errors(&errors),
                }
            }
        }
    }
}

impl InvoiceSchema for CreateInvoice {
    fn from_form(form: &FormData) -> Self {
        Self {
            customer_id: read(form, CUSTOMER_ID_FIELD),
            amount: read(form, AMOUNT_FIELD),
            status: read(form, STATUS_FIELD),
        }
    }

    fn fields(&self) -> (&str, &str, &str) {
        (&self.customer_id, &self.amount, &self.status)
    }
}

impl InvoiceSchema for UpdateInvoice {
    fn from_form(form: &FormData) -> Self {
        Self {
            customer_id: read(form, CUSTOMER_ID_FIELD),
            amount: read(form, AMOUNT_FIELD),
            status: read(form, STATUS_FIELD),
        }
    }

    fn fields(&self) -> (&str, &str, &str) {
        (&self.customer_id, &self.amount, &self.status)
    }
}

/// Missing fields read as empty text so they fail the same rules.
fn read(form: &FormData, name: &str) -> String {
    form.get(name).unwrap_or_default().to_string()
}

/// Convert an amount in whole currency units to minor units.
///
/// Accepts plain decimal or exponent notation (`125.50`, `.5`, `1e3`).
/// Returns `None` unless the amount parses, is strictly positive and its
/// rounded cent value fits in an `i64` and is non-zero.
pub fn amount_in_cents(amount: &str) -> Option<i64> {
    let amount = amount.trim();
    // Digit separators, hex and other radix forms are not amounts.
    if !amount
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
    {
        return None;
    }

    let amount = Decimal::from_str(amount)
        .or_else(|_| Decimal::from_scientific(amount))
        .ok()?;
    if amount <= Decimal::ZERO {
        return None;
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .filter(|cents| *cents > 0)
}

fn validate_customer_id(customer_id: &str) -> Result<(), ValidationError> {
    if customer_id.is_empty() {
        return Err(rule_error("customer_id", CUSTOMER_ID_MESSAGE));
    }
    Ok(())
}

fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    match amount_in_cents(amount) {
        Some(_) => Ok(()),
        None => Err(rule_error("amount", AMOUNT_MESSAGE)),
    }
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    InvoiceStatus::from_str(status)
        .map(|_| ())
        .map_err(|()| rule_error("status", STATUS_MESSAGE))
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Map a schema field to the name the form submits it under.
fn form_field_name(field: &str) -> &str {
    match field {
        "customer_id" => CUSTOMER_ID_FIELD,
        "amount" => AMOUNT_FIELD,
        "status" => STATUS_FIELD,
        other => other,
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::default();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            out.push(form_field_name(&field), message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(customer_id: &str, amount: &str, status: &str) -> FormData {
        FormData::new()
            .with(CUSTOMER_ID_FIELD, customer_id)
            .with(AMOUNT_FIELD, amount)
            .with(STATUS_FIELD, status)
    }

    fn errors_of(result: ValidationResult) -> FieldErrors {
        match result {
            ValidationResult::Failure { field_errors, .. } => field_errors,
            ValidationResult::Success(changes) => panic!("expected failure, got {changes:?}"),
        }
    }

    #[test]
    fn valid_submission_is_coerced_to_cents() {
        let result = CreateInvoice::safe_parse(&form("c1", "125.50", "pending"));
        assert_eq!(
            result,
            ValidationResult::Success(InvoiceChanges {
                customer_id: "c1".to_string(),
                amount_in_cents: 12550,
                status: InvoiceStatus::Pending,
            })
        );
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in ["0", "-1", "-0.01", "0.00", ""] {
            let errors = errors_of(CreateInvoice::safe_parse(&form("c1", amount, "paid")));
            assert_eq!(
                errors.get(AMOUNT_FIELD),
                Some(&[AMOUNT_MESSAGE.to_string()][..]),
                "amount {amount:?}"
            );
        }
    }

    #[test]
    fn unparseable_amount_is_an_amount_error() {
        let errors = errors_of(UpdateInvoice::safe_parse(&form("c1", "ten", "paid")));
        assert!(errors.contains(AMOUNT_FIELD));
        assert!(!errors.contains(CUSTOMER_ID_FIELD));
    }

    #[test]
    fn missing_customer_is_rejected() {
        let submission = FormData::new()
            .with(AMOUNT_FIELD, "10")
            .with(STATUS_FIELD, "paid");
        let errors = errors_of(UpdateInvoice::safe_parse(&submission));
        assert_eq!(
            errors.get(CUSTOMER_ID_FIELD),
            Some(&[CUSTOMER_ID_MESSAGE.to_string()][..])
        );
    }

    #[test]
    fn status_must_match_exactly() {
        for status in ["", "PAID", "overdue", " pending"] {
            let errors = errors_of(CreateInvoice::safe_parse(&form("c1", "10", status)));
            assert_eq!(
                errors.get(STATUS_FIELD),
                Some(&[STATUS_MESSAGE.to_string()][..]),
                "status {status:?}"
            );
        }
    }

    #[test]
    fn every_broken_field_is_reported() {
        let errors = errors_of(CreateInvoice::safe_parse(&FormData::new()));
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec![AMOUNT_FIELD, CUSTOMER_ID_FIELD, STATUS_FIELD]);
    }

    #[test]
    fn amount_accepts_only_numeric_notation() {
        assert_eq!(amount_in_cents("1e3"), Some(100000));
        assert_eq!(amount_in_cents(".5"), Some(50));
        for amount in ["1_000", "0x10", "1,000", "$10", "10 00", "NaN", "Infinity"] {
            assert_eq!(amount_in_cents(amount), None, "amount {amount:?}");
            let errors = errors_of(CreateInvoice::safe_parse(&form("c1", amount, "paid")));
            assert!(errors.contains(AMOUNT_FIELD), "amount {amount:?}");
        }
    }

    #[test]
    fn failure_summary_comes_from_validation() {
        match CreateInvoice::safe_parse(&form("", "10", "paid")) {
            ValidationResult::Failure {
                field_errors,
                summary,
            } => {
                assert_eq!(field_errors.fields().collect::<Vec<_>>(), vec![CUSTOMER_ID_FIELD]);
                assert!(summary.contains("customer_id"), "{summary}");
            }
            ValidationResult::Success(changes) => panic!("expected failure, got {changes:?}"),
        }
    }

    #[test]
    fn cents_round_half_away_from_zero() {
        assert_eq!(amount_in_cents("10"), Some(1000));
        assert_eq!(amount_in_cents(" 0.015 "), Some(2));
        assert_eq!(amount_in_cents("0.004"), None);
        assert_eq!(amount_in_cents("99999999999999999999"), None);
    }
}
