//! Amount validation and rate-based conversion.

use crate::core::error::FormError;
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("amount pattern is a valid regex")
});

/// A single user-initiated conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: String,
    pub source: String,
    pub target: String,
}

/// Outcome of a conversion, detached from later edits to the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub amount: String,
    pub source: String,
    pub target: String,
    pub converted: f64,
}

impl ConversionResult {
    pub fn converted_display(&self) -> String {
        format!("{:.2}", self.converted)
    }
}

impl Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            self.amount,
            self.source,
            self.converted_display(),
            self.target
        )
    }
}

/// Checks the raw amount text and parses it.
///
/// Accepts one or more ASCII digits, optionally followed by a decimal point
/// and one or two digits. Signs, exponents, whitespace and separators are
/// rejected, as are digit strings too long to fit in an `f64`.
pub fn validate_amount(amount: &str) -> Result<f64, FormError> {
    if amount.is_empty() {
        return Err(FormError::AmountRequired);
    }
    if !AMOUNT_PATTERN.is_match(amount) {
        return Err(FormError::InvalidAmount);
    }
    amount
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(FormError::InvalidAmount)
}

/// Rounds half away from zero to two decimal places.
///
/// Values too large to scale by 100 have no fractional part and pass through.
pub fn round_to_cents(value: f64) -> f64 {
    let cents = value * 100.0;
    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        value
    }
}

/// Validates the request amount and multiplies it by `ratio`.
pub fn convert(
    request: &ConversionRequest,
    ratio: Option<f64>,
) -> Result<ConversionResult, FormError> {
    let amount = validate_amount(&request.amount)?;
    let unavailable = || FormError::RateUnavailable {
        from: request.source.clone(),
        to: request.target.clone(),
    };
    let ratio = ratio.ok_or_else(unavailable)?;
    let converted = round_to_cents(amount * ratio);
    if !converted.is_finite() {
        return Err(unavailable());
    }

    Ok(ConversionResult {
        amount: request.amount.clone(),
        source: request.source.clone(),
        target: request.target.clone(),
        converted,
    })
}
