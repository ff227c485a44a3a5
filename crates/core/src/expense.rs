//! Expense amount rules: VAT derivation and net computation.
//!
//! Amounts are VAT-inclusive gross values in the project's currency. The VAT
//! rate is a percentage (`20` means 20%).

use rust_decimal::Decimal;

use crate::error::CoreError;

/// Decimal places kept for money amounts.
pub const MONEY_DP: u32 = 2;

/// Decimal places kept for VAT rates.
pub const RATE_DP: u32 = 3;

/// Currency assigned to new projects.
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Resolved amounts for an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseAmounts {
    pub gross_amount: Decimal,
    pub vat_rate: Option<Decimal>,
    pub vat_amount: Option<Decimal>,
    pub net_amount: Option<Decimal>,
}

/// Validate and complete the amounts of an expense.
///
/// - `gross` must not be negative (refunds are flagged, not signed).
/// - An explicit VAT amount must lie within `[0, gross]`.
/// - With only a rate, VAT is backed out of the gross: `gross - gross / (1 + rate/100)`.
/// - Net is `gross - vat` whenever VAT is known.
pub fn compute_amounts(
    gross: Decimal,
    vat_rate: Option<Decimal>,
    vat_amount: Option<Decimal>,
) -> Result<ExpenseAmounts, CoreError> {
    if gross.is_sign_negative() && !gross.is_zero() {
        return Err(CoreError::Validation(
            "Gross amount must not be negative; mark refunds with is_refund".into(),
        ));
    }
    let gross = gross.round_dp(MONEY_DP);

    let vat_rate = match vat_rate {
        Some(rate) if rate.is_sign_negative() && !rate.is_zero() => {
            return Err(CoreError::Validation("VAT rate must not be negative".into()));
        }
        Some(rate) => Some(rate.round_dp(RATE_DP)),
        None => None,
    };

    let vat_amount = match (vat_amount, vat_rate) {
        (Some(vat), _) => {
            let vat = vat.round_dp(MONEY_DP);
            if (vat.is_sign_negative() && !vat.is_zero()) || vat > gross {
                return Err(CoreError::Validation(format!(
                    "VAT amount {vat} must be between 0 and the gross amount {gross}"
                )));
            }
            Some(vat)
        }
        (None, Some(rate)) => {
            let divisor = Decimal::ONE + rate / Decimal::ONE_HUNDRED;
            Some((gross - gross / divisor).round_dp(MONEY_DP))
        }
        (None, None) => None,
    };

    Ok(ExpenseAmounts {
        gross_amount: gross,
        vat_rate,
        vat_amount,
        net_amount: vat_amount.map(|vat| gross - vat),
    })
}

/// Signed contribution of an expense to project spend.
pub fn signed_spend(gross: Decimal, is_refund: bool) -> Decimal {
    if is_refund {
        -gross
    } else {
        gross
    }
}
