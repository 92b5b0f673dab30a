//! Municipal income tax calculation for the annual city return.
//!
//! # Form lines
//!
//! | Line | Description |
//! |------|-------------|
//! | 7    | Net business/rental income (self-employment + rental + other − loss carryforward) |
//! | 8    | Taxable income (qualifying wages + line 7) |
//! | 9    | Tax due on income (line 8 × municipal rate) |
//! | 10   | City tax withheld |
//! | 11   | Taxes withheld or paid to other cities |
//! | 12   | Estimated taxes paid |
//! | 13   | Prior year credit / extension payments |
//! | 14   | Total payments and credits (lines 10 to 13) |
//! | 15   | Tax due or overpayment (line 9 − line 14) |
//! | 17   | Total tax due (line 15 when above the de minimis threshold, else 0) |
//!
//! Taxable income uses the wages declared on the return, not the wage
//! ledger. When ledger totals are supplied they are compared against the
//! declared figures in a [`WageReconciliation`], which never alters the
//! computed tax.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{Balance, MunicipalTaxConfig, TaxCalculator};
//! use tax_core::{Amount, TaxReturn};
//!
//! let calculator = TaxCalculator::new(MunicipalTaxConfig::default()).unwrap();
//!
//! let tax_return = TaxReturn {
//!     qualifying_wages: Amount::parse("244340.80"),
//!     dublin_tax_withheld: Amount::parse("4886.92"),
//!     ..TaxReturn::default()
//! };
//!
//! let result = calculator.compute(&tax_return, None);
//!
//! assert_eq!(result.tax_due.as_decimal(), dec!(4886.82));
//! assert_eq!(result.balance, Balance::Refund(Amount::parse("0.10")));
//! assert_eq!(result.final_tax_due, Amount::ZERO);
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::WageTotals;
use crate::{Amount, TaxReturn};

/// Errors for an unusable [`MunicipalTaxConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tax rate must be between 0 and 1, got {0}")]
    InvalidTaxRate(Decimal),

    #[error("de minimis threshold must be non-negative, got {0}")]
    InvalidThreshold(Amount),
}

/// Statutory parameters that differ from one municipality to the next.
///
/// Missing keys in a config document fall back to [`MunicipalTaxConfig::dublin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MunicipalTaxConfig {
    /// Name printed on reports.
    pub municipality: String,

    /// Flat income tax rate as a fraction (Dublin: `0.02`).
    pub tax_rate: Decimal,

    /// A balance due at or below this amount is not collected (Dublin: $10).
    pub de_minimis_threshold: Amount,
}

impl MunicipalTaxConfig {
    /// Dublin, Ohio: 2% with a $10 collection floor.
    pub fn dublin() -> Self {
        Self {
            municipality: "Dublin".to_string(),
            tax_rate: Decimal::new(2, 2),
            de_minimis_threshold: Amount::from_cents(1_000),
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the rate is outside `[0, 1]` or the
    /// threshold is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidTaxRate(self.tax_rate));
        }
        if self.de_minimis_threshold.is_negative() {
            return Err(ConfigError::InvalidThreshold(self.de_minimis_threshold));
        }
        Ok(())
    }
}

impl Default for MunicipalTaxConfig {
    fn default() -> Self {
        Self::dublin()
    }
}

/// Line 15 with its direction made explicit.
///
/// A zero balance is reported as `Due(0.00)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "camelCase")]
pub enum Balance {
    Due(Amount),
    Refund(Amount),
}

impl Balance {
    pub fn from_signed(balance: Amount) -> Self {
        if balance.is_negative() {
            Self::Refund(balance.abs())
        } else {
            Self::Due(balance)
        }
    }

    /// Positive when owed, negative when refunded.
    pub fn signed(&self) -> Amount {
        match *self {
            Self::Due(amount) => amount,
            Self::Refund(amount) => -amount,
        }
    }

    pub fn magnitude(&self) -> Amount {
        match *self {
            Self::Due(amount) | Self::Refund(amount) => amount,
        }
    }

    pub fn is_refund(&self) -> bool {
        matches!(self, Self::Refund(_))
    }
}

impl fmt::Display for Balance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let text = match self {
            Self::Due(amount) => format!("{amount} DUE"),
            Self::Refund(amount) => format!("{amount} REFUND"),
        };
        f.pad(&text)
    }
}

/// Declared return figures next to the wage ledger's totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WageReconciliation {
    pub declared_wages: Amount,
    pub ledger_net_taxable_wages: Amount,
    /// Declared minus ledger.
    pub wage_difference: Amount,
    pub declared_city_withheld: Amount,
    pub ledger_city_withheld: Amount,
    /// Declared minus ledger.
    pub withholding_difference: Amount,
}

impl WageReconciliation {
    fn between(
        tax_return: &TaxReturn,
        totals: &WageTotals,
    ) -> Self {
        Self {
            declared_wages: tax_return.qualifying_wages,
            ledger_net_taxable_wages: totals.net_taxable_wages,
            wage_difference: tax_return.qualifying_wages - totals.net_taxable_wages,
            declared_city_withheld: tax_return.dublin_tax_withheld,
            ledger_city_withheld: totals.dublin_tax_withheld,
            withholding_difference: tax_return.dublin_tax_withheld - totals.dublin_tax_withheld,
        }
    }

    /// True when both differences are zero.
    pub fn is_reconciled(&self) -> bool {
        self.wage_difference.is_zero() && self.withholding_difference.is_zero()
    }
}

/// Result of [`TaxCalculator::compute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    /// Line 7.
    pub net_business_income: Amount,

    /// Line 8.
    pub taxable_income: Amount,

    /// Line 9, rounded half-up to the cent.
    pub tax_due: Amount,

    /// Line 14.
    pub total_payments: Amount,

    /// Line 17. Zero unless the balance due exceeds the threshold.
    pub final_tax_due: Amount,

    /// Line 15.
    pub balance: Balance,

    /// Present only when wage totals were passed to `compute`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<WageReconciliation>,
}

/// Stateless calculator bound to one municipality's rules.
#[derive(Debug, Clone)]
pub struct TaxCalculator {
    config: MunicipalTaxConfig,
}

impl TaxCalculator {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails [`MunicipalTaxConfig::validate`].
    pub fn new(config: MunicipalTaxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MunicipalTaxConfig {
        &self.config
    }

    /// Derives every computed line of the return.
    ///
    /// Pure: the same inputs always produce the same result.
    pub fn compute(
        &self,
        tax_return: &TaxReturn,
        wage_totals: Option<&WageTotals>,
    ) -> TaxCalculationResult {
        let net_business_income = self.net_business_income(tax_return);
        let taxable_income = tax_return.qualifying_wages + net_business_income;
        let tax_due = taxable_income.scale(self.config.tax_rate);
        let total_payments = self.total_payments(tax_return);
        let balance = Balance::from_signed(tax_due - total_payments);
        let final_tax_due = self.final_tax_due(balance);

        TaxCalculationResult {
            net_business_income,
            taxable_income,
            tax_due,
            total_payments,
            final_tax_due,
            balance,
            reconciliation: wage_totals.map(|totals| WageReconciliation::between(tax_return, totals)),
        }
    }

    fn net_business_income(
        &self,
        tax_return: &TaxReturn,
    ) -> Amount {
        tax_return.self_employment_income + tax_return.rental_income + tax_return.other_taxable_income
            - tax_return.prior_year_loss_carryforward
    }

    fn total_payments(
        &self,
        tax_return: &TaxReturn,
    ) -> Amount {
        tax_return.dublin_tax_withheld
            + tax_return.taxes_withheld_other_cities
            + tax_return.estimated_taxes_paid
            + tax_return.prior_year_credit
    }

    /// Only ever lowers a positive balance to zero; a refund stays zero.
    fn final_tax_due(
        &self,
        balance: Balance,
    ) -> Amount {
        match balance {
            Balance::Due(amount) if amount > self.config.de_minimis_threshold => amount,
            _ => Amount::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::WageField;
    use crate::calculations::WageLedger;

    fn calculator() -> TaxCalculator {
        TaxCalculator::new(MunicipalTaxConfig::dublin()).unwrap()
    }

    fn sample_return() -> TaxReturn {
        TaxReturn {
            qualifying_wages: Amount::parse("244340.80"),
            dublin_tax_withheld: Amount::parse("4886.92"),
            ..TaxReturn::default()
        }
    }

    /// A return whose line 15 balance is exactly `balance`, at 2% with no payments.
    fn return_with_balance(balance: &str) -> TaxReturn {
        let tax_due = Amount::parse(balance);
        TaxReturn {
            qualifying_wages: tax_due.scale(dec!(50)),
            ..TaxReturn::default()
        }
    }

    // =========================================================================
    // config
    // =========================================================================

    #[test]
    fn config_rejects_rate_above_one() {
        let config = MunicipalTaxConfig {
            tax_rate: dec!(1.5),
            ..MunicipalTaxConfig::dublin()
        };

        assert_eq!(config.validate(), Err(ConfigError::InvalidTaxRate(dec!(1.5))));
        assert!(TaxCalculator::new(config).is_err());
    }

    #[test]
    fn config_rejects_negative_threshold() {
        let config = MunicipalTaxConfig {
            de_minimis_threshold: Amount::from_cents(-1),
            ..MunicipalTaxConfig::dublin()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(Amount::from_cents(-1)))
        );
    }

    // =========================================================================
    // income lines
    // =========================================================================

    #[test]
    fn scenario_two_employer_refund() {
        let result = calculator().compute(&sample_return(), None);

        assert_eq!(result.taxable_income.as_decimal(), dec!(244340.80));
        assert_eq!(result.tax_due.as_decimal(), dec!(4886.82));
        assert_eq!(result.total_payments.as_decimal(), dec!(4886.92));
        assert_eq!(result.balance, Balance::Refund(Amount::from_cents(10)));
        assert_eq!(result.balance.signed().as_decimal(), dec!(-0.10));
        assert_eq!(result.final_tax_due, Amount::ZERO);
    }

    #[test]
    fn taxable_income_includes_business_income_less_carryforward() {
        let tax_return = TaxReturn {
            qualifying_wages: Amount::parse("50000"),
            self_employment_income: Amount::parse("12000"),
            rental_income: Amount::parse("3000"),
            other_taxable_income: Amount::parse("500"),
            prior_year_loss_carryforward: Amount::parse("1500"),
            ..TaxReturn::default()
        };

        let result = calculator().compute(&tax_return, None);

        assert_eq!(result.net_business_income.as_decimal(), dec!(14000));
        assert_eq!(result.taxable_income.as_decimal(), dec!(64000));
        assert_eq!(result.tax_due.as_decimal(), dec!(1280.00));
    }

    #[test]
    fn negative_income_is_carried_through() {
        let tax_return = TaxReturn {
            other_taxable_income: Amount::parse("-200"),
            ..TaxReturn::default()
        };

        let result = calculator().compute(&tax_return, None);

        assert_eq!(result.taxable_income.as_decimal(), dec!(-200));
        assert_eq!(result.tax_due.as_decimal(), dec!(-4.00));
        assert_eq!(result.balance, Balance::Refund(Amount::from_cents(400)));
    }

    #[test]
    fn total_payments_sums_all_four_lines() {
        let tax_return = TaxReturn {
            dublin_tax_withheld: Amount::parse("100.10"),
            taxes_withheld_other_cities: Amount::parse("200.20"),
            estimated_taxes_paid: Amount::parse("300.30"),
            prior_year_credit: Amount::parse("400.40"),
            ..TaxReturn::default()
        };

        let result = calculator().compute(&tax_return, None);

        assert_eq!(result.total_payments.as_decimal(), dec!(1001.00));
    }

    #[test]
    fn rate_comes_from_config() {
        let calculator = TaxCalculator::new(MunicipalTaxConfig {
            municipality: "Columbus".to_string(),
            tax_rate: dec!(0.025),
            de_minimis_threshold: Amount::ZERO,
        })
        .unwrap();

        let result = calculator.compute(&sample_return(), None);

        assert_eq!(result.tax_due.as_decimal(), dec!(6108.52));
    }

    #[test]
    fn extreme_amounts_saturate_instead_of_panicking() {
        let top = Amount::new(Decimal::MAX);
        let tax_return = TaxReturn {
            qualifying_wages: top,
            self_employment_income: top,
            prior_year_loss_carryforward: -top,
            ..TaxReturn::default()
        };
        let mut ledger = WageLedger::new();
        let index = ledger.add_entry();
        ledger
            .update_field(index, WageField::QualifyingWages, -top)
            .unwrap();

        let result = calculator().compute(&tax_return, Some(&ledger.totals()));

        assert_eq!(result.taxable_income, top);
        assert_eq!(result.tax_due, top.scale(dec!(0.02)));
        assert_eq!(result.final_tax_due, result.tax_due);
        let reconciliation = result.reconciliation.unwrap();
        assert_eq!(reconciliation.wage_difference, top);
    }

    #[test]
    fn compute_is_idempotent() {
        let calculator = calculator();
        let tax_return = sample_return();

        assert_eq!(
            calculator.compute(&tax_return, None),
            calculator.compute(&tax_return, None)
        );
    }

    // =========================================================================
    // threshold clamp
    // =========================================================================

    #[test]
    fn balance_at_threshold_is_waived() {
        let result = calculator().compute(&return_with_balance("10.00"), None);

        assert_eq!(result.balance, Balance::Due(Amount::from_cents(1_000)));
        assert_eq!(result.final_tax_due, Amount::ZERO);
    }

    #[test]
    fn balance_just_above_threshold_is_collected() {
        let result = calculator().compute(&return_with_balance("10.01"), None);

        assert_eq!(result.final_tax_due, Amount::from_cents(1_001));
    }

    #[test]
    fn balance_below_threshold_is_waived() {
        let result = calculator().compute(&return_with_balance("9.99"), None);

        assert_eq!(result.final_tax_due, Amount::ZERO);
        assert!(!result.balance.is_refund());
    }

    #[test]
    fn zero_balance_is_due_not_refund() {
        let result = calculator().compute(&TaxReturn::default(), None);

        assert_eq!(result.balance, Balance::Due(Amount::ZERO));
    }

    #[test]
    fn large_refund_never_becomes_due() {
        let tax_return = TaxReturn {
            estimated_taxes_paid: Amount::parse("5000"),
            ..TaxReturn::default()
        };

        let result = calculator().compute(&tax_return, None);

        assert_eq!(result.balance, Balance::Refund(Amount::parse("5000")));
        assert_eq!(result.final_tax_due, Amount::ZERO);
    }

    // =========================================================================
    // reconciliation
    // =========================================================================

    #[test]
    fn reconciliation_reports_differences_without_changing_tax() {
        let totals = WageTotals {
            net_taxable_wages: Amount::parse("244000.00"),
            dublin_tax_withheld: Amount::parse("4886.92"),
            ..WageTotals::default()
        };

        let with = calculator().compute(&sample_return(), Some(&totals));
        let without = calculator().compute(&sample_return(), None);

        let reconciliation = with.reconciliation.unwrap();
        assert_eq!(reconciliation.wage_difference.as_decimal(), dec!(340.80));
        assert_eq!(reconciliation.withholding_difference, Amount::ZERO);
        assert!(!reconciliation.is_reconciled());
        assert_eq!(with.tax_due, without.tax_due);
        assert_eq!(with.balance, without.balance);
    }

    #[test]
    fn balance_display_names_direction() {
        assert_eq!(Balance::Refund(Amount::from_cents(10)).to_string(), "0.10 REFUND");
        assert_eq!(Balance::Due(Amount::from_cents(123_456)).to_string(), "1,234.56 DUE");
    }
}
