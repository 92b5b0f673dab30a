//! Tax computation for the municipal return.
//!
//! The wage ledger aggregates per-employer W-2 figures; the calculator turns
//! the declared return into taxable income, tax due, payments and the final
//! balance.

pub mod municipal;
pub mod wage_ledger;

pub use municipal::{
    Balance, ConfigError, MunicipalTaxConfig, TaxCalculationResult, TaxCalculator,
    WageReconciliation,
};
pub use wage_ledger::{LedgerError, WageLedger, WageTotals};
