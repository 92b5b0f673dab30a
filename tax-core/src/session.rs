//! One form-filling session: a return, its wage ledger, the wizard position
//! and the calculator that prices it.
//!
//! Every per-render output ([`ReturnSession::wage_totals`],
//! [`ReturnSession::calculation`], [`ReturnSession::section_errors`]) is
//! derived on demand from the current inputs. Nothing is cached.
//!
//! # Example
//!
//! ```
//! use tax_core::calculations::MunicipalTaxConfig;
//! use tax_core::session::ReturnSession;
//! use tax_core::{ReturnField, WageField};
//!
//! let mut session = ReturnSession::new(MunicipalTaxConfig::default()).unwrap();
//!
//! session.update_wage(0, WageField::QualifyingWages, "105,622.21").unwrap();
//! session.edit(ReturnField::QualifyingWages, "105622.21").unwrap();
//!
//! assert_eq!(session.wage_totals().net_taxable_wages.to_string(), "105,622.21");
//! assert!(session.calculation().reconciliation.unwrap().is_reconciled());
//! assert!(!session.next().moved());
//! ```

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::calculations::{
    ConfigError, LedgerError, MunicipalTaxConfig, TaxCalculationResult, TaxCalculator,
    WageLedger, WageTotals,
};
use crate::submission::{FinalizedReturn, SubmissionError, SubmissionHandoff};
use crate::validation::{ReturnValidator, ValidationResult};
use crate::wizard::{Advance, Section, Wizard};
use crate::{FieldError, FieldValue, ReturnField, TaxReturn, WageEntry, WageField};

#[derive(Debug, Clone)]
pub struct ReturnSession {
    tax_return: TaxReturn,
    wages: WageLedger,
    wizard: Wizard,
    calculator: TaxCalculator,
}

impl ReturnSession {
    /// Starts a blank return with one empty wage entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn new(config: MunicipalTaxConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            TaxCalculator::new(config)?,
            TaxReturn::default(),
            WageLedger::with_blank_entry(),
        ))
    }

    /// Resumes a return that was entered elsewhere, starting at the first section.
    pub fn from_parts(
        calculator: TaxCalculator,
        tax_return: TaxReturn,
        wages: WageLedger,
    ) -> Self {
        Self {
            tax_return,
            wages,
            wizard: Wizard::new(),
            calculator,
        }
    }

    pub fn tax_return(&self) -> &TaxReturn {
        &self.tax_return
    }

    pub fn wages(&self) -> &WageLedger {
        &self.wages
    }

    pub fn calculator(&self) -> &TaxCalculator {
        &self.calculator
    }

    // -- Edits --

    pub fn edit(
        &mut self,
        field: ReturnField,
        value: impl Into<FieldValue>,
    ) -> Result<(), FieldError> {
        self.tax_return.set(field, value)
    }

    pub fn add_wage_entry(&mut self) -> usize {
        self.wages.add_entry()
    }

    pub fn remove_wage_entry(
        &mut self,
        index: usize,
    ) -> Result<WageEntry, LedgerError> {
        self.wages.remove_entry(index)
    }

    pub fn update_wage(
        &mut self,
        index: usize,
        field: WageField,
        value: impl Into<FieldValue>,
    ) -> Result<(), LedgerError> {
        self.wages.update_field(index, field, value)
    }

    // -- Derived outputs --

    pub fn wage_totals(&self) -> WageTotals {
        self.wages.totals()
    }

    /// The return priced with the ledger totals attached for reconciliation.
    pub fn calculation(&self) -> TaxCalculationResult {
        self.calculator
            .compute(&self.tax_return, Some(&self.wages.totals()))
    }

    /// Errors for the section the wizard is on.
    pub fn section_errors(&self) -> ValidationResult {
        ReturnValidator::validate_section(self.wizard.current_section(), &self.tax_return, &self.wages)
    }

    pub fn validate(&self) -> ValidationResult {
        ReturnValidator::validate(&self.tax_return, &self.wages)
    }

    // -- Navigation --

    pub fn current_section(&self) -> Section {
        self.wizard.current_section()
    }

    pub fn current_index(&self) -> usize {
        self.wizard.current_index()
    }

    pub fn progress_ratio(&self) -> Decimal {
        self.wizard.progress_ratio()
    }

    pub fn next(&mut self) -> Advance {
        self.wizard.next(&self.tax_return, &self.wages)
    }

    pub fn previous(&mut self) -> Section {
        self.wizard.previous()
    }

    /// Discards the current return and rewinds to the first section.
    pub fn start_new_return(&mut self) {
        self.tax_return = TaxReturn::default();
        self.wages = WageLedger::with_blank_entry();
        self.wizard.reset();
        info!("Started a new return");
    }

    /// Finalizes the return and passes it to `handoff`.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::NotAtFinalSection`] unless the wizard is on the last section
    /// - [`SubmissionError::Invalid`] if any section has errors
    /// - [`SubmissionError::Handoff`] if the handoff refuses the filing
    pub fn submit(
        &self,
        handoff: &mut dyn SubmissionHandoff,
    ) -> Result<FinalizedReturn, SubmissionError> {
        if !self.wizard.is_last() {
            return Err(SubmissionError::NotAtFinalSection(self.current_section()));
        }

        let errors = self.validate();
        if !errors.is_valid() {
            return Err(SubmissionError::Invalid(errors));
        }

        let wage_totals = self.wages.totals();
        let filing = FinalizedReturn {
            finalized_at: Utc::now(),
            tax_return: self.tax_return.clone(),
            wages: self.wages.entries().to_vec(),
            wage_totals,
            calculation: self.calculator.compute(&self.tax_return, Some(&wage_totals)),
        };

        handoff.hand_off(&filing)?;
        info!(
            "Submitted return for '{}': {}",
            filing.tax_return.taxpayer_name, filing.calculation.balance
        );
        Ok(filing)
    }
}
