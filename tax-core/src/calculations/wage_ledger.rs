//! Per-employer wage records and their running totals.
//!
//! The ledger exclusively owns its [`WageEntry`] records. Each entry keeps its
//! own net taxable wages current on every write, and [`WageLedger::totals`]
//! is a plain fold over the entries, so there is nothing to recalculate and
//! nothing that can go stale.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::WageField;
//! use tax_core::calculations::WageLedger;
//!
//! let mut ledger = WageLedger::new();
//! let first = ledger.add_entry();
//! ledger.update_field(first, WageField::QualifyingWages, "105622.21").unwrap();
//! let second = ledger.add_entry();
//! ledger.update_field(second, WageField::QualifyingWages, "138718.59").unwrap();
//!
//! let totals = ledger.totals();
//! assert_eq!(totals.qualifying_wages.as_decimal(), dec!(244340.80));
//! assert_eq!(totals.net_taxable_wages.as_decimal(), dec!(244340.80));
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{Amount, FieldError, FieldValue, WageEntry, WageField};

/// Errors raised by ledger operations.
///
/// Both variants indicate a caller bug rather than bad user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("wage entry {index} is out of range (ledger has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Column sums over every entry in a [`WageLedger`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WageTotals {
    pub qualifying_wages: Amount,
    pub dublin_tax_withheld: Amount,
    pub other_city_tax_withheld: Amount,
    pub adjustments: Amount,
    pub net_taxable_wages: Amount,
    pub credit_limit: Amount,
}

impl WageTotals {
    fn include(
        mut self,
        entry: &WageEntry,
    ) -> Self {
        self.qualifying_wages += entry.qualifying_wages();
        self.dublin_tax_withheld += entry.dublin_tax_withheld();
        self.other_city_tax_withheld += entry.other_city_tax_withheld();
        self.adjustments += entry.adjustments();
        self.net_taxable_wages += entry.net_taxable_wages();
        self.credit_limit += entry.credit_limit();
        self
    }
}

/// The ordered collection of wage entries for one return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WageLedger {
    entries: Vec<WageEntry>,
}

impl WageLedger {
    /// An empty ledger. Totals over it are all zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger holding one zero-valued entry, which is how a fresh
    /// return starts out.
    pub fn with_blank_entry() -> Self {
        Self {
            entries: vec![WageEntry::new()],
        }
    }

    /// Appends a zero-valued entry and returns its index.
    pub fn add_entry(&mut self) -> usize {
        self.entries.push(WageEntry::new());
        let index = self.entries.len() - 1;
        debug!(index, "wage entry added");
        index
    }

    /// Removes the entry at `index`; the remaining entries keep their values
    /// and shift down by one.
    ///
    /// Removing the last remaining entry is allowed.
    pub fn remove_entry(
        &mut self,
        index: usize,
    ) -> Result<WageEntry, LedgerError> {
        self.check_index(index)?;
        let removed = self.entries.remove(index);
        debug!(index, remaining = self.entries.len(), "wage entry removed");
        Ok(removed)
    }

    /// Writes one field of one entry.
    ///
    /// Writing `qualifyingWages` or `adjustments` refreshes that entry's net
    /// taxable wages before this returns; no other entry is touched. On error
    /// the ledger is left unchanged.
    pub fn update_field(
        &mut self,
        index: usize,
        field: WageField,
        value: impl Into<FieldValue>,
    ) -> Result<(), LedgerError> {
        self.check_index(index)?;
        self.entries[index].set(field, value)?;
        debug!(index, field = %field, "wage entry updated");
        Ok(())
    }

    /// Column sums over the current entries.
    pub fn totals(&self) -> WageTotals {
        self.entries
            .iter()
            .fold(WageTotals::default(), WageTotals::include)
    }

    pub fn entries(&self) -> &[WageEntry] {
        &self.entries
    }

    pub fn entry(
        &self,
        index: usize,
    ) -> Option<&WageEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_index(
        &self,
        index: usize,
    ) -> Result<(), LedgerError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(LedgerError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_employer_ledger() -> WageLedger {
        let mut ledger = WageLedger::new();

        let first = ledger.add_entry();
        ledger
            .update_field(first, WageField::EmployerEin, "31-6401089")
            .unwrap();
        ledger
            .update_field(first, WageField::QualifyingWages, "105622.21")
            .unwrap();
        ledger
            .update_field(first, WageField::DublinTaxWithheld, "2112.55")
            .unwrap();

        let second = ledger.add_entry();
        ledger
            .update_field(second, WageField::EmployerEin, "31-4379441")
            .unwrap();
        ledger
            .update_field(second, WageField::QualifyingWages, "138718.59")
            .unwrap();
        ledger
            .update_field(second, WageField::DublinTaxWithheld, "2774.37")
            .unwrap();

        ledger
    }

    // =========================================================================
    // totals
    // =========================================================================

    #[test]
    fn totals_sum_every_column() {
        let totals = two_employer_ledger().totals();

        assert_eq!(totals.qualifying_wages.as_decimal(), dec!(244340.80));
        assert_eq!(totals.net_taxable_wages.as_decimal(), dec!(244340.80));
        assert_eq!(totals.dublin_tax_withheld.as_decimal(), dec!(4886.92));
        assert_eq!(totals.adjustments, Amount::ZERO);
        assert_eq!(totals.credit_limit, Amount::ZERO);
    }

    #[test]
    fn totals_of_empty_ledger_are_zero() {
        assert_eq!(WageLedger::new().totals(), WageTotals::default());
    }

    #[test]
    fn removing_the_only_entry_leaves_zero_totals() {
        let mut ledger = WageLedger::with_blank_entry();
        ledger
            .update_field(0, WageField::QualifyingWages, "5000")
            .unwrap();

        ledger.remove_entry(0).unwrap();

        assert!(ledger.is_empty());
        assert_eq!(ledger.totals(), WageTotals::default());
    }

    #[test]
    fn totals_track_adjustments() {
        let mut ledger = two_employer_ledger();

        ledger
            .update_field(1, WageField::Adjustments, "718.59")
            .unwrap();

        let totals = ledger.totals();
        assert_eq!(totals.adjustments.as_decimal(), dec!(718.59));
        assert_eq!(totals.net_taxable_wages.as_decimal(), dec!(243622.21));
        assert_eq!(totals.qualifying_wages.as_decimal(), dec!(244340.80));
    }

    // =========================================================================
    // structural errors
    // =========================================================================

    #[test]
    fn update_out_of_range_is_rejected() {
        let mut ledger = two_employer_ledger();

        let result = ledger.update_field(2, WageField::CityEmployed, "DUBLIN");

        assert_eq!(result, Err(LedgerError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let mut ledger = WageLedger::new();

        assert_eq!(
            ledger.remove_entry(0),
            Err(LedgerError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn type_mismatch_leaves_entry_unchanged() {
        let mut ledger = two_employer_ledger();
        let before = ledger.clone();

        let result = ledger.update_field(0, WageField::QualifyingWages, true);

        assert!(matches!(result, Err(LedgerError::Field(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn removal_does_not_disturb_other_entries() {
        let mut ledger = two_employer_ledger();

        let removed = ledger.remove_entry(0).unwrap();

        assert_eq!(removed.employer_ein(), "31-6401089");
        assert_eq!(ledger.len(), 1);
        let remaining = ledger.entry(0).unwrap();
        assert_eq!(remaining.employer_ein(), "31-4379441");
        assert_eq!(remaining.net_taxable_wages().as_decimal(), dec!(138718.59));
    }

    #[test]
    fn update_only_touches_the_addressed_entry() {
        let mut ledger = two_employer_ledger();

        ledger
            .update_field(0, WageField::Adjustments, "100")
            .unwrap();

        assert_eq!(ledger.entries()[0].net_taxable_wages().as_decimal(), dec!(105522.21));
        assert_eq!(ledger.entries()[1].net_taxable_wages().as_decimal(), dec!(138718.59));
    }

    // =========================================================================
    // extreme amounts
    // =========================================================================

    #[test]
    fn widest_typed_wage_reads_as_zero() {
        let mut ledger = WageLedger::with_blank_entry();

        ledger
            .update_field(0, WageField::QualifyingWages, "79228162514264337593543950335")
            .unwrap();
        ledger
            .update_field(0, WageField::Adjustments, "-1")
            .unwrap();

        let entry = ledger.entry(0).unwrap();
        assert_eq!(entry.qualifying_wages(), Amount::ZERO);
        assert_eq!(entry.net_taxable_wages(), Amount::from_cents(100));
    }

    #[test]
    fn extreme_amounts_saturate_through_updates_and_totals() {
        let top = Amount::new(Decimal::MAX);
        let mut ledger = WageLedger::new();
        for _ in 0..2 {
            let index = ledger.add_entry();
            ledger
                .update_field(index, WageField::QualifyingWages, top)
                .unwrap();
            ledger
                .update_field(index, WageField::Adjustments, Amount::from_cents(-100))
                .unwrap();
        }

        let totals = ledger.totals();

        assert_eq!(ledger.entries()[0].net_taxable_wages(), top);
        assert_eq!(totals.qualifying_wages, top);
        assert_eq!(totals.net_taxable_wages, top);
        assert_eq!(totals.adjustments, Amount::from_cents(-200));
    }

    proptest! {
        #[test]
        fn net_totals_equal_sum_of_entry_nets(
            rows in proptest::collection::vec((0i64..100_000_000, -1_000_000i64..1_000_000), 0..12)
        ) {
            let mut ledger = WageLedger::new();
            for (wages, adjustments) in &rows {
                let index = ledger.add_entry();
                ledger.update_field(index, WageField::QualifyingWages, Amount::from_cents(*wages)).unwrap();
                ledger.update_field(index, WageField::Adjustments, Amount::from_cents(*adjustments)).unwrap();
            }

            let entry_sum: Amount = ledger.entries().iter().map(WageEntry::net_taxable_wages).sum();
            prop_assert_eq!(ledger.totals().net_taxable_wages, entry_sum);
            for entry in ledger.entries() {
                prop_assert_eq!(entry.net_taxable_wages(), entry.qualifying_wages() - entry.adjustments());
            }
        }
    }
}
