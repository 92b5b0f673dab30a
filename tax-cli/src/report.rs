//! Plain-text reports printed by the commands.

use std::io::{self, Write};

use rust_decimal::Decimal;
use tax_core::calculations::{MunicipalTaxConfig, TaxCalculationResult, WageLedger};
use tax_core::validation::ValidationResult;
use tax_core::wizard::Section;
use tax_core::{Amount, FinalizedReturn};

const LABEL_WIDTH: usize = 36;
const AMOUNT_WIDTH: usize = 16;

fn line(
    out: &mut impl Write,
    number: &str,
    label: &str,
    value: impl std::fmt::Display,
) -> io::Result<()> {
    writeln!(
        out,
        "  {number:<4} {label:<label_width$} {value:>amount_width$}",
        label_width = LABEL_WIDTH,
        amount_width = AMOUNT_WIDTH,
    )
}

/// `0.02` as `2%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// One row per employer followed by the column totals.
pub fn write_wage_details(
    out: &mut impl Write,
    wages: &WageLedger,
) -> io::Result<()> {
    writeln!(out, "Wage details ({} employer(s))", wages.len())?;
    writeln!(
        out,
        "  {:<3} {:<12} {:<14} {:<6} {:>14} {:>12} {:>12} {:>14}",
        "#", "EIN", "City", "Spouse", "Wages", "Withheld", "Adjust", "Net taxable"
    )?;
    for (index, entry) in wages.entries().iter().enumerate() {
        writeln!(
            out,
            "  {:<3} {:<12} {:<14} {:<6} {:>14} {:>12} {:>12} {:>14}",
            index + 1,
            entry.employer_ein(),
            entry.city_employed(),
            if entry.is_spouse_wages() { "yes" } else { "no" },
            entry.qualifying_wages(),
            entry.dublin_tax_withheld(),
            entry.adjustments(),
            entry.net_taxable_wages(),
        )?;
    }

    let totals = wages.totals();
    writeln!(
        out,
        "  {:<38} {:>14} {:>12} {:>12} {:>14}",
        "Totals",
        totals.qualifying_wages,
        totals.dublin_tax_withheld,
        totals.adjustments,
        totals.net_taxable_wages,
    )?;
    if !totals.other_city_tax_withheld.is_zero() || !totals.credit_limit.is_zero() {
        writeln!(
            out,
            "  Other city tax withheld {}, credit limit {}",
            totals.other_city_tax_withheld, totals.credit_limit
        )?;
    }
    Ok(())
}

/// Form lines 7 to 17, then the reconciliation against the ledger if present.
pub fn write_calculation(
    out: &mut impl Write,
    config: &MunicipalTaxConfig,
    result: &TaxCalculationResult,
) -> io::Result<()> {
    writeln!(out, "{} municipal income tax", config.municipality)?;
    line(out, "7", "Net business income", result.net_business_income)?;
    line(out, "8", "Taxable income", result.taxable_income)?;
    line(
        out,
        "9",
        &format!("Tax due ({})", format_rate(config.tax_rate)),
        result.tax_due,
    )?;
    line(out, "14", "Total payments and credits", result.total_payments)?;
    line(out, "15", "Balance", result.balance)?;
    line(out, "17", "Total tax due", result.final_tax_due)?;

    if result.balance.magnitude() > Amount::ZERO
        && !result.balance.is_refund()
        && result.final_tax_due.is_zero()
    {
        writeln!(
            out,
            "  Balances of {} or less are not collected.",
            config.de_minimis_threshold
        )?;
    }

    if let Some(reconciliation) = &result.reconciliation {
        writeln!(out, "Reconciliation with wage details")?;
        line(out, "", "Declared qualifying wages", reconciliation.declared_wages)?;
        line(out, "", "Ledger net taxable wages", reconciliation.ledger_net_taxable_wages)?;
        line(out, "", "Difference", reconciliation.wage_difference)?;
        line(out, "", "Declared city tax withheld", reconciliation.declared_city_withheld)?;
        line(out, "", "Ledger city tax withheld", reconciliation.ledger_city_withheld)?;
        line(out, "", "Difference", reconciliation.withholding_difference)?;
        if !reconciliation.is_reconciled() {
            writeln!(out, "  Declared figures do not match the wage details.")?;
        }
    }
    Ok(())
}

/// Errors for one section, or `ok`.
pub fn write_section_errors(
    out: &mut impl Write,
    section: Section,
    errors: &ValidationResult,
) -> io::Result<()> {
    if errors.is_valid() {
        return writeln!(out, "{section}: ok");
    }
    writeln!(out, "{section}:")?;
    for (path, messages) in errors.iter() {
        for message in messages {
            writeln!(out, "  {path}: {message}")?;
        }
    }
    Ok(())
}

pub fn write_filing_summary(
    out: &mut impl Write,
    filing: &FinalizedReturn,
) -> io::Result<()> {
    writeln!(
        out,
        "Filed return for {} at {}",
        filing.tax_return.taxpayer_name,
        filing.finalized_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "  Balance: {}", filing.calculation.balance)?;
    writeln!(out, "  Total tax due: {}", filing.calculation.final_tax_due)
}
