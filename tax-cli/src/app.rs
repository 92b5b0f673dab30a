//! The `compute`, `check` and `file` commands.
//!
//! Each command loads a return document and, optionally, a W-2 wage CSV,
//! then writes its report to the given output.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tax_core::calculations::{TaxCalculator, WageLedger};
use tax_core::validation::{ReturnValidator, ValidationResult};
use tax_core::wizard::{Advance, Section};
use tax_core::{FinalizedReturn, ReturnSession, TaxReturn};
use tax_data::{WageEntryLoader, load_return_from_file};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::handoff::FileHandoff;
use crate::report;

/// A return document and the wage entries that go with it.
#[derive(Debug, Clone)]
pub struct LoadedReturn {
    pub tax_return: TaxReturn,
    /// `None` when no wage CSV was given.
    pub wages: Option<WageLedger>,
}

impl LoadedReturn {
    pub fn load(
        return_path: &Path,
        wages_path: Option<&Path>,
    ) -> Result<Self> {
        let tax_return = load_return_from_file(return_path)
            .with_context(|| format!("cannot load return '{}'", return_path.display()))?;

        let wages = match wages_path {
            Some(path) => Some(load_wages(path)?),
            None => None,
        };

        Ok(Self { tax_return, wages })
    }

    /// The loaded wages, or a ledger with one blank entry.
    pub fn ledger(&self) -> WageLedger {
        self.wages
            .clone()
            .unwrap_or_else(WageLedger::with_blank_entry)
    }
}

fn load_wages(path: &Path) -> Result<WageLedger> {
    let file =
        File::open(path).with_context(|| format!("cannot open wage file '{}'", path.display()))?;
    let records = WageEntryLoader::parse(file)
        .with_context(|| format!("cannot parse wage file '{}'", path.display()))?;

    let mut ledger = WageLedger::new();
    WageEntryLoader::load(&mut ledger, &records)?;
    if ledger.is_empty() {
        warn!("Wage file '{}' has no entries", path.display());
    }
    Ok(ledger)
}

/// Prints the wage details (when loaded) and the tax calculation.
pub fn compute(
    config: &AppConfig,
    input: &LoadedReturn,
    out: &mut impl Write,
) -> Result<()> {
    let calculator = TaxCalculator::new(config.tax.clone())?;
    let totals = input.wages.as_ref().map(WageLedger::totals);

    let result = calculator.compute(&input.tax_return, totals.as_ref());
    debug!(balance = %result.balance, "computed return");

    if let Some(wages) = &input.wages {
        report::write_wage_details(out, wages)?;
        writeln!(out)?;
    }
    report::write_calculation(out, &config.tax, &result)?;
    Ok(())
}

/// Prints every section's validation. Returns the full result.
pub fn check(
    input: &LoadedReturn,
    out: &mut impl Write,
) -> Result<ValidationResult> {
    let wages = input.ledger();
    let mut all = ValidationResult::new();

    for section in Section::ALL {
        let errors = ReturnValidator::validate_section(section, &input.tax_return, &wages);
        report::write_section_errors(out, section, &errors)?;
        all.merge(errors);
    }

    info!("Return has {} invalid field(s)", all.len());
    Ok(all)
}

/// How a `file` run ended.
#[derive(Debug)]
pub enum FileOutcome {
    Filed(FinalizedReturn),
    Blocked {
        section: Section,
        errors: ValidationResult,
    },
}

/// Walks the wizard from the first section and submits at the end.
pub fn file(
    config: &AppConfig,
    input: LoadedReturn,
    output: PathBuf,
    overwrite: bool,
    out: &mut impl Write,
) -> Result<FileOutcome> {
    let calculator = TaxCalculator::new(config.tax.clone())?;
    let wages = input.ledger();
    let mut session = ReturnSession::from_parts(calculator, input.tax_return, wages);

    loop {
        match session.next() {
            Advance::Moved { .. } => {}
            Advance::AtLastSection => break,
            Advance::Blocked { section, errors } => {
                report::write_section_errors(out, section, &errors)?;
                return Ok(FileOutcome::Blocked { section, errors });
            }
        }
    }

    // The last section is never left through `next`, so check it here.
    let errors = session.section_errors();
    if !errors.is_valid() {
        let section = session.current_section();
        report::write_section_errors(out, section, &errors)?;
        return Ok(FileOutcome::Blocked { section, errors });
    }

    let mut handoff = FileHandoff::new(output).overwrite(overwrite);
    let filing = session
        .submit(&mut handoff)
        .with_context(|| format!("cannot file return to '{}'", handoff.path().display()))?;
    report::write_filing_summary(out, &filing)?;
    Ok(FileOutcome::Filed(filing))
}
