//! The seam between a completed return and whatever files it.
//!
//! Transport (network, PDF, storage) lives behind [`SubmissionHandoff`];
//! the core only decides when a return may be handed off and what is sent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::calculations::{TaxCalculationResult, WageTotals};
use crate::validation::ValidationResult;
use crate::{TaxReturn, WageEntry, wizard::Section};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandoffError {
    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Returns can only be submitted from the last section (currently at '{0}')")]
    NotAtFinalSection(Section),

    #[error("Return has {} invalid field(s)", .0.len())]
    Invalid(ValidationResult),

    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

/// A validated return with everything computed from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedReturn {
    pub finalized_at: DateTime<Utc>,
    pub tax_return: TaxReturn,
    pub wages: Vec<WageEntry>,
    pub wage_totals: WageTotals,
    pub calculation: TaxCalculationResult,
}

/// Receives finalized returns.
pub trait SubmissionHandoff {
    fn hand_off(
        &mut self,
        filing: &FinalizedReturn,
    ) -> Result<(), HandoffError>;
}

/// Keeps every filing in memory.
#[derive(Debug, Default)]
pub struct CollectingHandoff {
    pub filings: Vec<FinalizedReturn>,
}

impl SubmissionHandoff for CollectingHandoff {
    fn hand_off(
        &mut self,
        filing: &FinalizedReturn,
    ) -> Result<(), HandoffError> {
        self.filings.push(filing.clone());
        Ok(())
    }
}
