use rust_decimal::Decimal;
use tracing::{debug, info};

use super::Section;
use crate::TaxReturn;
use crate::calculations::WageLedger;
use crate::validation::{ReturnValidator, ValidationResult};

/// Outcome of [`Wizard::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved { from: Section, to: Section },
    /// The current section has errors; the position is unchanged.
    Blocked {
        section: Section,
        errors: ValidationResult,
    },
    /// Already at the last section. Submission is the only way on.
    AtLastSection,
}

impl Advance {
    pub fn moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Position within the fixed section sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wizard {
    current: Section,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_section(&self) -> Section {
        self.current
    }

    pub fn current_index(&self) -> usize {
        self.current.index()
    }

    pub fn is_first(&self) -> bool {
        self.current.previous().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.current.next().is_none()
    }

    /// Moves to the next section if the current one validates.
    pub fn next(
        &mut self,
        tax_return: &TaxReturn,
        wages: &WageLedger,
    ) -> Advance {
        let Some(to) = self.current.next() else {
            return Advance::AtLastSection;
        };

        let errors = ReturnValidator::validate_section(self.current, tax_return, wages);
        if !errors.is_valid() {
            debug!(
                "Section '{}' blocked with {} invalid field(s)",
                self.current,
                errors.len()
            );
            return Advance::Blocked {
                section: self.current,
                errors,
            };
        }

        let from = self.current;
        self.current = to;
        info!("Advanced from '{}' to '{}'", from, to);
        Advance::Moved { from, to }
    }

    /// Steps back one section without validating. No-op at the first.
    pub fn previous(&mut self) -> Section {
        if let Some(previous) = self.current.previous() {
            debug!("Stepped back from '{}' to '{}'", self.current, previous);
            self.current = previous;
        }
        self.current
    }

    /// `(index + 1) / N`.
    pub fn progress_ratio(&self) -> Decimal {
        Decimal::from(self.current_index() + 1) / Decimal::from(Section::COUNT)
    }

    pub fn reset(&mut self) {
        self.current = Section::default();
    }
}
