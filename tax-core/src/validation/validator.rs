use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::{FieldPath, ValidationResult};
use crate::calculations::WageLedger;
use crate::wizard::Section;
use crate::{ReturnField, TaxReturn, WageField};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static EIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{7}$").expect("valid EIN pattern"));

const MIN_SSN_DIGITS: usize = 9;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checks a return and its wage ledger against the form's field rules.
///
/// Monetary fields carry no rules here: they are always parsed amounts, and
/// negative values are allowed (a loss is a legitimate entry).
pub struct ReturnValidator;

impl ReturnValidator {
    /// Validates every section.
    pub fn validate(
        tax_return: &TaxReturn,
        wages: &WageLedger,
    ) -> ValidationResult {
        Section::ALL
            .into_iter()
            .fold(ValidationResult::new(), |mut result, section| {
                result.merge(Self::validate_section(section, tax_return, wages));
                result
            })
    }

    /// Validates only the fields `section` governs.
    pub fn validate_section(
        section: Section,
        tax_return: &TaxReturn,
        wages: &WageLedger,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        for &field in section.fields() {
            if let Some(message) = Self::check_field(field, tax_return) {
                result.add(field, message);
            }
        }

        if section == Section::WageDetails {
            Self::check_wages(wages, &mut result);
        }

        result
    }

    fn check_field(
        field: ReturnField,
        tax_return: &TaxReturn,
    ) -> Option<&'static str> {
        match field {
            ReturnField::TaxpayerName => {
                is_blank(&tax_return.taxpayer_name).then_some("Taxpayer name is required")
            }
            ReturnField::TaxpayerSsn => {
                (!has_ssn_digits(&tax_return.taxpayer_ssn)).then_some("Valid SSN required")
            }
            ReturnField::SpouseSsn => (!is_blank(&tax_return.spouse_ssn)
                && !has_ssn_digits(&tax_return.spouse_ssn))
            .then_some("Valid spouse SSN required"),
            ReturnField::CurrentAddress => {
                is_blank(&tax_return.current_address).then_some("Address is required")
            }
            ReturnField::CityStateZip => {
                is_blank(&tax_return.city_state_zip).then_some("City/State/Zip is required")
            }
            ReturnField::TaxpayerEmail => {
                let email = tax_return.taxpayer_email.trim();
                (!email.is_empty() && !EMAIL.is_match(email)).then_some("Invalid email")
            }
            ReturnField::FilingStatus => tax_return
                .filing_status
                .is_none()
                .then_some("Filing status is required"),
            ReturnField::PreviousAddress => (tax_return.moved_out_of_dublin
                && is_blank(&tax_return.previous_address))
            .then_some("Previous address is required when moving out of Dublin"),
            ReturnField::TaxpayerSignatureDate
            | ReturnField::SpouseSignatureDate
            | ReturnField::PreparerDate => {
                let date = tax_return.text(field).unwrap_or_default().trim();
                (!date.is_empty() && NaiveDate::parse_from_str(date, DATE_FORMAT).is_err())
                    .then_some("Date must be formatted as YYYY-MM-DD")
            }
            _ => None,
        }
    }

    fn check_wages(
        wages: &WageLedger,
        result: &mut ValidationResult,
    ) {
        for (index, entry) in wages.entries().iter().enumerate() {
            let ein = entry.employer_ein().trim();
            if !ein.is_empty() && !EIN.is_match(ein) {
                result.add(
                    FieldPath::Wage {
                        index,
                        field: WageField::EmployerEin,
                    },
                    "EIN must be formatted as NN-NNNNNNN",
                );
            }
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_ssn_digits(value: &str) -> bool {
    value.chars().filter(char::is_ascii_digit).count() >= MIN_SSN_DIGITS
}
