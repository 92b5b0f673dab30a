use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Amount, FieldError, FieldKind, FieldValue, FilingStatus};

/// Everything the taxpayer enters on the return itself.
///
/// Per-employer wage records live in the wage ledger, not here.
/// Text fields use an empty string for "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxReturn {
    pub refund: bool,
    pub amended: bool,

    // Personal information
    pub taxpayer_name: String,
    #[serde(rename = "taxpayerSSN")]
    pub taxpayer_ssn: String,
    pub spouse_name: String,
    #[serde(rename = "spouseSSN")]
    pub spouse_ssn: String,
    pub current_address: String,
    pub city_state_zip: String,
    pub taxpayer_email: String,
    pub phone: String,
    pub filing_status: Option<FilingStatus>,
    pub moved_out_of_dublin: bool,
    pub previous_address: String,

    // Income (form lines 1-6)
    pub qualifying_wages: Amount,
    pub other_adjustments: String,
    pub self_employment_income: Amount,
    pub rental_income: Amount,
    pub other_taxable_income: Amount,
    pub prior_year_loss_carryforward: Amount,

    // Payments and credits (form lines 10-13)
    pub dublin_tax_withheld: Amount,
    pub taxes_withheld_other_cities: Amount,
    pub estimated_taxes_paid: Amount,
    pub prior_year_credit: Amount,

    // Signatures
    pub third_party_designee: bool,
    pub taxpayer_signature_date: String,
    pub spouse_signature_date: String,
    pub preparer_name: String,
    pub preparer_phone: String,
    pub preparer_date: String,
}

impl TaxReturn {
    /// Assigns one field.
    ///
    /// Money fields accept text and read it leniently. The filing status
    /// accepts text; an unrecognised value clears the selection, which
    /// validation then reports.
    pub fn set(
        &mut self,
        field: ReturnField,
        value: impl Into<FieldValue>,
    ) -> Result<(), FieldError> {
        let value = value.into();
        let name = field.as_str();

        if field == ReturnField::FilingStatus {
            let text = match value {
                FieldValue::Text(text) => text,
                _ => {
                    return Err(FieldError::TypeMismatch {
                        field: name,
                        expected: FieldKind::Choice,
                    });
                }
            };
            self.filing_status = FilingStatus::parse(text.trim());
        } else if let Some(slot) = self.amount_mut(field) {
            *slot = value.into_amount(name)?;
        } else if let Some(slot) = self.flag_mut(field) {
            *slot = value.into_flag(name)?;
        } else if let Some(slot) = self.text_mut(field) {
            *slot = value.into_text(name)?;
        }
        Ok(())
    }

    /// Returns the text content of a text field.
    pub fn text(
        &self,
        field: ReturnField,
    ) -> Option<&str> {
        let value = match field {
            ReturnField::TaxpayerName => &self.taxpayer_name,
            ReturnField::TaxpayerSsn => &self.taxpayer_ssn,
            ReturnField::SpouseName => &self.spouse_name,
            ReturnField::SpouseSsn => &self.spouse_ssn,
            ReturnField::CurrentAddress => &self.current_address,
            ReturnField::CityStateZip => &self.city_state_zip,
            ReturnField::TaxpayerEmail => &self.taxpayer_email,
            ReturnField::Phone => &self.phone,
            ReturnField::PreviousAddress => &self.previous_address,
            ReturnField::OtherAdjustments => &self.other_adjustments,
            ReturnField::TaxpayerSignatureDate => &self.taxpayer_signature_date,
            ReturnField::SpouseSignatureDate => &self.spouse_signature_date,
            ReturnField::PreparerName => &self.preparer_name,
            ReturnField::PreparerPhone => &self.preparer_phone,
            ReturnField::PreparerDate => &self.preparer_date,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn text_mut(
        &mut self,
        field: ReturnField,
    ) -> Option<&mut String> {
        match field {
            ReturnField::TaxpayerName => Some(&mut self.taxpayer_name),
            ReturnField::TaxpayerSsn => Some(&mut self.taxpayer_ssn),
            ReturnField::SpouseName => Some(&mut self.spouse_name),
            ReturnField::SpouseSsn => Some(&mut self.spouse_ssn),
            ReturnField::CurrentAddress => Some(&mut self.current_address),
            ReturnField::CityStateZip => Some(&mut self.city_state_zip),
            ReturnField::TaxpayerEmail => Some(&mut self.taxpayer_email),
            ReturnField::Phone => Some(&mut self.phone),
            ReturnField::PreviousAddress => Some(&mut self.previous_address),
            ReturnField::OtherAdjustments => Some(&mut self.other_adjustments),
            ReturnField::TaxpayerSignatureDate => Some(&mut self.taxpayer_signature_date),
            ReturnField::SpouseSignatureDate => Some(&mut self.spouse_signature_date),
            ReturnField::PreparerName => Some(&mut self.preparer_name),
            ReturnField::PreparerPhone => Some(&mut self.preparer_phone),
            ReturnField::PreparerDate => Some(&mut self.preparer_date),
            _ => None,
        }
    }

    fn amount_mut(
        &mut self,
        field: ReturnField,
    ) -> Option<&mut Amount> {
        match field {
            ReturnField::QualifyingWages => Some(&mut self.qualifying_wages),
            ReturnField::SelfEmploymentIncome => Some(&mut self.self_employment_income),
            ReturnField::RentalIncome => Some(&mut self.rental_income),
            ReturnField::OtherTaxableIncome => Some(&mut self.other_taxable_income),
            ReturnField::PriorYearLossCarryforward => Some(&mut self.prior_year_loss_carryforward),
            ReturnField::DublinTaxWithheld => Some(&mut self.dublin_tax_withheld),
            ReturnField::TaxesWithheldOtherCities => Some(&mut self.taxes_withheld_other_cities),
            ReturnField::EstimatedTaxesPaid => Some(&mut self.estimated_taxes_paid),
            ReturnField::PriorYearCredit => Some(&mut self.prior_year_credit),
            _ => None,
        }
    }

    fn flag_mut(
        &mut self,
        field: ReturnField,
    ) -> Option<&mut bool> {
        match field {
            ReturnField::Refund => Some(&mut self.refund),
            ReturnField::Amended => Some(&mut self.amended),
            ReturnField::MovedOutOfDublin => Some(&mut self.moved_out_of_dublin),
            ReturnField::ThirdPartyDesignee => Some(&mut self.third_party_designee),
            _ => None,
        }
    }
}

/// Names every field of a [`TaxReturn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReturnField {
    Refund,
    Amended,
    TaxpayerName,
    TaxpayerSsn,
    SpouseName,
    SpouseSsn,
    CurrentAddress,
    CityStateZip,
    TaxpayerEmail,
    Phone,
    FilingStatus,
    MovedOutOfDublin,
    PreviousAddress,
    QualifyingWages,
    OtherAdjustments,
    SelfEmploymentIncome,
    RentalIncome,
    OtherTaxableIncome,
    PriorYearLossCarryforward,
    DublinTaxWithheld,
    TaxesWithheldOtherCities,
    EstimatedTaxesPaid,
    PriorYearCredit,
    ThirdPartyDesignee,
    TaxpayerSignatureDate,
    SpouseSignatureDate,
    PreparerName,
    PreparerPhone,
    PreparerDate,
}

impl ReturnField {
    pub const ALL: [ReturnField; 29] = [
        Self::Refund,
        Self::Amended,
        Self::TaxpayerName,
        Self::TaxpayerSsn,
        Self::SpouseName,
        Self::SpouseSsn,
        Self::CurrentAddress,
        Self::CityStateZip,
        Self::TaxpayerEmail,
        Self::Phone,
        Self::FilingStatus,
        Self::MovedOutOfDublin,
        Self::PreviousAddress,
        Self::QualifyingWages,
        Self::OtherAdjustments,
        Self::SelfEmploymentIncome,
        Self::RentalIncome,
        Self::OtherTaxableIncome,
        Self::PriorYearLossCarryforward,
        Self::DublinTaxWithheld,
        Self::TaxesWithheldOtherCities,
        Self::EstimatedTaxesPaid,
        Self::PriorYearCredit,
        Self::ThirdPartyDesignee,
        Self::TaxpayerSignatureDate,
        Self::SpouseSignatureDate,
        Self::PreparerName,
        Self::PreparerPhone,
        Self::PreparerDate,
    ];

    /// The form's field name, as used in documents and validation output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refund => "refund",
            Self::Amended => "amended",
            Self::TaxpayerName => "taxpayerName",
            Self::TaxpayerSsn => "taxpayerSSN",
            Self::SpouseName => "spouseName",
            Self::SpouseSsn => "spouseSSN",
            Self::CurrentAddress => "currentAddress",
            Self::CityStateZip => "cityStateZip",
            Self::TaxpayerEmail => "taxpayerEmail",
            Self::Phone => "phone",
            Self::FilingStatus => "filingStatus",
            Self::MovedOutOfDublin => "movedOutOfDublin",
            Self::PreviousAddress => "previousAddress",
            Self::QualifyingWages => "qualifyingWages",
            Self::OtherAdjustments => "otherAdjustments",
            Self::SelfEmploymentIncome => "selfEmploymentIncome",
            Self::RentalIncome => "rentalIncome",
            Self::OtherTaxableIncome => "otherTaxableIncome",
            Self::PriorYearLossCarryforward => "priorYearLossCarryforward",
            Self::DublinTaxWithheld => "dublinTaxWithheld",
            Self::TaxesWithheldOtherCities => "taxesWithheldOtherCities",
            Self::EstimatedTaxesPaid => "estimatedTaxesPaid",
            Self::PriorYearCredit => "priorYearCredit",
            Self::ThirdPartyDesignee => "thirdPartyDesignee",
            Self::TaxpayerSignatureDate => "taxpayerSignatureDate",
            Self::SpouseSignatureDate => "spouseSignatureDate",
            Self::PreparerName => "preparerName",
            Self::PreparerPhone => "preparerPhone",
            Self::PreparerDate => "preparerDate",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Refund | Self::Amended | Self::MovedOutOfDublin | Self::ThirdPartyDesignee => {
                FieldKind::Flag
            }
            Self::FilingStatus => FieldKind::Choice,
            Self::QualifyingWages
            | Self::SelfEmploymentIncome
            | Self::RentalIncome
            | Self::OtherTaxableIncome
            | Self::PriorYearLossCarryforward
            | Self::DublinTaxWithheld
            | Self::TaxesWithheldOtherCities
            | Self::EstimatedTaxesPaid
            | Self::PriorYearCredit => FieldKind::Money,
            _ => FieldKind::Text,
        }
    }
}

impl FromStr for ReturnField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for ReturnField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
