use std::fmt;

use serde::Serialize;

use crate::ReturnField;
use crate::validation::FieldPath;

/// The form's sections, in the order the wizard visits them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    #[default]
    PersonalInformation,
    IncomeDetails,
    TaxCalculations,
    WageDetails,
    Signatures,
}

const PERSONAL_INFORMATION_FIELDS: &[ReturnField] = &[
    ReturnField::Refund,
    ReturnField::Amended,
    ReturnField::TaxpayerName,
    ReturnField::TaxpayerSsn,
    ReturnField::SpouseName,
    ReturnField::SpouseSsn,
    ReturnField::CurrentAddress,
    ReturnField::CityStateZip,
    ReturnField::TaxpayerEmail,
    ReturnField::Phone,
    ReturnField::FilingStatus,
    ReturnField::MovedOutOfDublin,
    ReturnField::PreviousAddress,
];

const INCOME_DETAILS_FIELDS: &[ReturnField] = &[
    ReturnField::QualifyingWages,
    ReturnField::OtherAdjustments,
    ReturnField::SelfEmploymentIncome,
    ReturnField::RentalIncome,
    ReturnField::OtherTaxableIncome,
    ReturnField::PriorYearLossCarryforward,
];

const TAX_CALCULATIONS_FIELDS: &[ReturnField] = &[
    ReturnField::DublinTaxWithheld,
    ReturnField::TaxesWithheldOtherCities,
    ReturnField::EstimatedTaxesPaid,
    ReturnField::PriorYearCredit,
];

const SIGNATURES_FIELDS: &[ReturnField] = &[
    ReturnField::ThirdPartyDesignee,
    ReturnField::TaxpayerSignatureDate,
    ReturnField::SpouseSignatureDate,
    ReturnField::PreparerName,
    ReturnField::PreparerPhone,
    ReturnField::PreparerDate,
];

impl Section {
    pub const ALL: [Section; 5] = [
        Self::PersonalInformation,
        Self::IncomeDetails,
        Self::TaxCalculations,
        Self::WageDetails,
        Self::Signatures,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PersonalInformation => "Personal Information",
            Self::IncomeDetails => "Income Details",
            Self::TaxCalculations => "Tax Calculations",
            Self::WageDetails => "Wage Details",
            Self::Signatures => "Signatures",
        }
    }

    /// Return fields this section collects and validates.
    ///
    /// Wage Details owns no return fields; it governs the wage ledger.
    pub fn fields(&self) -> &'static [ReturnField] {
        match self {
            Self::PersonalInformation => PERSONAL_INFORMATION_FIELDS,
            Self::IncomeDetails => INCOME_DETAILS_FIELDS,
            Self::TaxCalculations => TAX_CALCULATIONS_FIELDS,
            Self::WageDetails => &[],
            Self::Signatures => SIGNATURES_FIELDS,
        }
    }

    pub fn governs(
        &self,
        path: &FieldPath,
    ) -> bool {
        match path {
            FieldPath::Return(field) => self.fields().contains(field),
            FieldPath::Wage { .. } => *self == Self::WageDetails,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.title())
    }
}
