use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{Amount, FieldError, FieldKind, FieldValue};

/// One employer's W-2 figures.
///
/// Fields are private so that `net_taxable_wages` can only ever be the
/// entry's own qualifying wages minus its adjustments. All writes go through
/// [`WageEntry::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WageEntry {
    #[serde(rename = "employerEIN")]
    employer_ein: String,
    city_employed: String,
    is_spouse_wages: bool,
    qualifying_wages: Amount,
    dublin_tax_withheld: Amount,
    other_city_tax_withheld: Amount,
    adjustments: Amount,
    net_taxable_wages: Amount,
    credit_limit: Amount,
}

impl WageEntry {
    /// A zero-valued entry, as created by "add employer".
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns one field and, for wages or adjustments, refreshes the net
    /// taxable wages before returning.
    pub fn set(
        &mut self,
        field: WageField,
        value: impl Into<FieldValue>,
    ) -> Result<(), FieldError> {
        let value = value.into();
        let name = field.as_str();

        match field {
            WageField::EmployerEin => self.employer_ein = value.into_text(name)?,
            WageField::CityEmployed => self.city_employed = value.into_text(name)?,
            WageField::IsSpouseWages => self.is_spouse_wages = value.into_flag(name)?,
            WageField::QualifyingWages => {
                self.qualifying_wages = value.into_amount(name)?;
                self.refresh_net_taxable_wages();
            }
            WageField::Adjustments => {
                self.adjustments = value.into_amount(name)?;
                self.refresh_net_taxable_wages();
            }
            WageField::DublinTaxWithheld => self.dublin_tax_withheld = value.into_amount(name)?,
            WageField::OtherCityTaxWithheld => {
                self.other_city_tax_withheld = value.into_amount(name)?
            }
            WageField::CreditLimit => self.credit_limit = value.into_amount(name)?,
        }
        Ok(())
    }

    fn refresh_net_taxable_wages(&mut self) {
        self.net_taxable_wages = self.qualifying_wages - self.adjustments;
    }

    pub fn employer_ein(&self) -> &str {
        &self.employer_ein
    }

    pub fn city_employed(&self) -> &str {
        &self.city_employed
    }

    pub fn is_spouse_wages(&self) -> bool {
        self.is_spouse_wages
    }

    pub fn qualifying_wages(&self) -> Amount {
        self.qualifying_wages
    }

    pub fn dublin_tax_withheld(&self) -> Amount {
        self.dublin_tax_withheld
    }

    pub fn other_city_tax_withheld(&self) -> Amount {
        self.other_city_tax_withheld
    }

    pub fn adjustments(&self) -> Amount {
        self.adjustments
    }

    /// Qualifying wages minus adjustments.
    pub fn net_taxable_wages(&self) -> Amount {
        self.net_taxable_wages
    }

    pub fn credit_limit(&self) -> Amount {
        self.credit_limit
    }
}

/// Names the settable fields of a [`WageEntry`].
///
/// `netTaxableWages` is intentionally absent: parsing that name yields
/// [`FieldError::DerivedField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WageField {
    EmployerEin,
    CityEmployed,
    IsSpouseWages,
    QualifyingWages,
    DublinTaxWithheld,
    OtherCityTaxWithheld,
    Adjustments,
    CreditLimit,
}

impl WageField {
    pub const ALL: [WageField; 8] = [
        Self::EmployerEin,
        Self::CityEmployed,
        Self::IsSpouseWages,
        Self::QualifyingWages,
        Self::DublinTaxWithheld,
        Self::OtherCityTaxWithheld,
        Self::Adjustments,
        Self::CreditLimit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployerEin => "employerEIN",
            Self::CityEmployed => "cityEmployed",
            Self::IsSpouseWages => "isSpouseWages",
            Self::QualifyingWages => "qualifyingWages",
            Self::DublinTaxWithheld => "dublinTaxWithheld",
            Self::OtherCityTaxWithheld => "otherCityTaxWithheld",
            Self::Adjustments => "adjustments",
            Self::CreditLimit => "creditLimit",
        }
    }
}

impl FromStr for WageField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "netTaxableWages" {
            return Err(FieldError::DerivedField("netTaxableWages"));
        }
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| FieldError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for WageField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_entry_is_zero_valued() {
        let entry = WageEntry::new();

        assert_eq!(entry.qualifying_wages(), Amount::ZERO);
        assert_eq!(entry.net_taxable_wages(), Amount::ZERO);
        assert_eq!(entry.employer_ein(), "");
        assert!(!entry.is_spouse_wages());
    }

    #[test]
    fn net_taxable_wages_follows_wages_and_adjustments() {
        let mut entry = WageEntry::new();

        entry.set(WageField::QualifyingWages, "105622.21").unwrap();
        assert_eq!(entry.net_taxable_wages().as_decimal(), dec!(105622.21));

        entry.set(WageField::Adjustments, "622.21").unwrap();
        assert_eq!(entry.net_taxable_wages().as_decimal(), dec!(105000.00));

        entry.set(WageField::QualifyingWages, "500").unwrap();
        assert_eq!(entry.net_taxable_wages().as_decimal(), dec!(-122.21));
    }

    #[test]
    fn other_fields_do_not_touch_net_taxable_wages() {
        let mut entry = WageEntry::new();
        entry.set(WageField::QualifyingWages, "1000").unwrap();

        entry.set(WageField::DublinTaxWithheld, "20").unwrap();
        entry.set(WageField::CreditLimit, "5").unwrap();
        entry.set(WageField::IsSpouseWages, true).unwrap();

        assert_eq!(entry.net_taxable_wages().as_decimal(), dec!(1000));
        assert_eq!(entry.dublin_tax_withheld().as_decimal(), dec!(20));
        assert!(entry.is_spouse_wages());
    }

    #[test]
    fn net_taxable_wages_cannot_be_addressed() {
        assert_eq!(
            "netTaxableWages".parse::<WageField>(),
            Err(FieldError::DerivedField("netTaxableWages"))
        );
        assert_eq!(
            "salary".parse::<WageField>(),
            Err(FieldError::UnknownField("salary".to_string()))
        );
    }

    #[test]
    fn flag_field_rejects_text() {
        let mut entry = WageEntry::new();

        let result = entry.set(WageField::IsSpouseWages, "true");

        assert_eq!(
            result,
            Err(FieldError::TypeMismatch {
                field: "isSpouseWages",
                expected: FieldKind::Flag,
            })
        );
    }
}
