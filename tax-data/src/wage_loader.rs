use std::io::Read;

use serde::{Deserialize, Deserializer};
use tax_core::calculations::{LedgerError, WageLedger};
use tax_core::{Amount, WageField};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading W-2 wage data.
#[derive(Debug, Error)]
pub enum WageLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<csv::Error> for WageLoaderError {
    fn from(err: csv::Error) -> Self {
        WageLoaderError::CsvParse(err.to_string())
    }
}

/// One employer's W-2 figures from the wage CSV.
///
/// Columns are matched by header name:
/// - `employer_ein`: Employer identification number (`NN-NNNNNNN`)
/// - `qualifying_wages`: Wages subject to the municipal tax
/// - `city_employed`, `is_spouse_wages`, `dublin_tax_withheld`,
///   `other_city_tax_withheld`, `adjustments`, `credit_limit`: optional
///
/// Blank money cells are zero. A `net_taxable_wages` column is ignored; the
/// ledger derives that value itself.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct WageEntryRecord {
    pub employer_ein: String,
    #[serde(default)]
    pub city_employed: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_spouse_wages: bool,
    #[serde(deserialize_with = "deserialize_amount")]
    pub qualifying_wages: Amount,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub dublin_tax_withheld: Amount,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub other_city_tax_withheld: Amount,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub adjustments: Amount,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub credit_limit: Amount,
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<Amount>().map_err(serde::de::Error::custom)
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Ok(false),
        "true" | "yes" | "y" | "1" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "invalid flag '{other}', expected true/false or yes/no"
        ))),
    }
}

/// Loader for W-2 wage entries from CSV files.
pub struct WageEntryLoader;

impl WageEntryLoader {
    /// Parse wage records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice. Cells are trimmed before parsing.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<WageEntryRecord>, WageLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: WageEntryRecord = result?;
            records.push(record);
        }

        debug!(count = records.len(), "parsed wage records");
        Ok(records)
    }

    /// Append records to the ledger, one new entry per record.
    ///
    /// Entries go through the ledger's own update path, so each entry's net
    /// taxable wages are derived exactly as if typed in. Returns the number of
    /// entries added.
    pub fn load(
        ledger: &mut WageLedger,
        records: &[WageEntryRecord],
    ) -> Result<usize, WageLoaderError> {
        for record in records {
            let index = ledger.add_entry();
            ledger.update_field(index, WageField::EmployerEin, record.employer_ein.as_str())?;
            ledger.update_field(index, WageField::CityEmployed, record.city_employed.as_str())?;
            ledger.update_field(index, WageField::IsSpouseWages, record.is_spouse_wages)?;
            ledger.update_field(index, WageField::QualifyingWages, record.qualifying_wages)?;
            ledger.update_field(index, WageField::DublinTaxWithheld, record.dublin_tax_withheld)?;
            ledger.update_field(
                index,
                WageField::OtherCityTaxWithheld,
                record.other_city_tax_withheld,
            )?;
            ledger.update_field(index, WageField::Adjustments, record.adjustments)?;
            ledger.update_field(index, WageField::CreditLimit, record.credit_limit)?;
        }

        info!("Loaded {} wage entries", records.len());
        Ok(records.len())
    }
}
