mod amount;
mod field;
mod filing_status;
mod tax_return;
mod wage_entry;

pub use amount::{Amount, AmountParseError};
pub use field::{FieldError, FieldKind, FieldValue};
pub use filing_status::FilingStatus;
pub use tax_return::{ReturnField, TaxReturn};
pub use wage_entry::{WageEntry, WageField};
