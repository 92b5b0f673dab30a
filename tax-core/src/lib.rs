pub mod calculations;
pub mod models;
pub mod session;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use models::*;
pub use session::ReturnSession;
pub use submission::{FinalizedReturn, HandoffError, SubmissionError, SubmissionHandoff};
