//! The step wizard that orders data entry.
//!
//! Sections form a closed, ordered set ([`Section`]). The [`Wizard`] holds
//! the current position and only moves forward when the current section
//! validates.

mod section;
mod state;

pub use section::Section;
pub use state::{Advance, Wizard};
