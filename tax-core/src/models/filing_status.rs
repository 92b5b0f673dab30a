use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [
        FilingStatus::Single,
        FilingStatus::MarriedJoint,
        FilingStatus::MarriedSeparate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::MarriedJoint => "marriedJoint",
            Self::MarriedSeparate => "marriedSeparate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedJoint => "Married Filing Joint",
            Self::MarriedSeparate => "Married Filing Separate",
        }
    }

    /// Accepts the form value (`marriedJoint`) or the short code (`MFJ`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" | "S" => Some(Self::Single),
            "marriedJoint" | "MFJ" => Some(Self::MarriedJoint),
            "marriedSeparate" | "MFS" => Some(Self::MarriedSeparate),
            _ => None,
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
