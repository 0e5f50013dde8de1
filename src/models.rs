use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Lifecycle states of a job application. Stored as lowercase text; the
/// schema carries a matching CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Withdrawn,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Applied,
        Status::Interviewing,
        Status::Offer,
        Status::Rejected,
        Status::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Interviewing => "interviewing",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(Status::Applied),
            "interviewing" => Ok(Status::Interviewing),
            "offer" => Ok(Status::Offer),
            "rejected" => Ok(Status::Rejected),
            "withdrawn" => Ok(Status::Withdrawn),
            other => Err(TrackerError::validation(
                "status",
                format!(
                    "'{}' is not one of: applied, interviewing, offer, rejected, withdrawn",
                    other
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub status: Status,
    pub date_applied: NaiveDate,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Parse a user-supplied application date. Only ISO `YYYY-MM-DD` is accepted.
pub fn parse_date(s: &str) -> Result<NaiveDate, TrackerError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        TrackerError::validation(
            "date_applied",
            format!("'{}' is not a valid date (expected YYYY-MM-DD)", s),
        )
    })
}
