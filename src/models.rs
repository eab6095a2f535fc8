use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pipeline stage of one application. Declaration order is the canonical
/// display order for status summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Applied,
    Interview,
    Offer,
    Rejected,
    Pending,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Applied,
        Status::Interview,
        Status::Offer,
        Status::Rejected,
        Status::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Interview => "interview",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Pending => "pending",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(Status::Applied),
            "interview" => Ok(Status::Interview),
            "offer" => Ok(Status::Offer),
            "rejected" => Ok(Status::Rejected),
            "pending" => Ok(Status::Pending),
            other => Err(anyhow!(
                "Unknown status '{}' (expected applied, interview, offer, rejected, or pending)",
                other
            )),
        }
    }
}

/// The active status constraint on the list view: everything, or one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => *s == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(s) => f.write_str(s.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            Ok(StatusFilter::Only(s.parse()?))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    pub company: String,
    pub position: String,
    pub location: String,
    pub status: Status,
    pub date_applied: NaiveDate,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub salary: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub last_updated: NaiveDate,
}

/// Input for creating a record: everything but the fields the store assigns.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub location: String,
    pub status: Status,
    pub date_applied: NaiveDate,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub salary: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
}

/// Partial update: only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub status: Option<Status>,
    pub date_applied: Option<NaiveDate>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub salary: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
}

impl ApplicationPatch {
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCount {
    /// Display label, e.g. "Mar 2025".
    pub month: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips() {
        for status in Status::ALL {
            let parsed: Status = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!("Interview".parse::<Status>().unwrap(), Status::Interview);
        assert_eq!("  OFFER ".parse::<Status>().unwrap(), Status::Offer);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("ghosted".parse::<Status>().is_err());
        assert!("".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "rejected".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(Status::Rejected)
        );
        assert!("everything".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_status_filter_matches() {
        assert!(StatusFilter::All.matches(Status::Pending));
        assert!(StatusFilter::Only(Status::Offer).matches(Status::Offer));
        assert!(!StatusFilter::Only(Status::Offer).matches(Status::Applied));
    }

    #[test]
    fn test_status_serde_uses_lowercase() {
        let json = serde_json::to_string(&Status::Interview).unwrap();
        assert_eq!(json, "\"interview\"");
        let back: Status = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(back, Status::Pending);
    }
}
