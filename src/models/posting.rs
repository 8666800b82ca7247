use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Raised when a stored or submitted value is outside an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be one of: {allowed}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub allowed: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == s)
                    .ok_or_else(|| UnknownVariant {
                        field: $field,
                        allowed: $name::ALL
                            .iter()
                            .map(|variant| variant.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

text_enum! {
    JobType, "jobType" {
        FullTime => "Full-time",
        PartTime => "Part-time",
        Contract => "Contract",
        Internship => "Internship",
        Freelance => "Freelance",
    }
}

text_enum! {
    ContractLength, "jobContractLength" {
        OneMonth => "1 month",
        ThreeMonths => "3 months",
        SixMonths => "6 months",
        OneYear => "1 year",
        TwoYears => "2 years",
        Permanent => "Permanent",
    }
}

text_enum! {
    VisaType, "visaType" {
        UsCitizen => "US Citizen",
        GreenCard => "Green Card",
        H1b => "H1B",
        L1 => "L1",
        OptCpt => "OPT/CPT",
        Tn => "TN",
        NoSponsorship => "No Sponsorship",
    }
}

text_enum! {
    /// How long a posting is kept before it is considered expired.
    RetentionWindow, "autoDeleteInDays" {
        ThirtyDays => "30 days",
        SixtyDays => "60 days",
        NinetyDays => "90 days",
        Never => "Never",
    }
}

text_enum! {
    PostingStatus, "status" {
        Active => "active",
        Inactive => "inactive",
        Expired => "expired",
    }
}

impl Default for PostingStatus {
    fn default() -> Self {
        PostingStatus::Active
    }
}

impl RetentionWindow {
    /// Leading integer of the selection label, `None` for "Never".
    pub fn days(&self) -> Option<i64> {
        self.as_str()
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkLocation {
    pub remote: bool,
    pub hybrid: bool,
    pub onsite: bool,
}

impl WorkLocation {
    pub fn any_selected(&self) -> bool {
        self.remote || self.hybrid || self.onsite
    }
}

/// Every field a recruiter controls, already validated and normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingFields {
    pub recruiter_name: String,
    pub recruiter_email: String,
    pub recruiter_phone: Option<String>,
    pub share_phone_number: bool,
    pub recruiter_company: String,
    pub job_header: String,
    pub job_description: String,
    pub job_role_name: String,
    pub job_primary_technology: String,
    pub job_secondary_technology: Option<String>,
    pub job_location_city: Option<String>,
    pub job_location_state: Option<String>,
    pub job_type: Option<JobType>,
    pub job_pay_rate_per_hour: Option<f64>,
    pub job_pay_rate_yearly: Option<f64>,
    pub job_contract_length: Option<ContractLength>,
    pub work_location: WorkLocation,
    pub visa_type: Option<VisaType>,
    pub auto_delete_in_days: RetentionWindow,
    pub status: PostingStatus,
}

/// A stored job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: PostingFields,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    /// Whether the retention window has elapsed at `now`. Informational only.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.map_or(false, |expires| expires <= now)
    }
}
