use chrono::{DateTime, Utc};

use crate::dto::posting_dto::PostingListQuery;
use crate::error::{Error, Result};
use crate::models::posting::{JobPosting, JobType, PostingStatus, VisaType};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Listing knobs that come from configuration rather than from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingPolicy {
    /// Hide postings whose expiration date has passed even while still `active`.
    pub exclude_expired: bool,
    pub max_limit: i64,
}

impl Default for ListingPolicy {
    fn default() -> Self {
        Self {
            exclude_expired: false,
            max_limit: 100,
        }
    }
}

/// Immutable description of which postings a list or stats call covers.
#[derive(Debug, Clone, PartialEq)]
pub struct PostingPredicate {
    pub status: PostingStatus,
    pub job_type: Option<JobType>,
    pub visa_type: Option<VisaType>,
    pub job_location_state: Option<String>,
    pub search: Option<String>,
    /// When set, postings with `expiration_date <= visible_at` are excluded.
    pub visible_at: Option<DateTime<Utc>>,
}

impl PostingPredicate {
    pub fn active() -> Self {
        Self {
            status: PostingStatus::Active,
            job_type: None,
            visa_type: None,
            job_location_state: None,
            search: None,
            visible_at: None,
        }
    }

    pub fn with_job_type(self, job_type: Option<JobType>) -> Self {
        Self { job_type, ..self }
    }

    pub fn with_visa_type(self, visa_type: Option<VisaType>) -> Self {
        Self { visa_type, ..self }
    }

    pub fn with_location_state(self, state: Option<String>) -> Self {
        Self {
            job_location_state: non_blank(state),
            ..self
        }
    }

    pub fn with_search(self, search: Option<String>) -> Self {
        Self {
            search: non_blank(search),
            ..self
        }
    }

    pub fn visible_at(self, now: DateTime<Utc>) -> Self {
        Self {
            visible_at: Some(now),
            ..self
        }
    }

    /// Active-posting predicate for the caller's filters. Unknown enumeration values
    /// are rejected rather than silently matching nothing.
    pub fn from_query(
        query: &PostingListQuery,
        policy: &ListingPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let job_type = parse_filter::<JobType>(query.job_type.as_deref())?;
        let visa_type = parse_filter::<VisaType>(query.visa_type.as_deref())?;

        let predicate = Self::active()
            .with_job_type(job_type)
            .with_visa_type(visa_type)
            .with_location_state(query.job_location_state.clone())
            .with_search(query.search.clone());

        Ok(policy.scope(predicate, now))
    }

    pub fn matches(&self, posting: &JobPosting) -> bool {
        let fields = &posting.fields;
        if fields.status != self.status {
            return false;
        }
        if self.job_type.is_some() && fields.job_type != self.job_type {
            return false;
        }
        if self.visa_type.is_some() && fields.visa_type != self.visa_type {
            return false;
        }
        if let Some(state) = &self.job_location_state {
            if fields.job_location_state.as_deref() != Some(state.as_str()) {
                return false;
            }
        }
        if let Some(now) = self.visible_at {
            if posting.is_expired_at(now) {
                return false;
            }
        }
        match &self.search {
            Some(term) => {
                let needle = term.to_lowercase();
                [
                    &fields.job_header,
                    &fields.job_role_name,
                    &fields.recruiter_company,
                    &fields.job_primary_technology,
                ]
                .iter()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

impl ListingPolicy {
    /// Applies the configured expiry gate to a predicate.
    pub fn scope(&self, predicate: PostingPredicate, now: DateTime<Utc>) -> PostingPredicate {
        if self.exclude_expired {
            predicate.visible_at(now)
        } else {
            predicate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingSort {
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>, policy: &ListingPolicy) -> Self {
        let page = page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = match limit {
            Some(limit) if limit >= 1 => limit.min(policy.max_limit.max(1)),
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Rows before this page. Saturates so an absurd `page` reads past the end.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn pages_for(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = crate::models::posting::UnknownVariant>,
{
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|err| Error::BadRequest(err.to_string())),
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
