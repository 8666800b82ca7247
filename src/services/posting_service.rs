use std::sync::Arc;

use uuid::Uuid;

use crate::database::repository::{NewPosting, PostingRepository};
use crate::dto::posting_dto::{PostingDraft, PostingListQuery};
use crate::error::{Error, Result};
use crate::models::posting::{JobPosting, JobType, PostingStatus};
use crate::services::expiration_policy::compute_expiration;
use crate::services::posting_query::{ListingPolicy, PageRequest, PostingPredicate, PostingSort};
use crate::services::posting_validator::validate_draft;
use crate::utils::time::{Clock, SystemClock};

#[derive(Clone)]
pub struct PostingService {
    repository: Arc<dyn PostingRepository>,
    clock: Arc<dyn Clock>,
    policy: ListingPolicy,
}

pub struct PostingList {
    pub items: Vec<JobPosting>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostingStats {
    pub total_jobs: i64,
    pub job_type_stats: Vec<Option<JobType>>,
    pub avg_hourly_rate: f64,
}

impl PostingService {
    pub fn new(repository: Arc<dyn PostingRepository>, policy: ListingPolicy) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock), policy)
    }

    pub fn with_clock(
        repository: Arc<dyn PostingRepository>,
        clock: Arc<dyn Clock>,
        policy: ListingPolicy,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    pub async fn create(&self, draft: PostingDraft) -> Result<JobPosting> {
        let fields = validate_draft(draft)?;
        let expiration_date = compute_expiration(fields.auto_delete_in_days, self.clock.now());
        let posting = self
            .repository
            .insert(NewPosting {
                fields,
                expiration_date,
            })
            .await?;
        Ok(posting)
    }

    /// Overlays `patch` on the stored posting and re-validates the result. The
    /// expiration date stamped at creation is kept as is.
    pub async fn update(&self, id: Uuid, patch: PostingDraft) -> Result<JobPosting> {
        let existing = self.get_by_id(id).await?;
        let merged = PostingDraft::from(&existing.fields).overlay(patch);
        let fields = validate_draft(merged)?;
        self.repository
            .update_by_id(id, fields)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<JobPosting> {
        let existing = self.get_by_id(id).await?;
        let mut fields = existing.fields;
        fields.status = PostingStatus::Inactive;
        self.repository
            .update_by_id(id, fields)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<JobPosting> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, query: PostingListQuery) -> Result<PostingList> {
        let predicate = PostingPredicate::from_query(&query, &self.policy, self.clock.now())?;
        let page = PageRequest::new(query.page, query.limit, &self.policy);

        let items = self
            .repository
            .find(&predicate, PostingSort::NewestFirst, page)
            .await?;
        let total = self.repository.count(&predicate).await?;

        Ok(PostingList {
            items,
            page: page.page,
            limit: page.limit,
            total,
            pages: page.pages_for(total),
        })
    }

    pub async fn stats(&self) -> Result<PostingStats> {
        let predicate = self.policy.scope(PostingPredicate::active(), self.clock.now());
        let rows = self.repository.project_stats(&predicate).await?;

        let rates: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.job_pay_rate_per_hour)
            .filter(|rate| rate.is_finite())
            .collect();
        let avg_hourly_rate = if rates.is_empty() {
            0.0
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };

        Ok(PostingStats {
            total_jobs: rows.len() as i64,
            job_type_stats: rows.into_iter().map(|row| row.job_type).collect(),
            avg_hourly_rate,
        })
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Job posting {} not found", id))
}
