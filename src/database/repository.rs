use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::posting::{JobPosting, JobType, PostingFields};
use crate::services::posting_query::{PageRequest, PostingPredicate, PostingSort};

/// A validated posting ready to be stored. Identity and timestamps are assigned by
/// the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPosting {
    pub fields: PostingFields,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// The slice of a posting the statistics need.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsProjection {
    pub job_type: Option<JobType>,
    pub job_pay_rate_per_hour: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored posting {id} is corrupt: {reason}")]
    Corrupt { id: Uuid, reason: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage contract the posting service is written against.
///
/// `update_by_id` replaces the recruiter-controlled fields only; `expiration_date`
/// and `created_at` are never touched after insert.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingRepository: Send + Sync {
    async fn insert(&self, posting: NewPosting) -> Result<JobPosting, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPosting>, RepositoryError>;

    async fn update_by_id(
        &self,
        id: Uuid,
        fields: PostingFields,
    ) -> Result<Option<JobPosting>, RepositoryError>;

    async fn find(
        &self,
        predicate: &PostingPredicate,
        sort: PostingSort,
        page: PageRequest,
    ) -> Result<Vec<JobPosting>, RepositoryError>;

    async fn count(&self, predicate: &PostingPredicate) -> Result<i64, RepositoryError>;

    /// Job type and hourly rate of every match, oldest first.
    async fn project_stats(
        &self,
        predicate: &PostingPredicate,
    ) -> Result<Vec<StatsProjection>, RepositoryError>;
}
