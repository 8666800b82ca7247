use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::database::repository::{
    NewPosting, PostingRepository, RepositoryError, StatsProjection,
};
use crate::models::posting::{JobPosting, PostingFields};
use crate::services::posting_query::{PageRequest, PostingPredicate, PostingSort};
use crate::utils::time::{Clock, SystemClock};

struct Stored {
    seq: u64,
    posting: JobPosting,
}

#[derive(Default)]
struct Store {
    next_seq: u64,
    rows: Vec<Stored>,
}

/// Process-local posting store with the same query semantics as the Postgres one.
/// Used when no database is configured and in tests.
#[derive(Clone)]
pub struct InMemoryPostingRepository {
    store: Arc<Mutex<Store>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryPostingRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostingRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("posting store lock poisoned".to_string()))
    }

    fn matching<'a>(
        store: &'a Store,
        predicate: &'a PostingPredicate,
        sort: PostingSort,
    ) -> Vec<&'a Stored> {
        let mut rows: Vec<&Stored> = store
            .rows
            .iter()
            .filter(|row| predicate.matches(&row.posting))
            .collect();
        rows.sort_by(|a, b| {
            let oldest_first = a
                .posting
                .created_at
                .cmp(&b.posting.created_at)
                .then(a.seq.cmp(&b.seq));
            match sort {
                PostingSort::OldestFirst => oldest_first,
                PostingSort::NewestFirst => oldest_first.reverse(),
            }
        });
        rows
    }
}

#[async_trait]
impl PostingRepository for InMemoryPostingRepository {
    async fn insert(&self, posting: NewPosting) -> Result<JobPosting, RepositoryError> {
        let now = self.clock.now();
        let mut store = self.lock()?;
        let stored = JobPosting {
            id: Uuid::new_v4(),
            fields: posting.fields,
            expiration_date: posting.expiration_date,
            created_at: now,
            updated_at: now,
        };
        let seq = store.next_seq;
        store.next_seq += 1;
        store.rows.push(Stored {
            seq,
            posting: stored.clone(),
        });
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPosting>, RepositoryError> {
        let store = self.lock()?;
        Ok(store
            .rows
            .iter()
            .find(|row| row.posting.id == id)
            .map(|row| row.posting.clone()))
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        fields: PostingFields,
    ) -> Result<Option<JobPosting>, RepositoryError> {
        let now = self.clock.now();
        let mut store = self.lock()?;
        Ok(store
            .rows
            .iter_mut()
            .find(|row| row.posting.id == id)
            .map(|row| {
                row.posting.fields = fields;
                row.posting.updated_at = now;
                row.posting.clone()
            }))
    }

    async fn find(
        &self,
        predicate: &PostingPredicate,
        sort: PostingSort,
        page: PageRequest,
    ) -> Result<Vec<JobPosting>, RepositoryError> {
        let store = self.lock()?;
        let postings = Self::matching(&store, predicate, sort)
            .into_iter()
            .skip(page.skip().max(0) as usize)
            .take(page.limit.max(0) as usize)
            .map(|row| row.posting.clone())
            .collect();
        Ok(postings)
    }

    async fn count(&self, predicate: &PostingPredicate) -> Result<i64, RepositoryError> {
        let store = self.lock()?;
        Ok(store
            .rows
            .iter()
            .filter(|row| predicate.matches(&row.posting))
            .count() as i64)
    }

    async fn project_stats(
        &self,
        predicate: &PostingPredicate,
    ) -> Result<Vec<StatsProjection>, RepositoryError> {
        let store = self.lock()?;
        let rows = Self::matching(&store, predicate, PostingSort::OldestFirst)
            .into_iter()
            .map(|row| StatsProjection {
                job_type: row.posting.fields.job_type,
                job_pay_rate_per_hour: row.posting.fields.job_pay_rate_per_hour,
            })
            .collect();
        Ok(rows)
    }
}
