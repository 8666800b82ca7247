use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::repository::{
    NewPosting, PostingRepository, RepositoryError, StatsProjection,
};
use crate::models::posting::{
    JobPosting, PostingFields, UnknownVariant, WorkLocation,
};
use crate::services::posting_query::{PageRequest, PostingPredicate, PostingSort};

const POSTING_COLUMNS: &str = "id, recruiter_name, recruiter_email, recruiter_phone, share_phone_number, recruiter_company, job_header, job_description, job_role_name, job_primary_technology, job_secondary_technology, job_location_city, job_location_state, job_type, job_pay_rate_per_hour, job_pay_rate_yearly, job_contract_length, work_remote, work_hybrid, work_onsite, visa_type, auto_delete_in_days, status, expiration_date, created_at, updated_at";

#[derive(Debug, FromRow)]
struct PostingRow {
    id: Uuid,
    recruiter_name: String,
    recruiter_email: String,
    recruiter_phone: Option<String>,
    share_phone_number: bool,
    recruiter_company: String,
    job_header: String,
    job_description: String,
    job_role_name: String,
    job_primary_technology: String,
    job_secondary_technology: Option<String>,
    job_location_city: Option<String>,
    job_location_state: Option<String>,
    job_type: Option<String>,
    job_pay_rate_per_hour: Option<f64>,
    job_pay_rate_yearly: Option<f64>,
    job_contract_length: Option<String>,
    work_remote: bool,
    work_hybrid: bool,
    work_onsite: bool,
    visa_type: Option<String>,
    auto_delete_in_days: String,
    status: String,
    expiration_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct StatsRow {
    id: Uuid,
    job_type: Option<String>,
    job_pay_rate_per_hour: Option<f64>,
}

fn parse<T>(id: Uuid, raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.parse().map_err(|err: UnknownVariant| RepositoryError::Corrupt {
        id,
        reason: err.to_string(),
    })
}

fn parse_opt<T>(id: Uuid, raw: Option<&str>) -> Result<Option<T>, RepositoryError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.map(|value| parse(id, value)).transpose()
}

impl TryFrom<PostingRow> for JobPosting {
    type Error = RepositoryError;

    fn try_from(row: PostingRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(JobPosting {
            id,
            fields: PostingFields {
                recruiter_name: row.recruiter_name,
                recruiter_email: row.recruiter_email,
                recruiter_phone: row.recruiter_phone,
                share_phone_number: row.share_phone_number,
                recruiter_company: row.recruiter_company,
                job_header: row.job_header,
                job_description: row.job_description,
                job_role_name: row.job_role_name,
                job_primary_technology: row.job_primary_technology,
                job_secondary_technology: row.job_secondary_technology,
                job_location_city: row.job_location_city,
                job_location_state: row.job_location_state,
                job_type: parse_opt(id, row.job_type.as_deref())?,
                job_pay_rate_per_hour: row.job_pay_rate_per_hour,
                job_pay_rate_yearly: row.job_pay_rate_yearly,
                job_contract_length: parse_opt(id, row.job_contract_length.as_deref())?,
                work_location: WorkLocation {
                    remote: row.work_remote,
                    hybrid: row.work_hybrid,
                    onsite: row.work_onsite,
                },
                visa_type: parse_opt(id, row.visa_type.as_deref())?,
                auto_delete_in_days: parse(id, &row.auto_delete_in_days)?,
                status: parse(id, &row.status)?,
            },
            expiration_date: row.expiration_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Appends `WHERE ...` for `predicate`. Search terms are matched literally.
fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &PostingPredicate) {
    builder
        .push(" WHERE status = ")
        .push_bind(predicate.status.as_str());

    if let Some(job_type) = predicate.job_type {
        builder.push(" AND job_type = ").push_bind(job_type.as_str());
    }
    if let Some(visa_type) = predicate.visa_type {
        builder.push(" AND visa_type = ").push_bind(visa_type.as_str());
    }
    if let Some(state) = &predicate.job_location_state {
        builder
            .push(" AND job_location_state = ")
            .push_bind(state.clone());
    }
    if let Some(now) = predicate.visible_at {
        builder
            .push(" AND (expiration_date IS NULL OR expiration_date > ")
            .push_bind(now)
            .push(")");
    }
    if let Some(search) = &predicate.search {
        let pattern = format!("%{}%", escape_like(search));
        builder.push(" AND (");
        for (idx, column) in [
            "job_header",
            "job_role_name",
            "recruiter_company",
            "job_primary_technology",
        ]
        .iter()
        .enumerate()
        {
            if idx > 0 {
                builder.push(" OR ");
            }
            builder
                .push(*column)
                .push(" ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        builder.push(")");
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn order_by(sort: PostingSort) -> &'static str {
    match sort {
        PostingSort::NewestFirst => " ORDER BY created_at DESC, id DESC",
        PostingSort::OldestFirst => " ORDER BY created_at ASC, id ASC",
    }
}

#[derive(Clone)]
pub struct PgPostingRepository {
    pool: PgPool,
}

impl PgPostingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostingRepository for PgPostingRepository {
    async fn insert(&self, posting: NewPosting) -> Result<JobPosting, RepositoryError> {
        let fields = posting.fields;
        let sql = format!(
            r#"
            INSERT INTO job_postings (
                recruiter_name, recruiter_email, recruiter_phone, share_phone_number,
                recruiter_company, job_header, job_description, job_role_name,
                job_primary_technology, job_secondary_technology, job_location_city,
                job_location_state, job_type, job_pay_rate_per_hour, job_pay_rate_yearly,
                job_contract_length, work_remote, work_hybrid, work_onsite, visa_type,
                auto_delete_in_days, status, expiration_date
            ) VALUES (
                $1,$2,$3,$4,
                $5,$6,$7,$8,
                $9,$10,$11,
                $12,$13,$14,$15,
                $16,$17,$18,$19,$20,
                $21,$22,$23
            )
            RETURNING {}
            "#,
            POSTING_COLUMNS
        );

        let row = sqlx::query_as::<_, PostingRow>(&sql)
            .bind(fields.recruiter_name)
            .bind(fields.recruiter_email)
            .bind(fields.recruiter_phone)
            .bind(fields.share_phone_number)
            .bind(fields.recruiter_company)
            .bind(fields.job_header)
            .bind(fields.job_description)
            .bind(fields.job_role_name)
            .bind(fields.job_primary_technology)
            .bind(fields.job_secondary_technology)
            .bind(fields.job_location_city)
            .bind(fields.job_location_state)
            .bind(fields.job_type.map(|v| v.as_str()))
            .bind(fields.job_pay_rate_per_hour)
            .bind(fields.job_pay_rate_yearly)
            .bind(fields.job_contract_length.map(|v| v.as_str()))
            .bind(fields.work_location.remote)
            .bind(fields.work_location.hybrid)
            .bind(fields.work_location.onsite)
            .bind(fields.visa_type.map(|v| v.as_str()))
            .bind(fields.auto_delete_in_days.as_str())
            .bind(fields.status.as_str())
            .bind(posting.expiration_date)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPosting>, RepositoryError> {
        let sql = format!("SELECT {} FROM job_postings WHERE id = $1", POSTING_COLUMNS);
        let row = sqlx::query_as::<_, PostingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(JobPosting::try_from).transpose()
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        fields: PostingFields,
    ) -> Result<Option<JobPosting>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE job_postings
            SET
                recruiter_name = $2,
                recruiter_email = $3,
                recruiter_phone = $4,
                share_phone_number = $5,
                recruiter_company = $6,
                job_header = $7,
                job_description = $8,
                job_role_name = $9,
                job_primary_technology = $10,
                job_secondary_technology = $11,
                job_location_city = $12,
                job_location_state = $13,
                job_type = $14,
                job_pay_rate_per_hour = $15,
                job_pay_rate_yearly = $16,
                job_contract_length = $17,
                work_remote = $18,
                work_hybrid = $19,
                work_onsite = $20,
                visa_type = $21,
                auto_delete_in_days = $22,
                status = $23,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            POSTING_COLUMNS
        );

        let row = sqlx::query_as::<_, PostingRow>(&sql)
            .bind(id)
            .bind(fields.recruiter_name)
            .bind(fields.recruiter_email)
            .bind(fields.recruiter_phone)
            .bind(fields.share_phone_number)
            .bind(fields.recruiter_company)
            .bind(fields.job_header)
            .bind(fields.job_description)
            .bind(fields.job_role_name)
            .bind(fields.job_primary_technology)
            .bind(fields.job_secondary_technology)
            .bind(fields.job_location_city)
            .bind(fields.job_location_state)
            .bind(fields.job_type.map(|v| v.as_str()))
            .bind(fields.job_pay_rate_per_hour)
            .bind(fields.job_pay_rate_yearly)
            .bind(fields.job_contract_length.map(|v| v.as_str()))
            .bind(fields.work_location.remote)
            .bind(fields.work_location.hybrid)
            .bind(fields.work_location.onsite)
            .bind(fields.visa_type.map(|v| v.as_str()))
            .bind(fields.auto_delete_in_days.as_str())
            .bind(fields.status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(JobPosting::try_from).transpose()
    }

    async fn find(
        &self,
        predicate: &PostingPredicate,
        sort: PostingSort,
        page: PageRequest,
    ) -> Result<Vec<JobPosting>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT ");
        builder.push(POSTING_COLUMNS).push(" FROM job_postings");
        push_predicate(&mut builder, predicate);
        builder
            .push(order_by(sort))
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.skip());

        let rows = builder
            .build_query_as::<PostingRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(JobPosting::try_from).collect()
    }

    async fn count(&self, predicate: &PostingPredicate) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_postings");
        push_predicate(&mut builder, predicate);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn project_stats(
        &self,
        predicate: &PostingPredicate,
    ) -> Result<Vec<StatsProjection>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, job_type, job_pay_rate_per_hour FROM job_postings",
        );
        push_predicate(&mut builder, predicate);
        builder.push(order_by(PostingSort::OldestFirst));

        let rows = builder
            .build_query_as::<StatsRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(StatsProjection {
                    job_type: parse_opt(row.id, row.job_type.as_deref())?,
                    job_pay_rate_per_hour: row.job_pay_rate_per_hour,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::{JobType, VisaType};

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("c++"), "c++");
        assert_eq!(escape_like("100%_rust\\"), "100\\%\\_rust\\\\");
    }

    #[test]
    fn predicate_renders_only_supplied_filters() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_postings");
        push_predicate(&mut builder, &PostingPredicate::active());
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM job_postings WHERE status = $1"
        );

        let predicate = PostingPredicate::active()
            .with_job_type(Some(JobType::Contract))
            .with_visa_type(Some(VisaType::H1b))
            .with_location_state(Some("CA".to_string()))
            .with_search(Some("java".to_string()))
            .visible_at(Utc::now());
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM job_postings");
        push_predicate(&mut builder, &predicate);
        let sql = builder.sql();
        assert!(sql.contains("job_type = $2"));
        assert!(sql.contains("visa_type = $3"));
        assert!(sql.contains("job_location_state = $4"));
        assert!(sql.contains("expiration_date > $5"));
        assert!(sql.contains("job_header ILIKE $6"));
        assert!(sql.contains("job_primary_technology ILIKE $9"));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
    async fn round_trips_through_postgres() {
        use crate::models::posting::{PostingStatus, RetentionWindow};

        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("connect");
        sqlx::migrate!("./migrations").run(&pool).await.expect("migrate");

        let repo = PgPostingRepository::new(pool);
        let fields = PostingFields {
            recruiter_name: "Dana".to_string(),
            recruiter_email: "dana@acme.io".to_string(),
            recruiter_phone: None,
            share_phone_number: false,
            recruiter_company: "Acme".to_string(),
            job_header: "Postgres round trip".to_string(),
            job_description: "Details".to_string(),
            job_role_name: "Engineer".to_string(),
            job_primary_technology: "Rust".to_string(),
            job_secondary_technology: None,
            job_location_city: None,
            job_location_state: None,
            job_type: Some(JobType::Freelance),
            job_pay_rate_per_hour: Some(70.0),
            job_pay_rate_yearly: None,
            job_contract_length: None,
            work_location: WorkLocation {
                remote: false,
                hybrid: true,
                onsite: false,
            },
            visa_type: None,
            auto_delete_in_days: RetentionWindow::Never,
            status: PostingStatus::Active,
        };
        let created = repo
            .insert(NewPosting {
                fields: fields.clone(),
                expiration_date: None,
            })
            .await
            .unwrap();
        assert_eq!(created.fields, fields);

        let mut inactive = fields;
        inactive.status = PostingStatus::Inactive;
        let updated = repo.update_by_id(created.id, inactive).await.unwrap().unwrap();
        assert_eq!(updated.fields.status, PostingStatus::Inactive);
        assert_eq!(updated.created_at, created.created_at);
    }
}
