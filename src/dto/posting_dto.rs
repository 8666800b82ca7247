use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::Error;
use crate::models::posting::{
    ContractLength, JobPosting, JobType, PostingFields, PostingStatus, RetentionWindow, VisaType,
    WorkLocation,
};
use crate::services::posting_service::{PostingList, PostingStats};

/// Inbound posting as it arrives from a caller: every field optional, enumerations
/// still raw text. Only the validator turns this into [`PostingFields`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PostingDraft {
    #[validate(length(max = 100, message = "recruiterName must be at most 100 characters"))]
    pub recruiter_name: Option<String>,
    #[validate(
        email(message = "recruiterEmail must be a valid email address"),
        custom(function = "crate::utils::validation::dotted_domain")
    )]
    pub recruiter_email: Option<String>,
    #[validate(length(max = 20, message = "recruiterPhone must be at most 20 characters"))]
    pub recruiter_phone: Option<String>,
    pub share_phone_number: Option<bool>,
    #[validate(length(max = 100, message = "recruiterCompany must be at most 100 characters"))]
    pub recruiter_company: Option<String>,
    #[validate(length(max = 200, message = "jobHeader must be at most 200 characters"))]
    pub job_header: Option<String>,
    #[validate(length(max = 5000, message = "jobDescription must be at most 5000 characters"))]
    pub job_description: Option<String>,
    #[validate(length(max = 100, message = "jobRoleName must be at most 100 characters"))]
    pub job_role_name: Option<String>,
    #[validate(length(
        max = 100,
        message = "jobPrimaryTechnology must be at most 100 characters"
    ))]
    pub job_primary_technology: Option<String>,
    #[validate(length(
        max = 100,
        message = "jobSecondaryTechnology must be at most 100 characters"
    ))]
    pub job_secondary_technology: Option<String>,
    pub job_location_city: Option<String>,
    pub job_location_state: Option<String>,
    pub job_type: Option<String>,
    #[validate(range(min = 0.0, message = "jobPayRatePerHour cannot be negative"))]
    pub job_pay_rate_per_hour: Option<f64>,
    #[validate(range(min = 0.0, message = "jobPayRateYearly cannot be negative"))]
    pub job_pay_rate_yearly: Option<f64>,
    pub job_contract_length: Option<String>,
    pub work_location: Option<WorkLocationDraft>,
    pub visa_type: Option<String>,
    pub auto_delete_in_days: Option<String>,
    pub status: Option<String>,
    /// Messages for fields whose JSON value had the wrong type. Those fields are
    /// treated as absent and the messages join the validator's list.
    #[serde(skip)]
    pub type_errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WorkLocationDraft {
    pub remote: Option<bool>,
    pub hybrid: Option<bool>,
    pub onsite: Option<bool>,
}

impl WorkLocationDraft {
    fn overlay(self, patch: WorkLocationDraft) -> Self {
        Self {
            remote: patch.remote.or(self.remote),
            hybrid: patch.hybrid.or(self.hybrid),
            onsite: patch.onsite.or(self.onsite),
        }
    }
}

impl From<WorkLocation> for WorkLocationDraft {
    fn from(value: WorkLocation) -> Self {
        Self {
            remote: Some(value.remote),
            hybrid: Some(value.hybrid),
            onsite: Some(value.onsite),
        }
    }
}

impl PostingDraft {
    /// Reads a draft from an arbitrary JSON object without letting one mistyped
    /// field reject the whole payload.
    pub fn from_json(body: JsonValue) -> crate::error::Result<Self> {
        let JsonValue::Object(mut object) = body else {
            return Err(Error::BadRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };

        let keys: Vec<String> = object.keys().cloned().collect();
        let mut type_errors = Vec::new();
        for key in keys {
            let Some(value) = object.get(&key) else {
                continue;
            };
            let mut single = Map::new();
            single.insert(key.clone(), value.clone());
            if serde_json::from_value::<PostingDraft>(JsonValue::Object(single)).is_err() {
                object.remove(&key);
                type_errors.push(format!("{} has an invalid type", key));
            }
        }

        let mut draft: PostingDraft = serde_json::from_value(JsonValue::Object(object))?;
        draft.type_errors = type_errors;
        Ok(draft)
    }

    /// Applies `patch` on top of `self`; fields the patch leaves out keep their value.
    pub fn overlay(self, patch: PostingDraft) -> Self {
        let work_location = match (self.work_location, patch.work_location) {
            (Some(base), Some(patch)) => Some(base.overlay(patch)),
            (base, patch) => patch.or(base),
        };

        Self {
            recruiter_name: patch.recruiter_name.or(self.recruiter_name),
            recruiter_email: patch.recruiter_email.or(self.recruiter_email),
            recruiter_phone: patch.recruiter_phone.or(self.recruiter_phone),
            share_phone_number: patch.share_phone_number.or(self.share_phone_number),
            recruiter_company: patch.recruiter_company.or(self.recruiter_company),
            job_header: patch.job_header.or(self.job_header),
            job_description: patch.job_description.or(self.job_description),
            job_role_name: patch.job_role_name.or(self.job_role_name),
            job_primary_technology: patch.job_primary_technology.or(self.job_primary_technology),
            job_secondary_technology: patch
                .job_secondary_technology
                .or(self.job_secondary_technology),
            job_location_city: patch.job_location_city.or(self.job_location_city),
            job_location_state: patch.job_location_state.or(self.job_location_state),
            job_type: patch.job_type.or(self.job_type),
            job_pay_rate_per_hour: patch.job_pay_rate_per_hour.or(self.job_pay_rate_per_hour),
            job_pay_rate_yearly: patch.job_pay_rate_yearly.or(self.job_pay_rate_yearly),
            job_contract_length: patch.job_contract_length.or(self.job_contract_length),
            work_location,
            visa_type: patch.visa_type.or(self.visa_type),
            auto_delete_in_days: patch.auto_delete_in_days.or(self.auto_delete_in_days),
            status: patch.status.or(self.status),
            type_errors: patch.type_errors,
        }
    }
}

impl From<&PostingFields> for PostingDraft {
    fn from(value: &PostingFields) -> Self {
        Self {
            recruiter_name: Some(value.recruiter_name.clone()),
            recruiter_email: Some(value.recruiter_email.clone()),
            recruiter_phone: value.recruiter_phone.clone(),
            share_phone_number: Some(value.share_phone_number),
            recruiter_company: Some(value.recruiter_company.clone()),
            job_header: Some(value.job_header.clone()),
            job_description: Some(value.job_description.clone()),
            job_role_name: Some(value.job_role_name.clone()),
            job_primary_technology: Some(value.job_primary_technology.clone()),
            job_secondary_technology: value.job_secondary_technology.clone(),
            job_location_city: value.job_location_city.clone(),
            job_location_state: value.job_location_state.clone(),
            job_type: value.job_type.map(|v| v.as_str().to_string()),
            job_pay_rate_per_hour: value.job_pay_rate_per_hour,
            job_pay_rate_yearly: value.job_pay_rate_yearly,
            job_contract_length: value.job_contract_length.map(|v| v.as_str().to_string()),
            work_location: Some(value.work_location.into()),
            visa_type: value.visa_type.map(|v| v.as_str().to_string()),
            auto_delete_in_days: Some(value.auto_delete_in_days.as_str().to_string()),
            status: Some(value.status.as_str().to_string()),
            type_errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PostingListQuery {
    /// Exact job type, e.g. `Full-time`
    pub job_type: Option<String>,
    /// Exact visa type, e.g. `H1B`
    pub visa_type: Option<String>,
    pub job_location_state: Option<String>,
    /// Case-insensitive substring over header, role, company and primary technology
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Full posting, contact details included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingResponse {
    pub id: String,
    #[serde(rename = "_id")]
    pub storage_id: String,
    #[serde(flatten)]
    pub fields: PostingFields,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row. Carries no recruiter email or phone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingSummary {
    pub id: String,
    #[serde(rename = "_id")]
    pub storage_id: String,
    pub recruiter_name: String,
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
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingCreatedResponse {
    pub id: String,
    #[serde(rename = "_id")]
    pub storage_id: String,
    pub job_header: String,
    pub job_role_name: String,
    pub recruiter_company: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostingDeletedResponse {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostingListResponse {
    pub items: Vec<PostingSummary>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_jobs: i64,
    /// One entry per active posting, in storage order; not a histogram.
    pub job_type_stats: Vec<Option<JobType>>,
    pub avg_hourly_rate: f64,
}

impl From<JobPosting> for PostingResponse {
    fn from(value: JobPosting) -> Self {
        let id = value.id.to_string();
        Self {
            storage_id: id.clone(),
            id,
            fields: value.fields,
            expiration_date: value.expiration_date,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<JobPosting> for PostingSummary {
    fn from(value: JobPosting) -> Self {
        let id = value.id.to_string();
        let fields = value.fields;
        Self {
            storage_id: id.clone(),
            id,
            recruiter_name: fields.recruiter_name,
            share_phone_number: fields.share_phone_number,
            recruiter_company: fields.recruiter_company,
            job_header: fields.job_header,
            job_description: fields.job_description,
            job_role_name: fields.job_role_name,
            job_primary_technology: fields.job_primary_technology,
            job_secondary_technology: fields.job_secondary_technology,
            job_location_city: fields.job_location_city,
            job_location_state: fields.job_location_state,
            job_type: fields.job_type,
            job_pay_rate_per_hour: fields.job_pay_rate_per_hour,
            job_pay_rate_yearly: fields.job_pay_rate_yearly,
            job_contract_length: fields.job_contract_length,
            work_location: fields.work_location,
            visa_type: fields.visa_type,
            auto_delete_in_days: fields.auto_delete_in_days,
            status: fields.status,
            expiration_date: value.expiration_date,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<JobPosting> for PostingCreatedResponse {
    fn from(value: JobPosting) -> Self {
        let id = value.id.to_string();
        Self {
            storage_id: id.clone(),
            id,
            job_header: value.fields.job_header,
            job_role_name: value.fields.job_role_name,
            recruiter_company: value.fields.recruiter_company,
            created_at: value.created_at,
        }
    }
}

impl PostingDeletedResponse {
    pub fn new(id: Uuid) -> Self {
        Self {
            message: "Job posting deleted".to_string(),
            id: id.to_string(),
        }
    }
}

impl From<PostingList> for PostingListResponse {
    fn from(value: PostingList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            page: value.page,
            limit: value.limit,
            total: value.total,
            pages: value.pages,
        }
    }
}

impl From<PostingStats> for StatsResponse {
    fn from(value: PostingStats) -> Self {
        Self {
            total_jobs: value.total_jobs,
            job_type_stats: value.job_type_stats,
            avg_hourly_rate: value.avg_hourly_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mistyped_fields_are_reported_and_dropped() {
        let draft = PostingDraft::from_json(json!({
            "recruiterEmail": "dana@acme.io",
            "jobPayRatePerHour": "abc",
            "sharePhoneNumber": "yes",
            "workLocation": { "remote": true }
        }))
        .unwrap();

        assert_eq!(draft.recruiter_email.as_deref(), Some("dana@acme.io"));
        assert_eq!(draft.job_pay_rate_per_hour, None);
        assert_eq!(draft.share_phone_number, None);
        assert_eq!(draft.work_location.and_then(|w| w.remote), Some(true));
        assert_eq!(
            draft.type_errors,
            vec![
                "jobPayRatePerHour has an invalid type".to_string(),
                "sharePhoneNumber has an invalid type".to_string(),
            ]
        );
    }

    #[test]
    fn non_object_body_is_a_bad_request() {
        let err = PostingDraft::from_json(json!(["not", "a", "posting"])).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn overlay_keeps_unpatched_fields() {
        let base = PostingDraft {
            job_header: Some("Old".to_string()),
            recruiter_company: Some("Acme".to_string()),
            ..Default::default()
        };
        let merged = base.overlay(PostingDraft {
            job_header: Some("New".to_string()),
            ..Default::default()
        });
        assert_eq!(merged.job_header.as_deref(), Some("New"));
        assert_eq!(merged.recruiter_company.as_deref(), Some("Acme"));
    }
}
