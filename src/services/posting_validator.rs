use std::str::FromStr;

use validator::Validate;

use crate::dto::posting_dto::PostingDraft;
use crate::error::{Error, Result};
use crate::models::posting::{PostingFields, PostingStatus, UnknownVariant, WorkLocation};
use crate::utils::validation;

const WORK_LOCATION_REQUIRED: &str =
    "At least one work location (remote, hybrid, onsite) must be selected";

/// Every problem with `draft`, in a stable order. Empty means valid.
pub fn validate(draft: &PostingDraft) -> Vec<String> {
    let draft = normalize(draft.clone());
    check(&draft).err().unwrap_or_default()
}

/// Turns a draft into storable fields or fails with all collected messages.
pub fn validate_draft(draft: PostingDraft) -> Result<PostingFields> {
    check(&normalize(draft)).map_err(Error::ValidationFailed)
}

fn check(draft: &PostingDraft) -> std::result::Result<PostingFields, Vec<String>> {
    let mut errors = draft.type_errors.clone();

    let recruiter_name = required(&draft.recruiter_name, "recruiterName", &mut errors);
    let recruiter_email = required(&draft.recruiter_email, "recruiterEmail", &mut errors);
    let recruiter_company = required(&draft.recruiter_company, "recruiterCompany", &mut errors);
    let job_header = required(&draft.job_header, "jobHeader", &mut errors);
    let job_description = required(&draft.job_description, "jobDescription", &mut errors);
    let job_role_name = required(&draft.job_role_name, "jobRoleName", &mut errors);
    let job_primary_technology =
        required(&draft.job_primary_technology, "jobPrimaryTechnology", &mut errors);
    let auto_delete_in_days = required(&draft.auto_delete_in_days, "autoDeleteInDays", &mut errors);

    let work_location = WorkLocation {
        remote: draft.work_location.and_then(|w| w.remote).unwrap_or(false),
        hybrid: draft.work_location.and_then(|w| w.hybrid).unwrap_or(false),
        onsite: draft.work_location.and_then(|w| w.onsite).unwrap_or(false),
    };
    if !work_location.any_selected() {
        errors.push(WORK_LOCATION_REQUIRED.to_string());
    }

    let auto_delete_in_days = auto_delete_in_days.and_then(|raw| choice(&raw, &mut errors));
    let job_type = draft.job_type.as_ref().and_then(|raw| choice(raw, &mut errors));
    let job_contract_length = draft
        .job_contract_length
        .as_ref()
        .and_then(|raw| choice(raw, &mut errors));
    let visa_type = draft.visa_type.as_ref().and_then(|raw| choice(raw, &mut errors));
    let status = match &draft.status {
        Some(raw) => choice(raw, &mut errors),
        None => Some(PostingStatus::default()),
    };

    if let Err(derived) = draft.validate() {
        errors.extend(validation::messages(&derived));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    match (
        recruiter_name,
        recruiter_email,
        recruiter_company,
        job_header,
        job_description,
        job_role_name,
        job_primary_technology,
        auto_delete_in_days,
        status,
    ) {
        (
            Some(recruiter_name),
            Some(recruiter_email),
            Some(recruiter_company),
            Some(job_header),
            Some(job_description),
            Some(job_role_name),
            Some(job_primary_technology),
            Some(auto_delete_in_days),
            Some(status),
        ) => Ok(PostingFields {
            recruiter_name,
            recruiter_email,
            recruiter_phone: draft.recruiter_phone.clone(),
            share_phone_number: draft.share_phone_number.unwrap_or(false),
            recruiter_company,
            job_header,
            job_description,
            job_role_name,
            job_primary_technology,
            job_secondary_technology: draft.job_secondary_technology.clone(),
            job_location_city: draft.job_location_city.clone(),
            job_location_state: draft.job_location_state.clone(),
            job_type,
            job_pay_rate_per_hour: draft.job_pay_rate_per_hour,
            job_pay_rate_yearly: draft.job_pay_rate_yearly,
            job_contract_length,
            work_location,
            visa_type,
            auto_delete_in_days,
            status,
        }),
        _ => Err(vec!["posting is incomplete".to_string()]),
    }
}

/// Trims every text field, drops blanks and lowercases the email.
fn normalize(draft: PostingDraft) -> PostingDraft {
    PostingDraft {
        recruiter_name: trimmed(draft.recruiter_name),
        recruiter_email: trimmed(draft.recruiter_email).map(|email| email.to_lowercase()),
        recruiter_phone: trimmed(draft.recruiter_phone),
        recruiter_company: trimmed(draft.recruiter_company),
        job_header: trimmed(draft.job_header),
        job_description: trimmed(draft.job_description),
        job_role_name: trimmed(draft.job_role_name),
        job_primary_technology: trimmed(draft.job_primary_technology),
        job_secondary_technology: trimmed(draft.job_secondary_technology),
        job_location_city: trimmed(draft.job_location_city),
        job_location_state: trimmed(draft.job_location_state),
        job_type: trimmed(draft.job_type),
        job_contract_length: trimmed(draft.job_contract_length),
        visa_type: trimmed(draft.visa_type),
        auto_delete_in_days: trimmed(draft.auto_delete_in_days),
        status: trimmed(draft.status),
        ..draft
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: &Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    if value.is_none() {
        errors.push(format!("{} is required", field));
    }
    value.clone()
}

fn choice<T>(raw: &str, errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push(err.to_string());
            None
        }
    }
}
