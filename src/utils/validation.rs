use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

/// Addresses must carry a dotted domain (`local@domain.tld`). Inputs without an `@`
/// are left to the `email` rule so they report once.
pub fn dotted_domain(value: &str) -> Result<(), ValidationError> {
    match value.rsplit_once('@') {
        Some((_, domain)) if !domain.contains('.') => {
            let mut err = ValidationError::new("email_domain");
            err.message = Some(Cow::Borrowed(
                "recruiterEmail must be a valid email address",
            ));
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Flattens derive-level errors into field-named messages, ordered by field. Rules on
/// one field that share a message report it once.
pub fn messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let mut messages: Vec<String> = errs
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, err.code),
                })
                .collect();
            messages.dedup();
            (field, messages)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields.into_iter().flat_map(|(_, messages)| messages).collect()
}
