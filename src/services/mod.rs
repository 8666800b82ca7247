pub mod expiration_policy;
pub mod posting_query;
pub mod posting_service;
pub mod posting_validator;
