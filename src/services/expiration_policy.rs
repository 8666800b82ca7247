use chrono::{DateTime, Duration, Utc};

use crate::models::posting::RetentionWindow;

/// Expiration timestamp for a posting created at `created_at`. Only called on
/// creation; edits keep whatever was stamped then.
pub fn compute_expiration(
    retention: RetentionWindow,
    created_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    retention
        .days()
        .map(|days| created_at + Duration::seconds(days * 86_400))
}
