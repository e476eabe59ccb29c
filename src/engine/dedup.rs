use std::collections::HashMap;

use crate::models::UserRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    /// One record per id, in first-seen order of ids.
    pub users: Vec<UserRecord>,
    /// Rows dropped for lacking a usable id.
    pub anomalies: usize,
}

/// Collapses the backend's per-membership fan-out into one row per user.
///
/// The newest row by `updated_at` (falling back to `created_at`) wins. A
/// row with a timestamp beats one without; on a tie, or when neither has
/// one, the row seen first is kept.
pub fn dedup_users(records: Vec<UserRecord>) -> DedupOutcome {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut users: Vec<UserRecord> = Vec::with_capacity(records.len());
    let mut anomalies = 0;

    for record in records {
        if record.id.trim().is_empty() {
            anomalies += 1;
            continue;
        }

        match slots.get(&record.id) {
            Some(&slot) => {
                if record.effective_timestamp() > users[slot].effective_timestamp() {
                    users[slot] = record;
                }
            }
            None => {
                slots.insert(record.id.clone(), users.len());
                users.push(record);
            }
        }
    }

    if anomalies > 0 {
        log::warn!("⚠️  Dropped {} user rows without a usable id", anomalies);
    }

    DedupOutcome { users, anomalies }
}
