use crate::models::{CenterRecord, MembershipRecord, ReconciledUser, UserRecord};

use super::dedup::dedup_users;
use super::membership_index::{index_memberships, MembershipIndex};

/// Settles every user's center against the membership index.
///
/// When the index has an entry for the user it replaces the denormalized
/// `center_id`/`center_name` outright. Without an entry the user's own
/// fields are left alone, including having no center at all.
pub fn reconcile(users: Vec<UserRecord>, index: &MembershipIndex) -> Vec<ReconciledUser> {
    users
        .into_iter()
        .map(|mut user| {
            if let Some(assignment) = index.get(&user.id) {
                if user.center_id.as_deref() != Some(assignment.center_id.as_str()) {
                    log::debug!(
                        "User {} center {:?} overridden by membership -> {}",
                        user.id,
                        user.center_id,
                        assignment.center_id
                    );
                }
                user.center_id = Some(assignment.center_id.clone());
                user.center_name = Some(assignment.center_name.clone());
            }
            ReconciledUser::from_record(user)
        })
        .collect()
}

/// Dedup, index and reconcile in one pure step over already-fetched sources.
///
/// `memberships[i]` belongs to `centers[i]`.
pub fn reconcile_sources(
    users: Vec<UserRecord>,
    centers: &[CenterRecord],
    memberships: &[Vec<MembershipRecord>],
) -> Vec<ReconciledUser> {
    let deduped = dedup_users(users);
    let index = index_memberships(centers, memberships).index;
    reconcile(deduped.users, &index)
}
