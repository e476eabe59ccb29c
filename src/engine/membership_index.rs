use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{CenterAssignment, CenterRecord, MembershipRecord};
use crate::repositories::MembershipRepository;
use crate::utils::AppError;

/// `user_id → center` built from the membership join rows.
pub type MembershipIndex = HashMap<String, CenterAssignment>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MembershipIndexOutcome {
    pub index: MembershipIndex,
    /// Centers whose membership fetch failed, in source order.
    pub failed_centers: Vec<String>,
    /// Users found under more than one center. The later center won.
    pub ambiguous_users: Vec<String>,
}

impl MembershipIndexOutcome {
    pub fn ambiguities(&self) -> usize {
        self.ambiguous_users.len()
    }
}

/// Fetches every center's memberships concurrently and folds them into an index.
///
/// Each fetch is settled independently: an error, a panic or a timeout on
/// one center leaves that center with an empty list and records it in
/// `failed_centers`. Nothing here aborts the build.
pub async fn build_membership_index(
    repo: Arc<dyn MembershipRepository>,
    centers: &[CenterRecord],
    fetch_timeout: Option<Duration>,
) -> MembershipIndexOutcome {
    let tasks: Vec<_> = centers
        .iter()
        .map(|center| {
            let repo = Arc::clone(&repo);
            let center_id = center.id.clone();
            tokio::spawn(async move { fetch_center_memberships(repo, center_id, fetch_timeout).await })
        })
        .collect();

    let results = join_all(tasks).await;

    let mut failed_centers = Vec::new();
    let mut lists = Vec::with_capacity(centers.len());

    for (center, result) in centers.iter().zip(results) {
        match result {
            Ok(Ok(rows)) => {
                log::debug!("Center {} has {} memberships", center.id, rows.len());
                lists.push(rows);
            }
            Ok(Err(e)) => {
                log::warn!("⚠️  Membership fetch failed for center {}: {}", center.id, e);
                failed_centers.push(center.id.clone());
                lists.push(Vec::new());
            }
            Err(e) => {
                log::error!("❌ Membership task for center {} aborted: {}", center.id, e);
                failed_centers.push(center.id.clone());
                lists.push(Vec::new());
            }
        }
    }

    let mut outcome = index_memberships(centers, &lists);
    outcome.failed_centers = failed_centers;
    outcome
}

async fn fetch_center_memberships(
    repo: Arc<dyn MembershipRepository>,
    center_id: String,
    fetch_timeout: Option<Duration>,
) -> Result<Vec<MembershipRecord>, AppError> {
    match fetch_timeout {
        Some(limit) => tokio::time::timeout(limit, repo.list_by_center(&center_id))
            .await
            .map_err(|_| AppError::Timeout(format!("memberships for center {}", center_id)))?,
        None => repo.list_by_center(&center_id).await,
    }
}

/// Folds already-fetched membership lists into an index.
///
/// `lists[i]` belongs to `centers[i]`. Centers are walked in order, then
/// their rows in order; a later assignment overwrites an earlier one.
/// A user moved to a different center this way is reported as ambiguous.
pub fn index_memberships(
    centers: &[CenterRecord],
    lists: &[Vec<MembershipRecord>],
) -> MembershipIndexOutcome {
    let mut index = MembershipIndex::new();
    let mut ambiguous_users = Vec::new();
    let mut seen_ambiguous = HashSet::new();

    for (center, rows) in centers.iter().zip(lists) {
        let center_name = if center.name.is_empty() {
            center.id.clone()
        } else {
            center.name.clone()
        };

        for row in rows {
            if row.user_id.is_empty() {
                continue;
            }

            let assignment = CenterAssignment {
                center_id: center.id.clone(),
                center_name: center_name.clone(),
            };

            if let Some(previous) = index.insert(row.user_id.clone(), assignment) {
                if previous.center_id != center.id && seen_ambiguous.insert(row.user_id.clone()) {
                    ambiguous_users.push(row.user_id.clone());
                }
            }
        }
    }

    if !ambiguous_users.is_empty() {
        log::warn!(
            "⚠️  {} users belong to more than one center; last center wins: {:?}",
            ambiguous_users.len(),
            ambiguous_users
        );
    }

    MembershipIndexOutcome {
        index,
        failed_centers: Vec::new(),
        ambiguous_users,
    }
}
