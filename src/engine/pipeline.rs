// ==================== RECONCILIATION PIPELINE ====================
// Fetches users, deleted users and centers concurrently; each center's
// memberships are fetched as soon as the center list arrives, without
// waiting on the user sources. One immutable snapshot per reload.
// Views and stats are computed synchronously from the latest snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::models::{
    Diagnostics, EngineState, FilterSet, ReconciledUser, ReloadOutcome, Stats, UserRecord, View,
};
use crate::repositories::{CenterRepository, MembershipRepository, UserRepository};
use crate::utils::AppError;

use super::dedup::dedup_users;
use super::filter::filter_users;
use super::membership_index::build_membership_index;
use super::paginate::paginate;
use super::reconcile::reconcile;
use super::stats::compute_stats;

/// Everything derived from one successful reload. Never mutated after publish.
#[derive(Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub active: Vec<ReconciledUser>,
    pub deleted: Vec<ReconciledUser>,
    pub stats: Stats,
    pub diagnostics: Diagnostics,
}

struct EngineInner {
    state: EngineState,
    snapshot: Option<Arc<Snapshot>>,
    /// Highest generation that has finished, published or failed.
    settled: u64,
}

pub struct ReconciliationEngine {
    users: Arc<dyn UserRepository>,
    centers: Arc<dyn CenterRepository>,
    memberships: Arc<dyn MembershipRepository>,
    membership_timeout: Option<Duration>,
    /// Last generation handed out by `reload`.
    generation: AtomicU64,
    inner: RwLock<EngineInner>,
}

impl ReconciliationEngine {
    pub fn new(
        users: Arc<dyn UserRepository>,
        centers: Arc<dyn CenterRepository>,
        memberships: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            users,
            centers,
            memberships,
            membership_timeout: None,
            generation: AtomicU64::new(0),
            inner: RwLock::new(EngineInner {
                state: EngineState::Idle,
                snapshot: None,
                settled: 0,
            }),
        }
    }

    /// Bounds each per-center membership fetch. `None` waits indefinitely.
    pub fn with_membership_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.membership_timeout = timeout;
        self
    }

    /// Re-runs the whole pipeline and publishes the result.
    ///
    /// Only a failure of the users or centers source keeps the reload from
    /// becoming ready; the previous snapshot then stays visible. A result
    /// that arrives after a newer reload has already settled, whether that
    /// one published or failed, is dropped and reported as `superseded`.
    pub async fn reload(&self) -> ReloadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.write_inner().state = EngineState::Loading;

        log::info!("🔄 Reload #{} started", generation);

        let centers_and_memberships = async {
            let centers = self.centers.list_all().await?;
            let membership = build_membership_index(
                Arc::clone(&self.memberships),
                &centers,
                self.membership_timeout,
            )
            .await;
            Ok::<_, AppError>((centers, membership))
        };

        let (users, deleted, centers) = futures::join!(
            self.users.list_all(),
            self.users.list_deleted(),
            centers_and_memberships
        );

        let (users, centers, membership) = match (users, centers) {
            (Ok(users), Ok((centers, membership))) => (users, centers, membership),
            (users, centers) => {
                if let Err(e) = &users {
                    log::error!("❌ Reload #{}: user source failed: {}", generation, e);
                }
                if let Err(e) = &centers {
                    log::error!("❌ Reload #{}: center source failed: {}", generation, e);
                }
                return self.finish_failed(generation);
            }
        };

        log::debug!(
            "Reload #{}: {} user rows, {} centers",
            generation,
            users.len(),
            centers.len()
        );

        let (deleted, deleted_fetch_failed) = match deleted {
            Ok(rows) => (rows, false),
            Err(e) => {
                log::warn!("⚠️  Reload #{}: deleted users unavailable: {}", generation, e);
                (Vec::new(), true)
            }
        };

        let (live_rows, marked_rows): (Vec<UserRecord>, Vec<UserRecord>) =
            users.into_iter().partition(|user| user.deleted_at.is_none());
        if !marked_rows.is_empty() {
            log::debug!(
                "Reload #{}: {} rows with deleted_at left out of the active set",
                generation,
                marked_rows.len()
            );
        }

        let active = dedup_users(live_rows);
        let deleted = dedup_users(deleted);

        let active_users = reconcile(active.users, &membership.index);
        let deleted_users = reconcile(deleted.users, &membership.index);
        let stats = compute_stats(&active_users);
        let deleted_total = deleted_users.len();

        let diagnostics = Diagnostics {
            generation,
            anomalies: active.anomalies,
            deleted_anomalies: deleted.anomalies,
            failed_centers: membership.failed_centers.clone(),
            ambiguities: membership.ambiguities(),
            ambiguous_users: membership.ambiguous_users.clone(),
            deleted_fetch_failed,
            published_at: chrono::Utc::now(),
        };

        let snapshot = Snapshot {
            generation,
            active: active_users,
            deleted: deleted_users,
            stats,
            diagnostics,
        };

        let published = self.publish(snapshot);

        if published {
            log::info!(
                "✅ Reload #{} ready: {} users ({} active), {} deleted, {} failed centers",
                generation,
                stats.total,
                stats.active,
                deleted_total,
                membership.failed_centers.len()
            );
        } else {
            log::info!("⏭️  Reload #{} superseded by a newer reload; result discarded", generation);
        }

        ReloadOutcome {
            ready: true,
            anomalies: active.anomalies + deleted.anomalies,
            failed_centers: membership.failed_centers,
            ambiguities: membership.ambiguous_users.len(),
            ambiguous_users: membership.ambiguous_users,
            generation,
            superseded: !published,
        }
    }

    /// Active users matching `filters`, one page of them.
    /// Empty until the first successful reload.
    pub fn get_view(&self, filters: &FilterSet, page: usize, page_size: usize) -> View {
        let snapshot = self.snapshot();
        let users = snapshot.as_deref().map_or(&[][..], |s| s.active.as_slice());
        paginate(&filter_users(users, filters), page_size, page)
    }

    pub fn get_deleted_view(&self, filters: &FilterSet, page: usize, page_size: usize) -> View {
        let snapshot = self.snapshot();
        let users = snapshot.as_deref().map_or(&[][..], |s| s.deleted.as_slice());
        paginate(&filter_users(users, filters), page_size, page)
    }

    pub fn get_stats(&self) -> Stats {
        self.snapshot().map(|s| s.stats).unwrap_or_default()
    }

    pub fn state(&self) -> EngineState {
        self.read_inner().state
    }

    pub fn diagnostics(&self) -> Option<Diagnostics> {
        self.snapshot().map(|s| s.diagnostics.clone())
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.read_inner().snapshot.clone()
    }

    /// Swaps in `snapshot` unless a newer generation has already settled.
    /// The state only leaves `Loading` once the newest reload settles.
    fn publish(&self, snapshot: Snapshot) -> bool {
        let generation = snapshot.generation;
        let mut inner = self.write_inner();

        if generation < inner.settled {
            return false;
        }

        inner.settled = generation;
        inner.snapshot = Some(Arc::new(snapshot));
        if self.is_latest(generation) {
            inner.state = EngineState::Ready;
        }
        true
    }

    fn finish_failed(&self, generation: u64) -> ReloadOutcome {
        let mut inner = self.write_inner();

        let superseded = generation < inner.settled;
        if superseded {
            log::info!("⏭️  Reload #{} failed after a newer reload settled; ignored", generation);
        } else {
            inner.settled = generation;
            if self.is_latest(generation) {
                inner.state = EngineState::PartiallyFailed;
            }
            if inner.snapshot.is_some() {
                log::warn!("⚠️  Reload #{} failed; keeping previously published view", generation);
            }
        }

        ReloadOutcome {
            ready: false,
            anomalies: 0,
            failed_centers: Vec::new(),
            ambiguities: 0,
            ambiguous_users: Vec::new(),
            generation,
            superseded,
        }
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, EngineInner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_inner(&self) -> std::sync::RwLockWriteGuard<'_, EngineInner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
