// In-memory repositories for engine and handler tests.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::models::{CenterRecord, MembershipRecord, UserRecord};
use crate::repositories::{CenterRepository, MembershipRepository, UserRepository};
use crate::utils::AppError;

/// Holds one user `list_all` call open: `entered` fires once the call has
/// read its rows, and the call returns after `release`.
#[derive(Default)]
pub struct FetchGate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct FakeSources {
    pub users: Mutex<Vec<UserRecord>>,
    pub deleted: Mutex<Vec<UserRecord>>,
    pub centers: Mutex<Vec<CenterRecord>>,
    pub memberships: Mutex<HashMap<String, Vec<MembershipRecord>>>,
    pub failing_centers: Mutex<Vec<String>>,
    pub users_fail: AtomicBool,
    pub deleted_fail: AtomicBool,
    pub centers_fail: AtomicBool,
    /// Gates applied to successive `list_all` user calls, in order.
    pub user_gates: Mutex<VecDeque<Arc<FetchGate>>>,
    pub membership_calls: AtomicUsize,
}

impl FakeSources {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_users(&self, users: Vec<UserRecord>) {
        *self.users.lock().unwrap() = users;
    }

    pub fn set_deleted(&self, users: Vec<UserRecord>) {
        *self.deleted.lock().unwrap() = users;
    }

    pub fn set_centers(&self, centers: Vec<CenterRecord>) {
        *self.centers.lock().unwrap() = centers;
    }

    pub fn add_membership(&self, user_id: &str, center_id: &str) {
        self.memberships
            .lock()
            .unwrap()
            .entry(center_id.to_string())
            .or_default()
            .push(MembershipRecord::new(user_id, center_id));
    }

    pub fn fail_center(&self, center_id: &str) {
        self.failing_centers.lock().unwrap().push(center_id.to_string());
    }

    pub fn hold_next_user_fetch(&self) -> Arc<FetchGate> {
        let gate = Arc::new(FetchGate::default());
        self.user_gates.lock().unwrap().push_back(Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl UserRepository for FakeSources {
    async fn list_all(&self) -> Result<Vec<UserRecord>, AppError> {
        let users = self.users.lock().unwrap().clone();
        let gate = self.user_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.users_fail.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("users collection unavailable".to_string()));
        }
        Ok(users)
    }

    async fn list_deleted(&self) -> Result<Vec<UserRecord>, AppError> {
        if self.deleted_fail.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("deleted users unavailable".to_string()));
        }
        Ok(self.deleted.lock().unwrap().clone())
    }
}

#[async_trait]
impl CenterRepository for FakeSources {
    async fn list_all(&self) -> Result<Vec<CenterRecord>, AppError> {
        if self.centers_fail.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError("centers collection unavailable".to_string()));
        }
        Ok(self.centers.lock().unwrap().clone())
    }
}

#[async_trait]
impl MembershipRepository for FakeSources {
    async fn list_by_center(&self, center_id: &str) -> Result<Vec<MembershipRecord>, AppError> {
        self.membership_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_centers.lock().unwrap().iter().any(|c| c == center_id) {
            return Err(AppError::SourceFetchError(format!("center {} unreachable", center_id)));
        }
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .get(center_id)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn engine_over(sources: &Arc<FakeSources>) -> super::ReconciliationEngine {
    super::ReconciliationEngine::new(sources.clone(), sources.clone(), sources.clone())
}

pub fn user(id: &str, username: &str, center: Option<&str>) -> UserRecord {
    let mut record = UserRecord::new(id, username);
    record.email = format!("{}@example.com", username);
    record.center_id = center.map(str::to_string);
    record
}
