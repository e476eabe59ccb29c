// ==================== SOURCE REPOSITORIES ====================
// The engine only sees these traits. MongoDB implementations live in
// `crate::database`; tests plug in in-memory fakes.

use async_trait::async_trait;

use crate::models::{CenterRecord, MembershipRecord, UserRecord};
use crate::utils::AppError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Users without a deletion mark. May contain duplicate rows per id.
    async fn list_all(&self) -> Result<Vec<UserRecord>, AppError>;

    /// Soft-deleted users, fetched separately from the active set.
    async fn list_deleted(&self) -> Result<Vec<UserRecord>, AppError>;
}

#[async_trait]
pub trait CenterRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<CenterRecord>, AppError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn list_by_center(&self, center_id: &str) -> Result<Vec<MembershipRecord>, AppError>;
}
