// ==================== USER–CENTER RECONCILIATION ENGINE ====================
// users + centers + memberships  ->  dedup  ->  reconcile  ->  {stats, filter -> paginate}

pub mod dedup;
pub mod filter;
pub mod membership_index;
pub mod paginate;
pub mod pipeline;
pub mod reconcile;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use dedup::{dedup_users, DedupOutcome};
pub use filter::filter_users;
pub use membership_index::{build_membership_index, index_memberships, MembershipIndex, MembershipIndexOutcome};
pub use paginate::{page_window, paginate};
pub use pipeline::{ReconciliationEngine, Snapshot};
pub use reconcile::{reconcile, reconcile_sources};
pub use stats::compute_stats;
