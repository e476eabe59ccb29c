use crate::models::{ReconciledUser, Stats};

/// Headline counts over the whole reconciled population, before any filter.
pub fn compute_stats(users: &[ReconciledUser]) -> Stats {
    let total = users.len();
    let active = users.iter().filter(|user| user.is_active()).count();

    Stats {
        total,
        active,
        inactive: total - active,
    }
}
