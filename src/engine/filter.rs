use crate::models::{FilterSet, ReconciledUser, FILTER_ALL};

/// Normalized filter value, or `None` when the dimension is unfiltered.
fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(FILTER_ALL))
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Applies every active predicate (logical AND), keeping input order.
pub fn filter_users<'a>(users: &'a [ReconciledUser], filters: &FilterSet) -> Vec<&'a ReconciledUser> {
    let search = active(&filters.search_term).map(str::to_lowercase);
    let status = active(&filters.status);
    let role = active(&filters.role).map(str::to_lowercase);
    let center = active(&filters.center);

    users
        .iter()
        .filter(|user| {
            search.as_deref().map_or(true, |term| {
                contains_ci(&user.username, term)
                    || contains_ci(&user.email, term)
                    || contains_ci(&user.full_name, term)
            })
        })
        .filter(|user| status.map_or(true, |s| user.status.as_str() == s))
        .filter(|user| {
            role.as_deref()
                .map_or(true, |r| user.roles.iter().any(|name| contains_ci(name, r)))
        })
        .filter(|user| center.map_or(true, |c| user.center_id.as_deref() == Some(c)))
        .collect()
}
