//! Page slicing for the `/repos` listing.
//!
//! The command path and the "next page" button path both go through
//! [`paginate`], so the same `(page, repos)` input always yields the same page.

use crate::domain::RepositoryRecord;

/// Items per listing page.
pub const PAGE_SIZE: usize = 10;

/// One page of a fetch result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepoPage<'a> {
    /// 1-based page number.
    pub page: u32,
    pub items: &'a [RepositoryRecord],
    pub has_next: bool,
}

/// Normalize a user-supplied page argument.
///
/// - missing or blank: page 1
/// - `0`, negative or non-numeric: page 1
/// - digits too large for `u32`: `u32::MAX`, which is past any real listing
pub fn parse_page(arg: Option<&str>) -> u32 {
    let Some(raw) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        return 1;
    };

    match raw.parse::<u32>() {
        Ok(0) => 1,
        Ok(n) => n,
        Err(_) if raw.bytes().all(|b| b.is_ascii_digit()) => u32::MAX,
        Err(_) => 1,
    }
}

/// Slice `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)` of `repos`, clamped to its length.
pub fn paginate(repos: &[RepositoryRecord], page: u32) -> RepoPage<'_> {
    let page = page.max(1);
    let total = repos.len();
    let start = (page as usize - 1).saturating_mul(PAGE_SIZE);
    let end = start.saturating_add(PAGE_SIZE);

    let items = if start >= total {
        &repos[..0]
    } else {
        &repos[start..end.min(total)]
    };

    RepoPage {
        page,
        items,
        has_next: end < total,
    }
}
