//! Static status-filter enumeration for the jobs list view.

// self
use crate::_prelude::*;

/// The fixed (name, slug) table backing the jobs list filter bar.
const FILTER_TABLE: [(&str, &str); 10] = [
	("All", ""),
	("Accepted", "accepted"),
	("Finished", "finished"),
	("Screening", "screening"),
	("Writing", "writing"),
	("Draft Ready", "draft_ready"),
	("Revising", "revising"),
	("Final Ready", "final_ready"),
	("In Progress", "in_progress"),
	("Needs Review", "needs_review"),
];

/// One entry of the jobs list filter bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct JobFilter {
	/// Display name.
	pub name: &'static str,
	/// Slug appended to the jobs path; empty for "All".
	pub slug: &'static str,
	/// True when this entry matches the current request's filter parameter.
	pub selected: bool,
}

/// Builds the filter bar for the current request.
///
/// Always yields exactly ten entries in fixed order. At most one entry is selected:
/// the one whose non-empty slug equals `current`. An empty or unmatched `current`
/// selects nothing; "All" is never marked selected.
pub fn job_filters(current: &str) -> Vec<JobFilter> {
	FILTER_TABLE
		.iter()
		.map(|&(name, slug)| JobFilter {
			name,
			slug,
			selected: !slug.is_empty() && slug == current,
		})
		.collect()
}
