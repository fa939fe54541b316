//! Optional observability helpers for bridge flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `draftbridge.flow` with the `flow` and
//!   `stage` (call site) fields, plus error events for swallowed delivery failures.
//! - Enable `metrics` to increment the `draftbridge_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Jobs listing for the admin list view.
	JobsList,
	/// Finished-job preview callback.
	Preview,
	/// Job-to-content draft creation callback.
	CreateDraft,
	/// Previously imported content refresh callback.
	RefreshContent,
	/// Publish-event notification.
	Notify,
	/// Credential verification against the marketplace.
	VerifyCredentials,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::JobsList => "jobs_list",
			FlowKind::Preview => "preview",
			FlowKind::CreateDraft => "create_draft",
			FlowKind::RefreshContent => "refresh_content",
			FlowKind::Notify => "notify",
			FlowKind::VerifyCredentials => "verify_credentials",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a bridge flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller (or swallowed by design).
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
