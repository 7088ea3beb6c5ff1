//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit one span named `oidc_rest_client.call` per verb call. The span
//!   carries the `method` field and a `stage` field that is updated as the call moves from
//!   composition to dispatch to decoding.
//! - Enable `metrics` to increment `oidc_rest_client_call_attempt_total` (labeled by `method`) on
//!   entry and `oidc_rest_client_call_total` (labeled by `method`, `outcome`, `stage`, and
//!   `reason`) once the call settles.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, error::StatusClass};

/// HTTP verbs issued by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// `GET`, decodes the body.
	Get,
	/// `POST`, decodes the body and returns `Location`.
	Post,
	/// `PUT`, status only.
	Put,
	/// `DELETE`, status only.
	Delete,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Get => "GET",
			CallKind::Post => "POST",
			CallKind::Put => "PUT",
			CallKind::Delete => "DELETE",
		}
	}

	/// HTTP method for the verb.
	pub fn method(self) -> Method {
		match self {
			CallKind::Get => Method::GET,
			CallKind::Post => Method::POST,
			CallKind::Put => Method::PUT,
			CallKind::Delete => Method::DELETE,
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pipeline stage a call is in, or settled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallStage {
	/// Plugins and updaters are shaping the request.
	Compose,
	/// The transport is exchanging the request and the status is being classified.
	Dispatch,
	/// The body is being decoded into the destination.
	Decode,
}
impl CallStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallStage::Compose => "compose",
			CallStage::Dispatch => "dispatch",
			CallStage::Decode => "decode",
		}
	}
}
impl Display for CallStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Settled outcome of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// The verb returned `Ok`.
	Success,
	/// The verb returned an error.
	Failure,
}
impl CallOutcome {
	/// Classifies a verb result.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => CallOutcome::Success,
			Err(_) => CallOutcome::Failure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stable label naming why a call settled the way it did.
///
/// Error statuses are split by [`StatusClass`]; a status below 400 that still failed
/// classification is reported as `unexpected_status`.
pub fn failure_reason<T>(result: &Result<T>) -> &'static str {
	let Err(e) = result else {
		return "none";
	};

	match e {
		Error::Config(_) => "config",
		Error::Compose(_) => "compose",
		Error::Updater(_) => "updater",
		Error::Provider(_) => "provider",
		Error::Transport(_) => "transport",
		Error::Http(e) => match e.class() {
			StatusClass::Success => "unexpected_status",
			class => class.as_str(),
		},
		Error::Decode(_) => "decode",
		Error::Token(_) => "token",
	}
}
