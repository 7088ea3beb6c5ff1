// self
use crate::{
	_prelude::*,
	obs::{self, CallKind, CallOutcome, CallStage},
};

/// Counts a verb call on entry (when enabled).
pub fn record_call_attempt(kind: CallKind) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oidc_rest_client_call_attempt_total", "method" => kind.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = kind;
	}
}

/// Counts a settled verb call with the stage it stopped in and the failure reason (when enabled).
pub fn record_call_result<T>(kind: CallKind, stage: CallStage, result: &Result<T>) {
	let outcome = CallOutcome::of(result);
	let reason = obs::failure_reason(result);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oidc_rest_client_call_total",
			"method" => kind.as_str(),
			"outcome" => outcome.as_str(),
			"stage" => stage.as_str(),
			"reason" => reason
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, stage, outcome, reason);
	}
}
