// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallStage},
};

/// Future returned by [`CallSpan::instrument`]: instrumented with tracing, passthrough without.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`CallSpan::instrument`]: instrumented with tracing, passthrough without.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span covering one verb call, with a `stage` field that follows the pipeline.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens the span for `kind`; the stage starts at [`CallStage::Compose`].
	pub fn new(kind: CallKind) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oidc_rest_client.call",
				method = kind.as_str(),
				stage = CallStage::Compose.as_str()
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = kind;

			Self {}
		}
	}

	/// Moves the span's `stage` field forward.
	pub fn enter_stage(&self, stage: CallStage) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("stage", stage.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;
		}
	}

	/// Instruments a call future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
