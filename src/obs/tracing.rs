// self
use crate::{_prelude::*, auth::TenantId, obs::CallKind};

/// Resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Span wrapper used by client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a span tagged with the call kind and stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("tenant_broker.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
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

/// Notes that a fresh bearer token was exchanged for `tenant`.
pub fn trace_acquired(tenant: &TenantId, forced: bool) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(tenant = tenant.as_ref(), forced, "acquired bearer token");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (tenant, forced);
	}
}

/// Notes that the invalidation signal forced a second attempt for `tenant`.
pub fn trace_retry(tenant: &TenantId) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(tenant = tenant.as_ref(), "bearer token rejected, retrying once");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = tenant;
	}
}

/// Notes that a tenant id could not be resolved where it was mandatory.
pub fn trace_permission_denied(tenant: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(tenant, "tenant could not be resolved");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = tenant;
	}
}
