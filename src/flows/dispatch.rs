//! Dispatch surface: tenant-scoped, direct, and positional call shapes.
//!
//! Callers that know whether they are acting for a tenant use [`Client::dispatch`] or
//! [`Client::call_direct`]. [`Client::dispatch_positional`] serves callers that still pass an
//! untyped argument list whose first element may or may not be a tenant id; it decides by
//! resolving that element and comparing the argument count with the operation's arity.

// self
use crate::{
	_prelude::*,
	api::TransportErrorMapper,
	auth::TenantId,
	context::CallContext,
	flows::Client,
	http::ApiHttpClient,
	obs,
};

/// Boxed future returned by [`PositionalOperation::invoke`].
pub type OperationFuture<'a> = Pin<Box<dyn Future<Output = Result<JsonValue>> + 'a + Send>>;

/// Operation callable with a positional argument list.
pub trait PositionalOperation
where
	Self: Send + Sync,
{
	/// Stable operation name.
	fn name(&self) -> &'static str;

	/// Number of required parameters, not counting any tenant id.
	fn arity(&self) -> usize;

	/// Runs the operation. `ctx` is `None` when the call was not tenant-scoped.
	fn invoke(&self, ctx: Option<CallContext>, args: Vec<JsonValue>) -> OperationFuture<'_>;
}

impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs `op` for `tenant` through the token guard.
	///
	/// Unknown or malformed tenant ids fail with [`Error::Permission`] before `op` is touched.
	pub async fn dispatch<F, Fut, T>(&self, tenant: &str, op: F) -> Result<T>
	where
		F: Fn(CallContext) -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		let config = self.require_tenant(tenant).await?;

		self.with_token(&config, op).await
	}

	/// Runs `op` without any tenant context.
	pub async fn call_direct<F, Fut, T>(&self, op: F) -> Result<T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		op().await
	}

	/// Runs `op` with a positional argument list, inferring whether the first argument is a
	/// tenant id.
	///
	/// - A first argument that is not a string (or no arguments at all) invokes `op` directly.
	/// - A resolvable tenant id is dropped from `args` and the rest runs through the guard.
	/// - An unresolvable id fails with [`Error::Permission`] when `args` holds more values than
	///   [`PositionalOperation::arity`], and otherwise invokes `op` with `args` untouched.
	pub async fn dispatch_positional<P>(
		&self,
		op: &P,
		mut args: Vec<JsonValue>,
	) -> Result<JsonValue>
	where
		P: ?Sized + PositionalOperation,
	{
		let Some(candidate) = args.first().and_then(JsonValue::as_str).map(str::to_owned) else {
			return op.invoke(None, args).await;
		};
		let config = match TenantId::new(&candidate) {
			Ok(id) => self.resolve_tenant(&id).await?,
			Err(_) => None,
		};

		match config {
			Some(config) => {
				args.remove(0);

				self.with_token(&config, |ctx| op.invoke(Some(ctx), args.clone())).await
			},
			None if args.len() > op.arity() => {
				obs::trace_permission_denied(&candidate);

				Err(Error::Permission { tenant: candidate })
			},
			None => op.invoke(None, args).await,
		}
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		_preludet::{build_reqwest_test_client, tenant},
		auth::AccessToken,
		store::TokenStore,
	};

	const UNREACHABLE: &str = "http://127.0.0.1:9/";

	#[derive(Default)]
	struct Recorder {
		calls: Mutex<Vec<(Option<String>, Vec<JsonValue>)>>,
		invocations: AtomicUsize,
	}
	impl PositionalOperation for Recorder {
		fn name(&self) -> &'static str {
			"record"
		}

		fn arity(&self) -> usize {
			1
		}

		fn invoke(&self, ctx: Option<CallContext>, args: Vec<JsonValue>) -> OperationFuture<'_> {
			Box::pin(async move {
				self.invocations.fetch_add(1, Ordering::SeqCst);
				self.calls.lock().push((ctx.map(|c| c.access_token().to_owned()), args));

				Ok(JsonValue::Bool(true))
			})
		}
	}

	async fn seeded_client() -> crate::_preludet::ReqwestTestClient {
		let (client, store) = build_reqwest_test_client(UNREACHABLE, [tenant("t1", "A1", "S1")]);
		let id = TenantId::new("t1").expect("Tenant fixture should be valid.");

		store.save_token(&id, AccessToken::new("cached", 7200)).await.expect("Seed should save.");

		client
	}

	#[tokio::test]
	async fn resolved_tenant_is_dropped_and_bound() {
		let client = seeded_client().await;
		let op = Recorder::default();

		client
			.dispatch_positional(&op, vec!["t1".into(), serde_json::json!({"k": 1})])
			.await
			.expect("Resolved dispatch should succeed.");

		let calls = op.calls.lock();

		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].0.as_deref(), Some("cached"));
		assert_eq!(calls[0].1, vec![serde_json::json!({"k": 1})]);
	}

	#[tokio::test]
	async fn unresolved_extra_argument_is_a_permission_error() {
		let client = seeded_client().await;
		let op = Recorder::default();
		let err = client
			.dispatch_positional(&op, vec!["ghost".into(), serde_json::json!({})])
			.await
			.expect_err("Unknown tenant with surplus arguments should fail.");

		assert!(matches!(err, Error::Permission { ref tenant } if tenant == "ghost"));
		assert_eq!(op.invocations.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn unresolved_value_filling_a_slot_is_passed_through() {
		let client = seeded_client().await;
		let op = Recorder::default();

		client
			.dispatch_positional(&op, vec!["ghost".into()])
			.await
			.expect("Passthrough should succeed.");

		let calls = op.calls.lock();

		assert_eq!(calls[0], (None, vec![JsonValue::from("ghost")]));
	}

	#[tokio::test]
	async fn non_string_first_argument_skips_resolution() {
		let client = seeded_client().await;
		let op = Recorder::default();

		client
			.dispatch_positional(&op, vec![serde_json::json!(7), serde_json::json!(8)])
			.await
			.expect("Direct call should succeed.");
		client.dispatch_positional(&op, Vec::new()).await.expect("Empty call should succeed.");

		let calls = op.calls.lock();

		assert_eq!(calls.len(), 2);
		assert!(calls.iter().all(|(ctx, _)| ctx.is_none()));
		assert_eq!(calls[0].1.len(), 2, "Arguments must stay untouched.");
	}

	#[tokio::test]
	async fn malformed_tenant_ids_count_as_unknown() {
		let client = seeded_client().await;
		let op = Recorder::default();
		let err = client
			.dispatch_positional(&op, vec!["   ".into(), JsonValue::Null])
			.await
			.expect_err("Malformed id with surplus arguments should fail.");

		assert!(matches!(err, Error::Permission { .. }));
		assert_eq!(op.name(), "record");
	}

	#[tokio::test]
	async fn explicit_shapes_route_as_chosen() {
		let client = seeded_client().await;
		let bound = client
			.dispatch("t1", |ctx| async move { Ok(ctx.access_token().to_owned()) })
			.await
			.expect("Tenant-scoped call should succeed.");

		assert_eq!(bound, "cached");

		let direct = client.call_direct(|| async { Ok(5) }).await.expect("Direct call should run.");

		assert_eq!(direct, 5);

		let err = client
			.dispatch("ghost", |_| async { Ok(()) })
			.await
			.expect_err("Unknown tenant should be rejected.");

		assert!(matches!(err, Error::Permission { .. }));
	}
}
