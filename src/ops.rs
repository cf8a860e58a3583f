//! Domain operations built on a bound [`CallContext`].
//!
//! Operations take the context by value and append its bearer token themselves, so they run
//! equally well under [`Client::dispatch`] or with a context built by hand. [`UpdateCard`] shows
//! the positional shape for callers of [`Client::dispatch_positional`].

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	api::{ApiRequest, TransportErrorMapper},
	context::CallContext,
	flows::{Client, OperationFuture, PositionalOperation},
	http::ApiHttpClient,
};

/// Relative path of the card update endpoint.
pub const CARD_UPDATE_PATH: &str = "card/update";

impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// `GET {base}/{path}` with the context's bearer token and `query` appended.
	pub async fn get_json<T>(
		&self,
		ctx: &CallContext,
		path: &'static str,
		query: &[(&str, &str)],
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let request = query.iter().fold(
			ApiRequest::get(path, self.url(path)?).query("access_token", ctx.access_token()),
			|request, (key, value)| request.query(key, value),
		);

		self.send(request).await
	}

	/// `POST {base}/{path}` with the context's bearer token and a JSON `payload`.
	pub async fn post_json<B, T>(
		&self,
		ctx: &CallContext,
		path: &'static str,
		payload: &B,
	) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let request = ApiRequest::post_json(path, self.url(path)?, payload)?
			.query("access_token", ctx.access_token());

		self.send(request).await
	}

	/// Updates a card. `payload` must be a JSON object; anything else fails before any I/O.
	pub async fn update_card(&self, ctx: CallContext, payload: JsonValue) -> Result<JsonValue> {
		if !payload.is_object() {
			return Err(Error::invalid_param("card payload must be a JSON object"));
		}

		self.post_json(&ctx, CARD_UPDATE_PATH, &payload).await
	}

	/// Positional form of [`Client::update_card`].
	pub fn update_card_op(&self) -> UpdateCard<C, M> {
		UpdateCard { client: self.clone() }
	}
}

/// [`Client::update_card`] as a [`PositionalOperation`] taking one argument (the payload).
pub struct UpdateCard<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Client<C, M>,
}
impl<C, M> PositionalOperation for UpdateCard<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn name(&self) -> &'static str {
		"update_card"
	}

	fn arity(&self) -> usize {
		1
	}

	fn invoke(&self, ctx: Option<CallContext>, args: Vec<JsonValue>) -> OperationFuture<'_> {
		Box::pin(async move {
			let payload = args.into_iter().next().unwrap_or(JsonValue::Null);

			if !payload.is_object() {
				return Err(Error::invalid_param("card payload must be a JSON object"));
			}

			let ctx =
				ctx.ok_or_else(|| Error::invalid_param("update_card needs a tenant context"))?;

			self.client.update_card(ctx, payload).await
		})
	}
}
impl<C, M> Debug for UpdateCard<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("UpdateCard(..)")
	}
}
