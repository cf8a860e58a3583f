//! Tickets scoped by tenant and [`TicketKind`].

// self
use crate::{
	_prelude::*,
	api::{ApiRequest, TransportErrorMapper},
	auth::{Ticket, TicketKind},
	context::CallContext,
	flows::Client,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	remote::TICKET_PATH,
};

#[derive(Deserialize)]
struct TicketResponse {
	#[serde(default)]
	ticket: String,
	#[serde(default)]
	expires_in: u64,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns the tenant's cached ticket of `kind`, fetching and persisting one on a miss.
	///
	/// The fetch runs through the token guard, so an invalidated bearer token is replaced once.
	pub async fn ticket(&self, tenant: &str, kind: TicketKind) -> Result<Ticket> {
		const KIND: CallKind = CallKind::Ticket;

		let span = CallSpan::new(KIND, "ticket");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let config = self.require_tenant(tenant).await?;

				if let Some(cached) = self.store.get_ticket(&config.id, kind).await? {
					return Ok(cached);
				}

				let ticket = self.with_token(&config, |ctx| self.fetch_ticket(ctx, kind)).await?;

				self.store.save_ticket(&config.id, kind, ticket.clone()).await?;

				Ok(ticket)
			})
			.await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Fetches a ticket with the token bound in `ctx`, bypassing the store.
	pub async fn fetch_ticket(&self, ctx: CallContext, kind: TicketKind) -> Result<Ticket> {
		let request = ApiRequest::get("ticket", self.url(TICKET_PATH)?)
			.query("access_token", ctx.access_token())
			.query("type", kind.as_str());
		let response: TicketResponse = self.send(request).await?;

		if response.ticket.is_empty() {
			return Err(Error::TicketFetch { tenant: ctx.tenant().clone(), kind });
		}

		Ok(Ticket::new(kind, response.ticket, response.expires_in))
	}
}
