//! Request building and response decoding at the transport boundary.
//!
//! Every remote call goes through [`send`]: the request is turned into an
//! [`oauth2::HttpRequest`], executed on a metadata-instrumented handle, and the body is decoded
//! in one place. Error envelopes (`errcode` != 0) become [`ApiError`] values classified by the
//! configured [`ErrorClassifier`]; transport failures are mapped by a [`TransportErrorMapper`].
//! Request URLs carry secrets in their query strings and are never logged.

// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ApiError, ConfigError, DecodeError, TransportError},
	http::{ApiHttpClient, ResponseMetadata, ResponseMetadataSlot},
	remote::{ApiErrorContext, ErrorClassifier, ErrorCode},
};

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: &'static str,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					ConfigError::from(*inner).into()
				} else {
					TransportError::from(*inner).into()
				},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other {
				message: format!("{endpoint}: {message}"),
				status: meta_status(meta),
			}
			.into(),
			_ => TransportError::Other {
				message: format!("{endpoint}: unrecognized transport failure"),
				status: meta_status(meta),
			}
			.into(),
		}
	}
}

/// Outbound call described independently of any HTTP client.
#[derive(Clone)]
pub struct ApiRequest {
	endpoint: &'static str,
	method: Method,
	url: Url,
	body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Builds a `GET` request; `endpoint` is a label used in errors and spans.
	pub fn get(endpoint: &'static str, url: Url) -> Self {
		Self { endpoint, method: Method::GET, url, body: None }
	}

	/// Builds a `POST` request carrying `payload` as JSON.
	pub fn post_json<B>(endpoint: &'static str, url: Url, payload: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(payload).map_err(ConfigError::SerializePayload)?;

		Ok(Self { endpoint, method: Method::POST, url, body: Some(body) })
	}

	/// Appends a query parameter.
	pub fn query(mut self, key: &str, value: &str) -> Self {
		self.url.query_pairs_mut().append_pair(key, value);

		self
	}

	/// Endpoint label.
	pub fn endpoint(&self) -> &'static str {
		self.endpoint
	}

	/// Value of the first query parameter named `key`.
	pub fn query_value(&self, key: &str) -> Option<String> {
		self.url.query_pairs().find(|(name, _)| name == key).map(|(_, value)| value.into_owned())
	}

	fn into_http(self) -> Result<HttpRequest> {
		let mut builder = oauth2::http::Request::builder()
			.method(self.method)
			.uri(self.url.as_str())
			.header(ACCEPT, "application/json");

		if self.body.is_some() {
			builder = builder.header(CONTENT_TYPE, "application/json");
		}

		builder.body(self.body.unwrap_or_default()).map_err(|e| ConfigError::from(e).into())
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiRequest")
			.field("endpoint", &self.endpoint)
			.field("method", &self.method)
			.field("path", &self.url.path())
			.finish()
	}
}

/// Executes `request` and decodes the body as `T`.
pub(crate) async fn send<C, M, T>(
	http_client: &C,
	mapper: &M,
	classifier: &dyn ErrorClassifier,
	request: ApiRequest,
) -> Result<T>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	T: DeserializeOwned,
{
	let endpoint = request.endpoint;
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let response = handle
		.call(request.into_http()?)
		.await
		.map_err(|err| mapper.map_transport_error(endpoint, meta.take().as_ref(), err))?;
	let status = meta.take().and_then(|m| m.status).unwrap_or_else(|| response.status().as_u16());

	decode(classifier, endpoint, status, response.body())
}

/// Decodes a response body, turning error envelopes into [`ApiError`].
pub(crate) fn decode<T>(
	classifier: &dyn ErrorClassifier,
	endpoint: &'static str,
	status: u16,
	body: &[u8],
) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);
	let value: JsonValue = match serde_path_to_error::deserialize(&mut de) {
		Ok(value) => value,
		Err(source) if is_success(status) =>
			return Err(DecodeError::Json { endpoint, source, status: Some(status) }.into()),
		Err(_) => return Err(http_status_error(status)),
	};

	if let Some(code) = envelope_code(&value) {
		let message = value.get("errmsg").and_then(JsonValue::as_str).unwrap_or_default();
		let code = ErrorCode::from(code);
		let kind = classifier.classify(&ApiErrorContext {
			endpoint,
			code,
			message,
			http_status: Some(status),
		});

		return Err(ApiError { code, kind, message: message.to_owned(), status: Some(status) }
			.into());
	}
	if !is_success(status) {
		return Err(http_status_error(status));
	}

	serde_path_to_error::deserialize(value)
		.map_err(|source| DecodeError::Json { endpoint, source, status: Some(status) }.into())
}

fn envelope_code(value: &JsonValue) -> Option<i64> {
	value.get("errcode").and_then(JsonValue::as_i64).filter(|code| *code != 0)
}

fn is_success(status: u16) -> bool {
	(200..300).contains(&status)
}

fn http_status_error(status: u16) -> Error {
	let message = format!("unexpected HTTP status {status}");

	TransportError::Other { message, status: Some(status) }.into()
}

#[cfg(feature = "reqwest")]
fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::remote::{ApiErrorKind, DefaultErrorClassifier};

	#[derive(Debug, Deserialize)]
	struct Sample {
		access_token: String,
		expires_in: u64,
	}

	fn decode_sample(status: u16, body: &str) -> Result<Sample> {
		decode(&DefaultErrorClassifier, "sample", status, body.as_bytes())
	}

	#[test]
	fn success_bodies_decode() {
		let sample = decode_sample(200, r#"{"access_token":"abc","expires_in":7200}"#)
			.expect("Success body should decode.");

		assert_eq!(sample.access_token, "abc");
		assert_eq!(sample.expires_in, 7200);

		let sample =
			decode_sample(200, r#"{"errcode":0,"errmsg":"ok","access_token":"x","expires_in":1}"#)
				.expect("Zero errcode should be treated as success.");

		assert_eq!(sample.access_token, "x");
	}

	#[test]
	fn envelopes_become_classified_api_errors() {
		let err = decode_sample(200, r#"{"errcode":40001,"errmsg":"invalid credential"}"#)
			.expect_err("Error envelope should surface as an error.");
		let api = err.as_api().expect("Envelope should map to an API error.");

		assert_eq!(api.code, ErrorCode::InvalidCredential);
		assert_eq!(api.kind, ApiErrorKind::InvalidCredential);
		assert_eq!(api.message, "invalid credential");
		assert!(err.is_invalid_credential());
	}

	#[test]
	fn malformed_bodies_report_the_failing_path() {
		let err = decode_sample(200, r#"{"access_token":"abc","expires_in":"soon"}"#)
			.expect_err("Wrong field type should fail.");

		match err {
			Error::Decode(DecodeError::Json { endpoint, source, .. }) => {
				assert_eq!(endpoint, "sample");
				assert_eq!(source.path().to_string(), "expires_in");
			},
			other => panic!("Unexpected error: {other:?}"),
		}

		assert!(matches!(decode_sample(200, ""), Err(Error::Decode(_))));
	}

	#[test]
	fn non_success_status_without_envelope_is_transport_error() {
		let err = decode_sample(502, "<html>bad gateway</html>")
			.expect_err("Gateway errors should fail.");

		assert!(matches!(err, Error::Transport(TransportError::Other { status: Some(502), .. })));
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn untyped_transport_failures_name_the_endpoint() {
		let err = ReqwestTransportErrorMapper.map_transport_error(
			"ticket",
			Some(&ResponseMetadata { status: Some(503) }),
			HttpClientError::Other("connection reset".into()),
		);

		match err {
			Error::Transport(TransportError::Other { message, status }) => {
				assert_eq!(message, "ticket: connection reset");
				assert_eq!(status, Some(503));
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn requests_hide_query_strings_from_debug_output() {
		let url = Url::parse("https://api.example.com/cgi-bin/token")
			.expect("Request fixture URL should parse.");
		let request = ApiRequest::get("token", url).query("secret", "top-secret");

		assert_eq!(request.query_value("secret").as_deref(), Some("top-secret"));
		assert!(!format!("{request:?}").contains("top-secret"));
	}
}
