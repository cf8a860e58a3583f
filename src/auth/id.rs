//! Validated identifiers for tenants, platform applications, and end users.
//!
//! Each identifier has an [`IdShape`]: a length cap plus the ASCII punctuation it may carry next
//! to letters and digits. Tenant ids additionally must start with a letter or digit, which keeps
//! free-form strings (sentences, JSON text, paths) from ever being mistaken for a tenant by
//! [`Client::dispatch_positional`](crate::flows::Client::dispatch_positional).

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Character and length rules for one identifier kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdShape {
	/// Label used in error messages.
	pub kind: &'static str,
	/// Maximum length in bytes (identifiers are ASCII).
	pub max_len: usize,
	/// Punctuation allowed besides ASCII letters and digits.
	pub punctuation: &'static [char],
	/// Whether the first character must be a letter or digit.
	pub alphanumeric_start: bool,
}
impl IdShape {
	/// Checks `value` against the shape.
	pub fn check(&self, value: &str) -> Result<(), IdentifierError> {
		let kind = self.kind;

		if value.is_empty() {
			return Err(IdentifierError::Empty { kind });
		}
		if let Some((index, found)) = value
			.char_indices()
			.find(|(_, c)| !c.is_ascii_alphanumeric() && !self.punctuation.contains(c))
		{
			return Err(IdentifierError::UnexpectedChar { kind, found, index });
		}
		if self.alphanumeric_start && !value.starts_with(|c: char| c.is_ascii_alphanumeric()) {
			return Err(IdentifierError::BadStart { kind });
		}
		if value.len() > self.max_len {
			return Err(IdentifierError::TooLong { kind, max: self.max_len });
		}

		Ok(())
	}
}

/// Error returned when an identifier does not fit its [`IdShape`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// Nothing was supplied.
	#[error("The {kind} is empty.")]
	Empty {
		/// Identifier kind.
		kind: &'static str,
	},
	/// A character outside the allowed set was found.
	#[error("The {kind} contains {found:?} at byte {index}.")]
	UnexpectedChar {
		/// Identifier kind.
		kind: &'static str,
		/// Offending character.
		found: char,
		/// Byte offset of the offending character.
		index: usize,
	},
	/// The identifier starts with punctuation.
	#[error("The {kind} must start with a letter or digit.")]
	BadStart {
		/// Identifier kind.
		kind: &'static str,
	},
	/// The identifier is longer than allowed.
	#[error("The {kind} is longer than {max} characters.")]
	TooLong {
		/// Identifier kind.
		kind: &'static str,
		/// Maximum length.
		max: usize,
	},
}

macro_rules! identifier {
	($(#[$meta:meta])* $name:ident => $shape:expr) => {
		$(#[$meta])*
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Rules every value of this identifier satisfies.
			pub const SHAPE: IdShape = $shape;

			/// Validates `value` and wraps it.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				Self::try_from(value.as_ref().to_owned())
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::SHAPE.check(&value).map(|()| Self(value))
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.debug_tuple(stringify!($name)).field(&self.0).finish()
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

identifier! {
	/// Key selecting one hosted account, such as `acme` or `shop-eu.2`.
	TenantId => IdShape {
		kind: "tenant id",
		max_len: 64,
		punctuation: &['-', '_', '.'],
		alphanumeric_start: true,
	}
}
identifier! {
	/// Application identity the platform issued to a tenant (`appid`).
	AppId => IdShape {
		kind: "app id",
		max_len: 32,
		punctuation: &['-', '_'],
		alphanumeric_start: false,
	}
}
identifier! {
	/// Per-application identifier of an end user (`openid`).
	OpenId => IdShape {
		kind: "openid",
		max_len: 64,
		punctuation: &['-', '_'],
		alphanumeric_start: false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn tenant_ids_are_short_keys() {
		for valid in ["acme", "t1", "shop-eu.2", "tenant_7"] {
			TenantId::new(valid).expect("Tenant key should be accepted.");
		}

		assert_eq!(
			TenantId::new("{\"card_id\":1}"),
			Err(IdentifierError::UnexpectedChar { kind: "tenant id", found: '{', index: 0 })
		);
		assert_eq!(
			TenantId::new("hello world"),
			Err(IdentifierError::UnexpectedChar { kind: "tenant id", found: ' ', index: 5 })
		);
		assert_eq!(TenantId::new(".hidden"), Err(IdentifierError::BadStart { kind: "tenant id" }));

		let err = TenantId::new("   ").expect_err("Blank tenant should be rejected.");

		assert_eq!(err.to_string(), "The tenant id contains ' ' at byte 0.");
		assert!(TenantId::new("a".repeat(65)).is_err());
		assert!(TenantId::new("a".repeat(64)).is_ok());
	}

	#[test]
	fn platform_ids_follow_their_own_rules() {
		AppId::new("wx-a1b2c3d4e5f6a7b8").expect("App id should be accepted.");
		OpenId::new("o6_bmjrPTlm6_2sgVt7hMZOPfL2M").expect("Openid should be accepted.");

		assert!(AppId::new("-leading-dash-is-fine").is_ok());
		assert!(AppId::new("a".repeat(33)).is_err());
		assert!(AppId::new("wx.app").is_err(), "Dots belong to tenant ids only.");
		assert_eq!(OpenId::new(""), Err(IdentifierError::Empty { kind: "openid" }));
		assert!(OpenId::new("o\u{00A0}1").is_err());
	}

	#[test]
	fn deserialization_runs_the_same_checks() {
		let tenant: TenantId =
			serde_json::from_str("\"acme\"").expect("Valid tenant should deserialize.");

		assert_eq!(tenant.as_ref(), "acme");
		assert_eq!(serde_json::to_string(&tenant).expect("Tenant should serialize."), "\"acme\"");
		assert!(serde_json::from_str::<TenantId>("\"ac me\"").is_err());
		assert!(serde_json::from_str::<OpenId>("\"\"").is_err());
	}

	#[test]
	fn ids_work_as_string_keys() {
		let app = AppId::new("wx123").expect("App id fixture should be valid.");
		let map = HashMap::from([(TenantId::new("acme").expect("Tenant should be valid."), 7)]);

		assert_eq!(format!("{app:?}"), "AppId(\"wx123\")");
		assert_eq!(map.get("acme"), Some(&7));
		assert_eq!("acme".parse::<TenantId>().map(String::from).as_deref(), Ok("acme"));
	}
}
