//! Newtype IDs for type-safe record references.
//!
//! Records are keyed by opaque, human-readable strings such as `CUST001` or
//! `POL004`. Use the `define_id!` macro to create wrappers that prevent
//! accidentally passing a vehicle ID where a policy ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>`, `Borrow<str>` and `From<&str>`/`From<String>`
///
/// # Example
///
/// ```rust
/// # use mahardika_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(ClaimId);
///
/// let invoice = InvoiceId::new("INV001");
/// let claim = ClaimId::new("INV001");
///
/// // These are different types, so this won't compile:
/// // let _: InvoiceId = claim;
/// assert_eq!(invoice.as_str(), claim.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard record IDs
define_id!(UserUid);
define_id!(VehicleId);
define_id!(PolicyId);
define_id!(ReportId);

/// Build the next sequential identifier for a prefix.
///
/// Scans `existing` for identifiers of the form `{prefix}{digits}` and returns
/// the prefix followed by the highest number plus one, zero-padded to three
/// digits (`CUST006`, `POL010`, `STAFF002`). Identifiers that do not match the
/// pattern are ignored.
///
/// ```rust
/// # use mahardika_core::next_sequential_id;
/// let ids = ["CUST001", "CUST004", "STAFF001"];
/// assert_eq!(next_sequential_id("CUST", ids), "CUST005");
/// assert_eq!(next_sequential_id("ADMIN", ids), "ADMIN001");
/// ```
#[must_use]
pub fn next_sequential_id<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|digits| digits.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    // At u64::MAX the existing id comes back and the insert conflicts.
    format!("{prefix}{:03}", highest.saturating_add(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_sequential_id_saturates() {
        let top = format!("POL{}", u64::MAX);
        assert_eq!(next_sequential_id("POL", [top.as_str()]), top);
        assert_eq!(next_sequential_id("POL", ["POL4294967295"]), "POL4294967296");
    }

    #[test]
    fn test_id_display_and_borrow() {
        let id = PolicyId::new("POL001");
        assert_eq!(id.to_string(), "POL001");
        let borrowed: &str = std::borrow::Borrow::borrow(&id);
        assert_eq!(borrowed, "POL001");
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = VehicleId::new("VEH003");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"VEH003\"");
        let back: VehicleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_next_sequential_id_skips_foreign_prefixes() {
        let ids = ["POL001", "POL005", "POLX", "REP009"];
        assert_eq!(next_sequential_id("POL", ids), "POL006");
    }

    #[test]
    fn test_next_sequential_id_empty() {
        assert_eq!(next_sequential_id("REP", std::iter::empty()), "REP001");
    }

    #[test]
    fn test_next_sequential_id_does_not_confuse_longer_prefix() {
        // "STAFF" ids must not leak into the "ST" sequence through non-digit suffixes
        let ids = ["STAFF001", "ST002"];
        assert_eq!(next_sequential_id("ST", ids), "ST003");
    }
}
