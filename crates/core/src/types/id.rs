//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out opaque string identifiers (document IDs for menu
//! items and orders, client-derived numbers for placed orders). Use the
//! `define_id!` macro to create wrappers that prevent mixing them up.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use bistro_core::define_id;
/// define_id!(TableId);
/// define_id!(WaiterId);
///
/// let table = TableId::new("t-12");
/// let waiter = WaiterId::new("w-3");
///
/// // These are different types, so this won't compile:
/// // let _: TableId = waiter;
/// assert_eq!(table.as_str(), "t-12");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
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

            /// Get the ID as a string slice.
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

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Menu item document ID assigned by the backend catalog.
define_id!(ItemId);
// Client-derived order number (`ORD...`), used for lookups.
define_id!(OrderId);
// Backend document ID of a persisted order.
define_id!(BackendOrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_serializes_transparently() {
        let id = ItemId::new("665f1c2ab7e4");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"665f1c2ab7e4\"");

        let parsed: ItemId = serde_json::from_str("\"665f1c2ab7e4\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = OrderId::from("ORD1700000000000123404");
        assert_eq!(id.to_string(), "ORD1700000000000123404");
        assert_eq!(id.as_str(), id.as_ref());
        assert_eq!(id.into_inner(), "ORD1700000000000123404");
    }
}
