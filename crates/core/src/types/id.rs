//! Newtype ids for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe id wrappers that prevent
//! accidentally mixing ids from different entity types.
//!
//! The remote commerce API identifies every entity with a 24-character
//! lowercase hex object id; the wrappers store the id verbatim and expose
//! `is_well_formed` for handlers that want to reject garbage before making
//! a network call.

/// Macro to define a type-safe id wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `AsRef<str>` implementations
/// - `is_well_formed()` checking the remote API's object-id shape
///
/// # Example
///
/// ```rust
/// # use greenbasket_core::define_id;
/// define_id!(ProductId);
/// define_id!(BrandId);
///
/// let product_id = ProductId::new("6428ebc6dc1175abc65ca0b9");
/// assert!(product_id.is_well_formed());
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = BrandId::new("6428ebc6dc1175abc65ca0b9");
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
            /// Create a new id from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the id and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the id has the remote API's object-id shape
            /// (24 lowercase hex characters).
            #[must_use]
            pub fn is_well_formed(&self) -> bool {
                self.0.len() == 24
                    && self
                        .0
                        .bytes()
                        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
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

// Define standard entity ids
define_id!(ProductId);
define_id!(CategoryId);
define_id!(SubcategoryId);
define_id!(BrandId);
define_id!(CartId);
define_id!(CustomerId);
define_id!(AddressId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_object_id() {
        let id = ProductId::new("6428ebc6dc1175abc65ca0b9");
        assert!(id.is_well_formed());
    }

    #[test]
    fn test_uppercase_hex_rejected() {
        let id = ProductId::new("6428EBC6DC1175ABC65CA0B9");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(!ProductId::new("abc123").is_well_formed());
        assert!(!ProductId::new("").is_well_formed());
        assert!(!ProductId::new("6428ebc6dc1175abc65ca0b9ff").is_well_formed());
    }

    #[test]
    fn test_non_hex_rejected() {
        let id = ProductId::new("6428ebc6dc1175abc65ca0bz");
        assert!(!id.is_well_formed());
    }

    #[test]
    fn test_display_and_as_str() {
        let id = CategoryId::new("6439d58a0049ad0b52b9003f");
        assert_eq!(id.as_str(), "6439d58a0049ad0b52b9003f");
        assert_eq!(format!("{id}"), "6439d58a0049ad0b52b9003f");
    }

    #[test]
    fn test_serde_transparent() {
        let id = BrandId::new("64089bbe24b25627a253158b");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"64089bbe24b25627a253158b\"");

        let parsed: BrandId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
