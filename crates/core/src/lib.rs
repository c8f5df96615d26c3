//! # Verity Core
//!
//! Shared building blocks for the verifier: DID resolution, public key
//! material, and compact JWS decoding and verification.

pub mod api;
pub mod did;
pub mod jose;
pub mod key;

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> Kind<T> {
    /// Returns the string value, if any.
    pub const fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            Self::Object(_) => None,
        }
    }

    /// Returns the object value, if any.
    pub const fn as_object(&self) -> Option<&T> {
        match self {
            Self::String(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

/// `OneMany` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for OneMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T> From<T> for OneMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

impl<T> From<Vec<T>> for OneMany<T> {
    fn from(value: Vec<T>) -> Self {
        Self::Many(value)
    }
}

impl<T> OneMany<T> {
    /// Returns the single object, if there is exactly one.
    pub const fn as_one(&self) -> Option<&T> {
        match self {
            Self::One(o) => Some(o),
            Self::Many(_) => None,
        }
    }

    /// Returns the `OneMany` as a Vec regardless of contents.
    pub fn to_vec(self) -> Vec<T> {
        match self {
            Self::One(one) => vec![one],
            Self::Many(many) => many,
        }
    }

    /// Iterates over the contained objects.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(one) => std::slice::from_ref(one).iter(),
            Self::Many(many) => many.iter(),
        }
    }

    /// Returns `true` if any contained object is equal to `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|o| o == item)
    }

    /// Returns the number of contained objects.
    pub const fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(many) => many.len(),
        }
    }

    /// Returns `true` if this is an empty `Many`.
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(many) => many.is_empty(),
        }
    }
}

impl<'a, T> IntoIterator for &'a OneMany<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn one_or_many() {
        let one: OneMany<String> = serde_json::from_value(json!("a")).expect("should deserialize");
        assert_eq!(one.as_one(), Some(&"a".to_string()));

        let many: OneMany<String> =
            serde_json::from_value(json!(["a", "b"])).expect("should deserialize");
        assert_eq!(many.len(), 2);
        assert!(many.contains(&"b".to_string()));
        assert_eq!(many.to_vec(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn string_or_object() {
        #[derive(Deserialize)]
        struct Issuer {
            id: String,
        }

        let kind: Kind<Issuer> =
            serde_json::from_value(json!({"id": "did:key:z6Mk"})).expect("should deserialize");
        assert_eq!(kind.as_object().map(|i| i.id.as_str()), Some("did:key:z6Mk"));

        let kind: Kind<Issuer> = serde_json::from_value(json!("did:web:example.com")).expect("should deserialize");
        assert_eq!(kind.as_str(), Some("did:web:example.com"));
    }
}
