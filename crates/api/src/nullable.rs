//! PATCH body support for fields that may be cleared with `null`.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that tells "absent" apart from `null`.
///
/// Pair with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: an absent key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        bio: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"bio": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"bio": "hello"}"#).unwrap();

        assert_eq!(absent.bio, None);
        assert_eq!(cleared.bio, Some(None));
        assert_eq!(set.bio, Some(Some("hello".to_string())));
    }
}
