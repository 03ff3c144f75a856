//! Request pieces shared by several resources

use serde::{Deserialize, Deserializer};

/// Body of create/rename for users and categories
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: Option<String>,
}

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "explicit")]`: an absent
/// key stays `None`, an explicit `null` becomes `Some(None)`.
pub fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
