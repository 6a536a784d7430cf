//! Request validation helpers shared by the handlers

use serde::{Deserialize, Deserializer};

use crate::{ApiError, ApiResult};

/// Distinguish an absent field from an explicit `null`
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// absent gives `None`, `null` gives `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn require_text(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Absolute URL check for optional link fields
pub(crate) fn validate_url(field: &str, value: Option<&str>) -> ApiResult<()> {
    if let Some(value) = value {
        url::Url::parse(value)
            .map_err(|e| ApiError::BadRequest(format!("{} is not a valid URL: {}", field, e)))?;
    }
    Ok(())
}
