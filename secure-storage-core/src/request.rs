//! Typed request model parsed from the host's argument bag.
//!
//! The host hands over a JSON-like map of the shape
//!
//! ```text
//! { "key": "...", "value": "...", "options": { "groupId": "...", ... } }
//! ```
//!
//! and every call builds a fresh [`SecureStorageRequest`] from it.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::accessibility::Accessibility;
use crate::error::{SecureStorageError, StorageResult};

/// Wire shape of the argument bag.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Arguments {
    key: Option<String>,
    value: Option<String>,
    options: Option<Options>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Options {
    group_id: Option<String>,
    account_name: Option<String>,
    accessibility: Option<String>,
    localized_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    synchronizable: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    use_access_control: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    skip_authentication_item: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Text(String),
}

/// Booleans arrive either natively or as the strings `"true"`/`"false"`.
/// Any other string reads as unset.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BoolOrText>::deserialize(deserializer)? {
        None => None,
        Some(BoolOrText::Bool(value)) => Some(value),
        Some(BoolOrText::Text(text)) => match text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => {
                log::debug!("ignoring non-boolean option value `{other}`");
                None
            }
        },
    })
}

/// A single storage request with its options resolved to defaults.
#[derive(Debug, Default)]
pub struct SecureStorageRequest {
    key: Option<String>,
    value: Option<SecretString>,
    group_id: Option<String>,
    account_name: Option<String>,
    accessibility: Accessibility,
    localized_reason: Option<String>,
    synchronizable: Option<bool>,
    use_access_control: bool,
    skip_authentication_item: bool,
}

impl SecureStorageRequest {
    /// Parses a request from the host's argument bag.
    ///
    /// # Errors
    ///
    /// - [`SecureStorageError::MissingArguments`] if the bag is `null` or has
    ///   no `options` map.
    /// - [`SecureStorageError::InvalidArguments`] if the bag, the options or
    ///   any field has the wrong shape.
    pub fn from_arguments(arguments: &Value) -> StorageResult<Self> {
        match arguments {
            Value::Null => return Err(SecureStorageError::missing("requires arguments")),
            Value::Object(_) => {}
            _ => return Err(SecureStorageError::invalid("arguments must be a map")),
        }

        let Arguments {
            key,
            value,
            options,
        } = Arguments::deserialize(arguments)
            .map_err(|err| SecureStorageError::invalid(err.to_string()))?;
        let options = options.ok_or_else(|| SecureStorageError::missing("requires options"))?;

        Ok(Self {
            key,
            value: value.map(SecretString::from),
            group_id: options.group_id,
            account_name: options.account_name,
            accessibility: options
                .accessibility
                .map_or_else(Accessibility::default, |raw| Accessibility::parse_lenient(&raw)),
            localized_reason: options.localized_reason,
            synchronizable: options.synchronizable,
            use_access_control: options.use_access_control.unwrap_or(false),
            skip_authentication_item: options.skip_authentication_item.unwrap_or(false),
        })
    }

    /// Parses a request from the JSON text of an argument bag.
    ///
    /// # Errors
    ///
    /// Returns [`SecureStorageError::InvalidArguments`] if the text is not
    /// valid JSON, otherwise the errors of [`Self::from_arguments`].
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let arguments: Value = serde_json::from_str(json)
            .map_err(|err| SecureStorageError::invalid(err.to_string()))?;
        Self::from_arguments(&arguments)
    }

    /// Logical key, stored as the item's account attribute.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Value to write, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&SecretString> {
        self.value.as_ref()
    }

    /// Access group scoping the item.
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Account name, stored as the item's service attribute.
    #[must_use]
    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    /// Requested accessibility, already defaulted.
    #[must_use]
    pub const fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    /// Pre-built authentication context token.
    #[must_use]
    pub fn localized_reason(&self) -> Option<&str> {
        self.localized_reason.as_deref()
    }

    /// Whether the item syncs across the user's devices, if specified.
    #[must_use]
    pub const fn synchronizable(&self) -> Option<bool> {
        self.synchronizable
    }

    /// Whether user presence is required at access time.
    #[must_use]
    pub const fn use_access_control(&self) -> bool {
        self.use_access_control
    }

    /// Whether authentication UI must be suppressed.
    #[must_use]
    pub const fn skip_authentication_item(&self) -> bool {
        self.skip_authentication_item
    }

    /// Returns the key when present and non-empty.
    pub(crate) fn required_key(&self) -> Option<&str> {
        self.key().filter(|key| !key.is_empty())
    }

    /// Sets the key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets the value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(SecretString::from(value.into()));
        self
    }

    /// Sets the access group.
    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Sets the account name.
    #[must_use]
    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }

    /// Sets the accessibility.
    #[must_use]
    pub const fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    /// Sets the authentication context token.
    #[must_use]
    pub fn with_localized_reason(mut self, reason: impl Into<String>) -> Self {
        self.localized_reason = Some(reason.into());
        self
    }

    /// Sets the synchronizable flag.
    #[must_use]
    pub const fn with_synchronizable(mut self, synchronizable: bool) -> Self {
        self.synchronizable = Some(synchronizable);
        self
    }

    /// Requires user presence at access time.
    #[must_use]
    pub const fn with_access_control(mut self, use_access_control: bool) -> Self {
        self.use_access_control = use_access_control;
        self
    }

    /// Suppresses authentication UI.
    #[must_use]
    pub const fn with_skip_authentication_item(mut self, skip: bool) -> Self {
        self.skip_authentication_item = skip;
        self
    }

    /// Exposes the value as UTF-8 bytes.
    pub(crate) fn value_bytes(&self) -> Option<&[u8]> {
        self.value.as_ref().map(|value| value.expose_secret().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_parses_full_request() {
        let request = SecureStorageRequest::from_arguments(&json!({
            "key": "token",
            "value": "s3cret",
            "options": {
                "groupId": "group.example",
                "accountName": "service.example",
                "accessibility": "first_unlock",
                "localizedReason": "ctx",
                "synchronizable": true,
                "useAccessControl": true,
                "skipAuthenticationItem": false,
            }
        }))
        .expect("parse request");

        assert_eq!(request.key(), Some("token"));
        assert_eq!(request.value_bytes(), Some(b"s3cret".as_slice()));
        assert_eq!(request.group_id(), Some("group.example"));
        assert_eq!(request.account_name(), Some("service.example"));
        assert_eq!(request.accessibility(), Accessibility::FirstUnlock);
        assert_eq!(request.localized_reason(), Some("ctx"));
        assert_eq!(request.synchronizable(), Some(true));
        assert!(request.use_access_control());
        assert!(!request.skip_authentication_item());
    }

    #[test]
    fn test_empty_options_use_defaults() {
        let request =
            SecureStorageRequest::from_arguments(&json!({ "options": {} })).expect("parse");
        assert_eq!(request.key(), None);
        assert!(request.value().is_none());
        assert_eq!(request.accessibility(), Accessibility::Unlocked);
        assert_eq!(request.synchronizable(), None);
        assert!(!request.use_access_control());
        assert!(!request.skip_authentication_item());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let request = SecureStorageRequest::from_arguments(&json!({
            "key": null,
            "options": { "groupId": null, "synchronizable": null }
        }))
        .expect("parse");
        assert_eq!(request.key(), None);
        assert_eq!(request.group_id(), None);
        assert_eq!(request.synchronizable(), None);
    }

    #[test_case(json!(true), Some(true))]
    #[test_case(json!(false), Some(false))]
    #[test_case(json!("true"), Some(true))]
    #[test_case(json!("false"), Some(false))]
    #[test_case(json!("TRUE"), None)]
    #[test_case(json!("yes"), None)]
    fn test_boolean_forms(raw: Value, expected: Option<bool>) {
        let request = SecureStorageRequest::from_arguments(&json!({
            "options": {
                "synchronizable": raw.clone(),
                "useAccessControl": raw.clone(),
                "skipAuthenticationItem": raw,
            }
        }))
        .expect("parse");
        assert_eq!(request.synchronizable(), expected);
        assert_eq!(request.use_access_control(), expected.unwrap_or(false));
        assert_eq!(request.skip_authentication_item(), expected.unwrap_or(false));
    }

    #[test]
    fn test_bogus_accessibility_is_unlocked() {
        let request = SecureStorageRequest::from_arguments(&json!({
            "options": { "accessibility": "bogus" }
        }))
        .expect("parse");
        assert_eq!(request.accessibility(), Accessibility::Unlocked);
    }

    #[test]
    fn test_missing_arguments() {
        let err = SecureStorageRequest::from_arguments(&Value::Null).unwrap_err();
        assert!(matches!(err, SecureStorageError::MissingArguments(_)));

        let err = SecureStorageRequest::from_arguments(&json!({ "key": "a" })).unwrap_err();
        assert!(matches!(err, SecureStorageError::MissingArguments(_)));
    }

    #[test_case(json!([1, 2]))]
    #[test_case(json!({ "key": 7, "options": {} }))]
    #[test_case(json!({ "options": "nope" }))]
    #[test_case(json!({ "options": { "groupId": false } }))]
    #[test_case(json!({ "options": { "useAccessControl": 1 } }))]
    #[test_case(json!({ "options": { "accessibility": 3 } }))]
    fn test_invalid_arguments(arguments: Value) {
        let err = SecureStorageRequest::from_arguments(&arguments).unwrap_err();
        assert!(matches!(err, SecureStorageError::InvalidArguments(_)), "{err}");
    }

    #[test]
    fn test_from_json_rejects_malformed_text() {
        let err = SecureStorageRequest::from_json("{ not json").unwrap_err();
        assert_eq!(err.code(), "-101");

        let request =
            SecureStorageRequest::from_json(r#"{"key":"a","options":{}}"#).expect("parse");
        assert_eq!(request.key(), Some("a"));
    }

    #[test]
    fn test_debug_redacts_value() {
        let request = SecureStorageRequest::default().with_value("hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn test_required_key_rejects_empty() {
        assert_eq!(SecureStorageRequest::default().with_key("").required_key(), None);
        assert_eq!(
            SecureStorageRequest::default().with_key("a").required_key(),
            Some("a")
        );
    }
}
