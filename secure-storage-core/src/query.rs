//! Backend query construction.
//!
//! [`base_query`] is the only place that decides how a request maps onto
//! backend attributes; every engine operation starts from it.

use crate::accessibility::{AccessControl, AccessibilityTier};
use crate::request::SecureStorageRequest;

/// Item class of every item this crate touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum ItemClass {
    /// `kSecClassGenericPassword`
    #[default]
    GenericPassword,
}

/// How many matches a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum MatchLimit {
    /// A single match (the backend default).
    One,
    /// Every match.
    All,
}

/// Authentication UI policy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum AuthenticationUi {
    /// `kSecUseAuthenticationUISkip`: items needing authentication are
    /// silently skipped instead of prompting.
    Skip,
}

/// Attribute map sent to the backend to search, delete or anchor a write.
///
/// Unset fields are left out of the platform query.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct ItemQuery {
    /// `kSecClass`
    pub class: ItemClass,
    /// `kSecAttrAccount`, holds the logical key.
    pub account: Option<String>,
    /// `kSecAttrService`, holds the account name option.
    pub service: Option<String>,
    /// `kSecAttrAccessGroup`
    pub access_group: Option<String>,
    /// `kSecAttrSynchronizable`
    pub synchronizable: Option<bool>,
    /// `kSecReturnData`
    pub return_data: Option<bool>,
    /// `kSecReturnAttributes`
    pub return_attributes: Option<bool>,
    /// `kSecMatchLimit`
    pub match_limit: Option<MatchLimit>,
    /// `kSecUseAuthenticationContext`
    pub authentication_context: Option<String>,
    /// `kSecUseAuthenticationUI`
    pub authentication_ui: Option<AuthenticationUi>,
}

impl ItemQuery {
    /// Whether the query asks the backend to return anything.
    #[must_use]
    pub const fn has_return_keys(&self) -> bool {
        self.return_data.is_some()
            || self.return_attributes.is_some()
            || self.match_limit.is_some()
    }
}

/// Attributes written by an insert or an update.
///
/// `accessible` and `access_control` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct ItemAttributes {
    /// `kSecValueData`
    pub value_data: Option<Vec<u8>>,
    /// `kSecAttrSynchronizable`
    pub synchronizable: Option<bool>,
    /// `kSecAttrAccessible`
    pub accessible: Option<AccessibilityTier>,
    /// `kSecAttrAccessControl`
    pub access_control: Option<AccessControl>,
}

/// Protection applied to a written item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Accessibility tier only.
    Tier(AccessibilityTier),
    /// Access-control descriptor, superseding the tier.
    AccessControl(AccessControl),
}

impl ItemAttributes {
    /// Builds write attributes for `payload` under `protection`.
    #[must_use]
    pub fn new(payload: Vec<u8>, protection: Protection) -> Self {
        let (accessible, access_control) = match protection {
            Protection::Tier(tier) => (Some(tier), None),
            Protection::AccessControl(control) => (None, Some(control)),
        };
        Self {
            value_data: Some(payload),
            synchronizable: None,
            accessible,
            access_control,
        }
    }
}

/// Builds the query shared by every operation on `request`.
///
/// `want_data` sets the return-data flag when given.
#[must_use]
pub fn base_query(request: &SecureStorageRequest, want_data: Option<bool>) -> ItemQuery {
    ItemQuery {
        class: ItemClass::GenericPassword,
        account: request.key().map(str::to_owned),
        service: request.account_name().map(str::to_owned),
        access_group: request.group_id().map(str::to_owned),
        synchronizable: request.synchronizable(),
        return_data: want_data,
        return_attributes: None,
        match_limit: None,
        authentication_context: request.localized_reason().map(str::to_owned),
        authentication_ui: request
            .skip_authentication_item()
            .then_some(AuthenticationUi::Skip),
    }
}

/// Builds a key-less query covering a whole scope.
///
/// With every argument `None` this matches every item reachable under the
/// caller's default scope.
#[must_use]
pub fn scope_query(
    group_id: Option<&str>,
    account_name: Option<&str>,
    synchronizable: Option<bool>,
) -> ItemQuery {
    ItemQuery {
        service: account_name.map(str::to_owned),
        access_group: group_id.map(str::to_owned),
        synchronizable,
        ..ItemQuery::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::AccessConstraint;

    #[test]
    fn test_base_query_for_bare_request() {
        let request = SecureStorageRequest::default();
        let query = base_query(&request, None);
        assert_eq!(query, ItemQuery::default());
        assert!(!query.has_return_keys());
    }

    #[test]
    fn test_base_query_maps_every_option() {
        let request = SecureStorageRequest::default()
            .with_key("token")
            .with_group_id("group.example")
            .with_account_name("service.example")
            .with_synchronizable(false)
            .with_localized_reason("ctx")
            .with_skip_authentication_item(true);

        let query = base_query(&request, Some(true));
        assert_eq!(query.class, ItemClass::GenericPassword);
        assert_eq!(query.account.as_deref(), Some("token"));
        assert_eq!(query.service.as_deref(), Some("service.example"));
        assert_eq!(query.access_group.as_deref(), Some("group.example"));
        assert_eq!(query.synchronizable, Some(false));
        assert_eq!(query.return_data, Some(true));
        assert_eq!(query.return_attributes, None);
        assert_eq!(query.match_limit, None);
        assert_eq!(query.authentication_context.as_deref(), Some("ctx"));
        assert_eq!(query.authentication_ui, Some(AuthenticationUi::Skip));
    }

    #[test]
    fn test_skip_marker_only_when_requested() {
        let request = SecureStorageRequest::default().with_key("a");
        assert_eq!(base_query(&request, None).authentication_ui, None);
    }

    #[test]
    fn test_scope_query_has_no_key() {
        let query = scope_query(Some("group"), Some("service"), Some(true));
        assert_eq!(query.account, None);
        assert_eq!(query.service.as_deref(), Some("service"));
        assert_eq!(query.access_group.as_deref(), Some("group"));
        assert_eq!(query.synchronizable, Some(true));
        assert!(!query.has_return_keys());

        assert_eq!(scope_query(None, None, None), ItemQuery::default());
    }

    #[test]
    fn test_attributes_keep_tier_and_control_exclusive() {
        let tiered = ItemAttributes::new(
            b"v".to_vec(),
            Protection::Tier(AccessibilityTier::WhenUnlocked),
        );
        assert_eq!(tiered.accessible, Some(AccessibilityTier::WhenUnlocked));
        assert_eq!(tiered.access_control, None);

        let control = AccessControl {
            accessible: AccessibilityTier::WhenUnlocked,
            constraint: AccessConstraint::UserPresence,
        };
        let controlled = ItemAttributes::new(b"v".to_vec(), Protection::AccessControl(control));
        assert_eq!(controlled.accessible, None);
        assert_eq!(controlled.access_control, Some(control));
    }
}
