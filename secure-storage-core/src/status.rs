//! Backend status codes.

/// Outcome of a backend call.
///
/// Numeric values follow the keychain `OSStatus` codes so hosts can pass
/// platform results through unchanged. Statuses are returned as data: a
/// missing item is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum ItemStatus {
    /// `errSecSuccess`
    Success,
    /// `errSecItemNotFound`
    ItemNotFound,
    /// `errSecDuplicateItem`
    DuplicateItem,
    /// `errSecParam`
    InvalidParameter,
    /// `errSecAuthFailed`
    AuthenticationFailed,
    /// `errSecInteractionNotAllowed`
    InteractionNotAllowed,
    /// `errSecUserCanceled`
    UserCanceled,
    /// Any other platform status.
    Other {
        /// Raw platform status code.
        code: i32,
    },
}

const SUCCESS: i32 = 0;
const ITEM_NOT_FOUND: i32 = -25300;
const DUPLICATE_ITEM: i32 = -25299;
const INVALID_PARAMETER: i32 = -50;
const AUTHENTICATION_FAILED: i32 = -25293;
const INTERACTION_NOT_ALLOWED: i32 = -25308;
const USER_CANCELED: i32 = -128;

impl ItemStatus {
    /// Numeric status code reported to the host.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::ItemNotFound => ITEM_NOT_FOUND,
            Self::DuplicateItem => DUPLICATE_ITEM,
            Self::InvalidParameter => INVALID_PARAMETER,
            Self::AuthenticationFailed => AUTHENTICATION_FAILED,
            Self::InteractionNotAllowed => INTERACTION_NOT_ALLOWED,
            Self::UserCanceled => USER_CANCELED,
            Self::Other { code } => code,
        }
    }

    /// Maps a raw platform status code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            SUCCESS => Self::Success,
            ITEM_NOT_FOUND => Self::ItemNotFound,
            DUPLICATE_ITEM => Self::DuplicateItem,
            INVALID_PARAMETER => Self::InvalidParameter,
            AUTHENTICATION_FAILED => Self::AuthenticationFailed,
            INTERACTION_NOT_ALLOWED => Self::InteractionNotAllowed,
            USER_CANCELED => Self::UserCanceled,
            code => Self::Other { code },
        }
    }

    /// Returns `true` for [`ItemStatus::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<i32> for ItemStatus {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<ItemStatus> for i32 {
    fn from(status: ItemStatus) -> Self {
        status.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_map_back() {
        for status in [
            ItemStatus::Success,
            ItemStatus::ItemNotFound,
            ItemStatus::DuplicateItem,
            ItemStatus::InvalidParameter,
            ItemStatus::AuthenticationFailed,
            ItemStatus::InteractionNotAllowed,
            ItemStatus::UserCanceled,
        ] {
            assert_eq!(ItemStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let status = ItemStatus::from(-34018);
        assert_eq!(status, ItemStatus::Other { code: -34018 });
        assert_eq!(i32::from(status), -34018);
        assert!(!status.is_success());
    }
}
