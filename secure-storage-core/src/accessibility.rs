//! Accessibility policy: the logical tiers callers ask for and the backend
//! tiers they resolve to.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

/// Logical accessibility requested by the caller.
///
/// Parsed from the `accessibility` option. Unknown values resolve to
/// [`Accessibility::Unlocked`], see [`Accessibility::parse_lenient`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    AsRefStr,
    uniffi::Enum,
)]
#[strum(serialize_all = "snake_case")]
pub enum Accessibility {
    /// Only while a device passcode is set, never leaves this device.
    Passcode,
    /// While the device is unlocked.
    #[default]
    Unlocked,
    /// While the device is unlocked, never leaves this device.
    UnlockedThisDevice,
    /// After the first unlock since boot.
    FirstUnlock,
    /// After the first unlock since boot, never leaves this device.
    FirstUnlockThisDevice,
}

impl Accessibility {
    /// Parses an accessibility option, falling back to `Unlocked` for
    /// anything outside the closed set.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        Self::from_str(raw).unwrap_or_else(|_| {
            log::warn!("unknown accessibility `{raw}`, falling back to `unlocked`");
            Self::default()
        })
    }

    /// Backend tier enforcing this accessibility.
    #[must_use]
    pub const fn tier(self) -> AccessibilityTier {
        match self {
            Self::Passcode => AccessibilityTier::WhenPasscodeSetThisDeviceOnly,
            Self::Unlocked => AccessibilityTier::WhenUnlocked,
            Self::UnlockedThisDevice => AccessibilityTier::WhenUnlockedThisDeviceOnly,
            Self::FirstUnlock => AccessibilityTier::AfterFirstUnlock,
            Self::FirstUnlockThisDevice => {
                AccessibilityTier::AfterFirstUnlockThisDeviceOnly
            }
        }
    }
}

impl From<Accessibility> for AccessibilityTier {
    fn from(value: Accessibility) -> Self {
        value.tier()
    }
}

/// Backend accessibility tier attached to a stored item.
///
/// Mirrors the keychain `kSecAttrAccessible*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum AccessibilityTier {
    /// `kSecAttrAccessibleWhenPasscodeSetThisDeviceOnly`
    WhenPasscodeSetThisDeviceOnly,
    /// `kSecAttrAccessibleWhenUnlocked`
    WhenUnlocked,
    /// `kSecAttrAccessibleWhenUnlockedThisDeviceOnly`
    WhenUnlockedThisDeviceOnly,
    /// `kSecAttrAccessibleAfterFirstUnlock`
    AfterFirstUnlock,
    /// `kSecAttrAccessibleAfterFirstUnlockThisDeviceOnly`
    AfterFirstUnlockThisDeviceOnly,
}

impl AccessibilityTier {
    /// Whether items in this tier are excluded from backups and sync.
    #[must_use]
    pub const fn is_this_device_only(self) -> bool {
        matches!(
            self,
            Self::WhenPasscodeSetThisDeviceOnly
                | Self::WhenUnlockedThisDeviceOnly
                | Self::AfterFirstUnlockThisDeviceOnly
        )
    }

    /// Whether items in this tier stay readable while the device is locked
    /// (after the first unlock since boot).
    #[must_use]
    pub const fn is_available_while_locked(self) -> bool {
        matches!(
            self,
            Self::AfterFirstUnlock | Self::AfterFirstUnlockThisDeviceOnly
        )
    }
}

/// Requirement layered on top of an accessibility tier at access time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum AccessConstraint {
    /// Any form of user presence (biometry or device passcode).
    UserPresence,
}

/// Access-control descriptor produced by the backend.
///
/// When attached to an item it supersedes the plain accessibility attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Record)]
pub struct AccessControl {
    /// Tier the descriptor was created with.
    pub accessible: AccessibilityTier,
    /// Requirement evaluated when the item is accessed.
    pub constraint: AccessConstraint,
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("passcode", AccessibilityTier::WhenPasscodeSetThisDeviceOnly)]
    #[test_case("unlocked", AccessibilityTier::WhenUnlocked)]
    #[test_case("unlocked_this_device", AccessibilityTier::WhenUnlockedThisDeviceOnly)]
    #[test_case("first_unlock", AccessibilityTier::AfterFirstUnlock)]
    #[test_case("first_unlock_this_device", AccessibilityTier::AfterFirstUnlockThisDeviceOnly)]
    fn test_tier_mapping(raw: &str, expected: AccessibilityTier) {
        assert_eq!(Accessibility::parse_lenient(raw).tier(), expected);
    }

    #[test_case("bogus")]
    #[test_case("")]
    #[test_case("Unlocked")]
    #[test_case("PASSCODE")]
    fn test_unknown_falls_back_to_unlocked(raw: &str) {
        assert_eq!(Accessibility::parse_lenient(raw), Accessibility::Unlocked);
    }

    #[test]
    fn test_display_round_trips_option_names() {
        assert_eq!(
            Accessibility::FirstUnlockThisDevice.to_string(),
            "first_unlock_this_device"
        );
        assert_eq!(Accessibility::Passcode.as_ref(), "passcode");
    }

    #[test]
    fn test_tier_properties() {
        assert!(AccessibilityTier::WhenUnlockedThisDeviceOnly.is_this_device_only());
        assert!(!AccessibilityTier::WhenUnlocked.is_this_device_only());
        assert!(AccessibilityTier::AfterFirstUnlock.is_available_while_locked());
        assert!(!AccessibilityTier::WhenPasscodeSetThisDeviceOnly.is_available_while_locked());
    }
}
