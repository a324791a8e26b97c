//! Persisted value representation and the typed setting values.

use std::fmt;

/// A value as it sits in a [`PreferenceStore`](crate::PreferenceStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "lowercase"))]
pub enum PrefValue {
    /// Boolean flag.
    Bool(bool),
    /// 32-bit integer, also used for enum-by-int settings.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// UTF-8 string.
    Str(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(v) => write!(f, "{v}"),
            PrefValue::Int(v) => write!(f, "{v}"),
            PrefValue::Long(v) => write!(f, "{v}"),
            PrefValue::Str(v) => f.write_str(v),
        }
    }
}

/// A Rust type a setting can hold.
///
/// `Literal` is the form a constant default is written in, so defaults can
/// live in `const` items (`&'static str` for `String`).
pub trait SettingType: Sized {
    /// Const-friendly form of a default value.
    type Literal: Copy + Send + Sync + 'static;

    /// Build a value from its default literal.
    fn from_literal(literal: Self::Literal) -> Self;

    /// Encode for storage.
    fn to_pref(&self) -> PrefValue;

    /// Decode from storage. `None` for a value of another type or out of
    /// range, which makes the read fall back to the default.
    fn from_pref(value: PrefValue) -> Option<Self>;
}

impl SettingType for bool {
    type Literal = bool;

    fn from_literal(literal: bool) -> Self {
        literal
    }

    fn to_pref(&self) -> PrefValue {
        PrefValue::Bool(*self)
    }

    fn from_pref(value: PrefValue) -> Option<Self> {
        match value {
            PrefValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl SettingType for i32 {
    type Literal = i32;

    fn from_literal(literal: i32) -> Self {
        literal
    }

    fn to_pref(&self) -> PrefValue {
        PrefValue::Int(*self)
    }

    fn from_pref(value: PrefValue) -> Option<Self> {
        match value {
            PrefValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl SettingType for i64 {
    type Literal = i64;

    fn from_literal(literal: i64) -> Self {
        literal
    }

    fn to_pref(&self) -> PrefValue {
        PrefValue::Long(*self)
    }

    fn from_pref(value: PrefValue) -> Option<Self> {
        match value {
            PrefValue::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl SettingType for String {
    type Literal = &'static str;

    fn from_literal(literal: &'static str) -> Self {
        literal.to_owned()
    }

    fn to_pref(&self) -> PrefValue {
        PrefValue::Str(self.clone())
    }

    fn from_pref(value: PrefValue) -> Option<Self> {
        match value {
            PrefValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

// Enums persisted as their integer value.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        impl $name {
            /// Integer code stored for this value.
            pub const fn value(self) -> i32 {
                self as i32
            }

            /// Value for an integer code, if known.
            pub const fn from_value(value: i32) -> Option<Self> {
                match value {
                    $( $value => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl SettingType for $name {
            type Literal = $name;

            fn from_literal(literal: $name) -> Self {
                literal
            }

            fn to_pref(&self) -> PrefValue {
                PrefValue::Int(self.value())
            }

            fn from_pref(value: PrefValue) -> Option<Self> {
                match value {
                    PrefValue::Int(v) => $name::from_value(v),
                    _ => None,
                }
            }
        }
    };
}

// Enums persisted as their name.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Name stored for this value.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }

            /// Value for a stored name, if known.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $text => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl SettingType for $name {
            type Literal = $name;

            fn from_literal(literal: $name) -> Self {
                literal
            }

            fn to_pref(&self) -> PrefValue {
                PrefValue::Str(self.as_str().to_owned())
            }

            fn from_pref(value: PrefValue) -> Option<Self> {
                match value {
                    PrefValue::Str(v) => $name::from_name(&v),
                    _ => None,
                }
            }
        }
    };
}

int_enum! {
    /// Application colour theme.
    pub enum Theme {
        /// Light theme.
        Light = 0,
        /// Dark theme.
        Dark = 1,
        /// Pure black theme.
        Black = 2,
    }
}

int_enum! {
    /// Peer connection encryption policy.
    pub enum EncryptMode {
        /// Plaintext only.
        Disabled = 0,
        /// Both allowed.
        Enabled = 1,
        /// Encrypted preferred, plaintext allowed.
        Prefer = 2,
    }
}

int_enum! {
    /// Proxy protocol.
    pub enum ProxyType {
        /// No proxy.
        None = 0,
        /// SOCKS4.
        Socks4 = 1,
        /// SOCKS5.
        Socks5 = 2,
        /// HTTP CONNECT.
        Http = 3,
    }
}

named_enum! {
    /// Column the torrent list is sorted by.
    pub enum SortColumn {
        /// Torrent name.
        Name => "name",
        /// Total size.
        Size => "size",
        /// Download progress.
        Progress => "progress",
        /// Estimated time left.
        Eta => "ETA",
        /// Connected peers.
        Peers => "peers",
        /// Time the torrent was added.
        DateAdded => "dateAdded",
    }
}

named_enum! {
    /// Sort direction.
    pub enum SortDirection {
        /// Ascending.
        Asc => "ASC",
        /// Descending.
        Desc => "DESC",
    }
}

/// Session limits and toggles read together for the torrent engine.
///
/// A plain snapshot: each field is read independently, so a write racing
/// with [`read_session_settings`](crate::SettingsStore::read_session_settings)
/// may produce a mix of old and new values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSettings {
    /// Download rate limit in bytes per second, 0 for unlimited.
    pub download_rate_limit: i32,
    /// Upload rate limit in bytes per second, 0 for unlimited.
    pub upload_rate_limit: i32,
    /// Global connection limit.
    pub connections_limit: i32,
    /// Connections per torrent.
    pub connections_limit_per_torrent: i32,
    /// Upload slots per torrent.
    pub uploads_limit_per_torrent: i32,
    /// Torrents downloading at once.
    pub active_downloads: i32,
    /// Torrents seeding at once.
    pub active_seeds: i32,
    /// Total active torrents.
    pub active_limit: i32,
    /// First listen port.
    pub port_range_first: i32,
    /// Last listen port.
    pub port_range_second: i32,
    /// Distributed hash table.
    pub dht_enabled: bool,
    /// Local service discovery.
    pub lsd_enabled: bool,
    /// Micro transport protocol.
    pub utp_enabled: bool,
    /// UPnP port mapping.
    pub upnp_enabled: bool,
    /// NAT-PMP port mapping.
    pub nat_pmp_enabled: bool,
    /// Encrypt incoming connections.
    pub encrypt_in_connections: bool,
    /// Encrypt outgoing connections.
    pub encrypt_out_connections: bool,
    /// Encryption policy.
    pub encrypt_mode: EncryptMode,
    /// Let the engine queue torrents.
    pub auto_managed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_enum_codes() {
        assert_eq!(EncryptMode::Prefer.value(), 2);
        assert_eq!(EncryptMode::from_value(1), Some(EncryptMode::Enabled));
        assert_eq!(EncryptMode::from_value(9), None);
        assert_eq!(ProxyType::from_pref(PrefValue::Int(3)), Some(ProxyType::Http));
    }

    #[test]
    fn unknown_int_code_does_not_decode() {
        assert_eq!(Theme::from_pref(PrefValue::Int(42)), None);
        assert_eq!(Theme::from_pref(PrefValue::Str("1".into())), None);
    }

    #[test]
    fn named_enum_uses_stored_names() {
        assert_eq!(SortColumn::Eta.to_pref(), PrefValue::Str("ETA".into()));
        assert_eq!(
            SortDirection::from_pref(PrefValue::Str("DESC".into())),
            Some(SortDirection::Desc)
        );
        assert_eq!(SortDirection::from_name("desc"), None);
        assert_eq!(SortColumn::DateAdded.to_string(), "dateAdded");
    }

    #[test]
    fn wrong_primitive_type_does_not_decode() {
        assert_eq!(bool::from_pref(PrefValue::Int(1)), None);
        assert_eq!(i32::from_pref(PrefValue::Long(1)), None);
        assert_eq!(i64::from_pref(PrefValue::Int(1)), None);
        assert_eq!(String::from_pref(PrefValue::Bool(true)), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn pref_value_json_shape() {
        let json = serde_json::to_string(&PrefValue::Int(5)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":5}"#);
        let back: PrefValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PrefValue::Int(5));
    }
}
