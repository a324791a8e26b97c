//! # Settings Store
//!
//! Typed, persisted configuration with lazily derived defaults.
//!
//! ## Overview
//!
//! Every recognized key is a [`Setting<T>`] constant in [`keys`], pairing
//! the key string with a [`DefaultProvider`]. [`SettingsStore`] reads and
//! writes them over any [`PreferenceStore`]:
//!
//! | Stored value | `get` returns |
//! |--------------|---------------|
//! | absent | the default, not persisted |
//! | of type `T` | the stored value |
//! | another type, or an unknown enum code | the default |
//!
//! Derived defaults ([`DefaultProvider::Derived`]) are computed from the
//! [`StorageFacade`] on every read that misses, so an unset download
//! directory follows the platform when it changes.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use torrent_storage::{MemoryPreferences, SettingsStore, StaticPlatform, StorageFacade};
//!
//! let facade = Arc::new(StorageFacade::direct_only(Arc::new(StaticPlatform::new())));
//! let settings = SettingsStore::new(Arc::new(MemoryPreferences::new()), facade);
//!
//! assert_eq!(settings.port_range_first(), 37000);
//! settings.set_port_range_first(40000).unwrap();
//! assert_eq!(settings.port_range_first(), 40000);
//! ```

pub mod keys;
mod memory;
mod notifier;
mod value;

#[cfg(feature = "serde")]
mod json;

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::{PreferenceStore, SettingsError, StorageFacade, normalize_file_system_path};

#[cfg(feature = "serde")]
pub use json::JsonFilePreferences;
pub use memory::MemoryPreferences;
pub use notifier::{ListenerRegistry, Subscription};
pub use value::{
    EncryptMode, PrefValue, ProxyType, SessionSettings, SettingType, SortColumn, SortDirection,
    Theme,
};

// ============================================================================
// Setting descriptor
// ============================================================================

/// Where a setting's default comes from.
pub enum DefaultProvider<T: SettingType> {
    /// A fixed value.
    Const(T::Literal),
    /// Computed from the storage facade at read time.
    Derived(fn(&StorageFacade) -> T),
}

impl<T: SettingType> Clone for DefaultProvider<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: SettingType> Copy for DefaultProvider<T> {}

/// One recognized setting: its key, value type and default.
pub struct Setting<T: SettingType> {
    key: &'static str,
    default: DefaultProvider<T>,
}

impl<T: SettingType> Setting<T> {
    /// Setting with a constant default.
    pub const fn new(key: &'static str, default: T::Literal) -> Self {
        Self {
            key,
            default: DefaultProvider::Const(default),
        }
    }

    /// Setting whose default is computed from the storage facade.
    pub const fn derived(key: &'static str, default: fn(&StorageFacade) -> T) -> Self {
        Self {
            key,
            default: DefaultProvider::Derived(default),
        }
    }

    /// The persisted key.
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The default provider.
    pub const fn default_provider(&self) -> DefaultProvider<T> {
        self.default
    }

    /// The constant default, if the default is not derived.
    pub const fn constant(&self) -> Option<T::Literal> {
        match self.default {
            DefaultProvider::Const(literal) => Some(literal),
            DefaultProvider::Derived(_) => None,
        }
    }

    /// Returns `true` if the default is computed at read time.
    pub const fn is_derived(&self) -> bool {
        matches!(self.default, DefaultProvider::Derived(_))
    }
}

impl<T: SettingType> Clone for Setting<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: SettingType> Copy for Setting<T> {}

impl<T: SettingType> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("key", &self.key)
            .field("derived", &self.is_derived())
            .finish()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Typed access to every recognized setting.
///
/// Cheap to share; all methods take `&self`. Reads never fail. Writes
/// persist immediately and are visible to every later read in the process.
pub struct SettingsStore {
    prefs: Arc<dyn PreferenceStore>,
    facade: Arc<StorageFacade>,
}

impl SettingsStore {
    /// Settings over `prefs`, deriving path defaults from `facade`.
    pub fn new(prefs: Arc<dyn PreferenceStore>, facade: Arc<StorageFacade>) -> Self {
        Self { prefs, facade }
    }

    /// The underlying preference store.
    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.prefs
    }

    /// The facade derived defaults are computed from.
    pub fn facade(&self) -> &Arc<StorageFacade> {
        &self.facade
    }

    /// Current value of `setting`, or its default.
    pub fn get<T: SettingType>(&self, setting: &Setting<T>) -> T {
        match self.prefs.get(setting.key) {
            Some(stored) => T::from_pref(stored).unwrap_or_else(|| {
                debug!("ignoring unreadable value for {}", setting.key);
                self.default_of(setting)
            }),
            None => self.default_of(setting),
        }
    }

    /// The default of `setting`, evaluated now.
    pub fn default_of<T: SettingType>(&self, setting: &Setting<T>) -> T {
        match setting.default {
            DefaultProvider::Const(literal) => T::from_literal(literal),
            DefaultProvider::Derived(derive) => derive(&self.facade),
        }
    }

    /// Persist `value` for `setting`.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] if the store cannot save it
    pub fn set<T: SettingType>(&self, setting: &Setting<T>, value: T) -> Result<(), SettingsError> {
        self.prefs.set(setting.key, value.to_pref())
    }

    /// Forget the persisted value so `setting` reads its default again.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] if the store cannot save the removal
    pub fn reset<T: SettingType>(&self, setting: &Setting<T>) -> Result<(), SettingsError> {
        self.prefs.remove(setting.key)
    }

    /// Snapshot of the values the torrent session is configured from.
    ///
    /// Each key is read on its own; there is no cross-key atomicity.
    pub fn read_session_settings(&self) -> SessionSettings {
        SessionSettings {
            download_rate_limit: self.get(&keys::MAX_DOWNLOAD_SPEED),
            upload_rate_limit: self.get(&keys::MAX_UPLOAD_SPEED),
            connections_limit: self.get(&keys::MAX_CONNECTIONS),
            connections_limit_per_torrent: self.get(&keys::MAX_CONNECTIONS_PER_TORRENT),
            uploads_limit_per_torrent: self.get(&keys::MAX_UPLOADS_PER_TORRENT),
            active_downloads: self.get(&keys::MAX_ACTIVE_DOWNLOADS),
            active_seeds: self.get(&keys::MAX_ACTIVE_UPLOADS),
            active_limit: self.get(&keys::MAX_ACTIVE_TORRENTS),
            port_range_first: self.get(&keys::PORT_RANGE_FIRST),
            port_range_second: self.get(&keys::PORT_RANGE_SECOND),
            dht_enabled: self.get(&keys::ENABLE_DHT),
            lsd_enabled: self.get(&keys::ENABLE_LSD),
            utp_enabled: self.get(&keys::ENABLE_UTP),
            upnp_enabled: self.get(&keys::ENABLE_UPNP),
            nat_pmp_enabled: self.get(&keys::ENABLE_NATPMP),
            encrypt_in_connections: self.get(&keys::ENC_IN_CONNECTIONS),
            encrypt_out_connections: self.get(&keys::ENC_OUT_CONNECTIONS),
            encrypt_mode: self.get(&keys::ENC_MODE),
            auto_managed: self.get(&keys::AUTO_MANAGE),
        }
    }

    /// Live feed of changed keys. See [`Subscription`].
    pub fn observe_changes(&self) -> Subscription {
        Subscription::new(Arc::clone(&self.prefs))
    }

    // ------------------------------------------------------------------
    // Location-valued settings, normalized to `file://` form on read
    // ------------------------------------------------------------------

    fn get_location(&self, setting: &Setting<String>) -> String {
        normalize_file_system_path(&self.get(setting))
    }

    /// Download directory.
    pub fn save_torrents_in(&self) -> String {
        self.get_location(&keys::SAVE_TORRENTS_IN)
    }

    /// Where completed downloads are moved.
    pub fn move_after_download_in(&self) -> String {
        self.get_location(&keys::MOVE_AFTER_DOWNLOAD_IN)
    }

    /// Where `.torrent` copies are kept.
    pub fn save_torrent_files_in(&self) -> String {
        self.get_location(&keys::SAVE_TORRENT_FILES_IN)
    }

    /// The watched directory.
    pub fn dir_to_watch(&self) -> String {
        self.get_location(&keys::DIR_TO_WATCH)
    }

    /// IP filter file, empty when none is configured.
    pub fn ip_filtering_file(&self) -> String {
        let file = self.get(&keys::IP_FILTERING_FILE);
        if file.is_empty() {
            file
        } else {
            normalize_file_system_path(&file)
        }
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}

// ============================================================================
// Named accessors
// ============================================================================

macro_rules! accessors {
    ($( $(#[$meta:meta])* $get:ident / $set:ident : $ty:ty = $setting:path; )+) => {
        impl SettingsStore {
            $(
                $(#[$meta])*
                pub fn $get(&self) -> $ty {
                    self.get(&$setting)
                }

                #[doc = concat!("Persist a new [`", stringify!($get), "`](Self::", stringify!($get), ").")]
                ///
                /// # Errors
                ///
                /// - [`SettingsError::Persist`] if the store cannot save it
                pub fn $set(&self, value: $ty) -> Result<(), SettingsError> {
                    self.set(&$setting, value)
                }
            )+
        }
    };
}

// String-valued settings take anything string-like.
macro_rules! string_accessors {
    ($( $(#[$meta:meta])* $get:ident / $set:ident = $setting:path; )+) => {
        impl SettingsStore {
            $(
                $(#[$meta])*
                pub fn $get(&self) -> String {
                    self.get(&$setting)
                }

                #[doc = concat!("Persist a new [`", stringify!($get), "`](Self::", stringify!($get), ").")]
                ///
                /// # Errors
                ///
                /// - [`SettingsError::Persist`] if the store cannot save it
                pub fn $set(&self, value: impl Into<String>) -> Result<(), SettingsError> {
                    self.set(&$setting, value.into())
                }
            )+
        }
    };
}

accessors! {
    /// Notify when a torrent finishes.
    torrent_finish_notify / set_torrent_finish_notify: bool = keys::TORRENT_FINISH_NOTIFY;
    /// Play a sound with notifications.
    play_sound_notify / set_play_sound_notify: bool = keys::PLAY_SOUND_NOTIFY;
    /// Blink the LED with notifications.
    led_indicator_notify / set_led_indicator_notify: bool = keys::LED_INDICATOR_NOTIFY;
    /// Vibrate with notifications.
    vibration_notify / set_vibration_notify: bool = keys::VIBRATION_NOTIFY;
    /// Colour theme.
    theme / set_theme: Theme = keys::THEME;
    /// LED colour as packed ARGB.
    led_indicator_color_notify / set_led_indicator_color_notify: i32 = keys::LED_INDICATOR_COLOR_NOTIFY;

    /// Start with the system.
    autostart / set_autostart: bool = keys::AUTOSTART;
    /// Keep running in the background.
    keep_alive / set_keep_alive: bool = keys::KEEP_ALIVE;
    /// Shut down once every download completes.
    shutdown_downloads_complete / set_shutdown_downloads_complete: bool = keys::SHUTDOWN_DOWNLOADS_COMPLETE;
    /// Hold a wake lock while running.
    cpu_do_not_sleep / set_cpu_do_not_sleep: bool = keys::CPU_DO_NOT_SLEEP;
    /// Transfer only while charging.
    only_when_charging / set_only_when_charging: bool = keys::ONLY_WHEN_CHARGING;
    /// Pause on low battery.
    battery_control / set_battery_control: bool = keys::BATTERY_CONTROL;
    /// Use a custom low-battery threshold.
    custom_battery_control / set_custom_battery_control: bool = keys::CUSTOM_BATTERY_CONTROL;
    /// Custom low-battery threshold in percent.
    custom_battery_control_value / set_custom_battery_control_value: i32 = keys::CUSTOM_BATTERY_CONTROL_VALUE;
    /// Transfer only on unmetered networks.
    unmetered_connections_only / set_unmetered_connections_only: bool = keys::UNMETERED_CONNECTIONS_ONLY;
    /// Transfer while roaming.
    enable_roaming / set_enable_roaming: bool = keys::ENABLE_ROAMING;

    /// First port of the listen range.
    port_range_first / set_port_range_first: i32 = keys::PORT_RANGE_FIRST;
    /// Last port of the listen range.
    port_range_second / set_port_range_second: i32 = keys::PORT_RANGE_SECOND;
    /// Pick a random listen port.
    use_random_port / set_use_random_port: bool = keys::USE_RANDOM_PORT;
    /// Distributed hash table.
    enable_dht / set_enable_dht: bool = keys::ENABLE_DHT;
    /// Local service discovery.
    enable_lsd / set_enable_lsd: bool = keys::ENABLE_LSD;
    /// Micro transport protocol.
    enable_utp / set_enable_utp: bool = keys::ENABLE_UTP;
    /// UPnP port mapping.
    enable_upnp / set_enable_upnp: bool = keys::ENABLE_UPNP;
    /// NAT-PMP port mapping.
    enable_natpmp / set_enable_natpmp: bool = keys::ENABLE_NATPMP;
    /// Encrypt incoming connections.
    enc_in_connections / set_enc_in_connections: bool = keys::ENC_IN_CONNECTIONS;
    /// Encrypt outgoing connections.
    enc_out_connections / set_enc_out_connections: bool = keys::ENC_OUT_CONNECTIONS;
    /// Encryption policy.
    enc_mode / set_enc_mode: EncryptMode = keys::ENC_MODE;
    /// Apply the IP filter file.
    enable_ip_filtering / set_enable_ip_filtering: bool = keys::ENABLE_IP_FILTERING;
    /// Report port-mapping errors.
    show_nat_errors / set_show_nat_errors: bool = keys::SHOW_NAT_ERRORS;

    /// Move completed downloads.
    move_after_download / set_move_after_download: bool = keys::MOVE_AFTER_DOWNLOAD;
    /// Keep a copy of added `.torrent` files.
    save_torrent_files / set_save_torrent_files: bool = keys::SAVE_TORRENT_FILES;
    /// Watch a directory for new `.torrent` files.
    watch_dir / set_watch_dir: bool = keys::WATCH_DIR;

    /// Download rate limit, 0 for unlimited.
    max_download_speed / set_max_download_speed: i32 = keys::MAX_DOWNLOAD_SPEED;
    /// Upload rate limit, 0 for unlimited.
    max_upload_speed / set_max_upload_speed: i32 = keys::MAX_UPLOAD_SPEED;
    /// Global connection limit.
    max_connections / set_max_connections: i32 = keys::MAX_CONNECTIONS;
    /// Connections per torrent.
    max_connections_per_torrent / set_max_connections_per_torrent: i32 = keys::MAX_CONNECTIONS_PER_TORRENT;
    /// Upload slots per torrent.
    max_uploads_per_torrent / set_max_uploads_per_torrent: i32 = keys::MAX_UPLOADS_PER_TORRENT;
    /// Torrents seeding at once.
    max_active_uploads / set_max_active_uploads: i32 = keys::MAX_ACTIVE_UPLOADS;
    /// Torrents downloading at once.
    max_active_downloads / set_max_active_downloads: i32 = keys::MAX_ACTIVE_DOWNLOADS;
    /// Active torrents in total.
    max_active_torrents / set_max_active_torrents: i32 = keys::MAX_ACTIVE_TORRENTS;
    /// Let the engine queue torrents.
    auto_manage / set_auto_manage: bool = keys::AUTO_MANAGE;

    /// Proxy protocol.
    proxy_type / set_proxy_type: ProxyType = keys::PROXY_TYPE;
    /// Proxy port.
    proxy_port / set_proxy_port: i32 = keys::PROXY_PORT;
    /// Route peer connections through the proxy as well.
    proxy_peers_too / set_proxy_peers_too: bool = keys::PROXY_PEERS_TOO;
    /// Proxy requires credentials.
    proxy_requires_auth / set_proxy_requires_auth: bool = keys::PROXY_REQUIRES_AUTH;
    /// Proxy settings were edited and not yet applied.
    proxy_changed / set_proxy_changed: bool = keys::PROXY_CHANGED;

    /// Torrent list sort column.
    sort_torrent_by / set_sort_torrent_by: SortColumn = keys::SORT_TORRENT_BY;
    /// Torrent list sort direction.
    sort_torrent_direction / set_sort_torrent_direction: SortDirection = keys::SORT_TORRENT_DIRECTION;

    /// Start at a scheduled time.
    enable_scheduling_start / set_enable_scheduling_start: bool = keys::ENABLE_SCHEDULING_START;
    /// Shut down at a scheduled time.
    enable_scheduling_shutdown / set_enable_scheduling_shutdown: bool = keys::ENABLE_SCHEDULING_SHUTDOWN;
    /// Scheduled start, minutes after midnight.
    scheduling_start_time / set_scheduling_start_time: i32 = keys::SCHEDULING_START_TIME;
    /// Scheduled shutdown, minutes after midnight.
    scheduling_shutdown_time / set_scheduling_shutdown_time: i32 = keys::SCHEDULING_SHUTDOWN_TIME;
    /// Run the schedule once and then disable it.
    scheduling_run_only_once / set_scheduling_run_only_once: bool = keys::SCHEDULING_RUN_ONLY_ONCE;
    /// Switch Wi-Fi along with the schedule.
    scheduling_switch_wifi / set_scheduling_switch_wifi: bool = keys::SCHEDULING_SWITCH_WIFI;

    /// How long fetched feed items are kept, in milliseconds.
    feed_item_keep_time / set_feed_item_keep_time: i64 = keys::FEED_ITEM_KEEP_TIME;
    /// Refresh feeds periodically.
    feed_auto_refresh / set_feed_auto_refresh: bool = keys::FEED_AUTO_REFRESH;
    /// Feed refresh interval, in milliseconds.
    feed_refresh_interval / set_feed_refresh_interval: i64 = keys::FEED_REFRESH_INTERVAL;
    /// Refresh feeds only on unmetered networks.
    feed_auto_refresh_unmetered_only / set_feed_auto_refresh_unmetered_only: bool = keys::FEED_AUTO_REFRESH_UNMETERED_ONLY;
    /// Refresh feeds while roaming.
    feed_auto_refresh_enable_roaming / set_feed_auto_refresh_enable_roaming: bool = keys::FEED_AUTO_REFRESH_ENABLE_ROAMING;
    /// Start torrents found in feeds.
    feed_start_torrents / set_feed_start_torrents: bool = keys::FEED_START_TORRENTS;
    /// Skip feed items already seen.
    feed_remove_duplicates / set_feed_remove_duplicates: bool = keys::FEED_REMOVE_DUPLICATES;

    /// Serve torrent content over HTTP.
    streaming_enable / set_streaming_enable: bool = keys::STREAMING_ENABLE;
    /// Streaming server port.
    streaming_port / set_streaming_port: i32 = keys::STREAMING_PORT;
}

string_accessors! {
    /// Notification sound name.
    notify_sound / set_notify_sound = keys::NOTIFY_SOUND;
    /// Proxy host.
    proxy_address / set_proxy_address = keys::PROXY_ADDRESS;
    /// Proxy user name.
    proxy_login / set_proxy_login = keys::PROXY_LOGIN;
    /// Proxy password.
    proxy_password / set_proxy_password = keys::PROXY_PASSWORD;
    /// Streaming server bind address.
    streaming_hostname / set_streaming_hostname = keys::STREAMING_HOSTNAME;
}

// Location-valued setters store what the caller passes; reads normalize.
macro_rules! location_setters {
    ($( $set:ident => $setting:path; )+) => {
        impl SettingsStore {
            $(
                /// Persist a new location, stored as given.
                ///
                /// # Errors
                ///
                /// - [`SettingsError::Persist`] if the store cannot save it
                pub fn $set(&self, location: impl Into<String>) -> Result<(), SettingsError> {
                    self.set(&$setting, location.into())
                }
            )+
        }
    };
}

location_setters! {
    set_save_torrents_in => keys::SAVE_TORRENTS_IN;
    set_move_after_download_in => keys::MOVE_AFTER_DOWNLOAD_IN;
    set_save_torrent_files_in => keys::SAVE_TORRENT_FILES_IN;
    set_dir_to_watch => keys::DIR_TO_WATCH;
    set_ip_filtering_file => keys::IP_FILTERING_FILE;
}
