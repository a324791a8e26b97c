//! Recognized setting keys with their types and defaults.
//!
//! Keys are stable strings; changing one orphans the value users saved
//! under it.

use std::time::Duration;

use super::{Setting, Theme, EncryptMode, ProxyType, SortColumn, SortDirection};
use crate::{FILE_PREFIX, StorageFacade};

/// `"file://"` plus the platform download dir, else the user dir, else the
/// process temp dir. Evaluated on every read of an unset storage setting.
pub fn default_storage_dir(facade: &StorageFacade) -> String {
    let dir = facade
        .default_download_path()
        .or_else(|| facade.user_dir_path())
        .unwrap_or_else(std::env::temp_dir);
    format!("{FILE_PREFIX}{}", dir.display())
}

const fn millis(duration: Duration) -> i64 {
    duration.as_millis() as i64
}

// ============================================================================
// Appearance
// ============================================================================

/// Notification sound name.
pub const NOTIFY_SOUND: Setting<String> = Setting::new("notify_sound", "default");
/// Notify when a torrent finishes.
pub const TORRENT_FINISH_NOTIFY: Setting<bool> = Setting::new("torrent_finish_notify", true);
/// Play a sound with notifications.
pub const PLAY_SOUND_NOTIFY: Setting<bool> = Setting::new("play_sound_notify", true);
/// Blink the LED with notifications.
pub const LED_INDICATOR_NOTIFY: Setting<bool> = Setting::new("led_indicator_notify", true);
/// Vibrate with notifications.
pub const VIBRATION_NOTIFY: Setting<bool> = Setting::new("vibration_notify", true);
/// Colour theme.
pub const THEME: Setting<Theme> = Setting::new("theme", Theme::Light);
/// LED colour as packed ARGB.
pub const LED_INDICATOR_COLOR_NOTIFY: Setting<i32> =
    Setting::new("led_indicator_color_notify", 0xFF21_96F3_u32 as i32);

// ============================================================================
// Behavior
// ============================================================================

/// Start with the system.
pub const AUTOSTART: Setting<bool> = Setting::new("autostart", false);
/// Keep running in the background.
pub const KEEP_ALIVE: Setting<bool> = Setting::new("keep_alive", true);
/// Shut down once every download completes.
pub const SHUTDOWN_DOWNLOADS_COMPLETE: Setting<bool> =
    Setting::new("shutdown_downloads_complete", false);
/// Hold a wake lock while running.
pub const CPU_DO_NOT_SLEEP: Setting<bool> = Setting::new("cpu_do_not_sleep", false);
/// Transfer only while charging.
pub const ONLY_WHEN_CHARGING: Setting<bool> =
    Setting::new("download_and_upload_only_when_charging", false);
/// Pause on low battery.
pub const BATTERY_CONTROL: Setting<bool> = Setting::new("battery_control", false);
/// Use a custom low-battery threshold.
pub const CUSTOM_BATTERY_CONTROL: Setting<bool> = Setting::new("custom_battery_control", false);
/// Custom low-battery threshold in percent.
pub const CUSTOM_BATTERY_CONTROL_VALUE: Setting<i32> =
    Setting::new("custom_battery_control_value", 15);
/// Transfer only on unmetered networks.
pub const UNMETERED_CONNECTIONS_ONLY: Setting<bool> =
    Setting::new("unmetered_connections_only", false);
/// Transfer while roaming.
pub const ENABLE_ROAMING: Setting<bool> = Setting::new("enable_roaming", true);

// ============================================================================
// Network
// ============================================================================

/// First port of the listen range.
pub const PORT_RANGE_FIRST: Setting<i32> = Setting::new("port_range_first", 37000);
/// Last port of the listen range.
pub const PORT_RANGE_SECOND: Setting<i32> = Setting::new("port_range_second", 57000);
/// Pick a random listen port.
pub const USE_RANDOM_PORT: Setting<bool> = Setting::new("use_random_port", true);
/// Distributed hash table.
pub const ENABLE_DHT: Setting<bool> = Setting::new("enable_dht", true);
/// Local service discovery.
pub const ENABLE_LSD: Setting<bool> = Setting::new("enable_lsd", true);
/// Micro transport protocol.
pub const ENABLE_UTP: Setting<bool> = Setting::new("enable_utp", true);
/// UPnP port mapping.
pub const ENABLE_UPNP: Setting<bool> = Setting::new("enable_upnp", true);
/// NAT-PMP port mapping.
pub const ENABLE_NATPMP: Setting<bool> = Setting::new("enable_natpmp", true);
/// Encrypt incoming connections.
pub const ENC_IN_CONNECTIONS: Setting<bool> = Setting::new("enc_in_connections", true);
/// Encrypt outgoing connections.
pub const ENC_OUT_CONNECTIONS: Setting<bool> = Setting::new("enc_out_connections", true);
/// Encryption policy.
pub const ENC_MODE: Setting<EncryptMode> = Setting::new("enc_mode", EncryptMode::Prefer);
/// Apply the IP filter file.
pub const ENABLE_IP_FILTERING: Setting<bool> = Setting::new("enable_ip_filtering", false);
/// Location of the IP filter file, empty when unset.
pub const IP_FILTERING_FILE: Setting<String> = Setting::new("ip_filtering_file", "");
/// Report port-mapping errors.
pub const SHOW_NAT_ERRORS: Setting<bool> = Setting::new("show_nat_errors", false);

// ============================================================================
// Storage
// ============================================================================

/// Download directory.
pub const SAVE_TORRENTS_IN: Setting<String> =
    Setting::derived("save_torrents_in", default_storage_dir);
/// Move completed downloads.
pub const MOVE_AFTER_DOWNLOAD: Setting<bool> = Setting::new("move_after_download", false);
/// Where completed downloads are moved.
pub const MOVE_AFTER_DOWNLOAD_IN: Setting<String> =
    Setting::derived("move_after_download_in", default_storage_dir);
/// Keep a copy of added `.torrent` files.
pub const SAVE_TORRENT_FILES: Setting<bool> = Setting::new("save_torrent_files", false);
/// Where `.torrent` copies are kept.
pub const SAVE_TORRENT_FILES_IN: Setting<String> =
    Setting::derived("save_torrent_files_in", default_storage_dir);
/// Watch a directory for new `.torrent` files.
pub const WATCH_DIR: Setting<bool> = Setting::new("watch_dir", false);
/// The watched directory.
pub const DIR_TO_WATCH: Setting<String> = Setting::derived("dir_to_watch", default_storage_dir);

// ============================================================================
// Limits
// ============================================================================

/// Download rate limit, 0 for unlimited.
pub const MAX_DOWNLOAD_SPEED: Setting<i32> = Setting::new("max_download_speed", 0);
/// Upload rate limit, 0 for unlimited.
pub const MAX_UPLOAD_SPEED: Setting<i32> = Setting::new("max_upload_speed", 0);
/// Global connection limit.
pub const MAX_CONNECTIONS: Setting<i32> = Setting::new("max_connections", 200);
/// Connections per torrent.
pub const MAX_CONNECTIONS_PER_TORRENT: Setting<i32> =
    Setting::new("max_connections_per_torrent", 40);
/// Upload slots per torrent.
pub const MAX_UPLOADS_PER_TORRENT: Setting<i32> = Setting::new("max_uploads_per_torrent", 4);
/// Torrents seeding at once.
pub const MAX_ACTIVE_UPLOADS: Setting<i32> = Setting::new("max_active_uploads", 4);
/// Torrents downloading at once.
pub const MAX_ACTIVE_DOWNLOADS: Setting<i32> = Setting::new("max_active_downloads", 4);
/// Active torrents in total.
pub const MAX_ACTIVE_TORRENTS: Setting<i32> = Setting::new("max_active_torrents", 6);
/// Let the engine queue torrents.
pub const AUTO_MANAGE: Setting<bool> = Setting::new("auto_manage", false);

// ============================================================================
// Proxy
// ============================================================================

/// Proxy protocol.
pub const PROXY_TYPE: Setting<ProxyType> = Setting::new("proxy_type", ProxyType::None);
/// Proxy host.
pub const PROXY_ADDRESS: Setting<String> = Setting::new("proxy_address", "");
/// Proxy port.
pub const PROXY_PORT: Setting<i32> = Setting::new("proxy_port", 8080);
/// Route peer connections through the proxy as well.
pub const PROXY_PEERS_TOO: Setting<bool> = Setting::new("proxy_peers_too", true);
/// Proxy requires credentials.
pub const PROXY_REQUIRES_AUTH: Setting<bool> = Setting::new("proxy_requires_auth", false);
/// Proxy user name.
pub const PROXY_LOGIN: Setting<String> = Setting::new("proxy_login", "");
/// Proxy password.
pub const PROXY_PASSWORD: Setting<String> = Setting::new("proxy_password", "");
/// Proxy settings were edited and not yet applied.
pub const PROXY_CHANGED: Setting<bool> = Setting::new("proxy_changed", false);

// ============================================================================
// Sorting
// ============================================================================

/// Torrent list sort column.
pub const SORT_TORRENT_BY: Setting<SortColumn> = Setting::new("sort_torrent_by", SortColumn::Name);
/// Torrent list sort direction.
pub const SORT_TORRENT_DIRECTION: Setting<SortDirection> =
    Setting::new("sort_torrent_direction", SortDirection::Asc);

// ============================================================================
// Scheduling
// ============================================================================

/// Start at a scheduled time.
pub const ENABLE_SCHEDULING_START: Setting<bool> = Setting::new("enable_scheduling_start", false);
/// Shut down at a scheduled time.
pub const ENABLE_SCHEDULING_SHUTDOWN: Setting<bool> =
    Setting::new("enable_scheduling_shutdown", false);
/// Scheduled start, minutes after midnight.
pub const SCHEDULING_START_TIME: Setting<i32> = Setting::new("scheduling_start_time", 540);
/// Scheduled shutdown, minutes after midnight.
pub const SCHEDULING_SHUTDOWN_TIME: Setting<i32> = Setting::new("scheduling_shutdown_time", 1260);
/// Run the schedule once and then disable it.
pub const SCHEDULING_RUN_ONLY_ONCE: Setting<bool> = Setting::new("scheduling_run_only_once", false);
/// Switch Wi-Fi along with the schedule.
pub const SCHEDULING_SWITCH_WIFI: Setting<bool> = Setting::new("scheduling_switch_wifi", false);

// ============================================================================
// Feed
// ============================================================================

/// How long fetched feed items are kept, in milliseconds.
pub const FEED_ITEM_KEEP_TIME: Setting<i64> =
    Setting::new("feed_keep_items_time", millis(Duration::from_secs(4 * 24 * 60 * 60)));
/// Refresh feeds periodically.
pub const FEED_AUTO_REFRESH: Setting<bool> = Setting::new("feed_auto_refresh", false);
/// Feed refresh interval, in milliseconds.
pub const FEED_REFRESH_INTERVAL: Setting<i64> =
    Setting::new("feed_refresh_interval", millis(Duration::from_secs(2 * 60 * 60)));
/// Refresh feeds only on unmetered networks.
pub const FEED_AUTO_REFRESH_UNMETERED_ONLY: Setting<bool> =
    Setting::new("feed_auto_refresh_unmetered_connections_only", false);
/// Refresh feeds while roaming.
pub const FEED_AUTO_REFRESH_ENABLE_ROAMING: Setting<bool> =
    Setting::new("feed_auto_refresh_enable_roaming", true);
/// Start torrents found in feeds.
pub const FEED_START_TORRENTS: Setting<bool> = Setting::new("feed_start_torrents", true);
/// Skip feed items already seen.
pub const FEED_REMOVE_DUPLICATES: Setting<bool> = Setting::new("feed_remove_duplicates", true);

// ============================================================================
// Streaming
// ============================================================================

/// Serve torrent content over HTTP.
pub const STREAMING_ENABLE: Setting<bool> = Setting::new("streaming_enable", true);
/// Streaming server bind address.
pub const STREAMING_HOSTNAME: Setting<String> = Setting::new("streaming_hostname", "127.0.0.1");
/// Streaming server port.
pub const STREAMING_PORT: Setting<i32> = Setting::new("streaming_port", 8800);

/// Every recognized key.
pub const ALL: &[&str] = &[
    NOTIFY_SOUND.key(),
    TORRENT_FINISH_NOTIFY.key(),
    PLAY_SOUND_NOTIFY.key(),
    LED_INDICATOR_NOTIFY.key(),
    VIBRATION_NOTIFY.key(),
    THEME.key(),
    LED_INDICATOR_COLOR_NOTIFY.key(),
    AUTOSTART.key(),
    KEEP_ALIVE.key(),
    SHUTDOWN_DOWNLOADS_COMPLETE.key(),
    CPU_DO_NOT_SLEEP.key(),
    ONLY_WHEN_CHARGING.key(),
    BATTERY_CONTROL.key(),
    CUSTOM_BATTERY_CONTROL.key(),
    CUSTOM_BATTERY_CONTROL_VALUE.key(),
    UNMETERED_CONNECTIONS_ONLY.key(),
    ENABLE_ROAMING.key(),
    PORT_RANGE_FIRST.key(),
    PORT_RANGE_SECOND.key(),
    USE_RANDOM_PORT.key(),
    ENABLE_DHT.key(),
    ENABLE_LSD.key(),
    ENABLE_UTP.key(),
    ENABLE_UPNP.key(),
    ENABLE_NATPMP.key(),
    ENC_IN_CONNECTIONS.key(),
    ENC_OUT_CONNECTIONS.key(),
    ENC_MODE.key(),
    ENABLE_IP_FILTERING.key(),
    IP_FILTERING_FILE.key(),
    SHOW_NAT_ERRORS.key(),
    SAVE_TORRENTS_IN.key(),
    MOVE_AFTER_DOWNLOAD.key(),
    MOVE_AFTER_DOWNLOAD_IN.key(),
    SAVE_TORRENT_FILES.key(),
    SAVE_TORRENT_FILES_IN.key(),
    WATCH_DIR.key(),
    DIR_TO_WATCH.key(),
    MAX_DOWNLOAD_SPEED.key(),
    MAX_UPLOAD_SPEED.key(),
    MAX_CONNECTIONS.key(),
    MAX_CONNECTIONS_PER_TORRENT.key(),
    MAX_UPLOADS_PER_TORRENT.key(),
    MAX_ACTIVE_UPLOADS.key(),
    MAX_ACTIVE_DOWNLOADS.key(),
    MAX_ACTIVE_TORRENTS.key(),
    AUTO_MANAGE.key(),
    PROXY_TYPE.key(),
    PROXY_ADDRESS.key(),
    PROXY_PORT.key(),
    PROXY_PEERS_TOO.key(),
    PROXY_REQUIRES_AUTH.key(),
    PROXY_LOGIN.key(),
    PROXY_PASSWORD.key(),
    PROXY_CHANGED.key(),
    SORT_TORRENT_BY.key(),
    SORT_TORRENT_DIRECTION.key(),
    ENABLE_SCHEDULING_START.key(),
    ENABLE_SCHEDULING_SHUTDOWN.key(),
    SCHEDULING_START_TIME.key(),
    SCHEDULING_SHUTDOWN_TIME.key(),
    SCHEDULING_RUN_ONLY_ONCE.key(),
    SCHEDULING_SWITCH_WIFI.key(),
    FEED_ITEM_KEEP_TIME.key(),
    FEED_AUTO_REFRESH.key(),
    FEED_REFRESH_INTERVAL.key(),
    FEED_AUTO_REFRESH_UNMETERED_ONLY.key(),
    FEED_AUTO_REFRESH_ENABLE_ROAMING.key(),
    FEED_START_TORRENTS.key(),
    FEED_REMOVE_DUPLICATES.key(),
    STREAMING_ENABLE.key(),
    STREAMING_HOSTNAME.key(),
    STREAMING_PORT.key(),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn feed_durations_in_millis() {
        assert_eq!(FEED_ITEM_KEEP_TIME.constant(), Some(345_600_000));
        assert_eq!(FEED_REFRESH_INTERVAL.constant(), Some(7_200_000));
    }

    #[test]
    fn led_colour_keeps_argb_bits() {
        assert_eq!(LED_INDICATOR_COLOR_NOTIFY.constant().map(|c| c as u32), Some(0xFF21_96F3));
    }

    #[test]
    fn storage_dirs_are_derived() {
        assert!(SAVE_TORRENTS_IN.is_derived());
        assert!(DIR_TO_WATCH.is_derived());
        assert!(!PORT_RANGE_FIRST.is_derived());
    }
}
