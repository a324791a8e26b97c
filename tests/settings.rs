//! Integration tests for the settings store and change notifier.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use torrent_storage::*;

fn facade(platform: Arc<StaticPlatform>) -> Arc<StorageFacade> {
    Arc::new(StorageFacade::direct_only(platform))
}

fn memory_settings() -> SettingsStore {
    let platform = Arc::new(StaticPlatform::new().with_download_dir("/sdcard/Download"));
    SettingsStore::new(Arc::new(MemoryPreferences::new()), facade(platform))
}

// =============================================================================
// Defaults and overrides
// =============================================================================

#[test]
fn documented_defaults() {
    let s = memory_settings();
    assert_eq!(s.port_range_first(), 37000);
    assert_eq!(s.port_range_second(), 57000);
    assert_eq!(s.max_connections(), 200);
    assert_eq!(s.max_connections_per_torrent(), 40);
    assert_eq!(s.max_active_torrents(), 6);
    assert_eq!(s.proxy_type(), ProxyType::None);
    assert_eq!(s.proxy_port(), 8080);
    assert_eq!(s.theme(), Theme::Light);
    assert_eq!(s.notify_sound(), "default");
    assert_eq!(s.custom_battery_control_value(), 15);
    assert_eq!(s.scheduling_start_time(), 540);
    assert_eq!(s.scheduling_shutdown_time(), 1260);
    assert_eq!(s.feed_item_keep_time(), 4 * 24 * 60 * 60 * 1000);
    assert_eq!(s.feed_refresh_interval(), 2 * 60 * 60 * 1000);
    assert_eq!(s.streaming_hostname(), "127.0.0.1");
    assert_eq!(s.streaming_port(), 8800);
    assert_eq!(s.sort_torrent_by(), SortColumn::Name);
    assert_eq!(s.sort_torrent_direction(), SortDirection::Asc);
    assert_eq!(s.save_torrents_in(), "file:///sdcard/Download");
    assert!(s.enable_dht());
    assert!(!s.autostart());
}

#[test]
fn write_is_visible_to_other_threads() {
    let s = Arc::new(memory_settings());
    let writer = {
        let s = s.clone();
        thread::spawn(move || s.set_max_upload_speed(512).unwrap())
    };
    writer.join().unwrap();
    assert_eq!(s.max_upload_speed(), 512);

    s.set_max_upload_speed(0).unwrap();
    assert_eq!(s.max_upload_speed(), 0);
}

#[test]
fn generic_access_matches_named_accessors() {
    let s = memory_settings();
    s.set(&keys::ENC_MODE, EncryptMode::Disabled).unwrap();
    assert_eq!(s.enc_mode(), EncryptMode::Disabled);
    s.set_sort_torrent_direction(SortDirection::Desc).unwrap();
    assert_eq!(s.get(&keys::SORT_TORRENT_DIRECTION), SortDirection::Desc);
    assert_eq!(
        s.preferences().get("sort_torrent_direction"),
        Some(PrefValue::Str("DESC".into()))
    );
}

#[test]
fn derived_default_follows_platform() {
    let platform = Arc::new(StaticPlatform::new().with_download_dir("/one"));
    let s = SettingsStore::new(Arc::new(MemoryPreferences::new()), facade(platform.clone()));
    assert_eq!(s.save_torrents_in(), "file:///one");
    platform.set_download_dir(Some("/two".into()));
    assert_eq!(s.save_torrents_in(), "file:///two");
    assert_eq!(s.dir_to_watch(), "file:///two");

    s.set_save_torrents_in("file:///fixed").unwrap();
    platform.set_download_dir(Some("/three".into()));
    assert_eq!(s.save_torrents_in(), "file:///fixed");
}

#[test]
fn every_key_reads_without_panicking() {
    let s = memory_settings();
    for key in keys::ALL {
        s.preferences().set(key, PrefValue::Long(i64::MAX)).unwrap();
    }
    let session = s.read_session_settings();
    assert_eq!(session.connections_limit, 200);
    assert_eq!(session.encrypt_mode, EncryptMode::Prefer);
    assert_eq!(s.feed_refresh_interval(), i64::MAX);
    assert_eq!(s.notify_sound(), "default");
}

// =============================================================================
// Change notifier
// =============================================================================

#[test]
fn stalled_subscriber_observes_latest_key() {
    let s = memory_settings();
    let changes = s.observe_changes();
    s.set_port_range_first(40000).unwrap();
    s.set_port_range_second(40010).unwrap();
    assert_eq!(
        changes.recv_timeout(Duration::from_secs(1)).as_deref(),
        Some("port_range_second")
    );
    assert_eq!(changes.try_recv(), None);
}

#[test]
fn unchanged_write_is_not_reported() {
    let s = memory_settings();
    s.set_enable_lsd(false).unwrap();
    let changes = s.observe_changes();
    s.set_enable_lsd(false).unwrap();
    assert_eq!(changes.try_recv(), None);
}

#[test]
fn no_delivery_after_unsubscribe_returns() {
    let prefs = Arc::new(MemoryPreferences::new());
    let s = SettingsStore::new(prefs.clone(), facade(Arc::new(StaticPlatform::new())));
    let changes = Arc::new(s.observe_changes());
    let s = Arc::new(s);

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let (s, stop) = (s.clone(), stop.clone());
        thread::spawn(move || {
            let mut port = 0;
            while !stop.load(Ordering::SeqCst) {
                port = (port + 1) % 1000;
                s.set_streaming_port(port).unwrap();
            }
        })
    };

    thread::sleep(Duration::from_millis(10));
    assert!(changes.unsubscribe());
    // From here on nothing may arrive, however the writer interleaves.
    for _ in 0..100 {
        assert_eq!(changes.try_recv(), None);
    }
    assert_eq!(changes.recv(), None);
    stop.store(true, Ordering::SeqCst);
    writer.join().unwrap();
    assert_eq!(prefs.listener_count(), 0);
}

#[test]
fn iterator_ends_on_unsubscribe() {
    let s = memory_settings();
    let changes = Arc::new(s.observe_changes());
    let reader = {
        let changes = changes.clone();
        thread::spawn(move || changes.iter().count())
    };
    thread::sleep(Duration::from_millis(10));
    changes.unsubscribe();
    reader.join().unwrap();
}

// =============================================================================
// Durable store
// =============================================================================

#[cfg(feature = "serde")]
#[test]
fn json_store_persists_across_instances() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.json");
    let platform = Arc::new(StaticPlatform::new());

    {
        let prefs = Arc::new(JsonFilePreferences::open(&path).unwrap());
        let s = SettingsStore::new(prefs, facade(platform.clone()));
        s.set_theme(Theme::Black).unwrap();
        s.set_proxy_address("proxy.local").unwrap();
        s.set_feed_item_keep_time(1000).unwrap();
    }

    let prefs = Arc::new(JsonFilePreferences::open(&path).unwrap());
    let s = SettingsStore::new(prefs, facade(platform));
    assert_eq!(s.theme(), Theme::Black);
    assert_eq!(s.proxy_address(), "proxy.local");
    assert_eq!(s.feed_item_keep_time(), 1000);
    assert_eq!(s.port_range_first(), 37000);
}

#[cfg(feature = "serde")]
#[test]
fn json_store_notifies_subscribers() {
    let tmp = tempfile::tempdir().unwrap();
    let prefs = Arc::new(JsonFilePreferences::open(tmp.path().join("p.json")).unwrap());
    let s = SettingsStore::new(prefs, facade(Arc::new(StaticPlatform::new())));
    let changes = s.observe_changes();
    s.set_auto_manage(true).unwrap();
    assert_eq!(changes.try_recv().as_deref(), Some("auto_manage"));
}
