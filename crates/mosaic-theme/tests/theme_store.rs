//! Integration tests for the theme store: layer precedence, storage
//! recovery and file persistence.

use std::rc::Rc;

use mosaic_theme::{
    Accent, Appearance, ColorVision, FileStorage, MemoryStorage, NoStorage, PartialThemeOptions,
    StaticPreferences, StorageBackend, SystemPreference, ThemeStore, ThemeStoreConfig, TokenName,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stored(json: &str) -> Rc<MemoryStorage> {
    Rc::new(MemoryStorage::with_entry("mosaic-theme", json))
}

fn store_with(
    storage: &Rc<MemoryStorage>,
    prefs: &StaticPreferences,
    initial: PartialThemeOptions,
) -> ThemeStore {
    ThemeStore::new(
        ThemeStoreConfig::new()
            .storage_key("mosaic-theme")
            .initial(initial),
        Rc::clone(storage) as Rc<dyn StorageBackend>,
        prefs,
    )
}

// ---------------------------------------------------------------------------
// Precedence
// ---------------------------------------------------------------------------

#[test]
fn stored_record_beats_defaults() {
    let storage = stored(r#"{"accent":"rose","colorVision":"tritanopia"}"#);
    let store = store_with(&storage, &StaticPreferences::new(), PartialThemeOptions::new());
    let o = store.options();
    assert_eq!(o.accent, Accent::Rose);
    assert_eq!(o.color_vision, ColorVision::Tritanopia);
    assert_eq!(o.appearance, Appearance::Light);
}

#[test]
fn system_beats_stored() {
    let storage = stored(r#"{"appearance":"light","reducedMotion":false}"#);
    let prefs = StaticPreferences::new()
        .with(SystemPreference::PrefersDark, true)
        .with(SystemPreference::PrefersReducedMotion, true);
    let store = store_with(&storage, &prefs, PartialThemeOptions::new());
    assert_eq!(store.options().appearance, Appearance::Dark);
    assert!(store.options().reduced_motion);
}

#[test]
fn system_without_preference_keeps_stored_value() {
    let storage = stored(r#"{"appearance":"dark"}"#);
    let prefs = StaticPreferences::new().with(SystemPreference::PrefersDark, false);
    let store = store_with(&storage, &prefs, PartialThemeOptions::new());
    assert_eq!(store.options().appearance, Appearance::Dark);
}

#[test]
fn initial_overrides_beat_everything() {
    let storage = stored(r#"{"appearance":"dark","accent":"amber"}"#);
    let prefs = StaticPreferences::new().with(SystemPreference::PrefersDark, true);
    let store = store_with(
        &storage,
        &prefs,
        PartialThemeOptions::new()
            .appearance(Appearance::Light)
            .accent(Accent::Azure),
    );
    assert_eq!(store.options().appearance, Appearance::Light);
    assert_eq!(store.options().accent, Accent::Azure);
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn corrupt_record_is_treated_as_absent() {
    let storage = stored("{not json");
    let store = store_with(&storage, &StaticPreferences::new(), PartialThemeOptions::new());
    assert_eq!(store.options(), Default::default());
    // The corrupt record is overwritten with a valid one.
    let record = storage.peek("mosaic-theme").expect("rewritten");
    assert!(record.starts_with('{') && record.contains("\"accent\":\"indigo\""));
}

#[test]
fn unknown_enum_value_is_treated_as_absent() {
    let storage = stored(r#"{"accent":"chartreuse"}"#);
    let store = store_with(&storage, &StaticPreferences::new(), PartialThemeOptions::new());
    assert_eq!(store.options().accent, Accent::Indigo);
}

#[test]
fn read_failure_falls_back_to_defaults() {
    let storage = stored(r#"{"accent":"rose"}"#);
    storage.fail_reads(true);
    let store = store_with(&storage, &StaticPreferences::new(), PartialThemeOptions::new());
    assert_eq!(store.options().accent, Accent::Indigo);
    store.set_accent(Accent::Violet);
    let record = storage.peek("mosaic-theme").expect("writes still succeed");
    assert!(record.contains("\"accent\":\"violet\""));
    assert_eq!(store.token(TokenName::ColorPrimary), store.tokens()[TokenName::ColorPrimary]);
}

#[test]
fn unavailable_backend_is_skipped() {
    let store = ThemeStore::new(
        ThemeStoreConfig::new().storage_key("k"),
        Rc::new(NoStorage),
        &StaticPreferences::new(),
    );
    store.set_appearance(Appearance::Dark);
    assert_eq!(store.options().appearance, Appearance::Dark);
}

// ---------------------------------------------------------------------------
// File persistence
// ---------------------------------------------------------------------------

#[test]
fn file_storage_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("prefs.json");

    {
        let store = ThemeStore::new(
            ThemeStoreConfig::new().storage_key("theme"),
            Rc::new(FileStorage::new(&path)),
            &StaticPreferences::new(),
        );
        store.set_accent(Accent::Emerald);
        store.set_high_contrast(true);
    }
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let store = ThemeStore::new(
        ThemeStoreConfig::new().storage_key("theme"),
        Rc::new(FileStorage::new(&path)),
        &StaticPreferences::new(),
    );
    assert_eq!(store.options().accent, Accent::Emerald);
    assert!(store.options().high_contrast);
}

#[test]
fn file_storage_keeps_unrelated_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = FileStorage::new(dir.path().join("prefs.json"));
    storage.set("other", "1").expect("write");
    storage.set("theme", "{}").expect("write");
    assert_eq!(storage.get("other").expect("read").as_deref(), Some("1"));
    storage.remove("theme").expect("remove");
    assert_eq!(storage.get("theme").expect("read"), None);
    assert_eq!(storage.get("missing").expect("read"), None);
}

#[test]
fn unreadable_file_reports_serialization_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "][").expect("write");
    let storage = FileStorage::new(&path);
    assert!(matches!(
        storage.get("theme"),
        Err(mosaic_theme::StorageError::Serialization(_))
    ));
    // Writing replaces the broken file.
    storage.set("theme", "{}").expect("write");
    assert_eq!(storage.get("theme").expect("read").as_deref(), Some("{}"));
}
