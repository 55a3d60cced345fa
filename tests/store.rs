//! Integration tests for the alarms file.

use std::fs;

use alarm_clock::{error::StoreError, AlarmBuilder, AlarmStore};
use tempfile::TempDir;

/// Helper to create a store in a fresh temp directory
fn create_test_store() -> (AlarmStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = AlarmStore::new(temp_dir.path().join("alarms.json"));
    (store, temp_dir)
}

#[test]
fn test_save_then_load_round_trip() {
    let (mut store, _temp) = create_test_store();
    store
        .add(
            AlarmBuilder::new(7, 30)
                .days([0, 1, 2, 3, 4])
                .message("Wake up")
                .build()
                .unwrap(),
        )
        .unwrap();
    store
        .add(
            AlarmBuilder::new(22, 5)
                .days([5, 6])
                .sound("custom1")
                .repeat_interval(10)
                .message("Время спать")
                .build()
                .unwrap(),
        )
        .unwrap();
    store.deactivate_all().unwrap();
    store
        .add(AlarmBuilder::new(12, 0).build().unwrap())
        .unwrap();

    let (loaded, error) = AlarmStore::open(store.path());
    assert!(error.is_none());
    assert_eq!(loaded.alarms(), store.alarms());
}

#[test]
fn test_missing_file_then_first_add() {
    let (mut store, _temp) = create_test_store();
    assert_eq!(store.load().unwrap(), 0);
    assert!(!store.path().exists());

    store
        .add(AlarmBuilder::new(6, 45).build().unwrap())
        .unwrap();

    let contents = fs::read_to_string(store.path()).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["hour"], 6);
    assert_eq!(records[0]["minute"], 45);
    assert_eq!(records[0]["active"], true);
    // pretty printed
    assert!(contents.contains("\n  {"));
}

#[test]
fn test_reads_hand_written_file() {
    let (mut store, _temp) = create_test_store();
    fs::write(
        store.path(),
        r#"[
  {
    "hour": 8,
    "minute": 0,
    "days": [0, 2, 4],
    "sound": "custom2",
    "repeat_interval": 5,
    "message": "Стендап",
    "active": false
  }
]"#,
    )
    .unwrap();

    assert_eq!(store.load().unwrap(), 1);
    let alarm = &store.alarms()[0];
    assert_eq!(alarm.days, vec![0, 2, 4]);
    assert_eq!(alarm.sound, "custom2");
    assert_eq!(alarm.repeat_interval, 5);
    assert_eq!(alarm.message, "Стендап");
    assert!(!alarm.active);
}

#[test]
fn test_malformed_file_recovers_empty() {
    let (_, temp) = create_test_store();
    let path = temp.path().join("alarms.json");
    fs::write(&path, r#"[{"hour": "seven"}]"#).unwrap();

    let (mut store, error) = AlarmStore::open(&path);
    assert!(matches!(error, Some(StoreError::Malformed { .. })));
    assert!(store.is_empty());

    // the next save replaces the broken file
    store
        .add(AlarmBuilder::new(1, 2).build().unwrap())
        .unwrap();
    let (reloaded, error) = AlarmStore::open(&path);
    assert!(error.is_none());
    assert_eq!(reloaded.len(), 1);
}

#[test]
fn test_remove_shifts_positions() {
    let (mut store, _temp) = create_test_store();
    for hour in [5, 6, 7] {
        store
            .add(AlarmBuilder::new(hour, 0).build().unwrap())
            .unwrap();
    }

    store.remove_at(1).unwrap();
    assert!(matches!(
        store.remove_at(2),
        Err(StoreError::InvalidIndex { index: 2, len: 2 })
    ));

    let (loaded, _) = AlarmStore::open(store.path());
    let hours: Vec<_> = loaded.alarms().iter().map(|alarm| alarm.hour).collect();
    assert_eq!(hours, vec![5, 7]);
}
