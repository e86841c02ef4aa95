mod common;

use std::sync::Mutex;

use flow_core::{
    allocation::{AllocationPolicy, AllocationSnapshot, FlowCategory},
    core::FlowManager,
    storage::{AllocationStore, HistoryEntry, JsonStorage},
    FlowError,
};

/// Store whose writes can be switched to fail.
struct FlakyStore {
    fail_writes: bool,
    saved: Mutex<Vec<AllocationSnapshot>>,
}

impl FlakyStore {
    fn new(fail_writes: bool) -> Self {
        Self {
            fail_writes,
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl AllocationStore for FlakyStore {
    fn load_applied(&self) -> Result<Option<AllocationSnapshot>, FlowError> {
        Ok(self.saved.lock().unwrap().last().copied())
    }

    fn save_applied(&self, snapshot: &AllocationSnapshot) -> Result<HistoryEntry, FlowError> {
        if self.fail_writes {
            return Err(FlowError::Persistence("disk full".into()));
        }
        self.saved.lock().unwrap().push(*snapshot);
        Ok(HistoryEntry::new(*snapshot))
    }

    fn history(&self) -> Result<Vec<HistoryEntry>, FlowError> {
        Ok(Vec::new())
    }
}

#[test]
fn opens_with_default_split_when_nothing_stored() {
    let (manager, _, _) = common::setup_test_env();
    assert_eq!(*manager.applied(), AllocationSnapshot::default());
    assert!(!manager.is_dirty());
}

#[test]
fn commit_persists_and_reopens() {
    let (mut manager, _, base) = common::setup_test_env();
    manager.adjust(FlowCategory::Foundation, 65.0).unwrap();
    manager.adjust(FlowCategory::Future, 10.0).unwrap();
    let applied = manager.commit().unwrap();
    assert_eq!(applied.freedom(), 25.0);

    let storage = JsonStorage::new(base.join("data"), Some(3)).unwrap();
    let reopened = FlowManager::open(Box::new(storage), AllocationPolicy::default()).unwrap();
    assert_eq!(*reopened.applied(), applied);
    assert_eq!(reopened.history().unwrap().len(), 1);
}

#[test]
fn failed_write_keeps_previous_applied() {
    let mut manager =
        FlowManager::open(Box::new(FlakyStore::new(true)), AllocationPolicy::default()).unwrap();
    manager.adjust(FlowCategory::Foundation, 70.0).unwrap();

    let err = manager.commit().unwrap_err();
    assert!(matches!(err, FlowError::Persistence(_)));
    assert_eq!(manager.applied().foundation(), 50.0);
    assert!(manager.is_dirty(), "preview survives so the user can retry");
}

#[test]
fn begin_discards_in_progress_preview() {
    let mut manager =
        FlowManager::open(Box::new(FlakyStore::new(false)), AllocationPolicy::default()).unwrap();
    let first_session = manager.session().session_id();
    manager.adjust(FlowCategory::Future, 0.0).unwrap();
    assert!(manager.is_dirty());

    let preview = *manager.begin();
    assert_eq!(preview, AllocationSnapshot::default());
    assert!(!manager.is_dirty());
    assert_ne!(manager.session().session_id(), first_session);
}

#[test]
fn begin_keeps_configured_policy() {
    let mut manager =
        FlowManager::open(Box::new(FlakyStore::new(false)), AllocationPolicy::with_step(5.0))
            .unwrap();
    manager.begin();
    let update = manager.adjust(FlowCategory::Foundation, 57.0).unwrap();
    assert_eq!(update.snapshot.foundation(), 55.0);
}

#[test]
fn cancel_returns_applied() {
    let (mut manager, _, _) = common::setup_test_env();
    manager.adjust(FlowCategory::Foundation, 30.0).unwrap();
    let applied = manager.cancel();
    assert_eq!(applied, AllocationSnapshot::default());
    assert_eq!(*manager.preview(), applied);
}

#[test]
fn impact_follows_preview() {
    let (mut manager, _, _) = common::setup_test_env();
    manager.adjust(FlowCategory::Foundation, 60.0).unwrap();
    let projection = manager.impact(400_000).unwrap();
    assert_eq!(projection.foundation_cents, 240_000);
    assert_eq!(projection.future_cents, 80_000);
    assert_eq!(projection.freedom_cents, 80_000);
}

#[test]
fn invalid_category_is_recoverable() {
    let (mut manager, _, _) = common::setup_test_env();
    assert!(manager.adjust(FlowCategory::Freedom, 50.0).is_err());
    manager.adjust(FlowCategory::Future, 25.0).unwrap();
    assert_eq!(manager.commit().unwrap().freedom(), 25.0);
}
