use hourplan_core::db::open_db;
use hourplan_core::repo::snapshot::{ALLOCATIONS_KEY, PROJECTS_KEY};
use hourplan_core::{
    DayKey, KvRepository, MemoryKvRepository, MonthCursor, PlannerService, ProjectDraft,
    ProjectId, RepoError, RepoResult, SqliteKvRepository, ToggleOutcome,
};
use std::cell::Cell;

fn march() -> MonthCursor {
    MonthCursor::new(2024, 3).unwrap()
}

fn day(d: u32) -> DayKey {
    DayKey::from_ymd(2024, 3, d).unwrap()
}

/// Accepts reads, fails every write.
#[derive(Default)]
struct ReadOnlyRepo {
    failed_writes: Cell<usize>,
}

impl KvRepository for ReadOnlyRepo {
    fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        Ok(None)
    }

    fn put(&self, _key: &str, _value: &str) -> RepoResult<()> {
        self.failed_writes.set(self.failed_writes.get() + 1);
        Err(RepoError::Unavailable("read-only".to_string()))
    }
}

#[test]
fn legacy_allocations_are_migrated_and_rewritten() {
    let repo = MemoryKvRepository::new()
        .with_entry(PROJECTS_KEY, r##"[{"id":"p1","name":"Docs","totalHours":40,"color":"#3B82F6"}]"##)
        .with_entry(ALLOCATIONS_KEY, r#"[{"date":"2024-01-05","projectId":"p1"}]"#);

    let service = PlannerService::open_at(repo, march());

    let allocation = service
        .state()
        .allocations()
        .lookup(DayKey::from_ymd(2024, 1, 5).unwrap())
        .unwrap();
    assert_eq!(allocation.project_ids(), &[ProjectId::from("p1")]);

    let rewritten: serde_json::Value =
        serde_json::from_str(&service.repo().get(ALLOCATIONS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(
        rewritten,
        serde_json::json!([{ "date": "2024-01-05", "projectIds": ["p1"] }])
    );
    assert_eq!(service.hours_used(&ProjectId::from("p1")), 6);
}

#[test]
fn current_allocations_are_not_rewritten_on_load() {
    let raw = r#"[{"date":"2024-03-01","projectIds":["p1","p2"]}]"#;
    let repo = MemoryKvRepository::new().with_entry(ALLOCATIONS_KEY, raw);

    let service = PlannerService::open_at(repo, march());

    assert_eq!(service.repo().get(ALLOCATIONS_KEY).unwrap().as_deref(), Some(raw));
    assert_eq!(service.state().allocations().len(), 1);
}

#[test]
fn malformed_blobs_load_as_empty_collections() {
    let repo = MemoryKvRepository::new()
        .with_entry(PROJECTS_KEY, "{broken")
        .with_entry(ALLOCATIONS_KEY, r#"{"date":"2024-03-01"}"#);

    let service = PlannerService::open_at(repo, march());

    assert!(service.state().projects().is_empty());
    assert!(service.state().allocations().is_empty());
    assert!(service.last_persist_error().is_none());
}

#[test]
fn write_failure_keeps_in_memory_mutation() {
    let repo = ReadOnlyRepo::default();
    let mut service = PlannerService::open_at(&repo, march());

    let p1 = service
        .add_project(&ProjectDraft::new("Docs", 12))
        .expect("project is created in memory");
    assert!(service.last_persist_error().is_some());

    service.select_project(Some(&p1));
    assert_eq!(service.day_click(day(1)), Some(ToggleOutcome::Assigned));
    assert_eq!(service.hours_used(&p1), 6);
    assert_eq!(service.percent_used(&p1), 50);
    assert_eq!(repo.failed_writes.get(), 2);
}

#[test]
fn delete_project_cascades_through_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.sqlite3");

    let (p1, p2) = {
        let conn = open_db(&path).unwrap();
        let mut service = PlannerService::open_at(SqliteKvRepository::new(&conn), march());
        let p1 = service.add_project(&ProjectDraft::new("A", 30)).unwrap();
        let p2 = service.add_project(&ProjectDraft::new("B", 30)).unwrap();

        service.select_project(Some(&p1));
        service.day_click(day(1));
        service.day_click(day(2));
        service.select_project(Some(&p2));
        service.day_click(day(2));
        service.select_project(Some(&p1));

        let removal = service.delete_project(&p1).unwrap();
        assert_eq!(removal.purged_allocations, 2);
        assert!(removal.selection_cleared);
        assert!(service.state().selected_project().is_none());
        assert_eq!(service.day_click(day(3)), None);
        (p1, p2)
    };

    let conn = open_db(&path).unwrap();
    let service = PlannerService::open_at(SqliteKvRepository::new(&conn), march());
    assert_eq!(service.state().projects().len(), 1);
    assert_eq!(service.state().projects()[0].id, p2);
    assert_eq!(service.hours_used(&p1), 0);
    assert_eq!(service.hours_used(&p2), 6);
    assert!(service.state().allocations().lookup(day(1)).is_none());
}

#[test]
fn remove_allocation_is_idempotent_and_persisted() {
    let mut service = PlannerService::open_at(MemoryKvRepository::new(), march());
    let p1 = service.add_project(&ProjectDraft::new("A", 30)).unwrap();
    service.select_project(Some(&p1));
    service.day_click(day(9));

    assert!(service.remove_allocation(day(9), &p1));
    assert!(!service.remove_allocation(day(9), &p1));
    assert_eq!(
        service.repo().get(ALLOCATIONS_KEY).unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn usage_summary_follows_project_order() {
    let mut service = PlannerService::open_at(MemoryKvRepository::new(), march());
    let p1 = service.add_project(&ProjectDraft::new("A", 10)).unwrap();
    let p2 = service.add_project(&ProjectDraft::new("B", 4)).unwrap();
    service.select_project(Some(&p2));
    service.day_click(day(1));

    let summary = service.usage_summary();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].project_id, p1);
    assert_eq!(summary[0].hours_used, 0);
    assert_eq!(summary[1].hours_used, 6);
    assert_eq!(summary[1].percent_used, 100);
    assert_eq!(summary[1].remaining_hours(), 0);
}

#[test]
fn month_view_tracks_navigation_and_selection() {
    let mut service = PlannerService::open_at(MemoryKvRepository::new(), march());
    let p1 = service.add_project(&ProjectDraft::new("A", 10)).unwrap();
    assert!(!service.month_view().selectable);

    service.toggle_selection(&p1);
    service.next_month();
    service.day_click(DayKey::from_ymd(2024, 4, 15).unwrap());

    let view = service.month_view();
    assert_eq!(view.label, "April 2024");
    assert!(view.selectable);
    assert_eq!(view.days.len(), 30);
    assert_eq!(view.days[14].entries.len(), 1);
    assert_eq!(view.days[14].entries[0].hours, 6);
}
