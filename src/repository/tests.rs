//! Tests for the repository module

use super::*;
use chrono::{TimeZone, Utc};
use std::io::Write;
use test_case::test_case;

fn ts(day: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

fn repo() -> InMemoryRepository {
    let mut energy = Group::new("g-1", "energy");
    energy.title = Some("Energy".to_string());
    let mut retired = Group::new("g-2", "retired");
    retired.state = RecordState::Deleted;

    let mut solar = Dataset::new("d-1", "solar", ts(1));
    solar.owner_org = Some("g-1".to_string());
    let mut wind = Dataset::new("d-2", "wind", ts(2));
    wind.groups = vec!["energy".to_string()];
    let water = Dataset::new("d-3", "water", ts(3));
    let mut hidden = Dataset::new("d-4", "hidden", ts(4));
    hidden.private = true;
    let mut gone = Dataset::new("d-5", "gone", ts(5));
    gone.state = RecordState::Deleted;
    let mut showcase = Dataset::new("d-6", "showcase", ts(6));
    showcase.kind = "showcase".to_string();

    InMemoryRepository::with_data(
        vec![water, wind, solar, hidden, gone, showcase],
        vec![energy, retired],
    )
}

// ============================================================================
// DateRange Tests
// ============================================================================

#[test_case(None, None, 1, true ; "unbounded")]
#[test_case(Some(2), None, 2, false ; "from is exclusive")]
#[test_case(Some(2), None, 3, true ; "after from")]
#[test_case(None, Some(2), 2, false ; "until is exclusive")]
#[test_case(None, Some(2), 1, true ; "before until")]
#[test_case(Some(2), Some(3), 2, true ; "range includes from")]
#[test_case(Some(2), Some(3), 3, true ; "range includes until")]
#[test_case(Some(2), Some(3), 4, false ; "outside range")]
fn test_date_range(from: Option<u32>, until: Option<u32>, day: u32, expected: bool) {
    let range = DateRange::from_bounds(from.map(ts), until.map(ts));
    assert_eq!(range.contains(&ts(day)), expected);
}

// ============================================================================
// Query Tests
// ============================================================================

#[tokio::test]
async fn test_query_excludes_private_deleted_and_other_types() {
    let records = repo()
        .query_active_records(None, &DateRange::Unbounded)
        .await
        .unwrap();
    let names: Vec<&str> = records.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["solar", "wind", "water"]);
}

#[tokio::test]
async fn test_query_by_group_matches_owner_and_membership() {
    let repo = repo();
    let group = repo.resolve_group("energy").await.unwrap().unwrap();
    let records = repo
        .query_active_records(Some(&group), &DateRange::Unbounded)
        .await
        .unwrap();
    let names: Vec<&str> = records.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["solar", "wind"]);
}

#[tokio::test]
async fn test_query_with_range() {
    let records = repo()
        .query_active_records(None, &DateRange::After(ts(1)))
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_resolve_group() {
    let repo = repo();
    assert!(repo.resolve_group("energy").await.unwrap().is_some());
    assert!(repo.resolve_group("g-1").await.unwrap().is_some());
    assert!(repo.resolve_group("retired").await.unwrap().is_none());
    assert!(repo.resolve_group("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_record_any_state() {
    let repo = repo();
    assert!(repo.get_record("d-5").await.unwrap().is_some());
    assert_eq!(
        repo.get_record("wind").await.unwrap().map(|d| d.id),
        Some("d-2".to_string())
    );
    assert!(repo.get_record("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_earliest_timestamp() {
    assert_eq!(repo().earliest_timestamp().await.unwrap(), Some(ts(1)));
    assert_eq!(
        InMemoryRepository::new().earliest_timestamp().await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_active_groups() {
    let groups = repo().active_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "energy");
}

// ============================================================================
// Loading Tests
// ============================================================================

#[test]
fn test_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
  "datasets": [
    {{"id": "d-1", "name": "solar", "metadata_created": "2024-01-01T00:00:00Z",
      "metadata_modified": "2024-01-02T00:00:00Z",
      "agent": [{{"name": "Ada", "role": "author"}}],
      "tags": [{{"name": "pv", "display_name": "PV"}}]}}
  ],
  "groups": [{{"id": "g-1", "name": "energy"}}]
}}"#
    )
    .unwrap();

    let repo = InMemoryRepository::from_file(file.path()).unwrap();
    assert_eq!(repo.len(), 1);
}

#[test]
fn test_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        r"
datasets:
  - id: d-1
    name: solar
    metadata_created: 2024-01-01T00:00:00Z
    metadata_modified: 2024-01-02T00:00:00Z
"
    )
    .unwrap();

    let repo = InMemoryRepository::from_file(file.path()).unwrap();
    assert!(!repo.is_empty());
}

#[test]
fn test_from_missing_file() {
    let err = InMemoryRepository::from_file("/nonexistent/catalogue.json").unwrap_err();
    assert!(matches!(err, crate::Error::FileNotFound { .. }));
}

#[test]
fn test_dataset_helpers() {
    let mut d = Dataset::new("d", "n", ts(1));
    d.agents = vec![
        Agent::new("Ada", "author"),
        Agent::new("Bob", "distributor"),
        Agent::new("Cy", "author"),
    ];
    let authors: Vec<_> = d
        .agents_with_role("author")
        .filter_map(|a| a.name.as_deref())
        .collect();
    assert_eq!(authors, vec!["Ada", "Cy"]);
    assert!(d.is_harvestable());
}
