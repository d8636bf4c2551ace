//! Versioned snapshot codec for persisted planner collections.
//!
//! # Responsibility
//! - Encode projects and allocations as whole-collection JSON blobs.
//! - Decode allocation blobs in either the current or the legacy
//!   single-project shape and migrate legacy records on load.
//! - Repair malformed records instead of failing the whole load.
//!
//! # Invariants
//! - Decoding tries the current shape first; the legacy shape is only
//!   attempted when that fails, so current data is never re-migrated.
//! - A missing or unreadable blob loads as an empty collection.
//! - Loading never fails; repairs and fallbacks emit `warn` events.

use crate::model::allocation::{Allocation, MAX_PROJECTS_PER_DAY};
use crate::model::calendar::DayKey;
use crate::model::project::{Project, ProjectId};
use crate::repo::kv_repo::{KvRepository, RepoResult};
use crate::store::allocation_store::AllocationStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PROJECTS_KEY: &str = "projects";
pub const ALLOCATIONS_KEY: &str = "allocations";

/// Current allocation record: up to two projects per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecordV2 {
    pub date: String,
    pub project_ids: Vec<String>,
}

/// Legacy allocation record: exactly one project per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecordV1 {
    pub date: String,
    pub project_id: String,
}

impl From<AllocationRecordV1> for AllocationRecordV2 {
    fn from(value: AllocationRecordV1) -> Self {
        Self {
            date: value.date,
            project_ids: vec![value.project_id],
        }
    }
}

/// Decoded allocation blob tagged with the shape it was stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationSnapshot {
    Current(Vec<AllocationRecordV2>),
    Legacy(Vec<AllocationRecordV1>),
}

impl AllocationSnapshot {
    /// Decodes a blob, current shape first.
    ///
    /// An empty array decodes as `Current`.
    pub fn decode(raw: &str) -> Result<Self, SnapshotError> {
        let current_err = match serde_json::from_str::<Vec<AllocationRecordV2>>(raw) {
            Ok(records) => return Ok(Self::Current(records)),
            Err(err) => err,
        };
        serde_json::from_str::<Vec<AllocationRecordV1>>(raw)
            .map(Self::Legacy)
            .map_err(|_| SnapshotError::Malformed {
                key: ALLOCATIONS_KEY,
                source: current_err,
            })
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Converts to current-shape records; identity for `Current`.
    pub fn into_current(self) -> Vec<AllocationRecordV2> {
        match self {
            Self::Current(records) => records,
            Self::Legacy(records) => records.into_iter().map(Into::into).collect(),
        }
    }
}

/// Snapshot encode/decode failure.
#[derive(Debug)]
pub enum SnapshotError {
    Malformed {
        key: &'static str,
        source: serde_json::Error,
    },
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { key, source } => {
                write!(f, "malformed `{key}` snapshot: {source}")
            }
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed { source, .. } | Self::Encode { source, .. } => Some(source),
        }
    }
}

pub fn decode_projects(raw: &str) -> Result<Vec<Project>, SnapshotError> {
    serde_json::from_str(raw).map_err(|source| SnapshotError::Malformed {
        key: PROJECTS_KEY,
        source,
    })
}

pub fn encode_projects(projects: &[Project]) -> Result<String, SnapshotError> {
    serde_json::to_string(projects).map_err(|source| SnapshotError::Encode {
        key: PROJECTS_KEY,
        source,
    })
}

pub fn encode_allocations(store: &AllocationStore) -> Result<String, SnapshotError> {
    serde_json::to_string(&store.to_vec()).map_err(|source| SnapshotError::Encode {
        key: ALLOCATIONS_KEY,
        source,
    })
}

/// Builds a store from current-shape records, repairing what it can.
///
/// # Repairs
/// - Records with an unparseable date are skipped.
/// - Blank and repeated ids are dropped, first occurrence kept.
/// - Ids beyond `MAX_PROJECTS_PER_DAY` are dropped.
/// - Records left without ids are skipped.
/// - A repeated date keeps its first record.
pub fn normalize_allocations(records: Vec<AllocationRecordV2>) -> AllocationStore {
    let mut allocations = Vec::with_capacity(records.len());
    for record in records {
        let date = match record.date.parse::<DayKey>() {
            Ok(date) => date,
            Err(err) => {
                warn!("event=allocation_repair module=repo status=skipped reason=bad_date error={err}");
                continue;
            }
        };

        let original_len = record.project_ids.len();
        let mut project_ids: Vec<ProjectId> = Vec::with_capacity(MAX_PROJECTS_PER_DAY);
        for raw_id in record.project_ids {
            let project_id = ProjectId::from(raw_id);
            if project_id.as_str().trim().is_empty() || project_ids.contains(&project_id) {
                continue;
            }
            project_ids.push(project_id);
        }
        project_ids.truncate(MAX_PROJECTS_PER_DAY);
        if project_ids.len() != original_len {
            warn!(
                "event=allocation_repair module=repo status=repaired date={date} ids_before={original_len} ids_after={}",
                project_ids.len()
            );
        }

        match Allocation::try_new(date, project_ids) {
            Ok(allocation) => allocations.push(allocation),
            Err(err) => {
                warn!("event=allocation_repair module=repo status=skipped error={err}");
            }
        }
    }
    AllocationStore::from_allocations(allocations)
}

/// Planner collections read at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub projects: Vec<Project>,
    pub allocations: AllocationStore,
    /// Allocations were stored in the legacy shape and were migrated.
    pub migrated_legacy: bool,
}

/// Reads both collections, defaulting each to empty on any failure.
pub fn load_snapshot(repo: &impl KvRepository) -> LoadedSnapshot {
    let projects = match read_blob(repo, PROJECTS_KEY).map(|raw| decode_projects(&raw)) {
        Some(Ok(projects)) => projects,
        Some(Err(err)) => {
            warn!("event=snapshot_load module=repo status=fallback key={PROJECTS_KEY} error={err}");
            Vec::new()
        }
        None => Vec::new(),
    };

    let snapshot = match read_blob(repo, ALLOCATIONS_KEY).map(|raw| AllocationSnapshot::decode(&raw))
    {
        Some(Ok(snapshot)) => snapshot,
        Some(Err(err)) => {
            warn!(
                "event=snapshot_load module=repo status=fallback key={ALLOCATIONS_KEY} error={err}"
            );
            AllocationSnapshot::Current(Vec::new())
        }
        None => AllocationSnapshot::Current(Vec::new()),
    };

    let migrated_legacy = snapshot.is_legacy();
    if migrated_legacy {
        info!("event=allocation_migrate module=repo status=ok from=single_project to=multi_project");
    }
    let allocations = normalize_allocations(snapshot.into_current());

    info!(
        "event=snapshot_load module=repo status=ok projects={} allocations={} migrated_legacy={}",
        projects.len(),
        allocations.len(),
        migrated_legacy
    );
    LoadedSnapshot {
        projects,
        allocations,
        migrated_legacy,
    }
}

/// Rewrites the whole project collection.
pub fn save_projects(repo: &impl KvRepository, projects: &[Project]) -> RepoResult<()> {
    let raw = encode_projects(projects)?;
    repo.put(PROJECTS_KEY, &raw)
}

/// Rewrites the whole allocation collection in the current shape.
pub fn save_allocations(repo: &impl KvRepository, store: &AllocationStore) -> RepoResult<()> {
    let raw = encode_allocations(store)?;
    repo.put(ALLOCATIONS_KEY, &raw)
}

fn read_blob(repo: &impl KvRepository, key: &'static str) -> Option<String> {
    match repo.get(key) {
        Ok(value) => value.filter(|raw| !raw.trim().is_empty()),
        Err(err) => {
            warn!("event=snapshot_load module=repo status=fallback key={key} error={err}");
            None
        }
    }
}
