use crate::app::AppState;
use crate::store::ProjectStatus;

/// Maximum number of refreshes a project can be absent before being evicted from the snapshot.
const SNAPSHOT_EVICTION_REFRESHES: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub project: String,
    pub from: ProjectStatus,
    pub to: ProjectStatus,
}

impl StatusChange {
    pub fn message(&self) -> String {
        match self.to {
            ProjectStatus::Running => format!("{} is now running", self.project),
            ProjectStatus::Stopped => format!("{} stopped", self.project),
        }
    }
}

/// Compares the store against the statuses seen on earlier refreshes, queues a
/// toast per change and returns the changes. Projects seen for the first time
/// produce nothing.
pub fn detect_changes(state: &mut AppState) -> Vec<StatusChange> {
    state.refresh_count += 1;
    let current = state.refresh_count;

    let changes: Vec<StatusChange> = state
        .store
        .projects()
        .iter()
        .filter_map(|p| {
            let &(old, _) = state.previous_statuses.get(&p.name)?;
            (old != p.status).then(|| StatusChange {
                project: p.name.clone(),
                from: old,
                to: p.status,
            })
        })
        .collect();

    for change in &changes {
        state.notify(change.message());
    }

    for p in state.store.projects() {
        state
            .previous_statuses
            .insert(p.name.clone(), (p.status, current));
    }

    // Evict entries not seen in the last SNAPSHOT_EVICTION_REFRESHES refreshes
    state.previous_statuses.retain(|_, (_, last_seen)| {
        current.saturating_sub(*last_seen) <= SNAPSHOT_EVICTION_REFRESHES
    });

    changes
}
