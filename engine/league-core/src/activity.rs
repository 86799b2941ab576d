//! Recent activity merge

use crate::models::ActivityEvent;

/// Result of merging a fresh activity batch into the stored feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Full feed, newest first
    pub updated: Vec<ActivityEvent>,

    /// Events that were not in the feed before, newest first.
    /// Non-empty means there is something to notify about.
    pub newly_added: Vec<ActivityEvent>,
}

/// Append every fresh event strictly newer than the newest stored one.
///
/// `existing` must already be sorted newest first. Events sharing a
/// timestamp inside one batch are kept as they come.
pub fn merge_activity(existing: Vec<ActivityEvent>, fresh: Vec<ActivityEvent>) -> MergeOutcome {
    let newest_known = existing.first().map(|event| event.timestamp);

    let mut newly_added: Vec<ActivityEvent> = fresh
        .into_iter()
        .filter(|event| newest_known.map_or(true, |newest| event.timestamp > newest))
        .collect();
    newly_added.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut updated = existing;
    updated.extend(newly_added.iter().cloned());
    updated.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    MergeOutcome { updated, newly_added }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityAction, ActivityPlayer};

    fn event(timestamp: i64) -> ActivityEvent {
        ActivityEvent { timestamp, actions: Vec::new() }
    }

    fn timestamps(events: &[ActivityEvent]) -> Vec<i64> {
        events.iter().map(|e| e.timestamp).collect()
    }

    #[test]
    fn test_merge_into_empty_feed() {
        let outcome = merge_activity(Vec::new(), vec![event(2), event(7), event(4)]);

        assert_eq!(timestamps(&outcome.updated), vec![7, 4, 2]);
        assert_eq!(timestamps(&outcome.newly_added), vec![7, 4, 2]);
    }

    #[test]
    fn test_merge_empty_batch() {
        let existing = vec![event(9), event(5), event(1)];
        let outcome = merge_activity(existing.clone(), Vec::new());

        assert_eq!(outcome.updated, existing);
        assert!(outcome.newly_added.is_empty());
    }

    #[test]
    fn test_merge_only_strictly_newer() {
        let outcome = merge_activity(vec![event(5), event(3)], vec![event(4), event(6)]);

        // 4 predates the newest stored event
        assert_eq!(timestamps(&outcome.newly_added), vec![6]);
        assert_eq!(timestamps(&outcome.updated), vec![6, 5, 3]);
    }

    #[test]
    fn test_merge_drops_replayed_newest() {
        let outcome = merge_activity(vec![event(5), event(3)], vec![event(5), event(3)]);

        assert!(outcome.newly_added.is_empty());
        assert_eq!(timestamps(&outcome.updated), vec![5, 3]);
    }

    #[test]
    fn test_merge_keeps_same_batch_ties() {
        let mut first = event(8);
        first.actions.push(ActivityAction {
            team: "A".to_string(),
            action: "FA ADDED".to_string(),
            player: ActivityPlayer { name: "X".to_string(), team: "NE".to_string() },
        });
        let second = event(8);

        let outcome = merge_activity(vec![event(2)], vec![first.clone(), second.clone()]);

        assert_eq!(outcome.newly_added, vec![first, second]);
        assert_eq!(timestamps(&outcome.updated), vec![8, 8, 2]);
    }
}
