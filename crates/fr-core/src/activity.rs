//! # Activity Log
//!
//! Append-only audit trail. Entries are stored in append order and listed
//! newest first.

use chrono::{DateTime, Utc};

use crate::models::{ActivityKind, ActivityLogEntry, Actor, LogId};

pub(crate) fn entry(
    kind: ActivityKind,
    actor: &Actor,
    description: String,
    related_id: &str,
    timestamp: DateTime<Utc>,
) -> ActivityLogEntry {
    ActivityLogEntry {
        id: LogId::generate(),
        kind,
        user_id: actor.id.clone(),
        user_name: actor.name.clone(),
        user_role: actor.role,
        description,
        timestamp,
        related_id: related_id.to_string(),
    }
}

/// Sorts by timestamp descending; entries sharing a timestamp keep the most
/// recently appended first.
pub fn newest_first(logs: &[ActivityLogEntry]) -> Vec<ActivityLogEntry> {
    let mut indexed: Vec<(usize, &ActivityLogEntry)> = logs.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
    indexed.into_iter().map(|(_, entry)| entry.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_newest_first_breaks_ties_by_append_order() {
        let t0 = Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap();
        let admin = Actor::administrator();
        let logs = vec![
            entry(ActivityKind::DonationCreated, &admin, "a".into(), "1", t0),
            entry(ActivityKind::RequestCreated, &admin, "b".into(), "2", t0 + Duration::minutes(5)),
            entry(ActivityKind::RequestCompleted, &admin, "c".into(), "3", t0),
        ];

        let listed: Vec<_> = newest_first(&logs).into_iter().map(|e| e.description).collect();
        assert_eq!(listed, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_entry_copies_actor() {
        let actor = Actor::administrator();
        let log = entry(ActivityKind::DonationCompleted, &actor, "x".into(), "4", Utc::now());
        assert_eq!(log.user_id, "admin");
        assert_eq!(log.user_name, "Administrator");
        assert!(log.id.as_str().starts_with("log-"));
    }
}
