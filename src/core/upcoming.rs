use crate::domain::model::Contest;
use chrono::{DateTime, Utc};

/// Returns the contests starting strictly after `now`, earliest first.
/// Ties on start time are ordered by id so output does not depend on feed order.
pub fn select_upcoming(all: &[Contest], now: DateTime<Utc>) -> Vec<Contest> {
    let mut upcoming: Vec<Contest> = all
        .iter()
        .filter(|c| c.is_upcoming(now))
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    upcoming
}
