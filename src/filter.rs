use crate::model::Window;
use chrono::{DateTime, Utc};

/// Seconds since the epoch of `0001-01-01T00:00:00Z`, which `gh` reports for
/// timestamps that were never set.
const ZERO_INSTANT_SECS: i64 = -62_135_596_800;

pub fn is_unset(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() == ZERO_INSTANT_SECS && ts.timestamp_subsec_nanos() == 0
}

impl Window {
    /// Whether a record stamped `ts` belongs in the window. Unset timestamps
    /// never exclude a record.
    pub fn admits(&self, ts: Option<&DateTime<Utc>>) -> bool {
        match ts {
            Some(ts) if !is_unset(ts) => *ts >= self.since,
            _ => true,
        }
    }
}

/// Client-side re-check of `gh`'s own date qualifiers, which only work at day
/// granularity.
pub fn retain_in_window<T, F>(records: Vec<T>, window: &Window, timestamp: F) -> Vec<T>
where
    F: Fn(&T) -> Option<&DateTime<Utc>>,
{
    records
        .into_iter()
        .filter(|r| window.admits(timestamp(r)))
        .collect()
}
