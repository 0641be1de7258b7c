use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Recency buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TimeBucket {
    Today,
    Yesterday,
    ThisWeek,
    Earlier,
}

impl TimeBucket {
    pub const ORDER: [TimeBucket; 4] = [
        TimeBucket::Today,
        TimeBucket::Yesterday,
        TimeBucket::ThisWeek,
        TimeBucket::Earlier,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Today => "Today",
            TimeBucket::Yesterday => "Yesterday",
            TimeBucket::ThisWeek => "This Week",
            TimeBucket::Earlier => "Earlier",
        }
    }
}

/// Start of the local day containing `now`, as a UTC instant.
fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|m| m.with_timezone(&Utc))
        // Midnight skipped by a DST change: fall back to the naive UTC reading.
        .unwrap_or_else(|| midnight.and_utc())
}

pub fn bucket_for<Tz: TimeZone>(created_at: DateTime<Utc>, now: &DateTime<Tz>) -> TimeBucket {
    let today = local_midnight(now);
    if created_at >= today {
        TimeBucket::Today
    } else if created_at >= today - Duration::days(1) {
        TimeBucket::Yesterday
    } else if created_at >= today - Duration::days(7) {
        TimeBucket::ThisWeek
    } else {
        TimeBucket::Earlier
    }
}

/// Items partitioned into non-empty buckets in display order. Items keep
/// their input order inside a bucket.
pub fn group_by_recency<T, F, Tz>(items: Vec<T>, created_at: F, now: &DateTime<Tz>) -> Vec<(TimeBucket, Vec<T>)>
where
    F: Fn(&T) -> DateTime<Utc>,
    Tz: TimeZone,
{
    let mut buckets: [Vec<T>; 4] = Default::default();
    for item in items {
        let bucket = bucket_for(created_at(&item), now);
        buckets[bucket as usize].push(item);
    }

    TimeBucket::ORDER
        .into_iter()
        .zip(buckets)
        .filter(|(_, items)| !items.is_empty())
        .collect()
}
