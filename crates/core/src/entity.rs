//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// Persisted record with a stable identifier and a creation timestamp.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// When the record was first stored.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Sort records newest first, breaking timestamp ties by descending id.
///
/// This is the default ordering of every list the API returns.
pub fn sort_newest_first<E: Entity>(records: &mut [E]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row(i64, DateTime<Utc>);

    impl Entity for Row {
        type Id = i64;

        fn id(&self) -> i64 {
            self.0
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.1
        }
    }

    #[test]
    fn newest_first_with_id_tie_break() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let mut rows = vec![Row(1, t0), Row(2, t1), Row(3, t0)];

        sort_newest_first(&mut rows);

        assert_eq!(rows.iter().map(|r| r.0).collect::<Vec<_>>(), vec![2, 3, 1]);
    }
}
