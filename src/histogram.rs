use chrono::Timelike;

use crate::models::{CollisionRecord, MinuteBucket};

pub const MINUTES_PER_HOUR: usize = 60;

pub fn minute_histogram<'a, I>(records: I) -> Vec<MinuteBucket>
where
    I: IntoIterator<Item = &'a CollisionRecord>,
{
    let mut counts = [0usize; MINUTES_PER_HOUR];

    for record in records {
        if let Some(ts) = record.timestamp() {
            counts[ts.minute() as usize] += 1;
        }
    }

    counts
        .iter()
        .enumerate()
        .map(|(minute, &crashes)| MinuteBucket {
            minute: minute as u32,
            crashes,
        })
        .collect()
}

pub fn peak_minute(buckets: &[MinuteBucket]) -> Option<MinuteBucket> {
    buckets
        .iter()
        .filter(|bucket| bucket.crashes > 0)
        .fold(None, |best: Option<MinuteBucket>, bucket| match best {
            Some(current) if current.crashes >= bucket.crashes => Some(current),
            _ => Some(*bucket),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(crash_datetime: &str) -> CollisionRecord {
        CollisionRecord {
            crash_datetime: crash_datetime.to_string(),
            latitude: 40.7,
            longitude: -73.9,
            injured_persons: 0,
            injured_pedestrians: 0,
            injured_cyclists: 0,
            injured_motorists: 0,
            on_street_name: None,
        }
    }

    #[test]
    fn buckets_minutes_within_the_hour() {
        let records = vec![
            at("05/10/2019 8:05"),
            at("05/10/2019 08:05"),
            at("05/11/2019 8:47"),
        ];

        let buckets = minute_histogram(&records);
        assert_eq!(buckets.len(), 60);
        for bucket in &buckets {
            let expected = match bucket.minute {
                5 => 2,
                47 => 1,
                _ => 0,
            };
            assert_eq!(bucket.crashes, expected, "minute {}", bucket.minute);
        }
    }

    #[test]
    fn empty_input_yields_sixty_zero_buckets() {
        let buckets = minute_histogram(&Vec::<CollisionRecord>::new());
        assert_eq!(buckets.len(), 60);
        assert!(buckets.iter().all(|bucket| bucket.crashes == 0));
        assert_eq!(
            buckets.iter().map(|bucket| bucket.minute).collect::<Vec<_>>(),
            (0..60).collect::<Vec<u32>>()
        );
    }

    #[test]
    fn counts_only_rows_with_valid_timestamps() {
        let records = vec![
            at("05/10/2019 8:05"),
            at("garbage"),
            at("05/10/2019 8:59"),
            at(""),
        ];

        let total: usize = minute_histogram(&records).iter().map(|b| b.crashes).sum();
        let valid = records.iter().filter(|r| r.timestamp().is_some()).count();
        assert_eq!(total, valid);
        assert_eq!(total, 2);
    }

    #[test]
    fn peak_prefers_the_earliest_busiest_minute() {
        let records = vec![
            at("05/10/2019 8:12"),
            at("05/10/2019 8:30"),
            at("05/10/2019 8:30"),
            at("05/10/2019 8:12"),
        ];

        let peak = peak_minute(&minute_histogram(&records)).unwrap();
        assert_eq!(peak.minute, 12);
        assert_eq!(peak.crashes, 2);
        assert_eq!(peak_minute(&minute_histogram(&Vec::<CollisionRecord>::new())), None);
    }
}
