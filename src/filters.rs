use chrono::Timelike;

use crate::models::{CollisionRecord, Coordinates, PersonCategory, StreetRanking};

pub fn injured_locations(records: &[CollisionRecord], threshold: u32) -> Vec<Coordinates> {
    records
        .iter()
        .filter(|record| record.injured_persons >= threshold)
        .map(CollisionRecord::coordinates)
        .collect()
}

pub fn at_hour<'a, I>(records: I, hour: u32) -> Vec<&'a CollisionRecord>
where
    I: IntoIterator<Item = &'a CollisionRecord>,
{
    records
        .into_iter()
        .filter(|record| record.timestamp().map(|ts| ts.hour()) == Some(hour))
        .collect()
}

pub fn midpoint(records: &[&CollisionRecord]) -> Option<Coordinates> {
    if records.is_empty() {
        return None;
    }

    let count = records.len() as f64;
    let (lat_sum, lon_sum) = records
        .iter()
        .fold((0.0, 0.0), |(lat, lon), record| {
            (lat + record.latitude, lon + record.longitude)
        });

    Some(Coordinates {
        latitude: lat_sum / count,
        longitude: lon_sum / count,
    })
}

pub fn top_streets(
    records: &[CollisionRecord],
    category: PersonCategory,
    limit: usize,
) -> Vec<StreetRanking> {
    let mut candidates: Vec<(&str, u32)> = records
        .iter()
        .filter_map(|record| {
            let injured = record.injured(category);
            match record.on_street_name.as_deref() {
                Some(street) if injured >= 1 => Some((street, injured)),
                _ => None,
            }
        })
        .collect();

    // stable: ties keep source order
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    candidates
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(rank, (street, injured))| StreetRanking {
            rank,
            street: street.to_string(),
            injured,
        })
        .collect()
}
