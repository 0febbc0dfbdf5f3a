use std::fmt::Write;

use crate::dashboard::{Dashboard, TOP_STREETS_LIMIT};
use crate::histogram;
use crate::loader::TIMESTAMP_COLUMN;

pub fn build_report(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    let params = &dashboard.params;
    let hour = &dashboard.hour;

    let _ = writeln!(output, "# Motor Vehicle Collisions in New York City");
    let _ = writeln!(
        output,
        "Dashboard over {} collision records with known locations.",
        dashboard.total_records
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Locations with at least {} injured", params.min_injured);
    let _ = writeln!(output, "{} collisions match.", dashboard.injury_map.len());
    let _ = writeln!(output);

    let _ = writeln!(output, "## Collisions by hour of day");
    let _ = writeln!(
        output,
        "Collisions between {}:00 and {}:00 = **{}**",
        hour.hour, hour.next_hour, hour.collisions
    );

    match &hour.layer {
        Some(layer) => {
            let _ = writeln!(
                output,
                "Map centred on ({:.5}, {:.5}) at zoom {} and pitch {}, {} points in hexagons of radius {}m.",
                layer.view.latitude,
                layer.view.longitude,
                layer.view.zoom,
                layer.view.pitch,
                layer.points.len(),
                layer.style.radius
            );
        }
        None => {
            let _ = writeln!(output, "No collisions in this hour, map skipped.");
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(
        output,
        "## Breakdown by minute between {}:00 and {}:00",
        hour.hour, hour.next_hour
    );
    match histogram::peak_minute(&dashboard.minutes) {
        Some(peak) => {
            let _ = writeln!(
                output,
                "Busiest minute: {}:{:02} with {} collisions.",
                hour.hour, peak.minute, peak.crashes
            );
        }
        None => {
            let _ = writeln!(output, "No collisions recorded for this hour.");
        }
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "| minute | crashes |");
    let _ = writeln!(output, "|---|---|");
    for bucket in &dashboard.minutes {
        let _ = writeln!(output, "| {} | {} |", bucket.minute, bucket.crashes);
    }
    let _ = writeln!(output);

    let top = &dashboard.top_streets;
    let _ = writeln!(
        output,
        "## Top {} most dangerous streets for {}",
        TOP_STREETS_LIMIT, top.category
    );
    if top.rows.is_empty() {
        let _ = writeln!(output, "No injured {} recorded.", top.category.label().to_lowercase());
    } else {
        let _ = writeln!(output, "| # | street | {} |", top.category.column());
        let _ = writeln!(output, "|---|---|---|");
        for row in &top.rows {
            let _ = writeln!(output, "| {} | {} | {} |", row.rank, cell(&row.street), row.injured);
        }
    }

    if let Some(rows) = &dashboard.raw_rows {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Raw data");
        if rows.is_empty() {
            let _ = writeln!(output, "No rows in the current view.");
        } else {
            let _ = writeln!(
                output,
                "| {TIMESTAMP_COLUMN} | latitude | longitude | on_street_name | injured_persons | injured_pedestrians | injured_cyclists | injured_motorists |"
            );
            let _ = writeln!(output, "|---|---|---|---|---|---|---|---|");
            for row in rows {
                let _ = writeln!(
                    output,
                    "| {} | {} | {} | {} | {} | {} | {} | {} |",
                    cell(&row.crash_datetime),
                    row.latitude,
                    row.longitude,
                    cell(row.on_street_name.as_deref().unwrap_or("")),
                    row.injured_persons,
                    row.injured_pedestrians,
                    row.injured_cyclists,
                    row.injured_motorists
                );
            }
        }
    }

    output
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// One-line digest printed after every control change in a session.
pub fn build_summary(dashboard: &Dashboard) -> String {
    let params = &dashboard.params;
    let leader = dashboard
        .top_streets
        .rows
        .first()
        .map(|row| format!("{} ({})", row.street, row.injured))
        .unwrap_or_else(|| "none".to_string());

    format!(
        "{} records | {} with >= {} injured | {} between {}:00 and {}:00 | worst street for {}: {}",
        dashboard.total_records,
        dashboard.injury_map.len(),
        params.min_injured,
        dashboard.hour.collisions,
        dashboard.hour.hour,
        dashboard.hour.next_hour,
        dashboard.top_streets.category,
        leader
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardParams, LayerStyle};
    use crate::models::{CollisionRecord, PersonCategory};

    fn record(crash_datetime: &str, street: Option<&str>, cyclists: u32) -> CollisionRecord {
        CollisionRecord {
            crash_datetime: crash_datetime.to_string(),
            latitude: 40.75,
            longitude: -73.98,
            injured_persons: cyclists,
            injured_pedestrians: 0,
            injured_cyclists: cyclists,
            injured_motorists: 0,
            on_street_name: street.map(str::to_string),
        }
    }

    fn render(params: DashboardParams) -> String {
        let raw = vec![
            record("04/03/2019 8:05", Some("BROADWAY"), 1),
            record("04/03/2019 8:05", None, 0),
            record("04/04/2019 8:47", Some("BOWERY"), 2),
        ];
        let dashboard = Dashboard::build(&raw, params, &LayerStyle::default()).unwrap();
        build_report(&dashboard)
    }

    #[test]
    fn reports_hour_counts_and_peak_minute() {
        let report = render(DashboardParams {
            hour: 8,
            category: PersonCategory::Cyclists,
            ..DashboardParams::default()
        });

        assert!(report.contains("Collisions between 8:00 and 9:00 = **3**"));
        assert!(report.contains("Busiest minute: 8:05 with 2 collisions."));
        assert!(report.contains("| 47 | 1 |"));
        assert!(report.contains("| 0 | BOWERY | 2 |"));
        assert!(report.contains("| 1 | BROADWAY | 1 |"));
        assert!(!report.contains("## Raw data"));
    }

    #[test]
    fn pipes_in_cells_are_escaped() {
        let raw = vec![record("04/03/2019 8:05", Some("BROADWAY | 7 AVENUE"), 1)];
        let params = DashboardParams {
            hour: 8,
            category: PersonCategory::Cyclists,
            show_raw: true,
            ..DashboardParams::default()
        };
        let dashboard = Dashboard::build(&raw, params, &LayerStyle::default()).unwrap();
        let report = build_report(&dashboard);

        assert!(report.contains("## Top 5 most dangerous streets for Cyclists"));
        assert!(report.contains("| 0 | BROADWAY \\| 7 AVENUE | 1 |"));
        assert!(report.contains("| 04/03/2019 8:05 | 40.75 | -73.98 | BROADWAY \\| 7 AVENUE |"));
        assert!(!report.contains("BROADWAY | 7"));
    }

    #[test]
    fn summary_names_the_worst_street() {
        let raw = vec![record("04/03/2019 8:05", Some("BOWERY"), 2)];
        let params = DashboardParams {
            min_injured: 2,
            hour: 8,
            category: PersonCategory::Cyclists,
            show_raw: false,
        };
        let dashboard = Dashboard::build(&raw, params, &LayerStyle::default()).unwrap();

        assert_eq!(
            build_summary(&dashboard),
            "1 records | 1 with >= 2 injured | 1 between 8:00 and 9:00 | worst street for Cyclists: BOWERY (2)"
        );
    }

    #[test]
    fn empty_hour_skips_the_map() {
        let report = render(DashboardParams {
            hour: 23,
            show_raw: true,
            ..DashboardParams::default()
        });

        assert!(report.contains("Collisions between 23:00 and 0:00 = **0**"));
        assert!(report.contains("No collisions in this hour, map skipped."));
        assert!(report.contains("No injured pedestrians recorded."));
        assert!(report.contains("No rows in the current view."));
    }
}
