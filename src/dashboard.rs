use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::filters;
use crate::histogram;
use crate::models::{CollisionRecord, Coordinates, MinuteBucket, PersonCategory, StreetRanking};

pub const MAX_INJURED_THRESHOLD: u32 = 19;
pub const MAX_HOUR: u32 = 23;
pub const TOP_STREETS_LIMIT: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("injured threshold {0} is out of range (0-{})", MAX_INJURED_THRESHOLD)]
    InjuredOutOfRange(u32),
    #[error("hour {0} is out of range (0-{})", MAX_HOUR)]
    HourOutOfRange(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardParams {
    pub min_injured: u32,
    pub hour: u32,
    pub category: PersonCategory,
    pub show_raw: bool,
}

impl Default for DashboardParams {
    fn default() -> Self {
        Self {
            min_injured: 0,
            hour: 0,
            category: PersonCategory::Pedestrians,
            show_raw: false,
        }
    }
}

impl DashboardParams {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.min_injured > MAX_INJURED_THRESHOLD {
            return Err(ParamError::InjuredOutOfRange(self.min_injured));
        }
        if self.hour > MAX_HOUR {
            return Err(ParamError::HourOutOfRange(self.hour));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStyle {
    pub map_style: String,
    pub radius: f64,
    pub elevation_scale: f64,
    pub elevation_range: [u32; 2],
    pub zoom: f64,
    pub pitch: f64,
    pub extruded: bool,
    pub pickable: bool,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            map_style: "mapbox://styles/mapbox/light-v9".to_string(),
            radius: 100.0,
            elevation_scale: 4.0,
            elevation_range: [0, 1000],
            zoom: 11.0,
            pitch: 50.0,
            extruded: true,
            pickable: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerPoint {
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexagonLayer {
    pub style: LayerStyle,
    pub view: ViewState,
    pub points: Vec<LayerPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourSection {
    pub hour: u32,
    pub next_hour: u32,
    pub collisions: usize,
    /// `None` when no collision falls in the hour; the map is skipped then.
    pub midpoint: Option<Coordinates>,
    pub layer: Option<HexagonLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopStreets {
    pub category: PersonCategory,
    pub rows: Vec<StreetRanking>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub params: DashboardParams,
    pub total_records: usize,
    pub injury_map: Vec<Coordinates>,
    pub hour: HourSection,
    pub minutes: Vec<MinuteBucket>,
    pub top_streets: TopStreets,
    pub raw_rows: Option<Vec<CollisionRecord>>,
}

impl Dashboard {
    pub fn build(
        raw: &[CollisionRecord],
        params: DashboardParams,
        style: &LayerStyle,
    ) -> Result<Self, ParamError> {
        params.validate()?;

        let injury_map = filters::injured_locations(raw, params.min_injured);
        let hour_view = filters::at_hour(raw, params.hour);
        let midpoint = filters::midpoint(&hour_view);
        let layer = midpoint.map(|center| hexagon_layer(&hour_view, center, style));
        let minutes = histogram::minute_histogram(hour_view.iter().copied());
        let top_streets = TopStreets {
            category: params.category,
            rows: filters::top_streets(raw, params.category, TOP_STREETS_LIMIT),
        };

        log::debug!(
            "dashboard built: {} locations, {} collisions at hour {}",
            injury_map.len(),
            hour_view.len(),
            params.hour
        );

        Ok(Self {
            params,
            total_records: raw.len(),
            injury_map,
            hour: HourSection {
                hour: params.hour,
                next_hour: (params.hour + 1) % 24,
                collisions: hour_view.len(),
                midpoint,
                layer,
            },
            minutes,
            top_streets,
            raw_rows: params
                .show_raw
                .then(|| hour_view.iter().map(|record| (*record).clone()).collect()),
        })
    }
}

fn hexagon_layer(view: &[&CollisionRecord], center: Coordinates, style: &LayerStyle) -> HexagonLayer {
    let points = view
        .iter()
        .filter_map(|record| {
            record.timestamp().map(|timestamp| LayerPoint {
                timestamp,
                latitude: record.latitude,
                longitude: record.longitude,
            })
        })
        .collect();

    HexagonLayer {
        style: style.clone(),
        view: ViewState {
            latitude: center.latitude,
            longitude: center.longitude,
            zoom: style.zoom,
            pitch: style.pitch,
        },
        points,
    }
}
