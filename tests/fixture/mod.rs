// not every test binary exercises every helper
#![allow(dead_code)]

use std::sync::LazyLock;

use geojson::{Feature, FeatureCollection, Value};
use routeaudit::{
    Coordinate, LocalEquirectangular, Observation, ReferenceFeature, ReferenceIndex,
    encode_polyline,
};

/// Reference network shared by the integration tests.
pub static NETWORK: LazyLock<Vec<ReferenceFeature>> =
    LazyLock::new(|| parse_features(include_str!("network.geojson")));

pub const ORIGIN: Coordinate = Coordinate {
    lon: 13.46,
    lat: 52.517,
};

pub fn projection() -> LocalEquirectangular {
    LocalEquirectangular::centered_on(ORIGIN)
}

pub fn reference_index() -> ReferenceIndex {
    ReferenceIndex::from_features(NETWORK.iter().cloned(), &projection())
}

/// WGS84 geometry of a fixture segment.
pub fn segment_geometry(id: &str) -> Vec<Coordinate> {
    NETWORK
        .iter()
        .find(|feature| feature.id == id)
        .map(|feature| feature.geometry.clone())
        .unwrap_or_else(|| panic!("fixture has no segment {id}"))
}

/// Polyline recording the exact geometry of a fixture segment.
pub fn exact_polyline(id: &str) -> String {
    encode_polyline(&segment_geometry(id), 5)
}

/// Polyline recording a fixture segment shifted north by `degrees` latitude.
pub fn shifted_polyline(id: &str, degrees: f64) -> String {
    let shifted: Vec<Coordinate> = segment_geometry(id)
        .into_iter()
        .map(|coordinate| Coordinate {
            lon: coordinate.lon,
            lat: coordinate.lat + degrees,
        })
        .collect();
    encode_polyline(&shifted, 5)
}

pub fn observation(segment_id: &str, polyline: Option<String>) -> Observation {
    Observation {
        segment_id: segment_id.to_string(),
        timestamp: Some(1_700_000_000),
        polyline,
        ..Default::default()
    }
}

fn parse_features(geojson: &str) -> Vec<ReferenceFeature> {
    let FeatureCollection { features, .. } = geojson.parse().unwrap();

    features
        .into_iter()
        .map(
            |Feature {
                 geometry,
                 properties,
                 ..
             }| {
                let id = properties
                    .as_ref()
                    .and_then(|properties| properties.get("id"))
                    .and_then(|id| id.as_str())
                    .unwrap()
                    .to_string();

                let Some(Value::LineString(line)) = geometry.map(|geometry| geometry.value) else {
                    panic!("fixture features are linestrings");
                };

                ReferenceFeature {
                    id,
                    geometry: line
                        .iter()
                        .map(|position| Coordinate {
                            lon: position[0],
                            lat: position[1],
                        })
                        .collect(),
                }
            },
        )
        .collect()
}
