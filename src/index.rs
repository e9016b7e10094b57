use geo::{Euclidean, Length as _, LineString};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{Coordinate, Length, Projection};

/// One feature of the canonical road network, as delivered by the upstream
/// preprocessing: a unique identifier and a WGS84 linestring.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFeature {
    pub id: String,
    pub geometry: Vec<Coordinate>,
}

/// Indexed reference segment: planar geometry plus its derived length.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSegment {
    pub geometry: LineString,
    pub length: Length,
}

/// Identifier → reference segment lookup. Built once per run, read-only
/// afterwards, and shared by reference across validation workers.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    segments: FxHashMap<String, ReferenceSegment>,
}

impl ReferenceIndex {
    /// Builds the index, projecting every feature into the planar space.
    ///
    /// Duplicate identifiers keep the last definition; each duplicate is
    /// logged so the caller can audit the reference data.
    pub fn from_features(
        features: impl IntoIterator<Item = ReferenceFeature>,
        projection: &impl Projection,
    ) -> Self {
        let mut segments = FxHashMap::default();

        for ReferenceFeature { id, geometry } in features {
            let geometry = projection.project_line(&geometry);
            let length = Length::from_meters(Euclidean.length(&geometry));

            if let Some(previous) = segments.insert(id.clone(), ReferenceSegment { geometry, length })
            {
                warn!(
                    "Duplicate reference segment {id}: replacing {:?} with the last definition",
                    previous.length
                );
            }
        }

        debug!("Reference index holds {} segments", segments.len());
        Self { segments }
    }

    /// Looks a segment up. A miss is data, not an error: the batch validator
    /// records it per row instead of aborting.
    pub fn get(&self, segment_id: &str) -> Option<&ReferenceSegment> {
        self.segments.get(segment_id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::Planar;

    fn feature(id: &str, geometry: Vec<Coordinate>) -> ReferenceFeature {
        ReferenceFeature {
            id: id.to_string(),
            geometry,
        }
    }

    #[test]
    fn index_projects_and_measures_features() {
        let index = ReferenceIndex::from_features(
            [feature(
                "s_1-2",
                vec![
                    Coordinate { lon: 0.0, lat: 0.0 },
                    Coordinate {
                        lon: 300.0,
                        lat: 400.0,
                    },
                ],
            )],
            &Planar,
        );

        assert_eq!(index.len(), 1);
        let segment = index.get("s_1-2").unwrap();
        assert_eq!(segment.length, Length::from_meters(500.0));
    }

    #[test]
    fn lookup_miss_returns_none() {
        let index = ReferenceIndex::from_features([], &Planar);
        assert!(index.is_empty());
        assert_eq!(index.get("s_1-2"), None);
    }

    #[test]
    fn duplicate_identifiers_keep_the_last_definition() {
        let index = ReferenceIndex::from_features(
            [
                feature(
                    "s_1-2",
                    vec![
                        Coordinate { lon: 0.0, lat: 0.0 },
                        Coordinate {
                            lon: 100.0,
                            lat: 0.0,
                        },
                    ],
                ),
                feature(
                    "s_1-2",
                    vec![
                        Coordinate { lon: 0.0, lat: 0.0 },
                        Coordinate {
                            lon: 200.0,
                            lat: 0.0,
                        },
                    ],
                ),
            ],
            &Planar,
        );

        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get("s_1-2").unwrap().length,
            Length::from_meters(200.0)
        );
    }
}
