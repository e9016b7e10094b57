//! Geometry comparison between an observed route and its reference segment.
//!
//! Everything here assumes both linestrings live in the same planar metric
//! space (see [`crate::Projection`]); distances are Euclidean meters. The
//! comparator only measures — pass/fail logic belongs to the classifier.

use geo::{Closest, ClosestPoint, Distance as _, Euclidean, Length as _, LineString, Point};

use crate::{Length, ReferenceSegment};

/// Raw metrics of one observed/reference comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryComparison {
    /// Symmetric Hausdorff distance between the two curves.
    pub hausdorff: Length,
    pub observed_length: Length,
    pub reference_length: Length,
    /// observed / reference length; `None` when the reference length is zero.
    pub length_ratio: Option<f64>,
    /// Fraction of the reference lying within the buffer of the observed
    /// path. Unlike the Hausdorff distance this is not symmetric.
    pub coverage: f64,
}

/// Computes all comparison metrics between an observed and a reference
/// linestring. `buffer` is the coverage tolerance around the observed path,
/// `spacing` the arc-length step at which the reference is sampled.
pub fn compare_geometries(
    observed: &LineString,
    reference: &ReferenceSegment,
    buffer: Length,
    spacing: Length,
) -> GeometryComparison {
    let observed_length = Length::from_meters(Euclidean.length(observed));
    let reference_length = reference.length;

    let length_ratio = (reference_length > Length::ZERO)
        .then(|| observed_length.meters() / reference_length.meters());

    GeometryComparison {
        hausdorff: hausdorff_distance(observed, &reference.geometry),
        observed_length,
        reference_length,
        length_ratio,
        coverage: coverage_fraction(observed, &reference.geometry, buffer, spacing),
    }
}

/// Symmetric Hausdorff distance: the greatest of all minimum point-to-curve
/// distances, taken over the vertices of each curve against the whole of the
/// other (discrete Hausdorff, as reference GIS implementations compute it).
pub fn hausdorff_distance(a: &LineString, b: &LineString) -> Length {
    if a.0 == b.0 {
        // identical vertex sequences must measure exactly zero; the
        // projection arithmetic below cannot guarantee that
        return Length::ZERO;
    }

    Length::from_meters(directed_hausdorff(a, b).max(directed_hausdorff(b, a)))
}

fn directed_hausdorff(from: &LineString, to: &LineString) -> f64 {
    from.points()
        .map(|point| distance_to_line_string(point, to))
        .fold(0.0, f64::max)
}

/// Minimum Euclidean distance from a point to any segment of a linestring.
/// Returns infinity for a linestring without segments.
fn distance_to_line_string(point: Point, line_string: &LineString) -> f64 {
    line_string
        .lines()
        .map(|line| {
            if line.start == line.end {
                // degenerate segment: the projection is its only vertex
                return Euclidean.distance(point, line.start_point());
            }
            match line.closest_point(&point) {
                Closest::SinglePoint(closest) | Closest::Intersection(closest) => {
                    Euclidean.distance(point, closest)
                }
                Closest::Indeterminate => Euclidean.distance(point, line.start_point()),
            }
        })
        .fold(f64::INFINITY, f64::min)
}

/// Fraction of the reference within `buffer` of the observed path, estimated
/// by sampling the reference uniformly by arc length. Zero-length references
/// yield 0.0 rather than a division failure.
fn coverage_fraction(
    observed: &LineString,
    reference: &LineString,
    buffer: Length,
    spacing: Length,
) -> f64 {
    let samples = sample_along(reference, spacing);
    if samples.is_empty() {
        return 0.0;
    }

    let buffer = buffer.meters();
    let within = samples
        .iter()
        .filter(|&&sample| distance_to_line_string(sample, observed) <= buffer)
        .count();

    within as f64 / samples.len() as f64
}

/// Uniform arc-length samples of a linestring, including both endpoints.
/// Empty for degenerate (zero-length) inputs.
fn sample_along(line_string: &LineString, spacing: Length) -> Vec<Point> {
    let total = Euclidean.length(line_string);
    if total <= 0.0 {
        return vec![];
    }

    let intervals = (total / spacing.meters()).ceil().max(1.0) as usize;
    let step = total / intervals as f64;

    let mut samples = Vec::with_capacity(intervals + 1);
    let mut accumulated = 0.0;

    for line in line_string.lines() {
        let start = line.start_point();
        let end = line.end_point();
        let segment = Euclidean.distance(start, end);
        if segment == 0.0 {
            continue;
        }

        while samples.len() <= intervals {
            let target = step * samples.len() as f64;
            if target > accumulated + segment {
                break;
            }
            let ratio = (target - accumulated) / segment;
            samples.push(Point::new(
                start.x() + ratio * (end.x() - start.x()),
                start.y() + ratio * (end.y() - start.y()),
            ));
        }

        accumulated += segment;
    }

    // guard against float drift dropping the far endpoint
    if samples.len() <= intervals {
        if let Some(last) = line_string.points().next_back() {
            samples.push(last);
        }
    }

    samples
}
