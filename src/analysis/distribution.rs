use serde::{Deserialize, Serialize};

use crate::analysis::projection::predicted_volume;
use crate::analysis::{ProjectedFruit, ResultStatistics};
use crate::error::HarvestError;
use crate::models::{DiameterWindow, ProjectionRequest};

/// One equal-width interval of predicted volume.
///
/// Covers `[bin_start, bin_end)`, except the last bin of a histogram which is
/// closed at `bin_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub bin_center: f64,
    pub count: usize,
    /// Share of surviving fruits in this bin, 0-100
    pub percentage: f64,
}

/// Where the histogram's volume range came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBasis {
    /// Minimum and maximum of the surviving predicted volumes
    Observed,
    /// All surviving fruits share one predicted volume; bins are at least
    /// 1 mm³ wide starting at that value
    Uniform,
    /// No fruit survived; the range is the predicted volume of the window's
    /// smallest and largest diameter
    WindowImplied,
    /// No fruit survived and no finite reference range exists; every bin is `[0, 0]`
    Collapsed,
}

/// Filtered fruits, their histogram and summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDistribution {
    /// Fruits inside the diameter window, in input order
    pub fruits: Vec<ProjectedFruit>,
    /// Exactly `num_bins` bins ordered by `bin_start`
    pub bins: Vec<HistogramBin>,
    pub statistics: ResultStatistics,
    pub range_basis: RangeBasis,
    /// Valid fruits dropped by the diameter window
    pub filtered_out: usize,
}

/// Fruits whose scan-time diameter lies inside the window (inclusive).
pub fn filter_window<'a>(
    fruits: &'a [ProjectedFruit],
    window: &DiameterWindow,
) -> Vec<&'a ProjectedFruit> {
    fruits
        .iter()
        .filter(|f| window.contains(f.diameter_mm))
        .collect()
}

/// `num_bins + 1` edges spanning `[lo, hi]`.
///
/// Interior edges are shared by neighbouring bins and the final edge is `hi`
/// itself. A zero-width range gets bins starting at `lo` that are 1 mm³ wide,
/// or two ulps of `lo` wide once 1 mm³ no longer moves past `lo`, so the edges
/// always increase.
pub fn bin_edges(lo: f64, hi: f64, num_bins: usize) -> Vec<f64> {
    let n = num_bins.max(1);
    if hi > lo {
        let width = (hi - lo) / n as f64;
        let mut edges: Vec<f64> = (0..n).map(|i| lo + i as f64 * width).collect();
        edges.push(hi);
        edges
    } else {
        let step = (2.0 * lo.abs() * f64::EPSILON).max(1.0);
        (0..=n).map(|i| lo + i as f64 * step).collect()
    }
}

/// Index of the bin a value belongs to.
///
/// Picks the first bin whose end is above the value, so a value sitting on an
/// interior edge goes to the bin starting there. Half-open `[start, end)`
/// containment decides shared edges; the lower neighbour never claims them.
/// Anything at or past the last edge lands in the final bin.
pub fn assign_bin(value: f64, edges: &[f64]) -> usize {
    let last = edges.len().saturating_sub(2);
    edges[1..].partition_point(|&end| end <= value).min(last)
}

/// Filter projected fruits by the request's diameter window, bin their
/// predicted volumes and compute statistics.
///
/// Empty and uniform selections are not errors; see [`RangeBasis`] for how
/// the bin range is chosen in those cases. Fails only when the request itself
/// is invalid.
pub fn aggregate(
    fruits: &[ProjectedFruit],
    request: &ProjectionRequest,
) -> Result<VolumeDistribution, HarvestError> {
    request.validate()?;

    let window = request.window();
    let selected = filter_window(fruits, &window);
    let filtered_out = fruits.len() - selected.len();
    let num_bins = request.num_bins;

    let (edges, range_basis) = if selected.is_empty() {
        let lo = predicted_volume(window.min, request);
        let hi = predicted_volume(window.max, request);
        if lo.is_finite() && hi.is_finite() && hi >= lo {
            (bin_edges(lo, hi, num_bins), RangeBasis::WindowImplied)
        } else {
            (vec![0.0; num_bins + 1], RangeBasis::Collapsed)
        }
    } else {
        let min_pv = selected
            .iter()
            .map(|f| f.predicted_volume)
            .fold(f64::INFINITY, f64::min);
        let max_pv = selected
            .iter()
            .map(|f| f.predicted_volume)
            .fold(f64::NEG_INFINITY, f64::max);
        let basis = if max_pv > min_pv {
            RangeBasis::Observed
        } else {
            RangeBasis::Uniform
        };
        (bin_edges(min_pv, max_pv, num_bins), basis)
    };

    tracing::debug!(
        selected = selected.len(),
        filtered_out,
        lo = edges[0],
        hi = edges[num_bins],
        ?range_basis,
        "binning predicted volumes"
    );

    let mut counts = vec![0usize; num_bins];
    for fruit in &selected {
        counts[assign_bin(fruit.predicted_volume, &edges)] += 1;
    }

    let total = selected.len();
    let bins = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let bin_start = edges[i];
            let bin_end = edges[i + 1];
            HistogramBin {
                bin_start,
                bin_end,
                bin_center: (bin_start + bin_end) / 2.0,
                count,
                percentage: if total > 0 {
                    100.0 * count as f64 / total as f64
                } else {
                    0.0
                },
            }
        })
        .collect();

    let statistics = ResultStatistics::compute(selected.iter().copied());

    Ok(VolumeDistribution {
        fruits: selected.into_iter().cloned().collect(),
        bins,
        statistics,
        range_basis,
        filtered_out,
    })
}
