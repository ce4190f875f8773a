/// Peak clustering and merging for one chromosome/strand partition
///
/// Peaks arrive sorted by start. A single open cluster is extended while the
/// next peak starts before `open_end + merge_dist`; otherwise the cluster is
/// closed into one fixed-size consensus peak and a new cluster opens.
use crate::activity::ActivitySet;
use crate::peak::Peak;
use crate::window::normalize_window;
use anyhow::{bail, Result};

/// Parameters shared by every partition of a run
#[derive(Debug, Clone, Copy)]
pub struct MergeParams {
    /// Gap under which peaks coalesce; negative values require that much overlap
    pub merge_dist: i64,
    /// Length of every emitted consensus peak
    pub peak_size: u64,
}

impl Default for MergeParams {
    fn default() -> Self {
        MergeParams {
            merge_dist: 0,
            peak_size: 600,
        }
    }
}

/// Collapse a cluster into one consensus peak.
///
/// The center is the mean of member midpoints weighted by `1 + |act|`; the
/// activity set is the union over members.
pub fn merge_peaks(peaks: &[Peak], peak_size: u64, chrom_len: Option<u64>) -> Option<Peak> {
    if peaks.is_empty() {
        return None;
    }

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut merge_act = ActivitySet::new();

    for p in peaks {
        let weight = p.weight();
        weighted_sum += p.midpoint() * weight;
        weight_total += weight;
        merge_act.union_with(&p.act);
    }

    let (start, end) = normalize_window(weighted_sum / weight_total, peak_size, chrom_len);
    Some(Peak::new(start, end, merge_act))
}

/// Streaming clusterer for one partition
pub struct PeakClusterer {
    params: MergeParams,
    chrom_len: Option<u64>,
    open_peaks: Vec<Peak>,
    open_end: u64,
    last_start: u64,
}

impl PeakClusterer {
    pub fn new(params: MergeParams, chrom_len: Option<u64>) -> Self {
        PeakClusterer {
            params,
            chrom_len,
            open_peaks: Vec::new(),
            open_end: 0,
            last_start: 0,
        }
    }

    /// Add the next peak; returns the consensus peak of a cluster it closed, if any
    pub fn push(&mut self, peak: Peak) -> Result<Option<Peak>> {
        if self.open_peaks.is_empty() {
            self.open(peak);
            return Ok(None);
        }

        if peak.start < self.last_start {
            bail!(
                "Peaks out of order: start {} follows start {}",
                peak.start,
                self.last_start
            );
        }

        // widened: merge_dist may be any i64
        if self.open_end as i128 + self.params.merge_dist as i128 <= peak.start as i128 {
            let closed = self.close();
            self.open(peak);
            Ok(closed)
        } else {
            self.open_end = self.open_end.max(peak.end);
            self.last_start = peak.start;
            self.open_peaks.push(peak);
            Ok(None)
        }
    }

    /// Close the cluster still open at the end of input
    pub fn finish(&mut self) -> Option<Peak> {
        self.close()
    }

    /// Number of peaks in the open cluster
    pub fn open_len(&self) -> usize {
        self.open_peaks.len()
    }

    fn open(&mut self, peak: Peak) {
        self.open_end = peak.end;
        self.last_start = peak.start;
        self.open_peaks.push(peak);
    }

    fn close(&mut self) -> Option<Peak> {
        let merged = merge_peaks(&self.open_peaks, self.params.peak_size, self.chrom_len);
        self.open_peaks.clear();
        merged
    }
}

/// Merge a whole start-sorted partition
pub fn merge_sorted_peaks<I>(peaks: I, params: MergeParams, chrom_len: Option<u64>) -> Result<Vec<Peak>>
where
    I: IntoIterator<Item = Peak>,
{
    let mut clusterer = PeakClusterer::new(params, chrom_len);
    let mut merged = Vec::new();

    for peak in peaks {
        if let Some(mpeak) = clusterer.push(peak)? {
            merged.push(mpeak);
        }
    }
    merged.extend(clusterer.finish());

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(start: u64, end: u64, act: &str) -> Peak {
        Peak::new(start, end, act.parse().unwrap())
    }

    fn params(merge_dist: i64, peak_size: u64) -> MergeParams {
        MergeParams {
            merge_dist,
            peak_size,
        }
    }

    #[test]
    fn test_nearby_peaks_merge() {
        let peaks = vec![peak(100, 150, "0"), peak(155, 200, "1")];
        let merged = merge_sorted_peaks(peaks, params(10, 100), None).unwrap();

        assert_eq!(merged.len(), 1);
        // midpoints 124.5 and 177, equal weights -> 150.75 -> 151
        assert_eq!(merged[0].start, 101);
        assert_eq!(merged[0].end, 201);
        assert_eq!(merged[0].act.to_string(), "0,1");
    }

    #[test]
    fn test_distant_peaks_split() {
        let peaks = vec![peak(100, 150, "0"), peak(400, 450, "0")];
        let merged = merge_sorted_peaks(peaks, params(0, 100), None).unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|p| p.len() == 100));
    }

    #[test]
    fn test_touching_peaks_split_at_zero() {
        // open_end + 0 <= start closes the cluster
        let touching = vec![peak(100, 150, "0"), peak(150, 200, "1")];
        assert_eq!(merge_sorted_peaks(touching, params(0, 100), None).unwrap().len(), 2);

        let overlapping = vec![peak(100, 150, "0"), peak(149, 200, "1")];
        assert_eq!(merge_sorted_peaks(overlapping, params(0, 100), None).unwrap().len(), 1);

        let within_one = vec![peak(100, 150, "0"), peak(150, 200, "1")];
        assert_eq!(merge_sorted_peaks(within_one, params(1, 100), None).unwrap().len(), 1);
    }

    #[test]
    fn test_extreme_merge_distances() {
        let peaks = vec![peak(100, 150, "0"), peak(400, 450, "1")];
        let merged = merge_sorted_peaks(peaks.clone(), params(i64::MAX, 100), None).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].act.to_string(), "0,1");

        assert_eq!(merge_sorted_peaks(peaks, params(i64::MIN, 100), None).unwrap().len(), 2);
    }

    #[test]
    fn test_negative_distance_requires_overlap() {
        // overlap of 10: 150 - 20 = 130 <= 140, so they split
        let peaks = vec![peak(100, 150, "0"), peak(140, 200, "1")];
        assert_eq!(merge_sorted_peaks(peaks.clone(), params(-20, 100), None).unwrap().len(), 2);
        assert_eq!(merge_sorted_peaks(peaks, params(-5, 100), None).unwrap().len(), 1);
    }

    #[test]
    fn test_open_end_tracks_longest_member() {
        // The second peak is nested in the first; the third still reaches the long first peak
        let peaks = vec![peak(100, 1000, "0"), peak(200, 300, "1"), peak(900, 950, "2")];
        let merged = merge_sorted_peaks(peaks, params(0, 600), None).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].act.to_string(), "0,1,2");
    }

    #[test]
    fn test_weighting_pulls_center() {
        // Left peak carries three labels (weight 4), right peak none (weight 1)
        let peaks = vec![peak(0, 101, "0,1,2"), peak(50, 151, ".")];
        let merged = merge_peaks(&peaks, 10, None).unwrap();
        // mids 50 and 100 -> (200 + 100) / 5 = 60
        assert_eq!((merged.start, merged.end), (55, 65));
    }

    #[test]
    fn test_single_peak_resized() {
        let merged = merge_peaks(&[peak(1000, 1010, "3")], 600, Some(1_000_000)).unwrap();
        assert_eq!((merged.start, merged.end), (705, 1305));
        assert_eq!(merged.act.to_string(), "3");
    }

    #[test]
    fn test_chromosome_end_clamp() {
        let merged = merge_peaks(&[peak(9_950, 10_000, "0")], 600, Some(10_000)).unwrap();
        assert_eq!((merged.start, merged.end), (9_400, 10_000));
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_peaks(&[], 600, None).is_none());
        assert!(merge_sorted_peaks(Vec::new(), MergeParams::default(), None).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let peaks = vec![peak(500, 600, "0"), peak(100, 200, "1")];
        assert!(merge_sorted_peaks(peaks, params(-1000, 100), None).is_err());
    }

    #[test]
    fn test_streaming_matches_batch() {
        let peaks = vec![
            peak(100, 150, "0"),
            peak(140, 190, "1"),
            peak(800, 900, "."),
            peak(2000, 2100, "2"),
        ];
        let batch = merge_sorted_peaks(peaks.clone(), params(0, 200), None).unwrap();

        let mut clusterer = PeakClusterer::new(params(0, 200), None);
        let mut streamed = Vec::new();
        for p in peaks {
            streamed.extend(clusterer.push(p).unwrap());
        }
        assert_eq!(clusterer.open_len(), 1);
        streamed.extend(clusterer.finish());
        assert_eq!(clusterer.open_len(), 0);

        assert_eq!(batch, streamed);
        assert_eq!(batch.len(), 3);
    }
}
