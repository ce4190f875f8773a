//! Fixed-size window placement around a merged peak center

/// Round a weighted midpoint half-up to an integer coordinate
pub fn round_half_up(value: f64) -> u64 {
    let rounded = (value + 0.5).floor();
    if rounded <= 0.0 {
        0
    } else {
        rounded as u64
    }
}

/// Place a `peak_size` window around `weighted_mid`.
///
/// The window starts at `mid - peak_size / 2` (never below 0). When the
/// chromosome length is known and the window runs past it, the window is
/// shifted left so that it ends exactly at the chromosome end. A chromosome
/// shorter than `peak_size` pins the window to `[0, peak_size)`.
pub fn normalize_window(weighted_mid: f64, peak_size: u64, chrom_len: Option<u64>) -> (u64, u64) {
    let mid = round_half_up(weighted_mid);
    let mut start = mid.saturating_sub(peak_size / 2);
    let mut end = start.saturating_add(peak_size);

    if let Some(len) = chrom_len {
        if end > len {
            end = len.max(peak_size);
            start = end - peak_size;
        }
    }

    (start, end)
}
