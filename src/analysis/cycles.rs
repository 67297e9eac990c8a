//! Stroke-cycle detection on a single tracked coordinate.
//!
//! A catch event is a strict local minimum of the series. No smoothing or
//! amplitude threshold is applied, so jitter in the tracked coordinate shows
//! up as extra, shorter cycles.

/// Indices `i` with `series[i-1] > series[i] < series[i+1]`, in order.
pub fn catch_events(series: &[f64]) -> Vec<usize> {
    if series.len() < 3 {
        return Vec::new();
    }
    (1..series.len() - 1)
        .filter(|&i| series[i] < series[i - 1] && series[i] < series[i + 1])
        .collect()
}

/// Duration in seconds of every cycle between consecutive catch events.
pub fn cycle_durations(series: &[f64], fps: f64) -> Vec<f64> {
    catch_events(series)
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) as f64 / fps)
        .collect()
}

/// Mean cycle duration in seconds, `None` with fewer than two catch events.
pub fn mean_cycle_duration(series: &[f64], fps: f64) -> Option<f64> {
    let events = catch_events(series);
    if events.len() < 2 {
        return None;
    }
    let total_gap: usize = events.windows(2).map(|pair| pair[1] - pair[0]).sum();
    let mean_gap = total_gap as f64 / (events.len() - 1) as f64;
    Some(mean_gap / fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A series falling into a minimum at each of `minima` and rising elsewhere.
    fn series_with_minima(len: usize, minima: &[usize]) -> Vec<f64> {
        (0..len)
            .map(|i| {
                minima
                    .iter()
                    .map(|&m| (i as f64 - m as f64).abs())
                    .fold(f64::INFINITY, f64::min)
            })
            .collect()
    }

    #[test]
    fn three_evenly_spaced_catches() {
        let series = series_with_minima(40, &[10, 20, 30]);
        assert_eq!(catch_events(&series), vec![10, 20, 30]);
        assert_eq!(mean_cycle_duration(&series, 10.0), Some(1.0));
        assert_eq!(cycle_durations(&series, 10.0), vec![1.0, 1.0]);
    }

    #[test]
    fn monotonic_series_has_no_cycles() {
        let series: Vec<f64> = (0..50).map(|i| i as f64 * 0.01).collect();
        assert!(catch_events(&series).is_empty());
        assert_eq!(mean_cycle_duration(&series, 30.0), None);
    }

    #[test]
    fn single_catch_is_not_a_cycle() {
        let series = series_with_minima(20, &[8]);
        assert_eq!(catch_events(&series), vec![8]);
        assert_eq!(mean_cycle_duration(&series, 30.0), None);
        assert!(cycle_durations(&series, 30.0).is_empty());
    }

    #[test]
    fn flat_bottoms_are_not_catches() {
        let series = vec![3.0, 1.0, 1.0, 3.0, 2.0, 2.0, 4.0];
        assert!(catch_events(&series).is_empty());
    }

    #[test]
    fn endpoints_are_never_catches() {
        let series = vec![0.0, 1.0, 2.0, 1.0, 0.0];
        assert!(catch_events(&series).is_empty());
        assert!(catch_events(&[1.0, 0.0]).is_empty());
        assert!(catch_events(&[]).is_empty());
    }

    #[test]
    fn uneven_gaps_are_averaged() {
        let series = series_with_minima(30, &[5, 11, 23]);
        // gaps 6 and 12 frames at 12 fps
        assert_eq!(mean_cycle_duration(&series, 12.0), Some(0.75));
        assert_eq!(cycle_durations(&series, 12.0), vec![0.5, 1.0]);
    }
}
