//! Rolling per-metric windows for the trend charts.

use super::sample::{Metric, Sample};

/// Maximum number of samples kept per metric.
pub const MAX_POINTS: usize = 60;

/// The most recent samples of the selected device, split per charted metric.
///
/// The three series are always the same length and index-aligned: index `i`
/// in each of them came from the same source record. Missing readings are
/// kept as `None` so alignment survives gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Window {
    pub hr: Vec<Option<f64>>,
    pub spo2: Vec<Option<f64>>,
    pub temp: Vec<Option<f64>>,
}

/// Summary of the present values in one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of non-missing values.
    pub count: usize,
}

/// Build a window from a device's record history.
///
/// Takes the trailing `MAX_POINTS` records in their original order. The result
/// replaces the previous window wholesale; nothing is merged.
pub fn derive_window(records: &[Sample]) -> Window {
    let start = records.len().saturating_sub(MAX_POINTS);
    let tail = &records[start..];

    Window {
        hr: tail.iter().map(|s| s.hr).collect(),
        spo2: tail.iter().map(|s| s.spo2).collect(),
        temp: tail.iter().map(|s| s.temp).collect(),
    }
}

impl Window {
    pub fn len(&self) -> usize {
        self.hr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hr.is_empty()
    }

    /// The series for a charted metric. Humidity is not windowed.
    pub fn series(&self, metric: Metric) -> Option<&[Option<f64>]> {
        match metric {
            Metric::HeartRate => Some(self.hr.as_slice()),
            Metric::Spo2 => Some(self.spo2.as_slice()),
            Metric::Temperature => Some(self.temp.as_slice()),
            Metric::Humidity => None,
        }
    }

    /// Synthetic x-axis labels: `0..len`. Charts show shape, not wall time.
    pub fn labels(&self) -> Vec<usize> {
        (0..self.len()).collect()
    }

    /// Min/max/mean over the present values of a series.
    ///
    /// Returns None if the series has no values at all.
    pub fn stats(&self, metric: Metric) -> Option<SeriesStats> {
        let values: Vec<f64> = self.series(metric)?.iter().flatten().copied().collect();
        if values.is_empty() {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        Some(SeriesStats {
            min,
            max,
            mean,
            count: values.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: usize) -> Sample {
        Sample {
            hr: Some(i as f64),
            spo2: Some(90.0 + (i % 10) as f64),
            temp: Some(36.0 + i as f64 / 100.0),
            hum: Some(50.0),
            device_id: "dev".to_string(),
            received_time: Some(format!("t{}", i)),
        }
    }

    #[test]
    fn test_derive_window_keeps_last_sixty() {
        let records: Vec<Sample> = (0..100).map(record).collect();
        let window = derive_window(&records);

        assert_eq!(window.len(), MAX_POINTS);
        assert_eq!(window.spo2.len(), MAX_POINTS);
        assert_eq!(window.temp.len(), MAX_POINTS);

        let expected: Vec<Option<f64>> = (40..100).map(|i| Some(i as f64)).collect();
        assert_eq!(window.hr, expected);
        assert_eq!(window.temp[0], records[40].temp);
        assert_eq!(window.temp[59], records[99].temp);
    }

    #[test]
    fn test_derive_window_short_history() {
        let records: Vec<Sample> = (0..5).map(record).collect();
        let window = derive_window(&records);
        assert_eq!(window.len(), 5);
        assert_eq!(window.hr[0], Some(0.0));
        assert_eq!(window.hr[4], Some(4.0));
    }

    #[test]
    fn test_derive_window_empty() {
        let window = derive_window(&[]);
        assert!(window.is_empty());
        assert!(window.labels().is_empty());
    }

    #[test]
    fn test_missing_metrics_stay_aligned() {
        let records = vec![
            Sample {
                hr: Some(70.0),
                ..Default::default()
            },
            Sample {
                spo2: Some(98.0),
                temp: Some(36.5),
                ..Default::default()
            },
        ];
        let window = derive_window(&records);

        assert_eq!(window.hr, vec![Some(70.0), None]);
        assert_eq!(window.spo2, vec![None, Some(98.0)]);
        assert_eq!(window.temp, vec![None, Some(36.5)]);
    }

    #[test]
    fn test_lengths_equal_for_every_history_size() {
        for n in [0, 1, 59, 60, 61, 250] {
            let records: Vec<Sample> = (0..n).map(record).collect();
            let window = derive_window(&records);
            assert_eq!(window.hr.len(), window.spo2.len());
            assert_eq!(window.spo2.len(), window.temp.len());
            assert!(window.len() <= MAX_POINTS);
            assert_eq!(window.len(), n.min(MAX_POINTS));
        }
    }

    #[test]
    fn test_labels_are_sequential() {
        let records: Vec<Sample> = (0..3).map(record).collect();
        assert_eq!(derive_window(&records).labels(), vec![0, 1, 2]);
    }

    #[test]
    fn test_stats_skip_missing() {
        let window = Window {
            hr: vec![Some(60.0), None, Some(80.0)],
            spo2: vec![None, None, None],
            temp: vec![Some(36.0), Some(37.0), None],
        };

        let hr = window.stats(Metric::HeartRate).unwrap();
        assert_eq!(hr.min, 60.0);
        assert_eq!(hr.max, 80.0);
        assert_eq!(hr.mean, 70.0);
        assert_eq!(hr.count, 2);

        assert!(window.stats(Metric::Spo2).is_none());
        assert!(window.stats(Metric::Humidity).is_none());
    }
}
