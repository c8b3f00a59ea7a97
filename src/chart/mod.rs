//! Chart renderer bridge.
//!
//! The view owns one [`ChartBridge`], which owns three chart surfaces (heart
//! rate, SpO₂, temperature) on some [`ChartBackend`]. Surfaces are created
//! once on activation, fed a fresh window on every update, and destroyed
//! together on release. They are never recreated per tick.
//!
//! Every backend call is fallible, and failures stay local: a surface that
//! fails to create or update is logged and skipped while the other surfaces,
//! the latest-values panel and the alerts carry on.

mod terminal;

pub use terminal::{TerminalCharts, TerminalSurface};

use std::fmt;

use thiserror::Error;

use crate::data::{Metric, Window};

/// Opaque handle to a surface on a [`ChartBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("unknown chart surface {0:?}")]
    UnknownSurface(SurfaceId),

    #[error("label count {labels} does not match data count {data}")]
    LengthMismatch { labels: usize, data: usize },

    #[error("chart backend error: {0}")]
    Backend(String),
}

/// 24-bit line color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// How a surface should look. Backends honor what they can express.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    pub metric: Metric,
    pub color: Rgb,
    pub animation: bool,
    pub show_x_labels: bool,
    pub show_legend: bool,
    pub point_radius: u8,
    pub line_width: u8,
    pub tension: f32,
}

impl SurfaceSpec {
    /// The fixed trend-line style used for every vitals chart.
    pub fn for_metric(metric: Metric) -> Self {
        Self {
            metric,
            color: line_color(metric),
            animation: false,
            show_x_labels: false,
            show_legend: false,
            point_radius: 0,
            line_width: 2,
            tension: 0.25,
        }
    }
}

fn line_color(metric: Metric) -> Rgb {
    match metric {
        Metric::HeartRate => Rgb(0xff, 0x63, 0x61),
        Metric::Spo2 => Rgb(0x36, 0xa2, 0xeb),
        Metric::Temperature => Rgb(0xf7, 0xb2, 0x67),
        Metric::Humidity => Rgb(0x8d, 0xd3, 0xc7),
    }
}

/// Minimal capability interface of a charting backend.
pub trait ChartBackend {
    fn create_surface(&mut self, spec: &SurfaceSpec) -> Result<SurfaceId, ChartError>;

    /// Replace the surface's data and redraw it.
    fn update_surface(
        &mut self,
        id: SurfaceId,
        labels: &[usize],
        data: &[Option<f64>],
    ) -> Result<(), ChartError>;

    fn destroy_surface(&mut self, id: SurfaceId) -> Result<(), ChartError>;
}

/// Owns the three trend surfaces and keeps them in sync with the window.
#[derive(Debug)]
pub struct ChartBridge<B: ChartBackend> {
    backend: B,
    surfaces: [Option<SurfaceId>; 3],
}

impl<B: ChartBackend> ChartBridge<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            surfaces: [None; 3],
        }
    }

    /// Create any surface that does not exist yet.
    pub fn activate(&mut self) {
        for (slot, metric) in self.surfaces.iter_mut().zip(Metric::CHARTED) {
            if slot.is_some() {
                continue;
            }
            match self.backend.create_surface(&SurfaceSpec::for_metric(metric)) {
                Ok(id) => *slot = Some(id),
                Err(e) => {
                    tracing::error!(metric = metric.label(), error = %e, "Error initializing chart");
                }
            }
        }
    }

    /// Push a window into every live surface.
    pub fn push(&mut self, window: &Window) {
        let labels = window.labels();
        for (slot, metric) in self.surfaces.iter().zip(Metric::CHARTED) {
            let Some(id) = slot else {
                continue;
            };
            let data = window.series(metric).unwrap_or_default();
            if let Err(e) = self.backend.update_surface(*id, &labels, data) {
                tracing::error!(metric = metric.label(), error = %e, "Error updating chart");
            }
        }
    }

    /// Destroy all surfaces.
    pub fn release(&mut self) {
        for (slot, metric) in self.surfaces.iter_mut().zip(Metric::CHARTED) {
            let Some(id) = slot.take() else {
                continue;
            };
            if let Err(e) = self.backend.destroy_surface(id) {
                tracing::warn!(metric = metric.label(), error = %e, "Error destroying chart");
            }
        }
    }

    /// The surface showing `metric`, if it was created.
    pub fn surface(&self, metric: Metric) -> Option<SurfaceId> {
        let index = Metric::CHARTED.iter().position(|m| *m == metric)?;
        self.surfaces[index]
    }

    pub fn is_active(&self) -> bool {
        self.surfaces.iter().any(Option::is_some)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChartBackend> Drop for ChartBridge<B> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::data::{derive_window, Sample};

    #[derive(Debug, Default)]
    struct Log {
        created: Vec<Metric>,
        updates: HashMap<SurfaceId, Vec<Vec<Option<f64>>>>,
        destroyed: Vec<SurfaceId>,
        fail_create: Option<Metric>,
        fail_update: Option<Metric>,
        specs: HashMap<SurfaceId, SurfaceSpec>,
    }

    #[derive(Debug, Default, Clone)]
    struct Recording(Rc<RefCell<Log>>);

    impl ChartBackend for Recording {
        fn create_surface(&mut self, spec: &SurfaceSpec) -> Result<SurfaceId, ChartError> {
            let mut log = self.0.borrow_mut();
            if log.fail_create == Some(spec.metric) {
                return Err(ChartError::Backend("no canvas".to_string()));
            }
            log.created.push(spec.metric);
            let id = SurfaceId(log.created.len() as u32);
            log.specs.insert(id, spec.clone());
            Ok(id)
        }

        fn update_surface(
            &mut self,
            id: SurfaceId,
            labels: &[usize],
            data: &[Option<f64>],
        ) -> Result<(), ChartError> {
            let mut log = self.0.borrow_mut();
            let metric = log.specs.get(&id).map(|s| s.metric);
            if metric.is_some() && metric == log.fail_update {
                return Err(ChartError::Backend("context lost".to_string()));
            }
            assert_eq!(labels.len(), data.len());
            log.updates.entry(id).or_default().push(data.to_vec());
            Ok(())
        }

        fn destroy_surface(&mut self, id: SurfaceId) -> Result<(), ChartError> {
            self.0.borrow_mut().destroyed.push(id);
            Ok(())
        }
    }

    fn window(n: usize) -> Window {
        let records: Vec<Sample> = (0..n)
            .map(|i| Sample {
                hr: Some(60.0 + i as f64),
                spo2: Some(97.0),
                temp: Some(36.5),
                ..Default::default()
            })
            .collect();
        derive_window(&records)
    }

    #[test]
    fn test_activate_creates_three_configured_surfaces() {
        let log = Recording::default();
        let mut bridge = ChartBridge::new(log.clone());
        bridge.activate();

        let recorded = log.0.borrow();
        assert_eq!(
            recorded.created,
            vec![Metric::HeartRate, Metric::Spo2, Metric::Temperature]
        );
        for spec in recorded.specs.values() {
            assert!(!spec.animation);
            assert!(!spec.show_x_labels);
            assert!(!spec.show_legend);
            assert_eq!(spec.point_radius, 0);
            assert_eq!(spec.line_width, 2);
            assert_eq!(spec.tension, 0.25);
        }
    }

    #[test]
    fn test_surfaces_reused_across_pushes() {
        let log = Recording::default();
        let mut bridge = ChartBridge::new(log.clone());
        bridge.activate();
        bridge.activate();

        for n in [1, 30, 90] {
            bridge.push(&window(n));
        }

        let recorded = log.0.borrow();
        assert_eq!(recorded.created.len(), 3);
        let hr = bridge.surface(Metric::HeartRate).unwrap();
        let pushes = &recorded.updates[&hr];
        assert_eq!(pushes.len(), 3);
        assert_eq!(pushes[2].len(), 60);
        assert_eq!(pushes[2][59], Some(149.0));
    }

    #[test]
    fn test_failed_surface_does_not_block_others() {
        let log = Recording::default();
        log.0.borrow_mut().fail_create = Some(Metric::Spo2);
        log.0.borrow_mut().fail_update = Some(Metric::HeartRate);

        let mut bridge = ChartBridge::new(log.clone());
        bridge.activate();
        assert!(bridge.surface(Metric::Spo2).is_none());
        assert!(bridge.is_active());

        bridge.push(&window(5));

        let temp = bridge.surface(Metric::Temperature).unwrap();
        let hr = bridge.surface(Metric::HeartRate).unwrap();
        let recorded = log.0.borrow();
        assert_eq!(recorded.updates[&temp].len(), 1);
        assert!(!recorded.updates.contains_key(&hr));
    }

    #[test]
    fn test_release_destroys_all_once() {
        let log = Recording::default();
        {
            let mut bridge = ChartBridge::new(log.clone());
            bridge.activate();
            bridge.release();
            assert!(!bridge.is_active());
            // Dropping after release must not destroy again.
        }
        assert_eq!(log.0.borrow().destroyed.len(), 3);
    }

    #[test]
    fn test_drop_releases_surfaces() {
        let log = Recording::default();
        {
            let mut bridge = ChartBridge::new(log.clone());
            bridge.activate();
        }
        assert_eq!(log.0.borrow().destroyed.len(), 3);
    }

    #[test]
    fn test_empty_window_clears_surfaces() {
        let log = Recording::default();
        let mut bridge = ChartBridge::new(log.clone());
        bridge.activate();
        bridge.push(&window(10));
        bridge.push(&Window::default());

        let temp = bridge.surface(Metric::Temperature).unwrap();
        assert!(log.0.borrow().updates[&temp][1].is_empty());
    }

    #[test]
    fn test_line_colors() {
        assert_eq!(SurfaceSpec::for_metric(Metric::HeartRate).color.to_string(), "#ff6361");
        assert_eq!(SurfaceSpec::for_metric(Metric::Spo2).color.to_string(), "#36a2eb");
        assert_eq!(SurfaceSpec::for_metric(Metric::Temperature).color.to_string(), "#f7b267");
    }
}
