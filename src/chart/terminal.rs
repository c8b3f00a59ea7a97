//! Terminal chart backend.
//!
//! Stores per-surface data for ratatui's `Chart` widget. The widget itself is
//! built at draw time by `ui::vitals`; this type only holds what to draw.

use std::collections::BTreeMap;

use ratatui::style::Color;

use super::{ChartBackend, ChartError, SurfaceId, SurfaceSpec};

/// Fraction of the value range added above and below the line.
const Y_PADDING: f64 = 0.1;

/// One live chart surface.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    pub spec: SurfaceSpec,
    pub labels: Vec<usize>,
    pub data: Vec<Option<f64>>,
    /// Bumped on every update.
    pub revision: u64,
}

impl TerminalSurface {
    fn new(spec: SurfaceSpec) -> Self {
        Self {
            spec,
            labels: Vec::new(),
            data: Vec::new(),
            revision: 0,
        }
    }

    pub fn color(&self) -> Color {
        let rgb = self.spec.color;
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }

    /// Contiguous runs of present values as `(x, y)` points.
    ///
    /// Missing readings break the line instead of being drawn as zero.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();

        for (label, value) in self.labels.iter().zip(&self.data) {
            match value {
                Some(v) => current.push((*label as f64, *v)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// X range covering every label.
    pub fn x_bounds(&self) -> [f64; 2] {
        let max = self.labels.last().copied().unwrap_or(0).max(1);
        [0.0, max as f64]
    }

    /// Padded Y range, or None if there is nothing to draw.
    pub fn y_bounds(&self) -> Option<[f64; 2]> {
        let mut values = self.data.iter().flatten().copied();
        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let range = max - min;
        let pad = if range > 0.0 {
            range * Y_PADDING
        } else {
            (max.abs() * Y_PADDING).max(1.0)
        };
        Some([min - pad, max + pad])
    }
}

/// Chart backend that renders into the terminal.
#[derive(Debug, Default)]
pub struct TerminalCharts {
    surfaces: BTreeMap<SurfaceId, TerminalSurface>,
    next_id: u32,
}

impl TerminalCharts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&TerminalSurface> {
        self.surfaces.get(&id)
    }

    /// Number of surfaces currently alive.
    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }
}

impl ChartBackend for TerminalCharts {
    fn create_surface(&mut self, spec: &SurfaceSpec) -> Result<SurfaceId, ChartError> {
        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        self.surfaces.insert(id, TerminalSurface::new(spec.clone()));
        Ok(id)
    }

    fn update_surface(
        &mut self,
        id: SurfaceId,
        labels: &[usize],
        data: &[Option<f64>],
    ) -> Result<(), ChartError> {
        if labels.len() != data.len() {
            return Err(ChartError::LengthMismatch {
                labels: labels.len(),
                data: data.len(),
            });
        }
        let surface = self.surfaces.get_mut(&id).ok_or(ChartError::UnknownSurface(id))?;
        surface.labels.clear();
        surface.labels.extend_from_slice(labels);
        surface.data.clear();
        surface.data.extend_from_slice(data);
        surface.revision += 1;
        Ok(())
    }

    fn destroy_surface(&mut self, id: SurfaceId) -> Result<(), ChartError> {
        self.surfaces.remove(&id).map(|_| ()).ok_or(ChartError::UnknownSurface(id))
    }
}
