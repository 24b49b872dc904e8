//! Charts keyed by controller id, in registration order.

use indexmap::IndexMap;

use crate::chart::Chart;
use crate::error::{EngineError, EngineResult};
use crate::types::ChartId;

#[derive(Default)]
pub struct ChartRegistry {
    charts: IndexMap<ChartId, Chart>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chart: Chart) -> EngineResult<()> {
        if self.charts.contains_key(&chart.id) {
            return Err(EngineError::DuplicateChart(chart.id));
        }
        self.charts.insert(chart.id, chart);
        Ok(())
    }

    /// Remove a chart, keeping the order of the rest.
    pub fn remove(&mut self, id: ChartId) -> EngineResult<Chart> {
        self.charts
            .shift_remove(&id)
            .ok_or(EngineError::UnknownChart(id))
    }

    pub fn get(&self, id: ChartId) -> EngineResult<&Chart> {
        self.charts.get(&id).ok_or(EngineError::UnknownChart(id))
    }

    pub fn get_mut(&mut self, id: ChartId) -> EngineResult<&mut Chart> {
        self.charts.get_mut(&id).ok_or(EngineError::UnknownChart(id))
    }

    pub fn contains(&self, id: ChartId) -> bool {
        self.charts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chart> {
        self.charts.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chart> {
        self.charts.values_mut()
    }

    /// Visible charts with a non-zero size.
    pub fn active_count(&self) -> usize {
        self.iter().filter(|c| c.is_active()).count()
    }

    /// Whether some chart would be drawn by the next frame.
    pub fn has_pending(&self) -> bool {
        self.iter().any(|c| c.is_active() && c.is_dirty())
    }

    /// Take every chart out, in registration order.
    pub fn drain(&mut self) -> Vec<Chart> {
        self.charts.drain(..).map(|(_, chart)| chart).collect()
    }
}
