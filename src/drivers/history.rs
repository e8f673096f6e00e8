use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::drivers::{
    BrainwaveSample, ChannelSample, DensityCell, FrequencyPoint, SampleBundle, ScopeConfig,
    ScopeError, TimePoint,
};

/// Owned copy of every series, ready to serialise or hand to a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub num_channels: usize,
    pub latest_tick: Option<u64>,
    pub raw: Vec<ChannelSample>,
    pub frequency: Vec<FrequencyPoint>,
    pub time: Vec<TimePoint>,
    pub brainwave: Vec<BrainwaveSample>,
    pub density: Vec<DensityCell>,
}
/// Windowed history of generator output, oldest entry first in every series.
pub struct HistoryStore {
    num_channels: usize,
    raw: VecDeque<ChannelSample>,
    frequency: VecDeque<FrequencyPoint>,
    time: VecDeque<TimePoint>,
    brainwave: VecDeque<BrainwaveSample>,
    density: VecDeque<DensityCell>,
    raw_capacity: Option<usize>,
    frequency_capacity: Option<usize>,
    series_window: usize,
    density_capacity: usize,
    latest_tick: Option<u64>,
}
impl HistoryStore {
    pub fn from_config(config: &ScopeConfig) -> Self {
        let series_window = config.series_window;
        Self {
            num_channels: config.num_channels,
            raw: VecDeque::new(),
            frequency: VecDeque::new(),
            time: VecDeque::with_capacity(series_window + 1),
            brainwave: VecDeque::with_capacity(series_window + 1),
            density: VecDeque::with_capacity(config.density_capacity() + config.num_channels),
            raw_capacity: config.raw_capacity,
            frequency_capacity: config.frequency_capacity,
            series_window,
            density_capacity: config.density_capacity(),
            latest_tick: None,
        }
    }
    /// Appends one tick's worth of data, then trims every bounded series from the front.
    /// A bundle of the wrong width is rejected and leaves the store untouched.
    pub fn append(&mut self, bundle: SampleBundle) -> Result<(), ScopeError> {
        bundle.check_width(self.num_channels)?;
        self.latest_tick = Some(bundle.tick);
        push_bounded(&mut self.raw, bundle.channels, self.raw_capacity);
        push_bounded(&mut self.frequency, bundle.frequency, self.frequency_capacity);
        push_bounded(&mut self.time, bundle.time, Some(self.series_window));
        push_bounded(&mut self.brainwave, bundle.brainwave, Some(self.series_window));
        self.density.extend(bundle.density);
        trim_front(&mut self.density, self.density_capacity);
        Ok(())
    }
    pub fn clear(&mut self) {
        self.raw.clear();
        self.frequency.clear();
        self.time.clear();
        self.brainwave.clear();
        self.density.clear();
        self.latest_tick = None;
    }
    pub fn raw_series(&self) -> &VecDeque<ChannelSample> {
        &self.raw
    }
    pub fn frequency_series(&self) -> &VecDeque<FrequencyPoint> {
        &self.frequency
    }
    pub fn time_series(&self) -> &VecDeque<TimePoint> {
        &self.time
    }
    pub fn brainwave_series(&self) -> &VecDeque<BrainwaveSample> {
        &self.brainwave
    }
    pub fn density_grid(&self) -> &VecDeque<DensityCell> {
        &self.density
    }
    pub fn latest_tick(&self) -> Option<u64> {
        self.latest_tick
    }
    pub fn is_empty(&self) -> bool {
        self.latest_tick.is_none()
    }
    /// Full copy of every series.
    pub fn snapshot(&self) -> HistorySnapshot {
        self.recent(usize::MAX, usize::MAX)
    }
    /// Copy that keeps only the newest `raw_ticks` raw samples and `frequency_points`
    /// frequency points. The windowed series are copied whole.
    pub fn recent(&self, raw_ticks: usize, frequency_points: usize) -> HistorySnapshot {
        HistorySnapshot {
            num_channels: self.num_channels,
            latest_tick: self.latest_tick(),
            raw: tail(self.raw_series(), raw_ticks),
            frequency: tail(self.frequency_series(), frequency_points),
            time: tail(self.time_series(), usize::MAX),
            brainwave: tail(self.brainwave_series(), usize::MAX),
            density: tail(self.density_grid(), usize::MAX),
        }
    }
}
fn tail<T: Clone>(queue: &VecDeque<T>, count: usize) -> Vec<T> {
    let skip = queue.len().saturating_sub(count);
    queue.iter().skip(skip).cloned().collect()
}
fn push_bounded<T>(queue: &mut VecDeque<T>, item: T, capacity: Option<usize>) {
    queue.push_back(item);
    if let Some(capacity) = capacity {
        trim_front(queue, capacity);
    }
}
fn trim_front<T>(queue: &mut VecDeque<T>, capacity: usize) {
    while queue.len() > capacity {
        queue.pop_front();
    }
}
