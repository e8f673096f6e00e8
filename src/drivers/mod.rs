// src/drivers/mod.rs
// 模拟信号核心：生成器、窗口历史、配置与导出
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod history;
pub mod palette;
pub mod plot;
pub mod sample;
pub mod source;
// 公开导出这些模块里的结构体，方便外部调用
pub use config::ScopeConfig;
pub use error::ScopeError;
pub use export::export_snapshot;
pub use generator::SignalGenerator;
pub use history::{HistorySnapshot, HistoryStore};
pub use palette::{band_color, channel_color, DensityLevel};
pub use plot::PlotStyle;
pub use sample::{
    Band, BrainwaveSample, ChannelSample, DensityCell, FrequencyPoint, SampleBundle, TimePoint,
};
pub use source::SampleSource;
