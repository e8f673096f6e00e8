// src/gui.rs
use eframe::egui;
use egui::{Color32, Rounding, Stroke, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use std::path::PathBuf;
use std::time::Duration;
use crate::drivers::{
    band_color, channel_color, export_snapshot, Band, DensityLevel, HistorySnapshot, PlotStyle,
    ScopeError,
};
use crate::engine::Simulator;
use crate::types::*;

// 每帧只复制最近这些原始节拍和频率点
const RAW_VIEW_TICKS: usize = 200;
const FREQUENCY_VIEW_POINTS: usize = 1000;
const STACK_OFFSET: f64 = 1.2;

fn color32(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

pub struct EegScopeApp {
    simulator: Simulator,
    // 界面状态
    period_ms: u64,
    stack_channels: bool,
    export_dir: PathBuf,
    log_messages: Vec<String>,
    latest_tick: Option<u64>,
}

impl EegScopeApp {
    pub fn new(simulator: Simulator, export_dir: PathBuf) -> Self {
        let period_ms = simulator.config().tick_period_ms;
        Self {
            simulator,
            period_ms,
            stack_channels: true,
            export_dir,
            log_messages: vec!["EEG Scope Ready.".to_owned()],
            latest_tick: None,
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 { self.log_messages.remove(0); }
    }

    fn report(&mut self, result: Result<(), ScopeError>) {
        if let Err(err) = result {
            log::warn!("{err}");
            self.log(&format!("❌ {err}"));
        }
    }

    // 仅在导出时复制完整历史
    fn export(&mut self) {
        let exported = self
            .simulator
            .with_history(|store| store.snapshot())
            .and_then(|snapshot| {
                export_snapshot(&self.export_dir, &snapshot, &PlotStyle::default())
            });
        match exported {
            Ok(paths) => {
                for path in paths { self.log(&format!("💾 {}", path.display())); }
            }
            Err(err) => self.report(Err(err)),
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.heading("EEG Scope");
        ui.label(format!("{} channels", self.simulator.config().num_channels));
        ui.separator();

        let running = self.simulator.is_running();
        let btn_txt = if running { "⏹ STOP" } else { "▶ START" };
        if ui.button(btn_txt).clicked() {
            let result = if running { self.simulator.stop() } else { self.simulator.start() };
            self.report(result);
        }
        if ui.add_enabled(!running, egui::Button::new("⏭ STEP")).clicked() {
            let result = self.simulator.step().map(|_| ());
            self.report(result);
        }
        if ui.button("🔄 RESET VIEW").clicked() {
            let result = self.simulator.reset();
            self.report(result);
        }

        ui.add_space(10.0);
        let slider = egui::Slider::new(&mut self.period_ms, 50..=5000).text("tick ms");
        if ui.add(slider).changed() {
            let result = self.simulator.set_tick_period(Duration::from_millis(self.period_ms));
            self.report(result);
        }
        ui.checkbox(&mut self.stack_channels, "Stack channels");

        ui.add_space(10.0);
        if ui.button("💾 EXPORT SNAPSHOT").clicked() { self.export(); }

        ui.add_space(10.0);
        ui.label(match self.latest_tick {
            Some(t) => format!("Tick {t}"),
            None => "No data yet.".to_owned(),
        });
        egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
            for m in &self.log_messages { ui.monospace(m); }
        });
    }

    fn draw_brainwave_lines(ui: &mut egui::Ui, snapshot: &HistorySnapshot) {
        ui.heading("Brainwave Data");
        Plot::new("brainwave_lines")
            .height(220.0)
            .legend(Legend::default())
            .include_y(-0.2)
            .include_y(0.2)
            .show(ui, |plot_ui| {
                for band in Band::ALL {
                    let points: Vec<[f64; 2]> = snapshot
                        .brainwave
                        .iter()
                        .map(|s| [s.tick as f64, s.band(band)])
                        .collect();
                    plot_ui.line(
                        Line::new(PlotPoints::new(points))
                            .name(band.label())
                            .color(color32(band_color(band))),
                    );
                }
            });
    }

    fn draw_brainwave_bars(ui: &mut egui::Ui, snapshot: &HistorySnapshot) {
        ui.heading("Brainwave Amplitude");
        let width = 1.0 / (Band::ALL.len() as f64 + 1.0);
        Plot::new("brainwave_bars")
            .height(220.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                for (slot, band) in Band::ALL.into_iter().enumerate() {
                    // 每个节拍一组柱子，按波段错开
                    let offset = (slot as f64 - 2.0) * width;
                    let bars: Vec<Bar> = snapshot
                        .brainwave
                        .iter()
                        .map(|s| Bar::new(s.tick as f64 + offset, s.band(band)).width(width))
                        .collect();
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .name(band.label())
                            .color(color32(band_color(band))),
                    );
                }
            });
    }

    fn draw_raw(&self, ui: &mut egui::Ui, snapshot: &HistorySnapshot) {
        ui.heading("EEG Data");
        let stack = self.stack_channels;
        Plot::new("raw_eeg").height(320.0).show(ui, |plot_ui| {
            for channel in 0..snapshot.num_channels {
                let offset = if stack { channel as f64 * STACK_OFFSET } else { 0.0 };
                let points: Vec<[f64; 2]> = snapshot
                    .raw
                    .iter()
                    .filter_map(|s| s.values.get(channel).map(|v| [s.tick as f64, v + offset]))
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::new(points))
                        .name(format!("Ch{}", channel))
                        .color(color32(channel_color(channel))),
                );
            }
        });
    }

    fn draw_amp_time(ui: &mut egui::Ui, snapshot: &HistorySnapshot) {
        ui.heading("Amplitude vs. Time (Ch0)");
        let points: Vec<[f64; 2]> = snapshot
            .time
            .iter()
            .map(|p| [p.tick as f64, p.amplitude])
            .collect();
        Plot::new("amp_time")
            .height(180.0)
            .include_y(0.0)
            .include_y(1.0)
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(PlotPoints::new(points)).color(color32(channel_color(0))));
            });
    }

    fn draw_amp_freq(ui: &mut egui::Ui, snapshot: &HistorySnapshot) {
        ui.heading("Amplitude vs. Frequency");
        // -inf (功率为 0) 的点只存不画
        let points: Vec<[f64; 2]> = snapshot
            .frequency
            .iter()
            .filter(|p| p.amplitude_db.is_finite())
            .map(|p| [p.frequency_hz, p.amplitude_db])
            .collect();
        Plot::new("amp_freq")
            .height(220.0)
            .include_x(0.0)
            .include_x(100.0)
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .radius(3.0)
                        .color(color32(band_color(Band::Delta))),
                );
            });
    }

    fn draw_density(ui: &mut egui::Ui, snapshot: &HistorySnapshot) {
        ui.heading("EEG Density");
        let Some(last_tick) = snapshot.density.last().map(|c| c.tick) else {
            ui.label("No density data yet.");
            return;
        };
        let first_tick = snapshot.density.first().map(|c| c.tick).unwrap_or(last_tick);
        let rows = (last_tick - first_tick + 1) as f32;
        let cell = Vec2::new(18.0, 18.0);
        let size = Vec2::new(cell.x * snapshot.num_channels as f32, cell.y * rows);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
        let origin = response.rect.min;
        for c in &snapshot.density {
            let row = (c.tick - first_tick) as f32;
            let min = origin + Vec2::new(c.channel as f32 * cell.x, row * cell.y);
            let rect = egui::Rect::from_min_size(min, cell).shrink(1.0);
            let fill = color32(DensityLevel::classify(c.density).color());
            painter.rect_filled(rect, Rounding::same(2.0), fill);
            painter.rect_stroke(rect, Rounding::same(2.0), Stroke::new(0.5, Color32::from_rgb(60, 60, 60)));
        }
        ui.label("Blue < 100 ≤ Green < 200 ≤ Red");
    }
}

impl eframe::App for EegScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 消息处理
        for event in self.simulator.drain_events() {
            match event {
                EngineEvent::Log(s) => self.log(&s),
                EngineEvent::Ticked(t) => self.latest_tick = Some(t),
                EngineEvent::Stopped => self.log("Ticker stopped."),
            }
        }
        if self.simulator.ticker_finished() {
            let result = self.simulator.stop();
            self.report(result);
        }

        // 2. 读取本帧要画的部分历史
        let view = self
            .simulator
            .with_history(|store| store.recent(RAW_VIEW_TICKS, FREQUENCY_VIEW_POINTS));
        let snapshot = match view {
            Ok(s) => s,
            Err(err) => {
                self.report(Err(err));
                return;
            }
        };
        self.latest_tick = snapshot.latest_tick;

        // 3. UI 绘制
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::SidePanel::left("L").min_width(240.0).show(ctx, |ui| {
            self.draw_controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                Self::draw_brainwave_lines(ui, &snapshot);
                Self::draw_brainwave_bars(ui, &snapshot);
                self.draw_raw(ui, &snapshot);
                Self::draw_amp_time(ui, &snapshot);
                Self::draw_amp_freq(ui, &snapshot);
                Self::draw_density(ui, &snapshot);
            });
        });

        if self.simulator.is_running() {
            ctx.request_repaint_after(self.simulator.config().tick_period());
        }
    }
}
