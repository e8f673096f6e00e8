// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod drivers;
mod engine;
mod gui;
mod types;
use anyhow::Context;
use drivers::ScopeConfig;
use eframe::egui;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "eeg_scope.json";
const EXPORT_DIR: &str = "snapshots";

// 配置文件可选；不存在时使用默认值
fn load_config(path: &Path) -> anyhow::Result<ScopeConfig> {
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return Ok(ScopeConfig::default());
    }
    let config = ScopeConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

// 入口函数
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = load_config(&config_path)?;
    let mut simulator = engine::Simulator::init(config).context("invalid simulator config")?;
    // 与原界面一致：窗口打开即开始产生数据
    simulator.start().context("failed to start ticker")?;

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 900.0])
        .with_min_inner_size([900.0, 600.0])
        .with_title("EEG Scope");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "EEG Scope",
        options,
        Box::new(move |_cc| Box::new(gui::EegScopeApp::new(simulator, PathBuf::from(EXPORT_DIR)))),
    )
    .map_err(|err| anyhow::anyhow!("eframe exited with an error: {err}"))
}
