// src/engine.rs
use crate::drivers::{HistoryStore, SampleSource, ScopeConfig, ScopeError, SignalGenerator};
use crate::types::*;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub type SharedHistory = Arc<Mutex<HistoryStore>>;

// 运行中的节拍线程；线程结束时把数据源交还回来
struct Ticker<S> {
    tx_cmd: Sender<EngineCommand>,
    join: JoinHandle<S>,
}

/// Owns the sample source, the shared history and the ticker thread.
///
/// While stopped the simulator holds the source itself, so `step` and a later
/// `start` continue the same tick counter.
pub struct Simulator<S: SampleSource + 'static = SignalGenerator> {
    config: ScopeConfig,
    history: SharedHistory,
    source: Option<S>,
    ticker: Option<Ticker<S>>,
    tx_evt: Sender<EngineEvent>,
    rx_evt: Receiver<EngineEvent>,
}

impl Simulator<SignalGenerator> {
    pub fn init(config: ScopeConfig) -> Result<Self, ScopeError> {
        config.validate()?;
        let source = SignalGenerator::from_config(&config)?;
        Self::with_source(config, source)
    }
}

impl<S: SampleSource + 'static> Simulator<S> {
    pub fn with_source(config: ScopeConfig, source: S) -> Result<Self, ScopeError> {
        config.validate()?;
        if source.num_channels() != config.num_channels {
            return Err(ScopeError::InvalidChannelCount);
        }
        let history = Arc::new(Mutex::new(HistoryStore::from_config(&config)));
        let (tx_evt, rx_evt) = channel();
        Ok(Self {
            config,
            history,
            source: Some(source),
            ticker: None,
            tx_evt,
            rx_evt,
        })
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    // 数据源耗尽后线程会自行退出，仍需调用 stop() 回收
    pub fn ticker_finished(&self) -> bool {
        self.ticker
            .as_ref()
            .map_or(false, |ticker| ticker.join.is_finished())
    }

    pub fn with_history<T>(&self, read: impl FnOnce(&HistoryStore) -> T) -> Result<T, ScopeError> {
        let store = self.history.lock()?;
        Ok(read(&store))
    }

    pub fn start(&mut self) -> Result<(), ScopeError> {
        if self.ticker.is_some() {
            return Err(ScopeError::AlreadyRunning);
        }
        // 只有节拍线程 panic 时才会丢失数据源
        let source = self.source.take().ok_or(ScopeError::TickerPanicked)?;
        let (tx_cmd, rx_cmd) = channel();
        let history = Arc::clone(&self.history);
        let tx_evt = self.tx_evt.clone();
        let period = self.config.tick_period();
        let join = thread::spawn(move || run_ticker(source, history, rx_cmd, tx_evt, period));
        self.ticker = Some(Ticker { tx_cmd, join });
        log::info!("simulator started, period {period:?}");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ScopeError> {
        let ticker = self.ticker.take().ok_or(ScopeError::NotRunning)?;
        // 线程可能已经自行退出，发送失败无妨
        ticker.tx_cmd.send(EngineCommand::Stop).ok();
        let source = ticker.join.join().map_err(|_| {
            log::error!("ticker thread panicked");
            ScopeError::TickerPanicked
        })?;
        self.source = Some(source);
        let tick = self.with_history(|store| store.latest_tick())?;
        log::info!("simulator stopped at tick {tick:?}");
        Ok(())
    }

    /// Runs one generate-then-append cycle on the calling thread.
    /// Returns `None` when the source has run dry.
    pub fn step(&mut self) -> Result<Option<u64>, ScopeError> {
        if self.ticker.is_some() {
            return Err(ScopeError::AlreadyRunning);
        }
        let source = self.source.as_mut().ok_or(ScopeError::TickerPanicked)?;
        let Some(bundle) = source.next_bundle() else {
            return Ok(None);
        };
        let tick = bundle.tick;
        self.history.lock()?.append(bundle)?;
        log::debug!("manual step to tick {tick}");
        Ok(Some(tick))
    }

    // 周期按整毫秒保存，不足一毫秒的部分直接拒绝而不是截断
    pub fn set_tick_period(&mut self, period: Duration) -> Result<(), ScopeError> {
        let millis =
            u64::try_from(period.as_millis()).map_err(|_| ScopeError::InvalidTickPeriod)?;
        if millis == 0 || period.subsec_nanos() % 1_000_000 != 0 {
            return Err(ScopeError::InvalidTickPeriod);
        }
        self.config.tick_period_ms = millis;
        if let Some(ticker) = &self.ticker {
            ticker
                .tx_cmd
                .send(EngineCommand::SetPeriod(self.config.tick_period()))
                .ok();
        }
        Ok(())
    }

    // 清空历史；节拍计数不回退
    pub fn reset(&mut self) -> Result<(), ScopeError> {
        self.history.lock()?.clear();
        log::info!("history cleared");
        Ok(())
    }

    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.rx_evt.try_iter().collect()
    }
}

impl<S: SampleSource + 'static> Drop for Simulator<S> {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            if let Err(err) = self.stop() {
                log::warn!("failed to stop ticker on drop: {err}");
            }
        }
    }
}

fn run_ticker<S: SampleSource>(
    mut source: S,
    history: SharedHistory,
    rx_cmd: Receiver<EngineCommand>,
    tx_evt: Sender<EngineEvent>,
    mut period: Duration,
) -> S {
    tx_evt
        .send(EngineEvent::Log(format!("⚙️ Ticker running every {period:?}")))
        .ok();
    let mut deadline = Instant::now() + period;
    loop {
        // ============================================================
        // 1. 等待下一个节拍，期间响应命令
        // ============================================================
        let wait = deadline.saturating_duration_since(Instant::now());
        match rx_cmd.recv_timeout(wait) {
            Ok(EngineCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(EngineCommand::SetPeriod(new_period)) => {
                period = new_period;
                deadline = Instant::now() + period;
                tx_evt
                    .send(EngineEvent::Log(format!("⏱ Period set to {period:?}")))
                    .ok();
                continue;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
        // 落后时不补发节拍，直接对齐到下一个周期
        deadline += period;
        let now = Instant::now();
        if deadline < now {
            deadline = now + period;
        }

        // ============================================================
        // 2. 生成并写入历史 (整包写入)
        // ============================================================
        let Some(bundle) = source.next_bundle() else {
            log::warn!("sample source exhausted, ticker stopping");
            tx_evt
                .send(EngineEvent::Log("🛑 Source exhausted".to_owned()))
                .ok();
            break;
        };
        let tick = bundle.tick;
        let appended = history
            .lock()
            .map_err(ScopeError::from)
            .and_then(|mut store| store.append(bundle));
        if let Err(err) = appended {
            log::warn!("ticker stopping: {err}");
            tx_evt
                .send(EngineEvent::Log(format!("❌ History unavailable: {err}")))
                .ok();
            break;
        }
        log::debug!("tick {tick}");
        tx_evt.send(EngineEvent::Ticked(tick)).ok();
    }
    tx_evt.send(EngineEvent::Stopped).ok();
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::ReplaySource;
    use crate::drivers::SampleBundle;

    fn fast_config(num_channels: usize) -> ScopeConfig {
        ScopeConfig {
            num_channels,
            tick_period_ms: 5,
            seed: Some(17),
            ..ScopeConfig::default()
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let started = Instant::now();
        while started.elapsed() < Duration::from_secs(5) {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    fn latest(sim: &Simulator<impl SampleSource + 'static>) -> Option<u64> {
        sim.with_history(|store| store.latest_tick()).unwrap()
    }

    #[test]
    fn init_validates_config() {
        let bad = ScopeConfig {
            num_channels: 0,
            ..ScopeConfig::default()
        };
        assert!(matches!(
            Simulator::init(bad),
            Err(ScopeError::InvalidChannelCount)
        ));
        let sim = Simulator::init(fast_config(3)).unwrap();
        assert!(!sim.is_running());
        assert_eq!(latest(&sim), None);
    }

    #[test]
    fn step_appends_one_tick_at_a_time() {
        let mut sim = Simulator::init(fast_config(3)).unwrap();
        assert_eq!(sim.step().unwrap(), Some(1));
        assert_eq!(sim.step().unwrap(), Some(2));
        let (raw, grid) = sim
            .with_history(|s| (s.raw_series().len(), s.density_grid().len()))
            .unwrap();
        assert_eq!(raw, 2);
        assert_eq!(grid, 3);
    }

    #[test]
    fn lifecycle_guards() {
        let mut sim = Simulator::init(ScopeConfig {
            tick_period_ms: 10_000,
            ..fast_config(2)
        })
        .unwrap();
        assert!(matches!(sim.stop(), Err(ScopeError::NotRunning)));
        sim.start().unwrap();
        assert!(sim.is_running());
        assert!(matches!(sim.start(), Err(ScopeError::AlreadyRunning)));
        assert!(matches!(sim.step(), Err(ScopeError::AlreadyRunning)));
        sim.stop().unwrap();
        assert!(!sim.is_running());
        assert!(matches!(
            sim.set_tick_period(Duration::from_micros(10)),
            Err(ScopeError::InvalidTickPeriod)
        ));
    }

    #[test]
    fn fractional_millisecond_period_is_rejected() {
        let mut sim = Simulator::init(fast_config(2)).unwrap();
        assert!(matches!(
            sim.set_tick_period(Duration::from_micros(1_500)),
            Err(ScopeError::InvalidTickPeriod)
        ));
        assert_eq!(sim.config().tick_period_ms, 5);
        sim.set_tick_period(Duration::from_millis(250)).unwrap();
        assert_eq!(sim.config().tick_period(), Duration::from_millis(250));
    }

    #[test]
    fn ticks_continue_across_stop_and_start() {
        let mut sim = Simulator::init(fast_config(4)).unwrap();
        sim.start().unwrap();
        assert!(wait_until(|| latest(&sim).map_or(false, |t| t >= 3)));
        sim.stop().unwrap();
        let stopped_at = latest(&sim).unwrap();
        assert_eq!(sim.step().unwrap(), Some(stopped_at + 1));

        let times: Vec<u64> = sim
            .with_history(|s| s.time_series().iter().map(|p| p.tick).collect())
            .unwrap();
        let newest = stopped_at + 1;
        let oldest = newest.saturating_sub(19).max(1);
        let expected: Vec<u64> = (oldest..=newest).collect();
        assert_eq!(times, expected);

        let events = sim.drain_events();
        assert!(events.contains(&EngineEvent::Ticked(1)));
        assert_eq!(events.last(), Some(&EngineEvent::Stopped));
    }

    #[test]
    fn period_change_applies_while_running() {
        let mut sim = Simulator::init(ScopeConfig {
            tick_period_ms: 60_000,
            ..fast_config(2)
        })
        .unwrap();
        sim.start().unwrap();
        sim.set_tick_period(Duration::from_millis(3)).unwrap();
        assert_eq!(sim.config().tick_period_ms, 3);
        assert!(wait_until(|| latest(&sim).is_some()));
        sim.stop().unwrap();
    }

    #[test]
    fn exhausted_replay_source_stops_ticker() {
        let mut gen = SignalGenerator::with_seed(2, 4).unwrap();
        let bundles: Vec<_> = (0..3).map(|_| gen.generate()).collect();
        let replay = ReplaySource::new(2, bundles).unwrap();
        let mut sim = Simulator::with_source(fast_config(2), replay).unwrap();
        sim.start().unwrap();
        assert!(wait_until(|| sim.ticker_finished()));
        assert!(sim.is_running());
        sim.stop().unwrap();
        assert_eq!(latest(&sim), Some(3));
        assert_eq!(sim.step().unwrap(), None);
        assert!(sim.drain_events().contains(&EngineEvent::Stopped));
    }

    #[test]
    fn mismatched_source_is_rejected() {
        let replay = ReplaySource::new(5, Vec::new()).unwrap();
        assert!(matches!(
            Simulator::with_source(fast_config(2), replay),
            Err(ScopeError::InvalidChannelCount)
        ));
    }

    // 第二包少一个通道
    struct NarrowingSource(SignalGenerator);
    impl SampleSource for NarrowingSource {
        fn num_channels(&self) -> usize {
            2
        }
        fn next_bundle(&mut self) -> Option<SampleBundle> {
            let mut bundle = self.0.generate();
            if bundle.tick >= 2 {
                bundle.channels.values.truncate(1);
            }
            Some(bundle)
        }
    }

    #[test]
    fn malformed_bundle_is_refused() {
        let source = || NarrowingSource(SignalGenerator::with_seed(2, 6).unwrap());
        let mut sim = Simulator::with_source(fast_config(2), source()).unwrap();
        assert_eq!(sim.step().unwrap(), Some(1));
        assert!(matches!(
            sim.step(),
            Err(ScopeError::ChannelMismatch { tick: 2, .. })
        ));
        assert_eq!(latest(&sim), Some(1));

        let mut sim = Simulator::with_source(fast_config(2), source()).unwrap();
        sim.start().unwrap();
        assert!(wait_until(|| sim.ticker_finished()));
        sim.stop().unwrap();
        assert_eq!(latest(&sim), Some(1));
    }

    #[test]
    fn reset_clears_history_but_not_the_counter() {
        let mut sim = Simulator::init(fast_config(3)).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        sim.reset().unwrap();
        assert_eq!(latest(&sim), None);
        assert_eq!(sim.step().unwrap(), Some(3));
    }
}
