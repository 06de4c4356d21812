//! Real-time driver that advances game time on a wall-clock cadence.
//!
//! The driver is a single tokio task holding a shared handle to whatever
//! owns the engine. Starting it twice keeps the existing task; stopping it
//! when idle does nothing. A stop request is observed before the next tick
//! fires, while a tick already in progress runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{AdvanceOutcome, EngineError, TimeEngine};

/// Something the auto-tick driver can advance.
pub trait TickTarget: Send + 'static {
    /// Whether ticking is currently suspended.
    fn is_paused(&self) -> bool;

    /// Advance by one default tick.
    fn tick(&mut self) -> Result<AdvanceOutcome, EngineError>;
}

impl TickTarget for TimeEngine {
    fn is_paused(&self) -> bool {
        Self::is_paused(self)
    }

    fn tick(&mut self) -> Result<AdvanceOutcome, EngineError> {
        Self::tick(self)
    }
}

/// State shared between the driver handle and its task.
#[derive(Debug, Default)]
struct Control {
    stop_requested: AtomicBool,
    stop_notify: Notify,
    ticks: AtomicU64,
}

/// Handle to the auto-tick task.
#[derive(Debug, Default)]
pub struct AutoTick {
    control: Arc<Control>,
    handle: Option<JoinHandle<()>>,
}

impl AutoTick {
    /// A driver that is not running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the driver task is alive.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Ticks executed since the driver was created.
    pub fn ticks(&self) -> u64 {
        self.control.ticks.load(Ordering::Acquire)
    }

    /// Spawn the driver. Returns `false` and leaves the running task alone
    /// if one is already active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<T: TickTarget>(&mut self, target: Arc<Mutex<T>>, interval: Duration) -> bool {
        if self.is_running() {
            info!("Auto-tick already running");
            return false;
        }

        let control = Arc::new(Control::default());
        control
            .ticks
            .store(self.ticks(), Ordering::Release);
        self.control = Arc::clone(&control);
        self.handle = Some(tokio::spawn(run(target, interval, control)));
        info!(interval_ms = interval.as_millis(), "Auto-tick started");
        true
    }

    /// Stop the driver and wait for its task to finish. Returns `false`
    /// when it was not running.
    pub async fn stop(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        self.control.stop_requested.store(true, Ordering::Release);
        self.control.stop_notify.notify_one();
        if let Err(err) = handle.await {
            warn!(error = %err, "Auto-tick task ended abnormally");
        }
        info!(ticks = self.ticks(), "Auto-tick stopped");
        true
    }
}

async fn run<T: TickTarget>(target: Arc<Mutex<T>>, interval: Duration, control: Arc<Control>) {
    loop {
        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            () = control.stop_notify.notified() => {}
        }
        if control.stop_requested.load(Ordering::Acquire) {
            break;
        }

        let mut guard = target.lock().await;
        if guard.is_paused() {
            continue;
        }
        match guard.tick() {
            Ok(outcome) => {
                control.ticks.fetch_add(1, Ordering::AcqRel);
                debug!(
                    minute = outcome.time.total_minutes,
                    boundaries = outcome.events.len(),
                    failures = outcome.failures.len(),
                    "Auto-tick"
                );
            }
            Err(err) => {
                warn!(error = %err, "Auto-tick failed; stopping driver");
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    fn shared_engine() -> Arc<Mutex<TimeEngine>> {
        Arc::new(Mutex::new(TimeEngine::new(&SimulationConfig::default())))
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_cadence_and_stops() {
        let engine = shared_engine();
        let mut driver = AutoTick::new();
        assert!(driver.start(Arc::clone(&engine), Duration::from_millis(100)));

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(driver.stop().await);
        let ticks = driver.ticks();
        assert!(ticks >= 3, "expected at least 3 ticks, got {ticks}");

        let minutes = engine.lock().await.now().total_minutes;
        assert_eq!(minutes, ticks * 10);

        // No further ticks after stop.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(engine.lock().await.now().total_minutes, minutes);
    }

    #[tokio::test(start_paused = true)]
    async fn starting_twice_keeps_one_driver() {
        let engine = shared_engine();
        let mut driver = AutoTick::new();
        assert!(driver.start(Arc::clone(&engine), Duration::from_millis(100)));
        assert!(!driver.start(Arc::clone(&engine), Duration::from_millis(100)));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(driver.stop().await);
        let minutes = engine.lock().await.now().total_minutes;
        // A second driver would have doubled the advance.
        assert_eq!(minutes, driver.ticks() * 10);
        assert!(driver.ticks() <= 3);
    }

    #[tokio::test]
    async fn stopping_idle_driver_is_a_no_op() {
        let mut driver = AutoTick::new();
        assert!(!driver.stop().await);
        assert!(!driver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn paused_engine_does_not_advance() {
        let engine = shared_engine();
        engine.lock().await.pause();
        let mut driver = AutoTick::new();
        driver.start(Arc::clone(&engine), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(450)).await;
        driver.stop().await;
        assert_eq!(engine.lock().await.now().total_minutes, 0);
        assert_eq!(driver.ticks(), 0);
    }
}
