//! Fixed-cadence pose publishing for one device

use handlink_core::{compose_pose, HandState, InputFrame};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::host::{DeviceIndex, HostRuntime};

/// Default publishing period
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(5);

/// Background task that submits a composed pose every period
pub struct PosePublisher {
    device: DeviceIndex,
    running: Arc<AtomicBool>,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl PosePublisher {
    /// Start publishing for `device` from `hand`
    pub fn spawn(
        device: DeviceIndex,
        hand: Arc<HandState>,
        host: Arc<dyn HostRuntime>,
        period: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(publish_loop(
            device,
            hand,
            host,
            period,
            running.clone(),
            shutdown_rx,
        ));

        Self {
            device,
            running,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop and wait until the task has fully exited
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(device = self.device, error = %e, "Pose publisher ended abnormally");
            }
        }
        debug!(device = self.device, "Pose publisher stopped");
    }
}

impl Drop for PosePublisher {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            if let Some(shutdown) = self.shutdown.take() {
                let _ = shutdown.send(true);
            }
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
    }
}

async fn publish_loop(
    device: DeviceIndex,
    hand: Arc<HandState>,
    host: Arc<dyn HostRuntime>,
    period: Duration,
    running: Arc<AtomicBool>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(device = device, period_ms = period.as_millis() as u64, "Pose publisher started");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = hand.snapshot();
        let pose = compose_pose(&host.reference_frame(), &snapshot);
        host.submit_pose(device, &pose);
        host.submit_input(device, &InputFrame::from_snapshot(&snapshot));
    }
}
