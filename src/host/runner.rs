//! Interval-driven host loop
//!
//! Runs a [`Device<Running>`] against one port until the event source is
//! exhausted or the cancellation token fires. Host commands travel over an
//! mpsc channel to a logging task.

use super::{EventSource, HostCommand, HostPort};
use crate::config::HostSettings;
use crate::device::{Device, InputEvent, KeyDisposition, Response, Running};
use crate::time::Clock;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub ticks: u64,
    pub emitted: u64,
    pub mode_changes: u64,
    pub layer_changes: u64,
    pub reason: StopReason,
}

impl RunSummary {
    pub fn duration_ms(&self) -> i64 {
        (self.finished - self.started).num_milliseconds()
    }
}

/// Spawns the task that logs every host command with a wall-clock stamp.
/// Resolves to the number of commands seen once all senders are gone.
pub fn spawn_command_logger(mut receiver: mpsc::Receiver<HostCommand>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(command) = receiver.recv().await {
            count += 1;
            info!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), command);
        }
        debug!("Command logger finished after {} commands", count);
        count
    })
}

pub async fn run<P, C>(
    mut device: Device<Running>,
    port: &mut P,
    clock: &C,
    settings: HostSettings,
    cancel: CancellationToken,
) -> RunSummary
where
    P: HostPort + EventSource,
    C: Clock,
{
    let started = Local::now();
    info!(
        "Running device '{}' every {}ms",
        device.name(),
        settings.tick_interval_ms
    );

    let mut ticker = interval(settings.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats = interval(settings.stats_interval());
    stats.tick().await;

    let reason = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Shutdown requested");
                break StopReason::Cancelled;
            }
            _ = stats.tick() => {
                let s = device.stats();
                let elapsed = (Local::now() - started).num_seconds().max(1);
                info!(
                    "{} ticks, {} actions emitted ({:.1}/s), {} mode changes",
                    s.ticks,
                    s.emitted,
                    s.emitted as f64 / elapsed as f64,
                    s.mode_changes
                );
            }
            _ = ticker.tick() => {
                let now = clock.now();
                let Some(events) = port.pending(now) else {
                    info!("Event source exhausted");
                    break StopReason::Exhausted;
                };
                for event in events {
                    match device.handle(event, port) {
                        Response::Layers(folded) => port.adopt_layers(folded),
                        Response::Key(KeyDisposition::PassThrough) => {
                            debug!("{:?} passed through to host", event);
                        }
                        Response::Key(KeyDisposition::Consumed) | Response::Ticked => {}
                    }
                }
                device.handle(InputEvent::Tick { now }, port);
            }
        }
    };
    device.shutdown(port);

    let s = device.stats();
    let summary = RunSummary {
        started,
        finished: Local::now(),
        ticks: s.ticks,
        emitted: s.emitted,
        mode_changes: s.mode_changes,
        layer_changes: s.layer_changes,
        reason,
    };
    info!(
        "Run finished ({:?}) after {}ms: {} ticks, {} actions",
        summary.reason,
        summary.duration_ms(),
        summary.ticks,
        summary.emitted
    );
    summary
}
