//! `scanwatch run` - the daemon
//!
//! Wires the watcher, intake, retry controller and scheduler together and
//! runs until SIGINT/SIGTERM. A second launch signals the running instance
//! and exits successfully; the running instance answers by printing its
//! activity log to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use scanwatch_core::{
    activity::{ActivityLog, Notifier},
    instance::{signal_running, InstanceGuard, InstanceStatus},
    shutdown::{signal_channels, wait_for_signal},
    watcher::FileWatcher,
    Config, ExclusiveOpenProbe, Intake, RetryController, RetryPolicy, Scheduler, ShellOpener,
};
use tokio::sync::mpsc;

pub async fn run(config: Config) -> Result<()> {
    let lock_dir = &config.instance.lock_dir;
    let app_id = &config.instance.app_id;

    let guard = match InstanceGuard::acquire(lock_dir, app_id)? {
        InstanceStatus::Primary(guard) => guard,
        InstanceStatus::AlreadyRunning { holder_pid } => {
            notify_running_instance(&config, holder_pid);
            return Ok(());
        }
    };

    let activity = ActivityLog::new(config.log.capacity);
    activity.info("Starting up...");
    let scheduler = Scheduler::new()?;
    let retry = RetryController::new(
        scheduler.clone(),
        Arc::new(ExclusiveOpenProbe),
        Arc::new(ShellOpener::new()),
        Arc::new(activity.clone()),
        RetryPolicy::from_max_wait(config.max_wait_seconds),
    );
    let intake = Intake::new(scheduler.clone(), retry, config.attempt_open_on_create);

    let (watch, mut events) = FileWatcher::watch_directory(&config.watch_config())?;

    // Without a wake watcher the daemon still works; the sender is kept so the
    // placeholder channel never reports closed
    let (_wake_watcher, _wake_tx, mut wakes) = match guard.wake_requests() {
        Ok((watcher, rx)) => (Some(watcher), None, rx),
        Err(e) => {
            tracing::warn!("Wake requests disabled: {e}");
            let (tx, rx) = mpsc::channel(1);
            (None, Some(tx), rx)
        }
    };

    let (mut sigint, mut sigterm) = signal_channels()
        .await
        .context("Failed to setup signal handlers")?;

    activity.info(&format!("Filtering for: {}", watch.filter().pattern()));
    activity.info(&format!("Scan directory: {}", watch.directory().display()));
    activity.info(&format!(
        "Maximum wait time (secs): {}",
        config.max_wait_seconds
    ));
    activity.info("Ready.");

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    activity.warn("File watcher stopped");
                    break;
                };
                if let Err(e) = intake.handle(event) {
                    activity.alert("Error", &e.to_string());
                }
            }
            Some(()) = wakes.recv() => {
                activity.info("Another instance was started");
                show_activity(&activity);
            }
            reason = wait_for_signal(&mut sigint, &mut sigterm) => {
                tracing::info!("Received {reason:?}, shutting down...");
                break;
            }
        }
    }

    scheduler.shutdown();
    drop(watch);
    drop(guard);
    tracing::info!("Stopped ({} activity entries)", activity.len());
    Ok(())
}

/// Full activity log under a header line
fn activity_report(activity: &ActivityLog) -> String {
    format!("--- scanwatch activity log ---\n{}", activity.render())
}

fn show_activity(activity: &ActivityLog) {
    #[allow(clippy::print_stderr)]
    {
        eprintln!("{}", activity_report(activity));
    }
}

fn notify_running_instance(config: &Config, holder_pid: Option<u32>) {
    let holder = holder_pid.map_or_else(String::new, |pid| format!(" (PID {pid})"));

    match signal_running(&config.instance.lock_dir, &config.instance.app_id) {
        Ok(()) => tracing::debug!("Signalled running instance{holder}"),
        Err(e) => tracing::warn!("Could not signal running instance: {e}"),
    }

    #[allow(clippy::print_stdout)]
    {
        println!("scanwatch is already running{holder}");
    }
}
