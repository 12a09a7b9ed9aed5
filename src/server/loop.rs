// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` is notified.
///
/// After the listener closes, waits up to `server.shutdown_grace` seconds for
/// active connections and then background deliveries to finish. Must run
/// inside a `LocalSet`.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    let deadline = Instant::now() + Duration::from_secs(state.config.server.shutdown_grace);
    let remaining = drain(&active_connections, deadline).await;
    logger::log_shutdown_complete(remaining);

    let pending = finish_background(&state.background, deadline).await;
    logger::log_background_complete(pending);
    Ok(())
}

/// Wait until no connections remain or `deadline` passes; returns what is left
async fn drain(active_connections: &AtomicUsize, deadline: Instant) -> usize {
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 || Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

/// Let spawned background tasks run until `deadline`; returns how many are left
async fn finish_background(tasks: &TaskTracker, deadline: Instant) -> usize {
    tasks.close();
    match tokio::time::timeout_at(deadline, tasks.wait()).await {
        Ok(()) => 0,
        Err(_) => tasks.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn after(duration: Duration) -> Instant {
        Instant::now() + duration
    }

    #[tokio::test]
    async fn test_drain_returns_immediately_when_idle() {
        let active = AtomicUsize::new(0);
        assert_eq!(drain(&active, after(Duration::from_secs(5))).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let active = AtomicUsize::new(2);
        assert_eq!(drain(&active, after(Duration::from_millis(200))).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_tasks_finish_within_grace() {
        let tasks = TaskTracker::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = tx.send(());
        });

        assert_eq!(finish_background(&tasks, after(Duration::from_secs(5))).await, 0);
        assert!(rx.await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_tasks_abandoned_after_grace() {
        let tasks = TaskTracker::new();
        tasks.spawn(tokio::time::sleep(Duration::from_secs(60)));
        tasks.spawn(async {});

        assert_eq!(finish_background(&tasks, after(Duration::from_secs(1))).await, 1);
    }
}
