//! API polling data source.
//!
//! Spawns a background task that fetches `/api/vitals` on an interval and
//! publishes each snapshot through a [`ChannelSource`].

use std::future::Future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use eye2heart_client::{ApiClient, ClientError, Session};
use eye2heart_types::VitalRecord;

use super::{ChannelSource, DataSource};

/// Outcome of the most recent fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No fetch has completed yet.
    #[default]
    Pending,
    Ok,
    Failed(String),
    /// The session was rejected. Polling stops until a new session is used.
    Unauthorized,
}

/// A data source that polls the vitals endpoint in the background.
///
/// The session is moved into the polling task and used for every request.
/// When the server rejects it the task stops and [`is_unauthorized`]
/// reports true, so the caller can discard the stored session.
///
/// [`is_unauthorized`]: DataSource::is_unauthorized
#[derive(Debug)]
pub struct ApiSource {
    channel: ChannelSource,
    status: watch::Receiver<FetchStatus>,
    refresh_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
    description: String,
    last_error: Option<String>,
    unauthorized: bool,
}

impl ApiSource {
    /// Start polling the API with the given session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(client: ApiClient, session: Session, interval: Duration) -> Self {
        let description = format!("api: {}", client.endpoint());
        Self::spawn_with(
            move || {
                let client = client.clone();
                let session = session.clone();
                async move { client.vitals(&session).await }
            },
            interval,
            &description,
        )
    }

    /// Start polling with a custom fetch function.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use eye2heart::{ApiSource, DataSource};
    /// use eye2heart_types::VitalRecord;
    ///
    /// # tokio_test::block_on(async {
    /// let mut source = ApiSource::spawn_with(
    ///     || async { Ok(vec![VitalRecord::builder().heart_rate(72.0).build()]) },
    ///     Duration::from_secs(30),
    ///     "fixture",
    /// );
    ///
    /// tokio::time::sleep(Duration::from_millis(20)).await;
    /// assert_eq!(source.poll().map(|records| records.len()), Some(1));
    /// # });
    /// ```
    pub fn spawn_with<F, Fut>(fetch: F, interval: Duration, description: &str) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<VitalRecord>, ClientError>> + Send + 'static,
    {
        let (records_tx, channel) = ChannelSource::create(description);
        let (status_tx, status) = watch::channel(FetchStatus::Pending);
        let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            loop {
                match fetch().await {
                    Ok(records) => {
                        debug!(count = records.len(), "Fetched vitals");
                        // Status first, so a poll that sees the records sees it too
                        status_tx.send_replace(FetchStatus::Ok);
                        if records_tx.send(Some(records)).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.is_unauthorized() => {
                        warn!("Session rejected, stopping vitals polling");
                        status_tx.send_replace(FetchStatus::Unauthorized);
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to fetch vitals");
                        status_tx.send_replace(FetchStatus::Failed(e.to_string()));
                    }
                }

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    msg = refresh_rx.recv() => {
                        if msg.is_none() {
                            break;
                        }
                        debug!("Refresh requested");
                    }
                }
            }
            info!("Vitals polling stopped");
        });

        Self {
            channel,
            status,
            refresh_tx,
            task,
            description: description.to_string(),
            last_error: None,
            unauthorized: false,
        }
    }

    /// Outcome of the most recent fetch.
    pub fn status(&self) -> FetchStatus {
        self.status.borrow().clone()
    }

    fn sync_status(&mut self) {
        // The task drops its sender when it stops, but the final status stays readable
        let status = {
            let latest = self.status.borrow_and_update();
            if !latest.has_changed() {
                return;
            }
            latest.clone()
        };
        match status {
            FetchStatus::Pending | FetchStatus::Ok => {
                self.last_error = None;
            }
            FetchStatus::Failed(message) => {
                self.last_error = Some(message);
            }
            FetchStatus::Unauthorized => {
                self.unauthorized = true;
                self.last_error = Some("Session expired, please log in again".to_string());
            }
        }
    }
}

impl DataSource for ApiSource {
    fn poll(&mut self) -> Option<Vec<VitalRecord>> {
        self.sync_status();
        self.channel.poll()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_unauthorized(&self) -> bool {
        self.unauthorized
    }

    fn refresh(&mut self) {
        // A full buffer already holds a pending refresh
        let _ = self.refresh_tx.try_send(());
    }
}

impl Drop for ApiSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn poll_until<F>(source: &mut ApiSource, mut done: F) -> Option<Vec<VitalRecord>>
    where
        F: FnMut(&ApiSource, &Option<Vec<VitalRecord>>) -> bool,
    {
        for _ in 0..100 {
            let records = source.poll();
            if done(source, &records) {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_publishes_records() {
        let mut source = ApiSource::spawn_with(
            || async { Ok(vec![VitalRecord::builder().heart_rate(70.0).build()]) },
            Duration::from_secs(60),
            "test",
        );

        let records = poll_until(&mut source, |_, r| r.is_some()).await;
        assert_eq!(records.map(|r| r.len()), Some(1));
        assert_eq!(source.status(), FetchStatus::Ok);
        assert!(source.error().is_none());
        assert!(!source.is_unauthorized());
    }

    #[tokio::test]
    async fn test_records_failure() {
        let mut source = ApiSource::spawn_with(
            || async { Err(ClientError::Timeout) },
            Duration::from_secs(60),
            "test",
        );

        poll_until(&mut source, |s, _| s.error().is_some()).await;
        assert_eq!(source.error(), Some("Request timed out"));
        assert!(!source.is_unauthorized());
    }

    #[tokio::test]
    async fn test_unauthorized_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut source = ApiSource::spawn_with(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ClientError::Unauthorized) }
            },
            Duration::from_millis(5),
            "test",
        );

        poll_until(&mut source, |s, _| s.is_unauthorized()).await;
        assert!(source.is_unauthorized());
        assert_eq!(source.status(), FetchStatus::Unauthorized);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_seen_after_task_exits() {
        let mut source = ApiSource::spawn_with(
            || async { Err(ClientError::Unauthorized) },
            Duration::from_secs(60),
            "test",
        );

        // Let the task finish and drop its senders before the first poll
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(source.task.is_finished());

        assert!(source.poll().is_none());
        assert!(source.is_unauthorized());
        assert_eq!(source.error(), Some("Session expired, please log in again"));

        // Later polls keep the expired state
        assert!(source.poll().is_none());
        assert!(source.is_unauthorized());
    }

    #[tokio::test]
    async fn test_refresh_triggers_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut source = ApiSource::spawn_with(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    Ok(vec![VitalRecord::new(); n + 1])
                }
            },
            Duration::from_secs(3600),
            "test",
        );

        let first = poll_until(&mut source, |_, r| r.is_some()).await;
        assert_eq!(first.map(|r| r.len()), Some(1));

        source.refresh();
        let second = poll_until(&mut source, |_, r| r.is_some()).await;
        assert_eq!(second.map(|r| r.len()), Some(2));
    }
}
