//! Channel-based data source.
//!
//! Receives record snapshots via a tokio watch channel. Producers such as the
//! API poller push snapshots instead of the UI polling a file.

use tokio::sync::watch;

use eye2heart_types::VitalRecord;

use super::DataSource;

/// Value carried by the channel. `None` means nothing has been fetched yet.
pub type Snapshot = Option<Vec<VitalRecord>>;

/// A data source that receives record snapshots via a channel.
///
/// # Example
///
/// ```
/// use eye2heart::{ChannelSource, DataSource};
///
/// let (tx, mut source) = ChannelSource::create("test");
/// assert!(source.poll().is_none());
///
/// tx.send(Some(Vec::new())).unwrap();
/// assert_eq!(source.poll().map(|r| r.len()), Some(0));
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Snapshot>,
    description: String,
    /// Track if we've looked at the initial value yet
    initial_returned: bool,
    closed: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where snapshots come from (e.g. an API URL)
    pub fn new(receiver: watch::Receiver<Snapshot>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
            closed: false,
        }
    }

    /// Create a channel pair for sending snapshots to a ChannelSource.
    ///
    /// The channel starts empty, so the first poll returns `None` until a
    /// snapshot is sent.
    pub fn create(source_description: &str) -> (watch::Sender<Snapshot>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Vec<VitalRecord>> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().is_err() {
            self.closed = true;
        }

        // A closed channel still holds the last snapshot sent
        let latest = self.receiver.borrow_and_update();
        if latest.has_changed() {
            latest.clone()
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        if self.closed {
            Some("Channel closed")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert_eq!(source.description(), "channel: test");

        // Nothing fetched yet
        assert!(source.poll().is_none());

        tx.send(Some(vec![VitalRecord::builder().heart_rate(70.0).build()]))
            .unwrap();
        assert_eq!(source.poll().map(|r| r.len()), Some(1));

        // No change, so poll returns None
        assert!(source.poll().is_none());
        assert!(source.error().is_none());
    }

    #[test]
    fn test_initial_value_returned_once() {
        let (_tx, rx) = watch::channel(Some(vec![VitalRecord::new(), VitalRecord::new()]));
        let mut source = ChannelSource::new(rx, "preloaded");
        assert_eq!(source.poll().map(|r| r.len()), Some(2));
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_closed_channel_reports_error() {
        let (tx, mut source) = ChannelSource::create("test");
        let _ = source.poll();
        drop(tx);
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Channel closed"));
    }

    #[test]
    fn test_final_snapshot_survives_close() {
        let (tx, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());

        tx.send(Some(vec![VitalRecord::new(); 3])).unwrap();
        drop(tx);

        assert_eq!(source.poll().map(|r| r.len()), Some(3));
        assert_eq!(source.error(), Some("Channel closed"));
        assert!(source.poll().is_none());
    }
}
