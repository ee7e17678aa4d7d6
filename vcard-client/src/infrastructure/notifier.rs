use parking_lot::Mutex;

use crate::domain::{NotificationKind, Notifier};

/// Writes notifications to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => tracing::info!(target: "vcard::notify", "{}", message),
            NotificationKind::Error => tracing::error!(target: "vcard::notify", "{}", message),
        }
    }
}

/// Keeps every notification in memory so callers can inspect them
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(NotificationKind, String)> {
        self.events.lock().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.events.lock().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn last(&self) -> Option<(NotificationKind, String)> {
        self.events.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.events.lock().push((kind, message.to_string()));
    }
}
