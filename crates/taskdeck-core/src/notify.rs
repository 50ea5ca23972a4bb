use std::fmt;
use std::time::Duration;

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✕",
            NotificationKind::Info => "ℹ",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Info)
    }
}

/// Single-slot notification holder.
///
/// Every `show` bumps a generation counter. Expiry is keyed on that counter,
/// so a dismissal scheduled for an earlier notification is a no-op once it
/// has been replaced.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    current: Option<Notification>,
    generation: u64,
}

impl NotificationQueue {
    /// Replaces whatever is showing and returns the new generation.
    pub fn show(&mut self, notification: Notification) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        tracing::debug!(
            generation = self.generation,
            kind = %notification.kind,
            message = %notification.message,
            replaced = self.current.is_some(),
            "notification shown"
        );
        self.current = Some(notification);
        self.generation
    }

    pub fn dismiss(&mut self) -> Option<Notification> {
        self.current.take()
    }

    /// Clears the notification only if it is still the one shown at
    /// `generation`. Returns whether anything was cleared.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.current.is_none() {
            tracing::trace!(
                generation,
                current = self.generation,
                "ignoring stale notification expiry"
            );
            return false;
        }
        self.current = None;
        true
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_replaces_previous_message() {
        let mut queue = NotificationQueue::default();
        queue.show(Notification::info("first"));
        queue.show(Notification::error("second"));
        assert_eq!(queue.current(), Some(&Notification::error("second")));
    }

    #[test]
    fn stale_expiry_leaves_replacement_visible() {
        let mut queue = NotificationQueue::default();
        let first = queue.show(Notification::success("saved"));
        let second = queue.show(Notification::info("editing"));

        assert!(!queue.expire(first));
        assert_eq!(queue.current(), Some(&Notification::info("editing")));

        assert!(queue.expire(second));
        assert_eq!(queue.current(), None);
        assert!(!queue.expire(second));
    }

    #[test]
    fn dismiss_then_expire_is_harmless() {
        let mut queue = NotificationQueue::default();
        let generation = queue.show(Notification::success("done"));
        assert_eq!(queue.dismiss(), Some(Notification::success("done")));
        assert!(!queue.expire(generation));
        assert_eq!(queue.dismiss(), None);
    }

    #[test]
    fn default_kind_is_success() {
        assert_eq!(NotificationKind::default(), NotificationKind::Success);
    }
}
