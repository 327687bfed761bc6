//! Presentation state for the request-confirmation panel.
//!
//! The destination-chain identifier is currently a direct passthrough of
//! the source-chain transaction hash: the cross-chain lookup this panel was
//! designed around is not wired up, so `Received` means "the source
//! transaction hash is known", nothing more. Treat it as a placeholder, not
//! a delivery confirmation.

/// Labels longer than this are shortened for display.
pub const MAX_LABEL_CHARS: usize = 20;

/// Shortens a display label to [`MAX_LABEL_CHARS`] characters, appending an
/// ellipsis. Shorter labels come back unchanged.
pub fn truncate_label(value: &str) -> String {
    if value.chars().count() > MAX_LABEL_CHARS {
        let head: String = value.chars().take(MAX_LABEL_CHARS).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryState {
    InTransit,
    Received,
}

/// What the confirmation panel shows for one submitted request.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationStatus {
    label: String,
    source_tx: Option<String>,
    destination_tx: Option<String>,
}

impl ConfirmationStatus {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source_tx: None,
            destination_tx: None,
        }
    }

    pub fn record_source_tx(&mut self, hash: impl Into<String>) {
        let hash = hash.into();
        self.source_tx = if hash.is_empty() { None } else { Some(hash) };
    }

    /// Derives the destination-chain identifier. Placeholder passthrough of
    /// the source hash; no cross-chain poll happens.
    pub fn refresh_destination(&mut self) {
        self.destination_tx = self.source_tx.clone();
    }

    pub fn state(&self) -> DeliveryState {
        if self.destination_tx.is_some() {
            DeliveryState::Received
        } else {
            DeliveryState::InTransit
        }
    }

    pub fn headline(&self) -> String {
        let state = match self.state() {
            DeliveryState::InTransit => "in Transit",
            DeliveryState::Received => "Received",
        };
        format!("\"{}\" {}", truncate_label(&self.label), state)
    }

    pub fn source_tx(&self) -> Option<&str> {
        self.source_tx.as_deref()
    }

    /// Clears the panel for the next message.
    pub fn reset(&mut self) {
        self.source_tx = None;
        self.destination_tx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_are_cut_to_twenty_chars_plus_ellipsis() {
        let long = "0x1234567890abcdef1234567890abcdef";
        let shortened = truncate_label(long);
        assert_eq!(shortened, "0x1234567890abcdef12...");
        assert_eq!(shortened.chars().count(), MAX_LABEL_CHARS + 3);
    }

    #[test]
    fn short_labels_are_unchanged() {
        assert_eq!(truncate_label("TestProject"), "TestProject");
        let exactly_twenty = "a".repeat(20);
        assert_eq!(truncate_label(&exactly_twenty), exactly_twenty);
    }

    #[test]
    fn status_starts_in_transit_and_receives_on_passthrough() {
        let mut status = ConfirmationStatus::new("Hello Sonic Network!");
        assert_eq!(status.state(), DeliveryState::InTransit);
        assert_eq!(status.headline(), "\"Hello Sonic Network!\" in Transit");

        status.record_source_tx("0xdeadbeef");
        assert_eq!(status.state(), DeliveryState::InTransit);

        status.refresh_destination();
        assert_eq!(status.state(), DeliveryState::Received);
        assert_eq!(status.headline(), "\"Hello Sonic Network!\" Received");
    }

    #[test]
    fn empty_source_hash_never_counts_as_received() {
        let mut status = ConfirmationStatus::new("x");
        status.record_source_tx("");
        status.refresh_destination();
        assert_eq!(status.state(), DeliveryState::InTransit);
    }

    #[test]
    fn reset_clears_both_hashes() {
        let mut status = ConfirmationStatus::new("x");
        status.record_source_tx("0xabc");
        status.refresh_destination();
        status.reset();
        assert_eq!(status.state(), DeliveryState::InTransit);
        assert!(status.source_tx().is_none());
    }
}
