//! Last-observed clipboard text and change deduplication.
//!
//! The OS raises a change notification for every clipboard write, including
//! writes that put back the exact same text (a second Ctrl+C on the same
//! selection, for example).  [`ClipboardSnapshot::observe`] collapses those
//! into a single [`ContentChange`].

/// A newly observed, distinct clipboard text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub text: String,
    /// Revision of the snapshot after this change was applied.
    pub revision: u64,
}

/// The most recent clipboard text the agent has seen.
///
/// `revision` starts at zero and increases by exactly one per accepted change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    text: String,
    revision: u64,
}

impl ClipboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies one clipboard observation.
    ///
    /// `None` (no text format on the clipboard) and empty text are ignored
    /// without touching the snapshot.  Text identical to the stored value is a
    /// duplicate.  Anything else replaces the stored text and bumps the
    /// revision.
    pub fn observe(&mut self, text: Option<&str>) -> Option<ContentChange> {
        let text = text.filter(|t| !t.is_empty())?;
        if text == self.text {
            tracing::trace!(revision = self.revision, "clipboard text unchanged");
            return None;
        }
        self.text.clear();
        self.text.push_str(text);
        self.revision += 1;
        Some(ContentChange {
            text: self.text.clone(),
            revision: self.revision,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snapshot_is_empty_at_revision_zero() {
        let snap = ClipboardSnapshot::new();
        assert_eq!(snap.text(), "");
        assert_eq!(snap.revision(), 0);
    }

    #[test]
    fn test_sequence_with_duplicate_emits_two_changes() {
        // Arrange
        let mut snap = ClipboardSnapshot::new();
        let observed = ["", "Hello", "Hello", "World"];

        // Act
        let changes: Vec<ContentChange> = observed
            .iter()
            .filter_map(|t| snap.observe(Some(t)))
            .collect();

        // Assert
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].text, "Hello");
        assert_eq!(changes[0].revision, 1);
        assert_eq!(changes[1].text, "World");
        assert_eq!(changes[1].revision, 2);
    }

    #[test]
    fn test_non_text_payload_is_ignored() {
        // Arrange
        let mut snap = ClipboardSnapshot::new();
        snap.observe(Some("before"));

        // Act
        let change = snap.observe(None);

        // Assert: snapshot is untouched
        assert!(change.is_none());
        assert_eq!(snap.text(), "before");
        assert_eq!(snap.revision(), 1);
    }

    #[test]
    fn test_same_text_after_non_text_payload_is_still_duplicate() {
        let mut snap = ClipboardSnapshot::new();
        snap.observe(Some("Hello"));
        snap.observe(None);
        assert!(snap.observe(Some("Hello")).is_none());
    }

    #[test]
    fn test_returning_to_earlier_text_counts_as_change() {
        let mut snap = ClipboardSnapshot::new();
        snap.observe(Some("A"));
        snap.observe(Some("B"));
        let change = snap.observe(Some("A")).expect("A differs from B");
        assert_eq!(change.revision, 3);
    }

    #[test]
    fn test_whitespace_only_text_is_a_real_change() {
        let mut snap = ClipboardSnapshot::new();
        assert!(snap.observe(Some(" ")).is_some());
    }
}
