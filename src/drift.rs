//! Drift detection between a checked-in generated file and fresh output

use similar::{ChangeTag, TextDiff};

use crate::checksum::Checksum;

/// Difference between an existing generated file and the regenerated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    /// Checksum recorded in the existing file's header
    pub recorded: Option<Checksum>,
    /// Checksum of the current input
    pub current: Option<Checksum>,
    pub added: usize,
    pub removed: usize,
    /// Unified diff, empty when the texts match
    pub diff: String,
}

impl DriftReport {
    /// Compare `existing` against `regenerated` line by line
    pub fn compare(existing: &str, regenerated: &str) -> Self {
        let diff = TextDiff::from_lines(existing, regenerated);

        let mut added = 0;
        let mut removed = 0;
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => added += 1,
                ChangeTag::Delete => removed += 1,
                ChangeTag::Equal => {}
            }
        }

        let unified = if added + removed == 0 {
            String::new()
        } else {
            diff.unified_diff()
                .context_radius(3)
                .header("existing", "regenerated")
                .to_string()
        };

        Self {
            recorded: Checksum::from_header(existing),
            current: Checksum::from_header(regenerated),
            added,
            removed,
            diff: unified,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.added == 0 && self.removed == 0
    }

    /// The input descriptors changed since the file was generated
    pub fn input_changed(&self) -> bool {
        self.recorded != self.current
    }
}
