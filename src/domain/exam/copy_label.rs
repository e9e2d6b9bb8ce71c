//! Copy label value object.

use std::fmt;
use std::num::NonZeroU32;

/// On-page label distinguishing printed copies of one exam.
///
/// `CopyLabel::UNLABELLED` (0) is used for single-document exports and
/// prints no version line. A positive label `k` marks copy `k` of a batch.
/// The label is display-only: every copy carries identical questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CopyLabel(u32);

impl CopyLabel {
    pub const UNLABELLED: CopyLabel = CopyLabel(0);

    /// Label for copy `number` of a batch.
    pub fn copy(number: NonZeroU32) -> Self {
        Self(number.get())
    }

    /// Returns the copy number, or `None` when unlabelled.
    pub fn number(&self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn is_labelled(&self) -> bool {
        self.0 > 0
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CopyLabel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CopyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
