//! Resource pack status reports.

use std::fmt;

/// Status a client reports for a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackStatus {
    Accepted,
    Downloaded,
    Successful,
    Declined,
    Failed,
    InvalidUrl,
    /// The client dropped the pack (modern clients only).
    Discarded,
    FailedReload,
}

impl PackStatus {
    /// Accepted and Downloaded precede a terminal report.
    pub fn is_intermediate(self) -> bool {
        matches!(self, Self::Accepted | Self::Downloaded)
    }

    pub fn is_success(self) -> bool {
        self == Self::Successful
    }

    /// The client explicitly refused the pack.
    pub fn is_refusal(self) -> bool {
        self == Self::Declined
    }

    /// Terminal and not successful.
    pub fn is_failure(self) -> bool {
        !self.is_intermediate() && !self.is_success()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Downloaded => "downloaded",
            Self::Successful => "successful",
            Self::Declined => "declined",
            Self::Failed => "failed",
            Self::InvalidUrl => "invalid_url",
            Self::Discarded => "discarded",
            Self::FailedReload => "failed_reload",
        }
    }
}

impl fmt::Display for PackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
