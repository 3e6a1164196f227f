use std::fmt;

/// Track status reported to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    /// Newly created track, not yet confirmed
    #[default]
    Tentative,
    /// Matched often enough to be trusted
    Confirmed,
    /// Missed on the latest cycle(s), still awaiting eviction
    Lost,
}

impl fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrackStatus::Tentative => "tentative",
            TrackStatus::Confirmed => "confirmed",
            TrackStatus::Lost => "lost",
        };
        f.write_str(s)
    }
}
