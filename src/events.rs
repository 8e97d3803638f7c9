use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
}

/// A file picked up by the content catalog during one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// What the scheduler decided to show for a single photo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDecision {
    pub photo: PathBuf,
    /// Index into the cycle's eligible announcements.
    pub announcement: Option<usize>,
    pub video: Option<PathBuf>,
}
