/// Session-level tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// No detection accepted yet
    #[default]
    Bootstrap,
    /// At least one genuine detection in the history
    Tracking,
}

/// What happened to the ball in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A candidate passed the gate
    Detected,
    /// No accepted candidate; position extrapolated for display only
    Interpolated,
    /// Position unknown
    Lost,
}
