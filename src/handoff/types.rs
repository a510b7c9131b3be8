use std::time::Duration;

/// Host visibility transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    EnteredBackground,
    EnteredForeground,
}

/// Commands accepted by a running background service.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ServiceCmd {
    Play,
    Pause,
    TogglePlayPause,
    SkipForward,
    SkipBackward,
    SeekTo(Duration),
    /// Release and acknowledge with the final position.
    Stop,
    /// Report position, then release. Sent when the foreground reclaims.
    RequestPosition,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ServiceEvent {
    pub handoff: u64,
    pub kind: ServiceEventKind,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ServiceEventKind {
    /// Periodic progress while the service plays.
    Tick { position: Duration, playing: bool },
    /// Final report. The service has released its resources when this arrives.
    Ack { position: Duration, playing: bool },
}
