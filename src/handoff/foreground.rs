use crate::audio::{AudioPlayer, PlaybackSnapshot};

use super::coordinator::ForegroundPlayer;

/// The foreground engine as seen by the coordinator.
pub struct PlayerForeground {
    player: AudioPlayer,
}

impl PlayerForeground {
    pub fn new(player: AudioPlayer) -> Self {
        Self { player }
    }
}

impl ForegroundPlayer for PlayerForeground {
    fn detach_playing(&self) -> Option<PlaybackSnapshot> {
        self.player.detach_playing()
    }

    fn restore(&self, snapshot: &PlaybackSnapshot) {
        self.player
            .prepare(&snapshot.url, snapshot.playing, snapshot.position);
    }
}
