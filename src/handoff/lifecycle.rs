use super::types::LifecycleEvent;

/// Turns raw visibility signals into transitions, dropping repeats.
#[derive(Debug)]
pub struct LifecycleTracker {
    visible: bool,
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, visible: bool) -> Option<LifecycleEvent> {
        if visible == self.visible {
            return None;
        }
        self.visible = visible;
        Some(if visible {
            LifecycleEvent::EnteredForeground
        } else {
            LifecycleEvent::EnteredBackground
        })
    }
}
