//! Presentation adapter seam.
//!
//! The engine only produces [`Event`]s. Rendering, audio cues and the
//! completion screen live behind this trait.

use crate::events::Event;
use crate::timer::Announcement;

pub trait PresentationAdapter {
    fn present(&mut self, event: &Event);

    fn present_all(&mut self, events: &[Event]) {
        for event in events {
            self.present(event);
        }
    }
}

/// Keeps every event it is shown. Used by tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    events: Vec<Event>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Announcement { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PresentationAdapter for RecordingPresenter {
    fn present(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}

impl<P: PresentationAdapter + ?Sized> PresentationAdapter for &mut P {
    fn present(&mut self, event: &Event) {
        (**self).present(event);
    }
}
