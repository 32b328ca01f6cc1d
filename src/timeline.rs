// ⏯️ Timeline Reconstruction - playback and risk filtering over a fixed event sequence
//
// Two independent state axes:
// - playing ∈ {true, false}, initially false
// - current_index ∈ [0, N-1], initially 0
//
// The visible list depends only on the filter and the highlight only on the
// index, so filter and index changes commute. Highlighting is computed
// against an event's position in the UNFILTERED sequence.

use crate::models::{EventType, RiskFilter, TimelineEvent};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// VISIBLE EVENT
// ============================================================================

/// One row of the filtered timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleEvent<'a> {
    pub event: &'a TimelineEvent,

    /// Position in the unfiltered sequence
    pub position: usize,

    /// Already played back (position ≤ current index)
    pub highlighted: bool,

    /// Exactly at the playback head
    pub current: bool,
}

/// Aggregate figures for the "Temporal Analysis" panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimelineSummary {
    pub event_count: usize,
    pub transaction_count: usize,
    pub pattern_count: usize,
    pub alert_count: usize,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
}

impl TimelineSummary {
    pub fn from_events(events: &[TimelineEvent]) -> Self {
        let count = |kind: EventType| events.iter().filter(|e| e.event_type == kind).count();

        TimelineSummary {
            event_count: events.len(),
            transaction_count: count(EventType::Transaction),
            pattern_count: count(EventType::Pattern),
            alert_count: count(EventType::Alert),
            window_start: events.first().map(|e| e.time.clone()),
            window_end: events.last().map(|e| e.time.clone()),
        }
    }

    /// "14:30:00 - 14:35:00", or "—" for an empty timeline
    pub fn window(&self) -> String {
        match (&self.window_start, &self.window_end) {
            (Some(start), Some(end)) => format!("{} - {}", start, end),
            _ => "—".to_string(),
        }
    }
}

// ============================================================================
// TIMELINE CONTROLLER
// ============================================================================

#[derive(Debug, Clone)]
pub struct TimelineController {
    events: Vec<TimelineEvent>,
    filter: RiskFilter,
    current_index: usize,
    playing: bool,

    /// Original positions of the events passing the filter, in order
    visible: Vec<usize>,
}

impl TimelineController {
    pub fn new(events: Vec<TimelineEvent>) -> Self {
        let visible = (0..events.len()).collect();
        TimelineController {
            events,
            filter: RiskFilter::All,
            current_index: 0,
            playing: false,
            visible,
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Replace the active filter and recompute the visible subsequence
    pub fn set_filter(&mut self, filter: RiskFilter) {
        self.filter = filter;
        self.visible = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, event)| filter.matches_event(event.risk))
            .map(|(position, _)| position)
            .collect();
        debug!(filter = filter.as_str(), visible = self.visible.len(), "timeline filter changed");
    }

    /// Move the playback head. Out-of-range values clamp to [0, N-1];
    /// an empty timeline keeps the index at 0. Returns the applied index.
    pub fn set_current_index(&mut self, index: i64) -> usize {
        let last = self.events.len().saturating_sub(1) as i64;
        let clamped = index.clamp(0, last) as usize;
        if clamped as i64 != index {
            debug!(requested = index, applied = clamped, "playback index clamped");
        }
        self.current_index = clamped;
        clamped
    }

    /// Flip play/pause. Advancing is left to the tick driver.
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// The filtered sequence with highlight flags
    pub fn visible_events(&self) -> Vec<VisibleEvent<'_>> {
        self.visible
            .iter()
            .map(|&position| VisibleEvent {
                event: &self.events[position],
                position,
                highlighted: position <= self.current_index,
                current: position == self.current_index,
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Playback helpers
    // ------------------------------------------------------------------------

    pub fn step_forward(&mut self) -> usize {
        self.set_current_index(self.current_index as i64 + 1)
    }

    pub fn step_back(&mut self) -> usize {
        self.set_current_index(self.current_index as i64 - 1)
    }

    pub fn rewind(&mut self) {
        self.current_index = 0;
    }

    pub fn jump_to_end(&mut self) -> usize {
        self.set_current_index(self.events.len() as i64 - 1)
    }

    /// Timer-driver hook. While playing, advance one event; playback pauses
    /// itself once the last event is reached. Returns whether the head moved.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }

        let last = self.events.len().saturating_sub(1);
        if self.current_index >= last {
            self.playing = false;
            return false;
        }

        self.current_index += 1;
        if self.current_index == last {
            debug!("playback reached the last event");
            self.playing = false;
        }
        true
    }

    /// Fill ratio of the progress bar: current index over sequence length
    pub fn progress(&self) -> f64 {
        if self.events.is_empty() {
            0.0
        } else {
            self.current_index as f64 / self.events.len() as f64
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_event(&self) -> Option<&TimelineEvent> {
        self.events.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn filter(&self) -> RiskFilter {
        self.filter
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn summary(&self) -> TimelineSummary {
        TimelineSummary::from_events(&self.events)
    }
}

// ============================================================================
// TESTS
// ============================================================================
