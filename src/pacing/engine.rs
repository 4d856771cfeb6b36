//! The playback state machine.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::PeakRate;
use crate::error::ConfigError;
use crate::tokenize::WordSequence;

use super::ramp::{START_WPM, rate_for_index};
use super::timer::TimerSlot;

/// What observers see after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackSnapshot {
    /// Position of the word on display; equals `total` once finished.
    pub index: usize,
    pub total: usize,
    pub playing: bool,
    /// Rate of the current word, rounded.
    pub rate_wpm: u32,
    pub peak_wpm: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// Stopped at the first word.
    Idle,
    Playing,
    /// Stopped part way through.
    Paused,
    /// Stopped after the last word.
    Finished,
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaybackPhase::Idle => "idle",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Paused => "paused",
            PlaybackPhase::Finished => "finished",
        })
    }
}

/// Returned by [`Pacer::subscribe`]; pass to [`Pacer::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&PlaybackSnapshot)>;

/// Paces a [`WordSequence`] one word at a time.
///
/// The pacer owns no clock: every time-dependent call takes `now`, and the
/// driver calls [`poll`](Self::poll) when [`next_due`](Self::next_due)
/// passes. Each word is shown for `60000 / rate` milliseconds, with the
/// rate following the ramp in [`super::ramp`].
///
/// ```
/// use std::time::{Duration, Instant};
/// use tachy::{Pacer, WordSequence};
///
/// let mut pacer = Pacer::new(WordSequence::from_text("one two three"));
/// let start = Instant::now();
/// pacer.toggle(start);
/// assert_eq!(pacer.current_word(), Some("one"));
///
/// // The first word is shown at 120 wpm: half a second
/// assert!(pacer.poll(start + Duration::from_millis(500)));
/// assert_eq!(pacer.current_word(), Some("two"));
/// ```
pub struct Pacer {
    words: WordSequence,
    index: usize,
    playing: bool,
    rate_wpm: u32,
    peak: PeakRate,
    timer: TimerSlot,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl Pacer {
    pub fn new(words: WordSequence) -> Self {
        Self::with_peak_rate(words, PeakRate::default())
    }

    pub fn with_peak_rate(words: WordSequence, peak: PeakRate) -> Self {
        Self {
            words,
            index: 0,
            playing: false,
            rate_wpm: START_WPM as u32,
            peak,
            timer: TimerSlot::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Replace the word sequence; playback always resets.
    pub fn load(&mut self, words: WordSequence) {
        debug!(words = words.len(), "loading word sequence");
        self.words = words;
        self.reset();
    }

    /// Stop, cancel the pending tick and return to the first word.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.playing = false;
        self.index = 0;
        self.rate_wpm = START_WPM as u32;
        self.publish();
    }

    /// Play or pause. From the finished state, restart from the first word.
    pub fn toggle(&mut self, now: Instant) {
        if self.words.is_empty() {
            return;
        }
        if self.index >= self.words.len() {
            self.index = 0;
            self.playing = true;
            self.schedule(now);
        } else if self.playing {
            self.playing = false;
            self.timer.cancel();
            self.publish();
        } else {
            self.playing = true;
            self.schedule(now);
        }
    }

    /// Jump to `target`, clamped to the sequence.
    ///
    /// A pending tick is cancelled; when playing, the new word is scheduled
    /// from `now`.
    pub fn seek(&mut self, target: i64, now: Instant) {
        let Some(last) = self.words.len().checked_sub(1) else {
            return;
        };
        let index = usize::try_from(target.max(0)).map_or(last, |t| t.min(last));

        self.timer.cancel();
        self.index = index;
        if self.playing {
            self.schedule(now);
        } else {
            self.publish();
        }
    }

    /// Fire the pending tick if it is due. Returns whether the pacer advanced.
    ///
    /// At most one word advances per call; the following word is timed from
    /// `now`, so a late poll delays the rest of the sequence rather than
    /// skipping words.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.playing || !self.timer.fire(now) {
            return false;
        }
        self.index += 1;
        self.schedule(now);
        true
    }

    /// When the pending tick falls due, if one is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.timer.due()
    }

    /// Change the peak rate for subsequent words. The pending delay stands.
    pub fn set_peak_rate(&mut self, peak: PeakRate) {
        if peak != self.peak {
            debug!(%peak, "peak rate changed");
            self.peak = peak;
            self.publish();
        }
    }

    /// Validate and apply a user-entered peak rate.
    ///
    /// On rejection the previous rate is kept.
    pub fn commit_peak_rate(&mut self, input: &str) -> Result<PeakRate, ConfigError> {
        let peak = input.parse::<PeakRate>()?;
        self.set_peak_rate(peak);
        Ok(peak)
    }

    pub fn peak_rate(&self) -> PeakRate {
        self.peak
    }

    /// Register an observer, called after every published change.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&PlaybackSnapshot) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            index: self.index,
            total: self.words.len(),
            playing: self.playing,
            rate_wpm: self.rate_wpm,
            peak_wpm: self.peak.wpm(),
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.playing {
            PlaybackPhase::Playing
        } else if !self.words.is_empty() && self.index >= self.words.len() {
            PlaybackPhase::Finished
        } else if self.index == 0 {
            PlaybackPhase::Idle
        } else {
            PlaybackPhase::Paused
        }
    }

    pub fn words(&self) -> &WordSequence {
        &self.words
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The word on display, or `None` once finished.
    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.index)
    }

    /// Fraction of the sequence already passed, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.words.is_empty() {
            0.0
        } else {
            self.index as f64 / self.words.len() as f64
        }
    }

    /// Show the current word: arm the next tick, or stop at the end.
    fn schedule(&mut self, now: Instant) {
        self.timer.cancel();
        let total = self.words.len();
        if self.index >= total {
            debug!(total, "reached the end");
            self.playing = false;
            self.publish();
            return;
        }

        let rate = rate_for_index(self.index, total, f64::from(self.peak.wpm()));
        self.rate_wpm = rate.round() as u32;
        let delay = Duration::from_secs_f64(60.0 / rate);
        self.timer.arm(now + delay);
        trace!(index = self.index, rate_wpm = self.rate_wpm, ?delay, "word scheduled");
        self.publish();
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
    }
}

impl fmt::Debug for Pacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacer")
            .field("snapshot", &self.snapshot())
            .field("next_due", &self.timer.due())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(WordSequence::empty())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn words(n: usize) -> WordSequence {
        WordSequence::from((0..n).map(|i| format!("w{i}")).collect::<Vec<_>>())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_state() {
        let pacer = Pacer::new(words(3));
        assert_eq!(pacer.phase(), PlaybackPhase::Idle);
        assert_eq!(
            pacer.snapshot(),
            PlaybackSnapshot {
                index: 0,
                total: 3,
                playing: false,
                rate_wpm: 120,
                peak_wpm: 650,
            }
        );
        assert_eq!(pacer.next_due(), None);
    }

    #[test]
    fn test_first_word_delay() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(100));
        pacer.toggle(start);
        assert_eq!(pacer.next_due(), Some(start + ms(500)));
        assert!(!pacer.poll(start + ms(499)));
        assert!(pacer.poll(start + ms(500)));
        assert_eq!(pacer.index(), 1);
    }

    #[test]
    fn test_runs_to_finished() {
        let mut now = Instant::now();
        let mut pacer = Pacer::new(words(4));
        pacer.toggle(now);
        while let Some(due) = pacer.next_due() {
            now = due;
            assert!(pacer.poll(now));
        }
        assert_eq!(pacer.phase(), PlaybackPhase::Finished);
        assert_eq!(pacer.index(), 4);
        assert_eq!(pacer.current_word(), None);
        assert_eq!(pacer.progress(), 1.0);
    }

    #[test]
    fn test_late_poll_advances_once() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(10));
        pacer.toggle(start);
        let late = start + Duration::from_secs(60);
        assert!(pacer.poll(late));
        assert!(!pacer.poll(late));
        assert_eq!(pacer.index(), 1);
        assert!(pacer.next_due().unwrap() > late);
    }

    #[test]
    fn test_pause_and_resume() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(10));
        pacer.toggle(start);
        pacer.poll(start + ms(500));
        pacer.toggle(start + ms(600));
        assert_eq!(pacer.phase(), PlaybackPhase::Paused);
        assert_eq!(pacer.next_due(), None);
        assert!(!pacer.poll(start + Duration::from_secs(10)));

        pacer.toggle(start + Duration::from_secs(20));
        assert!(pacer.is_playing());
        assert_eq!(pacer.index(), 1);
        assert!(pacer.next_due().unwrap() > start + Duration::from_secs(20));
    }

    #[test]
    fn test_toggle_from_finished_restarts() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(2));
        pacer.seek(1, start);
        pacer.toggle(start);
        assert!(pacer.poll(pacer.next_due().unwrap()));
        assert_eq!(pacer.phase(), PlaybackPhase::Finished);

        pacer.toggle(start);
        assert_eq!(pacer.index(), 0);
        assert!(pacer.is_playing());
        assert!(pacer.next_due().is_some());
    }

    #[test]
    fn test_seek_clamps() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(100));
        pacer.seek(-5, start);
        assert_eq!(pacer.index(), 0);
        pacer.seek(500, start);
        assert_eq!(pacer.index(), 99);
        pacer.seek(i64::MAX, start);
        assert_eq!(pacer.index(), 99);
        pacer.seek(42, start);
        assert_eq!(pacer.index(), 42);
        assert_eq!(pacer.phase(), PlaybackPhase::Paused);
    }

    #[test]
    fn test_seek_while_playing_reschedules() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(1000));
        pacer.toggle(start);
        pacer.seek(500, start + ms(100));
        // Past the ramp the word lasts 60000 / 650 ms
        let due = pacer.next_due().unwrap();
        assert_eq!(due, start + ms(100) + Duration::from_secs_f64(60.0 / 650.0));
        assert_eq!(pacer.snapshot().rate_wpm, 650);
    }

    #[test]
    fn test_empty_sequence_is_inert() {
        let start = Instant::now();
        let mut pacer = Pacer::default();
        pacer.toggle(start);
        pacer.seek(3, start);
        assert!(!pacer.is_playing());
        assert_eq!(pacer.phase(), PlaybackPhase::Idle);
        assert_eq!(pacer.progress(), 0.0);
    }

    #[test]
    fn test_load_resets() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(10));
        pacer.toggle(start);
        pacer.poll(start + ms(500));
        pacer.load(words(5));
        assert_eq!(pacer.snapshot().index, 0);
        assert!(!pacer.is_playing());
        assert_eq!(pacer.next_due(), None);
        assert_eq!(pacer.snapshot().total, 5);
    }

    #[test]
    fn test_commit_peak_rate() {
        let mut pacer = Pacer::new(words(10));
        assert_eq!(pacer.commit_peak_rate("400").unwrap().wpm(), 400);
        assert!(pacer.commit_peak_rate("2000").is_err());
        assert!(pacer.commit_peak_rate("abc").is_err());
        assert_eq!(pacer.peak_rate().wpm(), 400);
    }

    #[test]
    fn test_peak_change_keeps_pending_delay() {
        let start = Instant::now();
        let mut pacer = Pacer::new(words(1000));
        pacer.seek(200, start);
        pacer.toggle(start);
        let due = pacer.next_due();
        pacer.set_peak_rate(PeakRate::try_from(1000).unwrap());
        assert_eq!(pacer.next_due(), due);

        pacer.poll(due.unwrap());
        assert_eq!(pacer.snapshot().rate_wpm, 1000);
    }

    #[test]
    fn test_observers() {
        let start = Instant::now();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pacer = Pacer::new(words(3));

        let sink = Rc::clone(&seen);
        let id = pacer.subscribe(move |s| sink.borrow_mut().push(*s));
        pacer.toggle(start);
        pacer.poll(start + ms(500));
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1].index, 1);

        assert!(pacer.unsubscribe(id));
        assert!(!pacer.unsubscribe(id));
        pacer.reset();
        assert_eq!(seen.borrow().len(), 2);
    }
}
