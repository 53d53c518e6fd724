//! Dual-handle price range slider.
//!
//! The slider is `Idle` until a pointer goes down on one of its handles, then
//! `Dragging` that handle until the pointer is released anywhere or the
//! capture is lost. While dragging, every pointer move converts the pixel
//! delta into a domain value, snaps it to the step grid and clamps it against
//! the bounds and the other handle. Displayed values change at once, the
//! propagation to the filter state goes through a debouncer. Releasing the
//! pointer hands out the final values immediately.
use std::fmt;
use std::time::{Duration, Instant};

use config::Slider as SliderConfig;
use filters::debounce::Debouncer;

/// Routing of global pointer events to the slider while a drag is in progress
pub trait PointerCapture {
    /// Starts delivering every pointer move and release to the slider
    fn attach(&mut self);
    /// Stops delivering pointer events to the slider
    fn detach(&mut self);
}

/// Capture for hosts that route pointer events on their own
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn attach(&mut self) {}
    fn detach(&mut self) {}
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { handle: Handle, start_x: f64, start_value: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderSettings {
    pub step: f64,
    pub debounce: Duration,
    pub track_width: f64,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            step: 100.0,
            debounce: Duration::from_millis(100),
            track_width: 300.0,
        }
    }
}

impl<'a> From<&'a SliderConfig> for SliderSettings {
    fn from(config: &'a SliderConfig) -> Self {
        Self {
            step: config.step,
            debounce: Duration::from_millis(config.debounce_ms),
            track_width: config.track_width,
        }
    }
}

pub struct RangeSlider {
    min: f64,
    max: f64,
    low: f64,
    high: f64,
    low_text: String,
    high_text: String,
    settings: SliderSettings,
    state: DragState,
    pending: Debouncer<(f64, f64)>,
    capture: Box<PointerCapture>,
}

impl fmt::Debug for RangeSlider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RangeSlider")
            .field("bounds", &(self.min, self.max))
            .field("values", &(self.low, self.high))
            .field("state", &self.state)
            .field("pending", &self.pending.is_pending())
            .finish()
    }
}

impl RangeSlider {
    /// Slider over `[min, max]` with both handles at the bounds
    pub fn new(min: f64, max: f64, settings: SliderSettings) -> Self {
        let (min, max) = ordered(min, max);
        let mut slider = Self {
            min,
            max,
            low: min,
            high: max,
            low_text: String::new(),
            high_text: String::new(),
            settings,
            state: DragState::Idle,
            pending: Debouncer::new(settings.debounce),
            capture: Box::new(NoCapture),
        };
        slider.update_texts();
        slider
    }

    /// Replaces the pointer capture. A drag in progress is ended first.
    pub fn set_capture(&mut self, capture: Box<PointerCapture>) {
        self.release();
        self.capture = capture;
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Displayed handle values
    pub fn values(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    pub fn low_text(&self) -> &str {
        &self.low_text
    }

    pub fn high_text(&self) -> &str {
        &self.high_text
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn settings(&self) -> SliderSettings {
        self.settings
    }

    /// Moves the slider onto new bounds. A drag in progress ends without
    /// producing a value, handles are pulled inside the new bounds.
    pub fn rebound(&mut self, min: f64, max: f64) {
        self.release();
        let (min, max) = ordered(min, max);
        self.min = min;
        self.max = max;
        let (low, high) = self.values();
        self.set_values(low, high);
    }

    /// Places both handles, clamped into the bounds and ordered. Drops any pending update.
    pub fn set_values(&mut self, low: f64, high: f64) {
        let (low, high) = ordered(low, high);
        self.low = low.max(self.min).min(self.max);
        self.high = high.max(self.min).min(self.max);
        self.pending.cancel();
        self.update_texts();
    }

    /// Pointer went down on `handle` at horizontal position `x`
    pub fn pointer_down(&mut self, handle: Handle, x: f64) {
        if self.is_dragging() {
            return;
        }
        let start_value = match handle {
            Handle::Min => self.low,
            Handle::Max => self.high,
        };
        self.capture.attach();
        self.state = DragState::Dragging {
            handle,
            start_x: x,
            start_value,
        };
    }

    /// Pointer moved to `x` during a drag. Returns the new displayed values and
    /// re-arms the debounced propagation.
    pub fn pointer_move(&mut self, x: f64, now: Instant) -> Option<(f64, f64)> {
        let (handle, start_x, start_value) = match self.state {
            DragState::Idle => return None,
            DragState::Dragging {
                handle,
                start_x,
                start_value,
            } => (handle, start_x, start_value),
        };

        let delta = if self.settings.track_width > 0.0 {
            (x - start_x) / self.settings.track_width * (self.max - self.min)
        } else {
            0.0
        };
        let value = self.quantize(start_value + delta);
        let gap = self.min_gap();

        match handle {
            Handle::Min => self.low = value.min(self.high - gap).max(self.min),
            Handle::Max => self.high = value.max(self.low + gap).min(self.max),
        }

        self.update_texts();
        self.pending.schedule((self.low, self.high), now);
        Some(self.values())
    }

    /// Pointer released. Ends the drag and returns the values to commit right away.
    pub fn pointer_up(&mut self) -> Option<(f64, f64)> {
        if !self.is_dragging() {
            return None;
        }
        self.release();
        self.pending.cancel();
        Some(self.values())
    }

    /// Capture lost mid-drag, e.g. the window went out of focus. Same as a release.
    pub fn capture_lost(&mut self) -> Option<(f64, f64)> {
        self.pointer_up()
    }

    /// Debounced values whose quiet period is over
    pub fn poll(&mut self, now: Instant) -> Option<(f64, f64)> {
        self.pending.poll(now)
    }

    /// Manual entry in the numeric fields. Unparsable text keeps the current
    /// boundary, the result is clamped, ordered and committed at once.
    pub fn commit_text(&mut self, low_text: &str, high_text: &str) -> (f64, f64) {
        let low = parse_amount(low_text).unwrap_or(self.low);
        let high = parse_amount(high_text).unwrap_or(self.high);
        self.set_values(low, high);
        self.values()
    }

    fn release(&mut self) {
        if self.is_dragging() {
            self.capture.detach();
            self.state = DragState::Idle;
        }
    }

    fn quantize(&self, value: f64) -> f64 {
        if self.settings.step > 0.0 {
            (value / self.settings.step).round() * self.settings.step
        } else {
            value
        }
    }

    /// One step, or the whole span when the bounds are closer than a step
    fn min_gap(&self) -> f64 {
        let span = self.max - self.min;
        if span < self.settings.step {
            span
        } else {
            self.settings.step
        }
    }

    fn update_texts(&mut self) {
        self.low_text = self.low.to_string();
        self.high_text = self.high.to_string();
    }
}

impl Drop for RangeSlider {
    fn drop(&mut self) {
        self.release();
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingCapture {
        events: Rc<RefCell<Vec<&'static str>>>,
    }

    impl PointerCapture for RecordingCapture {
        fn attach(&mut self) {
            self.events.borrow_mut().push("attach");
        }

        fn detach(&mut self) {
            self.events.borrow_mut().push("detach");
        }
    }

    fn slider() -> RangeSlider {
        // 300px track over a 3000 span: one pixel is ten currency units
        RangeSlider::new(0.0, 3000.0, SliderSettings::default())
    }

    fn ms(start: Instant, millis: u64) -> Instant {
        start + Duration::from_millis(millis)
    }

    #[test]
    fn test_drag_converts_and_quantizes() {
        let start = Instant::now();
        let mut slider = slider();
        slider.pointer_down(Handle::Min, 10.0);
        assert_eq!(slider.pointer_move(22.0, start), Some((100.0, 3000.0)));
        assert_eq!(slider.pointer_move(26.0, start), Some((200.0, 3000.0)));
        assert_eq!(slider.low_text(), "200");
        assert_eq!(slider.pointer_up(), Some((200.0, 3000.0)));
        assert!(!slider.is_dragging());
    }

    #[test]
    fn test_min_handle_stops_one_step_below_max() {
        let start = Instant::now();
        let mut slider = slider();
        slider.pointer_down(Handle::Max, 300.0);
        slider.pointer_move(100.0, start);
        slider.pointer_up();
        assert_eq!(slider.values(), (0.0, 1000.0));

        slider.pointer_down(Handle::Min, 0.0);
        slider.pointer_move(290.0, start);
        assert_eq!(slider.values(), (900.0, 1000.0));
        slider.pointer_move(-500.0, start);
        assert_eq!(slider.values(), (0.0, 1000.0));
    }

    #[test]
    fn test_clamp_invariant_holds_for_long_drags() {
        let start = Instant::now();
        let mut slider = RangeSlider::new(100.0, 5000.0, SliderSettings::default());
        let moves = [-400.0, 35.5, 612.0, 120.0, -7.0, 299.9, 1000.0, 42.0];
        for (i, handle) in [Handle::Min, Handle::Max, Handle::Min, Handle::Max].iter().enumerate() {
            slider.pointer_down(*handle, 150.0);
            for (j, x) in moves.iter().enumerate() {
                slider.pointer_move(*x, ms(start, (i * 10 + j) as u64));
                let (low, high) = slider.values();
                assert!(low <= high - 100.0, "{} > {} - step", low, high);
                assert!(low >= 100.0);
                assert!(high <= 5000.0);
            }
            slider.pointer_up();
        }
    }

    #[test]
    fn test_burst_propagates_once_then_release_once() {
        let start = Instant::now();
        let mut slider = slider();
        let mut propagated = vec![];

        slider.pointer_down(Handle::Min, 0.0);
        for i in 0..8u64 {
            slider.pointer_move((i * 10) as f64, ms(start, i * 10));
            if let Some(values) = slider.poll(ms(start, i * 10)) {
                propagated.push(values);
            }
        }
        assert!(propagated.is_empty());
        if let Some(values) = slider.poll(ms(start, 70 + 100)) {
            propagated.push(values);
        }
        assert_eq!(propagated, vec![(700.0, 3000.0)]);
        assert_eq!(slider.poll(ms(start, 400)), None);

        assert_eq!(slider.pointer_up(), Some((700.0, 3000.0)));
        assert_eq!(slider.poll(ms(start, 1000)), None);
    }

    #[test]
    fn test_release_cancels_pending_propagation() {
        let start = Instant::now();
        let mut slider = slider();
        slider.pointer_down(Handle::Max, 300.0);
        slider.pointer_move(250.0, start);
        assert!(slider.has_pending_update());
        assert_eq!(slider.pointer_up(), Some((0.0, 2500.0)));
        assert!(!slider.has_pending_update());
    }

    #[test]
    fn test_capture_is_released_on_every_exit() {
        let capture = RecordingCapture::default();
        let events = capture.events.clone();
        {
            let mut slider = slider();
            slider.set_capture(Box::new(capture));

            slider.pointer_down(Handle::Min, 0.0);
            slider.pointer_up();

            slider.pointer_down(Handle::Min, 0.0);
            assert!(slider.capture_lost().is_some());

            slider.pointer_down(Handle::Max, 0.0);
            slider.rebound(0.0, 100.0);

            slider.pointer_down(Handle::Max, 0.0);
        }
        assert_eq!(
            *events.borrow(),
            vec!["attach", "detach", "attach", "detach", "attach", "detach", "attach", "detach"]
        );
    }

    #[test]
    fn test_moves_while_idle_are_ignored() {
        let mut slider = slider();
        assert_eq!(slider.pointer_move(100.0, Instant::now()), None);
        assert_eq!(slider.pointer_up(), None);
        assert!(!slider.has_pending_update());
    }

    #[test]
    fn test_text_entry_clamps_orders_and_falls_back() {
        let mut slider = slider();
        assert_eq!(slider.commit_text("2500", "-10"), (0.0, 2500.0));
        assert_eq!(slider.commit_text("abc", "9999"), (0.0, 3000.0));
        assert_eq!(slider.commit_text(" 150 ", ""), (150.0, 3000.0));
        assert_eq!(slider.high_text(), "3000");
    }

    #[test]
    fn test_narrow_bounds_use_span_as_gap() {
        let start = Instant::now();
        let mut slider = RangeSlider::new(100.0, 150.0, SliderSettings::default());
        slider.pointer_down(Handle::Min, 0.0);
        slider.pointer_move(300.0, start);
        assert_eq!(slider.values(), (100.0, 150.0));
    }
}
