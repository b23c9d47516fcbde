/*!
    Progress reporting shared between the engine and its frontends.

    The engine owns a [ProcessParameter] and pushes completion figures
    into it from the packet loop; frontends register a [ProgressObserver]
    to hear about them. Observer callbacks run outside the internal locks
    so a slow listener can never stall the conversion.
*/

use std::sync::Arc;

use parking_lot::Mutex;

/** Receives progress updates for a running conversion. */
pub trait ProgressObserver: Send + Sync {
    /** Called with the overall completion in percent, 0 to 100. */
    fn on_progress(&self, percent: f64);

    /** Called with the estimated remaining wall-clock time in seconds. */
    fn on_time_remaining(&self, _seconds: f64) {}
}

#[derive(Default)]
struct ProgressState {
    percent: f64,
    time_remaining: f64,
}

/** Shared progress hub for one conversion job. */
#[derive(Default)]
pub struct ProcessParameter {
    state: Mutex<ProgressState>,
    observers: Mutex<Vec<Arc<dyn ProgressObserver>>>,
}

impl ProcessParameter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&self, observer: Arc<dyn ProgressObserver>) {
        self.observers.lock().push(observer);
    }

    /** Removes a previously added observer, matched by identity. */
    pub fn remove_observer(&self, observer: &Arc<dyn ProgressObserver>) {
        self.observers
            .lock()
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    /** Current completion in percent. */
    pub fn percent(&self) -> f64 {
        self.state.lock().percent
    }

    /** Last published remaining-time estimate in seconds. */
    pub fn time_remaining(&self) -> f64 {
        self.state.lock().time_remaining
    }

    /** Publishes `current` out of `total` as a percentage. */
    pub fn set_progress(&self, current: i64, total: i64) {
        if total <= 0 || current < 0 {
            return;
        }
        let percent = (current as f64 / total as f64 * 100.0).clamp(0.0, 100.0);
        self.publish_percent(percent);
    }

    /** Publishes an absolute completion percentage directly. */
    pub fn set_percent(&self, percent: f64) {
        if !(0.0..=100.0).contains(&percent) {
            return;
        }
        self.publish_percent(percent);
    }

    /** Publishes a remaining-time estimate in seconds. */
    pub fn set_time_remaining(&self, seconds: f64) {
        if seconds < 0.0 {
            return;
        }
        {
            let mut state = self.state.lock();
            state.time_remaining = seconds;
        }
        for observer in self.snapshot() {
            observer.on_time_remaining(seconds);
        }
    }

    fn publish_percent(&self, percent: f64) {
        {
            let mut state = self.state.lock();
            // Suppress updates that would render identically. Completion
            // always goes out so listeners can rely on a final 100.
            if state.percent.round() == percent.round() && state.percent != 0.0 && percent < 100.0
            {
                state.percent = percent;
                return;
            }
            state.percent = percent;
        }
        for observer in self.snapshot() {
            observer.on_progress(percent);
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn ProgressObserver>> {
        self.observers.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
        last: Mutex<f64>,
    }

    impl ProgressObserver for Recorder {
        fn on_progress(&self, percent: f64) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = percent;
        }
    }

    #[test]
    fn observers_hear_progress() {
        let process = ProcessParameter::new();
        let recorder = Arc::new(Recorder::default());
        process.add_observer(recorder.clone());

        process.set_progress(1, 4);
        process.set_progress(1, 2);

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 2);
        assert_eq!(*recorder.last.lock(), 50.0);
        assert_eq!(process.percent(), 50.0);
    }

    #[test]
    fn near_identical_updates_are_coalesced() {
        let process = ProcessParameter::new();
        let recorder = Arc::new(Recorder::default());
        process.add_observer(recorder.clone());

        process.set_progress(500, 1000);
        process.set_progress(501, 1000);
        process.set_progress(502, 1000);
        process.set_progress(510, 1000);

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removed_observer_stays_silent() {
        let process = ProcessParameter::new();
        let recorder: Arc<Recorder> = Arc::new(Recorder::default());
        let observer: Arc<dyn ProgressObserver> = recorder.clone();
        process.add_observer(observer.clone());
        process.remove_observer(&observer);

        process.set_progress(1, 2);
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn absolute_percent_is_bounded() {
        let process = ProcessParameter::new();
        process.set_percent(120.0);
        process.set_percent(-5.0);
        assert_eq!(process.percent(), 0.0);
        process.set_percent(42.0);
        assert_eq!(process.percent(), 42.0);
    }

    #[test]
    fn degenerate_totals_are_ignored() {
        let process = ProcessParameter::new();
        process.set_progress(10, 0);
        process.set_progress(-1, 100);
        assert_eq!(process.percent(), 0.0);
    }

    #[test]
    fn completion_is_clamped() {
        let process = ProcessParameter::new();
        process.set_progress(150, 100);
        assert_eq!(process.percent(), 100.0);
    }

    #[test]
    fn time_remaining_reaches_observers() {
        struct Eta(Mutex<f64>);
        impl ProgressObserver for Eta {
            fn on_progress(&self, _percent: f64) {}
            fn on_time_remaining(&self, seconds: f64) {
                *self.0.lock() = seconds;
            }
        }

        let process = ProcessParameter::new();
        let eta = Arc::new(Eta(Mutex::new(0.0)));
        process.add_observer(eta.clone());
        process.set_time_remaining(12.5);
        assert_eq!(*eta.0.lock(), 12.5);
        assert_eq!(process.time_remaining(), 12.5);
    }
}
