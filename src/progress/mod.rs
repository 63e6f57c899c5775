//! Shared spinner registry for concurrent operations.
//!
//! A [`ProgressTracker`] keeps a set of labelled operations "in flight" and
//! drives a single animated status line on one background renderer thread.
//! The line is redrawn in place with carriage returns while operations are
//! active; each finished operation scrolls into permanent output with a
//! check or cross mark. The tracker is an explicit instance (cloneable,
//! `Arc`-backed) rather than a process-wide global, so tests can run several
//! registries side by side with captured output.

mod runner;

pub use runner::{run_parallel, Task};

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// Redraw interval for the animated status line.
const TICK: Duration = Duration::from_millis(100);

/// Animation style for the status line. Purely cosmetic; every style is a
/// fixed cycle of glyphs drawn at the same tick rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinnerStyle {
    /// Braille dots: ⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏
    #[default]
    Dots,
    /// Rotating arrow: ←↖↑↗→↘↓↙
    Arrow,
    /// Filling bar: █▉▊▋▌▍▎▏
    Bar,
    /// Pulsing circle: ◐◓◑◒
    Pulse,
    /// Moon phases: 🌑🌒🌓🌔🌕🌖🌗🌘
    Moon,
    /// Braille shimmer: ⣾⣽⣻⢿⡿⣟⣯⣷
    Braille,
}

impl SpinnerStyle {
    /// The glyph cycle for this style.
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            SpinnerStyle::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            SpinnerStyle::Arrow => &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
            SpinnerStyle::Bar => &["█", "▉", "▊", "▋", "▌", "▍", "▎", "▏"],
            SpinnerStyle::Pulse => &["◐", "◓", "◑", "◒"],
            SpinnerStyle::Moon => &["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"],
            SpinnerStyle::Braille => &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
        }
    }
}

/// Tracks concurrently active labelled operations and renders one animated
/// status line for them.
///
/// The displayed label is the most recently started operation that is still
/// active; when it stops, the previous still-active label takes over. Labels
/// may repeat: the active set is a multiset, and `stop` removes one
/// occurrence per call.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    state: Mutex<TrackerState>,
    /// Width of the last in-place redraw, so shorter lines can blank it out.
    last_width: AtomicUsize,
    writer: Mutex<Box<dyn Write + Send>>,
}

struct TrackerState {
    /// Active labels in start order; the last entry is the one displayed.
    active: Vec<String>,
    /// The renderer thread paired with its own shutdown flag. The flag
    /// belongs to exactly one renderer; a restarted renderer gets a fresh
    /// one, so signalling an old renderer can never leak into a new one.
    renderer: Option<(JoinHandle<()>, Arc<AtomicBool>)>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Create a tracker that renders to stdout.
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    /// Create a tracker that renders to an arbitrary writer.
    ///
    /// Used by tests to capture output; every redraw, terminal line, and
    /// error line goes through this writer.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                state: Mutex::new(TrackerState {
                    active: Vec::new(),
                    renderer: None,
                }),
                last_width: AtomicUsize::new(0),
                writer: Mutex::new(Box::new(writer)),
            }),
        }
    }

    /// Register `label` as active and make it the displayed operation.
    ///
    /// Starts the renderer thread if none is running; `style` only takes
    /// effect when this call is the one that starts the renderer.
    pub fn start(&self, label: &str, style: SpinnerStyle) {
        let mut state = self.inner.state.lock().expect("tracker lock poisoned");
        state.active.push(label.to_string());

        if state.renderer.is_none() {
            let halt = Arc::new(AtomicBool::new(false));
            let inner = Arc::clone(&self.inner);
            let flag = Arc::clone(&halt);
            state.renderer = Some((thread::spawn(move || inner.animate(style, flag)), halt));
        }
    }

    /// Remove one occurrence of `label` from the active set and emit its
    /// terminal line (check mark on success, cross mark on failure).
    ///
    /// When the active set becomes empty the renderer thread is signalled
    /// and joined before this returns; no redraw happens afterwards.
    /// Stopping a label that is not active is a benign no-op.
    pub fn stop(&self, label: &str, success: bool) {
        let renderer = {
            let mut state = self.inner.state.lock().expect("tracker lock poisoned");

            let Some(pos) = state.active.iter().rposition(|l| l == label) else {
                debug!("stop called for inactive operation: {label}");
                return;
            };
            state.active.remove(pos);

            let mark = if success { "✓" } else { "✗" };
            self.inner.write_terminal_line(&format!("{mark} {label}"));

            if state.active.is_empty() {
                state.renderer.take()
            } else {
                None
            }
        };

        // Join outside the lock; the renderer takes the same lock each tick.
        if let Some((handle, halt)) = renderer {
            halt.store(true, Ordering::SeqCst);
            let _ = handle.join();
            // The renderer may have drawn one last frame after the terminal
            // line above; blank it so the batch ends on a clean line.
            self.inner.clear_status_line();
        }
    }

    /// Run a fallible closure on the calling thread with the spinner active.
    ///
    /// The operation is stopped with `success = work returned Ok`, and the
    /// result is passed through untouched.
    pub fn track<T, E>(
        &self,
        label: &str,
        style: SpinnerStyle,
        work: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        self.start(label, style);
        let result = work();
        self.stop(label, result.is_ok());
        result
    }

    /// Number of currently active operations.
    pub fn active_count(&self) -> usize {
        self.inner.state.lock().expect("tracker lock poisoned").active.len()
    }

    /// Emit a permanent line through the tracker's writer, clearing any
    /// in-place status line first. Write errors are ignored.
    pub fn println(&self, line: &str) {
        self.inner.write_terminal_line(line);
    }
}

impl TrackerInner {
    /// Renderer loop: redraw the most recently started active label until
    /// halted. The state lock is held only long enough to clone that label.
    fn animate(self: Arc<Self>, style: SpinnerStyle, halt: Arc<AtomicBool>) {
        let frames = style.frames();
        let mut tick = 0usize;

        while !halt.load(Ordering::SeqCst) {
            let current = {
                let state = self.state.lock().expect("tracker lock poisoned");
                state.active.last().cloned()
            };

            if let Some(label) = current {
                let frame = frames[tick % frames.len()];
                self.redraw(&format!("{frame} {label}"));
            }

            thread::sleep(TICK);
            tick += 1;
        }
    }

    /// Overwrite the status line in place.
    fn redraw(&self, line: &str) {
        let padded = self.pad(line);
        let mut writer = self.writer.lock().expect("writer lock poisoned");
        let _ = write!(writer, "\r{padded}");
        let _ = writer.flush();
    }

    /// Blank out any in-place status line, leaving the cursor at column 0.
    fn clear_status_line(&self) {
        let width = self.last_width.swap(0, Ordering::Relaxed);
        if width > 0 {
            let mut writer = self.writer.lock().expect("writer lock poisoned");
            let _ = write!(writer, "\r{}\r", " ".repeat(width));
            let _ = writer.flush();
        }
    }

    /// Replace the status line with a permanent one.
    fn write_terminal_line(&self, line: &str) {
        let padded = self.pad(line);
        // The newline leaves the cursor on a fresh, empty line.
        self.last_width.store(0, Ordering::Relaxed);
        let mut writer = self.writer.lock().expect("writer lock poisoned");
        let _ = write!(writer, "\r{padded}\n");
        let _ = writer.flush();
    }

    /// Pad with spaces so a shorter line fully covers the previous redraw.
    fn pad(&self, line: &str) -> String {
        let width = line.chars().count();
        let previous = self.last_width.swap(width, Ordering::Relaxed);
        if previous > width {
            format!("{line}{}", " ".repeat(previous - width))
        } else {
            line.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Cloneable in-memory writer for asserting on tracker output.
    #[derive(Clone, Default)]
    pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }

        pub fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::SharedBuf;
    use super::*;

    #[test]
    fn test_frames_non_empty() {
        for style in [
            SpinnerStyle::Dots,
            SpinnerStyle::Arrow,
            SpinnerStyle::Bar,
            SpinnerStyle::Pulse,
            SpinnerStyle::Moon,
            SpinnerStyle::Braille,
        ] {
            assert!(!style.frames().is_empty());
        }
    }

    #[test]
    fn test_start_stop_emits_terminal_line() {
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        tracker.start("Downloading", SpinnerStyle::Dots);
        tracker.stop("Downloading", true);

        let out = buf.contents();
        assert!(out.contains("✓ Downloading"));
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_failure_mark() {
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        tracker.start("Fetching", SpinnerStyle::Pulse);
        tracker.stop("Fetching", false);

        assert!(buf.contents().contains("✗ Fetching"));
    }

    #[test]
    fn test_stop_unknown_label_is_noop() {
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        // Must not panic, must not write a terminal line.
        tracker.stop("never started", true);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_double_stop_does_not_underflow() {
        let tracker = ProgressTracker::with_writer(SharedBuf::default());

        tracker.start("A", SpinnerStyle::Dots);
        tracker.stop("A", true);
        tracker.stop("A", true);

        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_duplicate_labels_tracked_by_occurrence() {
        let tracker = ProgressTracker::with_writer(SharedBuf::default());

        tracker.start("pull", SpinnerStyle::Dots);
        tracker.start("pull", SpinnerStyle::Dots);
        assert_eq!(tracker.active_count(), 2);

        tracker.stop("pull", true);
        assert_eq!(tracker.active_count(), 1);

        tracker.stop("pull", true);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_renderer_silent_after_last_stop() {
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        tracker.start("work", SpinnerStyle::Dots);
        std::thread::sleep(Duration::from_millis(250));
        tracker.stop("work", true);

        // stop() joins the renderer, so any write after this point would be
        // a dangling redraw.
        let settled = buf.len();
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(buf.len(), settled);
    }

    #[test]
    fn test_final_stop_races_with_new_start() {
        // A start arriving while the last stop is shutting the renderer down
        // must neither revive the old renderer nor leave the stop blocked on
        // a join that outlives it.
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        tracker.start("first", SpinnerStyle::Dots);
        let t = tracker.clone();
        let stopper = std::thread::spawn(move || t.stop("first", true));
        tracker.start("second", SpinnerStyle::Dots);

        let started = std::time::Instant::now();
        stopper.join().unwrap();
        assert!(
            started.elapsed() < Duration::from_millis(500),
            "stop blocked on a renderer belonging to a later operation"
        );

        std::thread::sleep(Duration::from_millis(150));
        tracker.stop("second", true);

        let out = buf.contents();
        assert!(out.contains("✓ first"));
        assert!(out.contains("✓ second"));
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_batch_ends_on_clean_line() {
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        tracker.start("work", SpinnerStyle::Dots);
        std::thread::sleep(Duration::from_millis(250));
        tracker.stop("work", true);

        // Whatever the renderer managed to draw, the content visible after
        // the last newline must be blank once stop returns.
        let out = buf.contents();
        let last_line = out.rsplit('\n').next().unwrap_or("");
        let visible = last_line.rsplit('\r').next().unwrap_or("");
        assert!(
            visible.trim().is_empty(),
            "stale status line after completion: {visible:?}"
        );
    }

    #[test]
    fn test_renderer_restarts_for_new_operations() {
        let buf = SharedBuf::default();
        let tracker = ProgressTracker::with_writer(buf.clone());

        tracker.start("first", SpinnerStyle::Dots);
        tracker.stop("first", true);
        tracker.start("second", SpinnerStyle::Dots);
        tracker.stop("second", true);

        let out = buf.contents();
        assert!(out.contains("✓ first"));
        assert!(out.contains("✓ second"));
    }

    #[test]
    fn test_track_passes_result_through() {
        let tracker = ProgressTracker::with_writer(SharedBuf::default());

        let ok: std::result::Result<u32, String> =
            tracker.track("ok", SpinnerStyle::Dots, || Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: std::result::Result<u32, String> =
            tracker.track("bad", SpinnerStyle::Dots, || Err("boom".to_string()));
        assert_eq!(err.unwrap_err(), "boom");
        assert_eq!(tracker.active_count(), 0);
    }
}
