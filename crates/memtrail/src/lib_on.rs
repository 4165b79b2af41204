pub use memtrail_macros::main;

mod ledger;
mod site;
mod stack;
mod tracker;

pub use site::CallSite;

use std::ffi::c_void;
use std::fs::File;
use std::io::LineWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use arc_swap::ArcSwapOption;

use crate::error::TrackError;
use crate::output::Reporter;
use crate::output_on::ConsoleReporter;
use crate::raw::{RawAllocator, SystemRaw};
use tracker::Tracker;

/// Default log destination, relative to the process working directory.
pub const DEFAULT_LOG_PATH: &str = "memtrail.log";

/// Env switch: set to the literal `1` to keep tracking permanently inactive
/// for the process (pure passthrough, no log file created).
pub const ENV_OFF: &str = "MEMTRAIL_OFF";
/// Env override for the log destination path.
pub const ENV_LOG: &str = "MEMTRAIL_LOG";
/// Env switch: set to `1` to capture an allocation stack per record.
pub const ENV_STACKS: &str = "MEMTRAIL_STACKS";
/// Env switch: set to `1` to print the leak report as JSON (feature `json`).
#[cfg(feature = "json")]
pub const ENV_JSON: &str = "MEMTRAIL_JSON";

pub(crate) static MEMTRAIL_STATE: OnceLock<ArcSwapOption<RwLock<Tracker>>> = OnceLock::new();

// Flipped exactly once, never cleared: tracking must not be re-initialized
// after teardown.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// Builder for the process-wide tracking guard.
///
/// `GuardBuilder` gives manual control over the tracking lifecycle when the
/// [`main`] attribute macro is not a fit. The leak report is generated when
/// the returned guard is dropped.
///
/// # Examples
///
/// Basic usage with default settings:
///
/// ```rust,no_run
/// use memtrail::GuardBuilder;
///
/// let _memtrail = GuardBuilder::new().build();
/// // Allocations routed through the memtrail macros are now tracked.
/// // The leak report runs when _memtrail goes out of scope.
/// ```
///
/// Custom configuration:
///
/// ```rust,no_run
/// use memtrail::GuardBuilder;
///
/// let _memtrail = GuardBuilder::new()
///     .log_path("target/allocs.log")
///     .capture_stacks(true)
///     .build();
/// ```
///
/// # Limitations
///
/// Tracking can be initialized only once per process. A second `build()`
/// (via this builder or the [`main`] macro) will cause a panic.
pub struct GuardBuilder {
    log_path: Option<PathBuf>,
    capture_stacks: bool,
    raw: Option<Box<dyn RawAllocator>>,
    reporter: Option<Box<dyn Reporter>>,
}

impl GuardBuilder {
    pub fn new() -> Self {
        Self {
            log_path: None,
            capture_stacks: false,
            raw: None,
            reporter: None,
        }
    }

    /// Sets the log destination path.
    ///
    /// Default: `memtrail.log`. The `MEMTRAIL_LOG` env var takes precedence
    /// over this setting at runtime.
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Captures an allocation stack for every tracked allocation and prints
    /// it with the leak report.
    ///
    /// Frames are captured unresolved and symbolized only for records that
    /// actually leak, so tracked allocations stay cheap. Requires the
    /// `backtrace` feature to produce frames; without it the report carries
    /// an "unavailable" marker instead. `MEMTRAIL_STACKS=1` enables this at
    /// runtime.
    pub fn capture_stacks(mut self, capture: bool) -> Self {
        self.capture_stacks = capture;
        self
    }

    /// Replaces the raw allocator the tracker wraps.
    ///
    /// Defaults to [`SystemRaw`] (libc `malloc`/`calloc`/`realloc`/`free`).
    /// The tracker only records around these primitives; it never allocates
    /// through them itself.
    pub fn raw_allocator(mut self, raw: Box<dyn RawAllocator>) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Sets a custom reporter for the end-of-process leak report.
    ///
    /// The default reporter mirrors each diagnostic and the summary to
    /// stdout. The log sink is written regardless of the reporter.
    pub fn reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Builds the tracking guard, returning the typed condition on misuse or
    /// sink failure instead of terminating.
    pub fn try_build(self) -> Result<Memtrail, TrackError> {
        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(TrackError::AlreadyInitialized);
        }

        if env_flag(ENV_OFF) {
            // Disabled variant: no sink, every operation is a passthrough,
            // teardown reports nothing.
            return Ok(Memtrail { reporter: None });
        }

        let path: PathBuf = std::env::var_os(ENV_LOG)
            .map(Into::into)
            .or(self.log_path)
            .unwrap_or_else(|| DEFAULT_LOG_PATH.into());
        let path_str = path.display().to_string();

        // Truncate-on-open: each run starts a fresh log.
        let file = File::create(&path).map_err(|source| TrackError::Sink {
            path: path_str.clone(),
            source,
        })?;

        let capture_stacks = self.capture_stacks || env_flag(ENV_STACKS);
        let raw = self.raw.unwrap_or_else(|| Box::new(SystemRaw));
        let tracker = Tracker::new(
            raw,
            Box::new(LineWriter::new(file)),
            path_str,
            capture_stacks,
        );

        MEMTRAIL_STATE
            .get_or_init(|| ArcSwapOption::from(None))
            .store(Some(Arc::new(RwLock::new(tracker))));

        let reporter = self
            .reporter
            .unwrap_or_else(|| Box::new(ConsoleReporter));

        // Override the reporter with the JSON one when MEMTRAIL_JSON is set.
        #[cfg(feature = "json")]
        let reporter: Box<dyn Reporter> = if env_flag(ENV_JSON) {
            Box::new(crate::output_on::JsonReporter)
        } else {
            reporter
        };

        Ok(Memtrail {
            reporter: Some(reporter),
        })
    }

    /// Builds the tracking guard.
    ///
    /// # Panics
    ///
    /// Panics if tracking was already initialized. Terminates the process if
    /// the log destination cannot be opened.
    pub fn build(self) -> Memtrail {
        match self.try_build() {
            Ok(guard) => guard,
            Err(err @ TrackError::AlreadyInitialized) => {
                panic!("{err}. Only one memtrail guard can be alive per process.")
            }
            Err(err) => fatal(err),
        }
    }
}

impl Default for GuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The tracking guard. Dropping it runs the leak scan, writes the summary,
/// and closes the log sink.
///
/// Operations issued after the guard is dropped are silent passthroughs to
/// the raw allocator: late frees in exit-ordered destructors degrade
/// gracefully instead of crashing the teardown path.
pub struct Memtrail {
    // None for a disabled (opted-out) run.
    reporter: Option<Box<dyn Reporter>>,
}

impl Drop for Memtrail {
    fn drop(&mut self) {
        let Some(reporter) = self.reporter.take() else {
            return;
        };
        let Some(state) = MEMTRAIL_STATE.get() else {
            return;
        };
        let Some(tracker) = state.swap(None) else {
            return;
        };
        let Ok(mut tracker) = tracker.write() else {
            return;
        };

        let report = tracker.finish();
        if let Err(e) = reporter.report(&report) {
            eprintln!("Failed to report memtrail leaks: {e}");
        }
    }
}

fn fatal(err: TrackError) -> ! {
    eprintln!("memtrail: fatal: {err}");
    std::process::exit(1);
}

fn with_tracker<R>(f: impl FnOnce(&mut Tracker) -> R) -> Option<R> {
    let state = MEMTRAIL_STATE.get()?;
    let tracker = state.load_full()?;
    let Ok(mut guard) = tracker.write() else {
        return None;
    };
    Some(f(&mut guard))
}

/// Allocates `size` bytes through the raw allocator, recording the
/// allocation while tracking is active.
///
/// Raw-allocator failure is fatal: the condition is reported and the process
/// terminates. While tracking is inactive this is a pure passthrough.
pub fn alloc(size: usize, site: CallSite) -> *mut c_void {
    match with_tracker(|t| t.alloc(size, site)) {
        Some(Ok(ptr)) => ptr,
        Some(Err(err)) => fatal(err),
        None => SystemRaw.alloc(size),
    }
}

/// Allocates a zeroed block of `count * size` bytes, recording it while
/// tracking is active. Same failure policy as [`alloc`].
pub fn zero_alloc(count: usize, size: usize, site: CallSite) -> *mut c_void {
    match with_tracker(|t| t.zero_alloc(count, size, site)) {
        Some(Ok(ptr)) => ptr,
        Some(Err(err)) => fatal(err),
        None => SystemRaw.zero_alloc(count, size),
    }
}

/// Resizes a tracked block, re-keying its record; resizing from null behaves
/// as a fresh [`alloc`].
///
/// Resizing a non-null address the tracker never saw is fatal, as is
/// raw-allocator failure. While tracking is inactive this is a pure
/// passthrough.
///
/// # Safety
///
/// `ptr` must be null or a live block obtained from these operations (or
/// from the raw allocator while tracking was inactive).
pub unsafe fn resize(ptr: *mut c_void, new_size: usize, site: CallSite) -> *mut c_void {
    match with_tracker(|t| unsafe { t.resize(ptr, new_size, site) }) {
        Some(Ok(new_ptr)) => new_ptr,
        Some(Err(err)) => fatal(err),
        None => unsafe { SystemRaw.resize(ptr, new_size) },
    }
}

/// Releases a block, retiring its record while tracking is active.
///
/// Releasing an address with no record is reported as a warning on stderr
/// and the raw release still proceeds; releasing null is a silent no-op.
///
/// # Safety
///
/// `ptr` must be null or a live block obtained from these operations (or
/// from the raw allocator while tracking was inactive).
pub unsafe fn release(ptr: *mut c_void, site: CallSite) {
    if with_tracker(|t| unsafe { t.release(ptr, site) }).is_none() {
        unsafe { SystemRaw.release(ptr) };
    }
}

/// Allocates `size` bytes, capturing the call site of the expansion point.
///
/// # Examples
///
/// ```rust,no_run
/// #[memtrail::main]
/// fn main() {
///     let ptr = memtrail::alloc!(100);
///     unsafe { memtrail::release!(ptr) };
/// }
/// ```
#[macro_export]
macro_rules! alloc {
    ($size:expr) => {
        $crate::alloc($size, $crate::callsite!())
    };
}

/// Allocates a zeroed `count * size`-byte block, capturing the call site of
/// the expansion point.
#[macro_export]
macro_rules! zalloc {
    ($count:expr, $size:expr) => {
        $crate::zero_alloc($count, $size, $crate::callsite!())
    };
}

/// Resizes a tracked block, capturing the call site of the expansion point.
/// Unsafe: must be called in an `unsafe` context.
#[macro_export]
macro_rules! resize {
    ($ptr:expr, $new_size:expr) => {
        $crate::resize($ptr, $new_size, $crate::callsite!())
    };
}

/// Releases a tracked block, capturing the call site of the expansion point.
/// Unsafe: must be called in an `unsafe` context.
#[macro_export]
macro_rules! release {
    ($ptr:expr) => {
        $crate::release($ptr, $crate::callsite!())
    };
}
