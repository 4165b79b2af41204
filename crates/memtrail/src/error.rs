use crate::CallSite;
use thiserror::Error;

/// Conditions raised by the tracking layer.
///
/// The fatal variants (`RawFailure`, `UntrackedResize`, `Sink`) never reach
/// callers of the wrapped operations: those preserve the raw primitives'
/// calling convention, so the passthrough layer reports the condition to
/// stderr and terminates the process instead of returning it.
#[derive(Debug, Error)]
pub enum TrackError {
    /// Tracking was initialized a second time. Initialization is legal
    /// exactly once per process.
    #[error("memtrail is already initialized")]
    AlreadyInitialized,

    /// The log destination could not be opened for writing.
    #[error("cannot open log destination {path}: {source}")]
    Sink {
        path: String,
        source: std::io::Error,
    },

    /// The raw allocator returned null. Out-of-memory is unrecoverable for a
    /// tracking build.
    #[error("{op}({args}) failed at {site}")]
    RawFailure {
        op: &'static str,
        args: String,
        site: CallSite,
    },

    /// Resize of a non-null address this tracker never saw. Memory outside
    /// the ledger cannot be safely reasoned about, so the tracker refuses
    /// rather than guessing.
    #[error("resize({address:#x}, {new_size}) on untracked memory at {site}")]
    UntrackedResize {
        address: usize,
        new_size: usize,
        site: CallSite,
    },
}
