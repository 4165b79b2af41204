//! A debug-mode allocation tracker: interpose on allocate / zero-allocate /
//! resize / release, log every call with its call site, and get a report of
//! every unreleased allocation when your program exits.
//! ## Setup & Usage
//! Annotate your entry point with `#[memtrail::main]` and route allocations
//! through the [`alloc!`], [`zalloc!`], [`resize!`] and [`release!`] macros.

#[cfg(not(feature = "memtrail-off"))]
#[doc(inline)]
pub use lib_on::*;
#[cfg(not(feature = "memtrail-off"))]
mod lib_on;

pub(crate) mod error;
pub use error::TrackError;

pub(crate) mod raw;
pub use raw::{RawAllocator, SystemRaw};

#[allow(dead_code)]
pub(crate) mod output;
pub use output::{format_bytes, LeakEntry, LeakReport, Reporter};

#[cfg(not(feature = "memtrail-off"))]
pub(crate) mod output_on;

// When tracking is disabled with the memtrail-off feature we import methods
// from lib_off, which all degrade to raw-allocator passthroughs.
#[cfg(feature = "memtrail-off")]
#[doc(inline)]
pub use lib_off::*;
#[cfg(feature = "memtrail-off")]
mod lib_off;
