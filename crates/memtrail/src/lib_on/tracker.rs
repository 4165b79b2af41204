use std::ffi::c_void;
use std::fmt;
use std::io::Write;

use super::ledger::{AllocationRecord, Ledger};
use super::site::CallSite;
use super::stack::Stack;
use crate::error::TrackError;
use crate::output::{LeakEntry, LeakReport};
use crate::raw::RawAllocator;

/// The interception core: wraps the raw allocator, keeps the ledger
/// consistent, and writes one log line per tracked operation.
///
/// One instance lives in the process-wide slot while tracking is active; it
/// is constructed by `GuardBuilder` and drained exactly once by the guard's
/// teardown via [`Tracker::finish`].
pub(crate) struct Tracker {
    ledger: Ledger,
    raw: Box<dyn RawAllocator>,
    sink: Box<dyn Write + Send + Sync>,
    sink_path: String,
    total_allocations: u64,
    capture_stacks: bool,
}

impl Tracker {
    pub fn new(
        raw: Box<dyn RawAllocator>,
        sink: Box<dyn Write + Send + Sync>,
        sink_path: String,
        capture_stacks: bool,
    ) -> Self {
        Self {
            ledger: Ledger::default(),
            raw,
            sink,
            sink_path,
            total_allocations: 0,
            capture_stacks,
        }
    }

    fn log(&mut self, line: fmt::Arguments<'_>) {
        // Per-line write errors are ignored; the sink is flushed at finish.
        let _ = writeln!(self.sink, "{line}");
    }

    fn stack(&self) -> Option<Stack> {
        if self.capture_stacks {
            Stack::capture()
        } else {
            None
        }
    }

    /// Inserts a fresh record and bumps the allocate-class counter.
    fn record(&mut self, address: usize, size: usize, site: CallSite) {
        let stack = self.stack();
        self.ledger.insert(AllocationRecord {
            address,
            size,
            site,
            stack,
        });
        self.total_allocations += 1;
    }

    pub fn alloc(&mut self, size: usize, site: CallSite) -> Result<*mut c_void, TrackError> {
        let ptr = self.raw.alloc(size);
        if ptr.is_null() {
            return Err(TrackError::RawFailure {
                op: "alloc",
                args: size.to_string(),
                site,
            });
        }
        self.record(ptr as usize, size, site);
        self.log(format_args!("alloc({size}) at {site}: {:#x}", ptr as usize));
        Ok(ptr)
    }

    pub fn zero_alloc(
        &mut self,
        count: usize,
        size: usize,
        site: CallSite,
    ) -> Result<*mut c_void, TrackError> {
        // The raw zero-allocate fails on product overflow too; refusing here
        // keeps the recorded size honest.
        let Some(total) = count.checked_mul(size) else {
            return Err(TrackError::RawFailure {
                op: "zalloc",
                args: format!("{count}, {size}"),
                site,
            });
        };
        let ptr = self.raw.zero_alloc(count, size);
        if ptr.is_null() {
            return Err(TrackError::RawFailure {
                op: "zalloc",
                args: format!("{count}, {size}"),
                site,
            });
        }
        self.record(ptr as usize, total, site);
        self.log(format_args!(
            "zalloc({count}, {size}) at {site}: {:#x}",
            ptr as usize
        ));
        Ok(ptr)
    }

    /// # Safety
    ///
    /// `ptr` must be null or a live block owned by the wrapped raw allocator.
    pub unsafe fn resize(
        &mut self,
        ptr: *mut c_void,
        new_size: usize,
        site: CallSite,
    ) -> Result<*mut c_void, TrackError> {
        if ptr.is_null() {
            // The raw primitive defines resize(null) as a fresh allocate.
            let new_ptr = self.raw.alloc(new_size);
            if new_ptr.is_null() {
                return Err(TrackError::RawFailure {
                    op: "resize",
                    args: format!("null, {new_size}"),
                    site,
                });
            }
            self.record(new_ptr as usize, new_size, site);
            self.log(format_args!(
                "resize(null, {new_size}) at {site}: {:#x}",
                new_ptr as usize
            ));
            return Ok(new_ptr);
        }

        let old = ptr as usize;
        if self.ledger.find(old).is_none() {
            return Err(TrackError::UntrackedResize {
                address: old,
                new_size,
                site,
            });
        }

        let new_ptr = unsafe { self.raw.resize(ptr, new_size) };
        if new_ptr.is_null() {
            return Err(TrackError::RawFailure {
                op: "resize",
                args: format!("{old:#x}, {new_size}"),
                site,
            });
        }

        // Re-key as one logical operation: no intermediate state where both
        // or neither address is tracked is observable after this call.
        let stack = self.stack();
        self.ledger.rekey(old, new_ptr as usize, new_size, site, stack);
        self.log(format_args!(
            "resize({old:#x}, {new_size}) at {site}: {:#x}",
            new_ptr as usize
        ));
        Ok(new_ptr)
    }

    /// # Safety
    ///
    /// `ptr` must be null or a live block owned by the wrapped raw allocator.
    pub unsafe fn release(&mut self, ptr: *mut c_void, site: CallSite) {
        if ptr.is_null() {
            // Releasing null is a defined no-op for the raw primitive;
            // forward it without a log line or an untracked-release warning.
            unsafe { self.raw.release(ptr) };
            return;
        }

        let address = ptr as usize;
        self.log(format_args!("release({address:#x}) at {site}"));
        if self.ledger.remove(address).is_none() {
            eprintln!("memtrail: releasing untracked memory {address:#x} at {site}");
        }
        unsafe { self.raw.release(ptr) };
    }

    /// The end-of-process leak scan: drains the ledger, writes one diagnostic
    /// per surviving record plus the summary line to the sink, and returns
    /// the report for the configured reporter to mirror.
    pub fn finish(&mut self) -> LeakReport {
        let mut leaks = Vec::new();
        for mut record in self.ledger.drain() {
            let frames = if self.capture_stacks {
                Some(match record.stack.as_mut() {
                    Some(stack) => stack.frames(),
                    None => Vec::new(),
                })
            } else {
                None
            };
            let entry = LeakEntry {
                address: record.address,
                size: record.size,
                file: record.site.file().to_string(),
                line: record.site.line(),
                func: record.site.func().to_string(),
                frames,
            };

            self.log(format_args!("{entry}"));
            if let Some(frames) = &entry.frames {
                if frames.is_empty() {
                    self.log(format_args!("    <stack unavailable>"));
                } else {
                    for frame in frames {
                        self.log(format_args!("    {frame}"));
                    }
                }
            }
            leaks.push(entry);
        }
        debug_assert_eq!(self.ledger.len(), 0);

        let total_allocations = self.total_allocations;
        let leak_count = leaks.len();
        let sink_path = self.sink_path.clone();
        self.log(format_args!(
            "Summary: total allocations: {}, leaks: {}, log: {}",
            total_allocations, leak_count, sink_path
        ));
        let _ = self.sink.flush();

        LeakReport {
            leaks,
            total_allocations: self.total_allocations,
            log_path: self.sink_path.clone(),
        }
    }
}
