use std::ffi::c_void;
use std::fmt;
use std::path::PathBuf;

pub use memtrail_macros::main;

use crate::error::TrackError;
use crate::output::Reporter;
use crate::raw::{RawAllocator, SystemRaw};

pub const DEFAULT_LOG_PATH: &str = "memtrail.log";
pub const ENV_OFF: &str = "MEMTRAIL_OFF";
pub const ENV_LOG: &str = "MEMTRAIL_LOG";
pub const ENV_STACKS: &str = "MEMTRAIL_STACKS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    func: &'static str,
}

impl CallSite {
    pub fn new(file: &'static str, line: u32, func: &'static str) -> Self {
        Self { file, line, func }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn func(&self) -> &'static str {
        self.func
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} in {}", self.file, self.line, self.func)
    }
}

#[macro_export]
macro_rules! callsite {
    () => {
        $crate::CallSite::new(file!(), line!(), "")
    };
}

pub fn alloc(size: usize, _site: CallSite) -> *mut c_void {
    SystemRaw.alloc(size)
}

pub fn zero_alloc(count: usize, size: usize, _site: CallSite) -> *mut c_void {
    SystemRaw.zero_alloc(count, size)
}

/// # Safety
///
/// `ptr` must be null or a live block owned by the raw allocator.
pub unsafe fn resize(ptr: *mut c_void, new_size: usize, _site: CallSite) -> *mut c_void {
    unsafe { SystemRaw.resize(ptr, new_size) }
}

/// # Safety
///
/// `ptr` must be null or a live block owned by the raw allocator.
pub unsafe fn release(ptr: *mut c_void, _site: CallSite) {
    unsafe { SystemRaw.release(ptr) }
}

#[macro_export]
macro_rules! alloc {
    ($size:expr) => {
        $crate::alloc($size, $crate::callsite!())
    };
}

#[macro_export]
macro_rules! zalloc {
    ($count:expr, $size:expr) => {
        $crate::zero_alloc($count, $size, $crate::callsite!())
    };
}

#[macro_export]
macro_rules! resize {
    ($ptr:expr, $new_size:expr) => {
        $crate::resize($ptr, $new_size, $crate::callsite!())
    };
}

#[macro_export]
macro_rules! release {
    ($ptr:expr) => {
        $crate::release($ptr, $crate::callsite!())
    };
}

pub struct GuardBuilder {}

impl GuardBuilder {
    pub fn new() -> Self {
        Self {}
    }

    pub fn log_path(self, _path: impl Into<PathBuf>) -> Self {
        self
    }

    pub fn capture_stacks(self, _capture: bool) -> Self {
        self
    }

    pub fn raw_allocator(self, _raw: Box<dyn RawAllocator>) -> Self {
        self
    }

    pub fn reporter(self, _reporter: Box<dyn Reporter>) -> Self {
        self
    }

    pub fn try_build(self) -> Result<Memtrail, TrackError> {
        Ok(Memtrail {})
    }

    pub fn build(self) -> Memtrail {
        Memtrail {}
    }
}

impl Default for GuardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Memtrail {}
