use std::ffi::c_void;

/// The raw allocator the tracker wraps.
///
/// This is an interface boundary only: the tracker never implements
/// allocation itself, it records around these four primitives. The default is
/// [`SystemRaw`]; [`GuardBuilder::raw_allocator`](crate::GuardBuilder::raw_allocator)
/// accepts a replacement (tests inject failing or counting allocators).
pub trait RawAllocator: Send + Sync {
    fn alloc(&self, size: usize) -> *mut c_void;

    fn zero_alloc(&self, count: usize, size: usize) -> *mut c_void;

    /// # Safety
    ///
    /// `ptr` must be null or a live block previously returned by this
    /// allocator.
    unsafe fn resize(&self, ptr: *mut c_void, new_size: usize) -> *mut c_void;

    /// # Safety
    ///
    /// `ptr` must be null or a live block previously returned by this
    /// allocator.
    unsafe fn release(&self, ptr: *mut c_void);
}

/// The process allocator: libc `malloc`/`calloc`/`realloc`/`free`.
pub struct SystemRaw;

impl RawAllocator for SystemRaw {
    fn alloc(&self, size: usize) -> *mut c_void {
        unsafe { libc::malloc(size) }
    }

    fn zero_alloc(&self, count: usize, size: usize) -> *mut c_void {
        unsafe { libc::calloc(count, size) }
    }

    unsafe fn resize(&self, ptr: *mut c_void, new_size: usize) -> *mut c_void {
        unsafe { libc::realloc(ptr, new_size) }
    }

    unsafe fn release(&self, ptr: *mut c_void) {
        unsafe { libc::free(ptr) }
    }
}
