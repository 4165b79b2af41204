use std::ffi::c_void;

#[memtrail::main]
fn main() {
    println!("resizing foreign memory");

    let foreign = unsafe { libc::malloc(32) };
    let _ = unsafe { memtrail::resize!(foreign as *mut c_void, 64) };

    println!("unreachable: untracked resize must be fatal");
}
