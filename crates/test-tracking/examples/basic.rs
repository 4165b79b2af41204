use std::ffi::CStr;

#[memtrail::main]
fn main() {
    let ptr = memtrail::alloc!(100);
    let msg = b"tracked allocation roundtrip\0";

    unsafe {
        std::ptr::copy_nonoverlapping(msg.as_ptr(), ptr as *mut u8, msg.len());
        let read_back = CStr::from_ptr(ptr as *const libc::c_char)
            .to_str()
            .expect("valid utf-8");
        println!("read back: {read_back}");

        memtrail::release!(ptr);
    }
}
