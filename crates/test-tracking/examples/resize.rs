use std::ffi::c_void;
use std::mem::size_of;

#[memtrail::main]
fn main() {
    unsafe {
        let ptr = memtrail::alloc!(5 * size_of::<i32>()) as *mut i32;
        for i in 0..5 {
            ptr.add(i).write(i as i32 * 3);
        }

        let grown = memtrail::resize!(ptr as *mut c_void, 10 * size_of::<i32>()) as *mut i32;
        for i in 0..5 {
            assert_eq!(grown.add(i).read(), i as i32 * 3);
        }
        for i in 5..10 {
            grown.add(i).write(i as i32 * 3);
        }
        println!("values survived resize");

        memtrail::release!(grown as *mut c_void);
    }
}
