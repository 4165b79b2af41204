// Run with MEMTRAIL_OFF=1: allocations still work, nothing is tracked, no
// log file is created and no report is printed.
#[memtrail::main]
fn main() {
    let ptr = memtrail::alloc!(256);
    unsafe {
        (ptr as *mut u8).write(0xAB);
        assert_eq!((ptr as *const u8).read(), 0xAB);
    }
    std::hint::black_box(ptr);

    println!("allocations still functional");
}
