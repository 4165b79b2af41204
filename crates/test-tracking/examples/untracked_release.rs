#[memtrail::main]
fn main() {
    // Allocated behind the tracker's back: releasing it is reported as a
    // warning but must not derail the program.
    let foreign = unsafe { libc::malloc(32) };
    unsafe { memtrail::release!(foreign) };

    println!("survived untracked release");
}
