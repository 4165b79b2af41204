#[memtrail::main(log_path = "custom-memtrail.log")]
fn main() {
    let ptr = memtrail::alloc!(48);
    unsafe { memtrail::release!(ptr) };

    println!("logged to custom path");
}
