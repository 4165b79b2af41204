#[memtrail::main]
fn main() {
    let leaked = memtrail::alloc!(512);
    std::hint::black_box(leaked);

    let freed = memtrail::alloc!(64);
    unsafe { memtrail::release!(freed) };

    println!("done, leaking one block");
}
