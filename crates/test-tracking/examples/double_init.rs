#[memtrail::main]
fn main() {
    // The attribute macro already built the process guard; a second build is
    // a programmer error and panics.
    let _second = memtrail::GuardBuilder::new().build();
}
