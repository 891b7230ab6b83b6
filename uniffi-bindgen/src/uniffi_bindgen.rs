//! Generates Swift and Kotlin bindings for the secure storage libraries.

fn main() {
    uniffi::uniffi_bindgen_main();
}
