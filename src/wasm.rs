//! Browser-only setup. Without a panic hook a WASM panic only shows up as an opaque `unreachable`
//! trap; the hook forwards the panic message to the browser console.

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
