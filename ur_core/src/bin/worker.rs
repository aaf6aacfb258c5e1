//! Entry point of the browser search worker script.

#[cfg(target_arch = "wasm32")]
fn main() {
    use gloo_worker::Registrable;
    use ur_core::worker::web::WebAiWorker;
    use ur_core::worker::NoSecondaryEngine;

    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        return;
    }
    WebAiWorker::<NoSecondaryEngine>::registrar().register();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    // Native hosts embed `ur_core::worker::ThreadWorker` instead.
}
