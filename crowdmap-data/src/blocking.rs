//! Bridge from the synchronous source traits to async HTTP clients.

use std::future::Future;

use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Drive `future` to completion from synchronous code.
///
/// Inside a multi-threaded Tokio runtime the caller's runtime is borrowed via
/// [`tokio::task::block_in_place`]. Everywhere else, including inside a
/// `current_thread` runtime where `block_in_place` would panic, the source's
/// own runtime is used.
pub(crate) fn block_on<F: Future>(runtime: &Runtime, future: F) -> F::Output {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(future))
        }
        _ => runtime.block_on(future),
    }
}

/// Build the current-thread runtime owned by each HTTP source.
pub(crate) fn current_thread_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
