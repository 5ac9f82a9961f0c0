use std::future::Future;

pub mod object_store;
pub mod parameter_store;
pub mod queue;

/// Drives an SDK future to completion from synchronous gateway code.
///
/// Requires the multi-threaded tokio runtime the Lambda binaries start.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
