#![doc(test(attr(deny(warnings))))]

//! Flow Core reconciles Foundation/Future/Freedom budget splits: a live
//! preview driven by slider input, a committed allocation that is the only
//! thing ever persisted, and the plumbing to store, configure, and drive it.

pub mod allocation;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod storage;
pub mod utils;

pub use allocation::{
    begin_adjustment, AllocationSnapshot, FlowCategory, PreviewUpdate, ReconciliationState,
};
pub use errors::FlowError;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Flow Core tracing initialized.");
    });
}
