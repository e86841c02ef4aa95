//! C ABI over the reconciliation engine for native UI shells.
//!
//! A host creates a handle with [`flow_engine_begin`], streams slider events
//! through [`flow_engine_update`], and finishes with commit or cancel. Every
//! call that produces a snapshot writes it to a caller-owned
//! [`FfiAllocation`]. Persistence stays on the host side.

use std::ffi::CString;
use std::os::raw::c_char;
use std::sync::OnceLock;

use crate::{
    allocation::{AllocationSnapshot, FlowCategory, ReconciliationState},
    errors::FlowError,
};

/// Semantic version of the Rust core (mirrors `Cargo.toml`).
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Semantic version of the FFI surface. Bumps when ABI/contract changes.
pub const FFI_VERSION: &str = "0.1.0";

/// Status codes returned across the FFI boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    InvalidCategory = 1,
    InvalidAllocation = 2,
    Persistence = 3,
    NullPointer = 4,
}

impl From<FfiStatus> for i32 {
    fn from(value: FfiStatus) -> Self {
        value as i32
    }
}

pub fn classify_error(err: &FlowError) -> FfiStatus {
    match err {
        FlowError::InvalidCategory(_) => FfiStatus::InvalidCategory,
        FlowError::InvalidAllocation(_) => FfiStatus::InvalidAllocation,
        FlowError::Io(_) | FlowError::Serde(_) | FlowError::Persistence(_) => {
            FfiStatus::Persistence
        }
    }
}

/// Category identifiers: 0 Foundation, 1 Future, 2 Freedom.
fn category_from_raw(raw: i32) -> Option<FlowCategory> {
    match raw {
        0 => Some(FlowCategory::Foundation),
        1 => Some(FlowCategory::Future),
        2 => Some(FlowCategory::Freedom),
        _ => None,
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FfiAllocation {
    pub foundation: f64,
    pub future: f64,
    pub freedom: f64,
    pub saturated: bool,
}

impl FfiAllocation {
    fn from_snapshot(snapshot: &AllocationSnapshot, saturated: bool) -> Self {
        Self {
            foundation: snapshot.foundation(),
            future: snapshot.future(),
            freedom: snapshot.freedom(),
            saturated,
        }
    }
}

/// Opaque session handle owned by the host until [`flow_engine_free`].
pub struct FlowEngineHandle {
    state: ReconciliationState,
}

unsafe fn write_out(out: *mut FfiAllocation, value: FfiAllocation) {
    if !out.is_null() {
        *out = value;
    }
}

/// Returns the core (Rust) semantic version as a C string.
#[no_mangle]
pub extern "C" fn ffi_core_version() -> *const c_char {
    static CORE: OnceLock<CString> = OnceLock::new();
    CORE.get_or_init(|| CString::new(CORE_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Returns the FFI interface semantic version as a C string.
#[no_mangle]
pub extern "C" fn ffi_version() -> *const c_char {
    static FFI: OnceLock<CString> = OnceLock::new();
    FFI.get_or_init(|| CString::new(FFI_VERSION).unwrap_or_default())
        .as_ptr()
}

/// Starts a session from a committed split. Returns null when the split is
/// invalid.
#[no_mangle]
pub extern "C" fn flow_engine_begin(foundation: f64, future: f64) -> *mut FlowEngineHandle {
    match AllocationSnapshot::new(foundation, future) {
        Ok(snapshot) => Box::into_raw(Box::new(FlowEngineHandle {
            state: crate::allocation::begin_adjustment(snapshot),
        })),
        Err(err) => {
            tracing::warn!(error = %err, "ffi begin rejected");
            std::ptr::null_mut()
        }
    }
}

/// # Safety
/// `handle` must come from [`flow_engine_begin`] and not be freed. `out` may
/// be null or point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn flow_engine_update(
    handle: *mut FlowEngineHandle,
    category: i32,
    raw_percent: f64,
    out: *mut FfiAllocation,
) -> i32 {
    let Some(handle) = handle.as_mut() else {
        return FfiStatus::NullPointer.into();
    };
    let Some(category) = category_from_raw(category) else {
        return FfiStatus::InvalidCategory.into();
    };
    match handle.state.update_preview(category, raw_percent) {
        Ok(update) => {
            let value = FfiAllocation::from_snapshot(&update.snapshot, update.saturated);
            write_out(out, value);
            FfiStatus::Ok.into()
        }
        Err(err) => classify_error(&err).into(),
    }
}

/// # Safety
/// Same contract as [`flow_engine_update`].
#[no_mangle]
pub unsafe extern "C" fn flow_engine_commit(
    handle: *mut FlowEngineHandle,
    out: *mut FfiAllocation,
) -> i32 {
    let Some(handle) = handle.as_mut() else {
        return FfiStatus::NullPointer.into();
    };
    match handle.state.commit() {
        Ok(applied) => {
            let saturated = applied.is_saturated(handle.state.policy().epsilon);
            write_out(out, FfiAllocation::from_snapshot(&applied, saturated));
            FfiStatus::Ok.into()
        }
        Err(err) => classify_error(&err).into(),
    }
}

/// # Safety
/// Same contract as [`flow_engine_update`].
#[no_mangle]
pub unsafe extern "C" fn flow_engine_cancel(
    handle: *mut FlowEngineHandle,
    out: *mut FfiAllocation,
) -> i32 {
    let Some(handle) = handle.as_mut() else {
        return FfiStatus::NullPointer.into();
    };
    let applied = handle.state.cancel();
    let saturated = applied.is_saturated(handle.state.policy().epsilon);
    write_out(out, FfiAllocation::from_snapshot(&applied, saturated));
    FfiStatus::Ok.into()
}

/// # Safety
/// `handle` must come from [`flow_engine_begin`] and is invalid afterwards.
/// Null is ignored.
#[no_mangle]
pub unsafe extern "C" fn flow_engine_free(handle: *mut FlowEngineHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_versions() {
        assert!(!ffi_core_version().is_null());
        assert!(!ffi_version().is_null());
    }

    #[test]
    fn session_round_trip() {
        let handle = flow_engine_begin(50.0, 20.0);
        assert!(!handle.is_null());

        let mut out = FfiAllocation::default();
        unsafe {
            assert_eq!(flow_engine_update(handle, 0, 80.0, &mut out), 0);
            assert_eq!(out.freedom, 0.0);
            assert!(out.saturated);

            assert_eq!(flow_engine_update(handle, 2, 10.0, &mut out), 1);

            assert_eq!(flow_engine_commit(handle, &mut out), 0);
            assert_eq!(out.foundation, 80.0);

            assert_eq!(flow_engine_update(handle, 1, 0.0, &mut out), 0);
            assert_eq!(flow_engine_cancel(handle, &mut out), 0);
            assert_eq!(out.future, 20.0);

            flow_engine_free(handle);
        }
    }

    #[test]
    fn invalid_inputs_are_reported() {
        assert!(flow_engine_begin(90.0, 20.0).is_null());
        unsafe {
            assert_eq!(
                flow_engine_update(std::ptr::null_mut(), 0, 50.0, std::ptr::null_mut()),
                FfiStatus::NullPointer as i32
            );
            let handle = flow_engine_begin(50.0, 20.0);
            assert_eq!(flow_engine_update(handle, 9, 50.0, std::ptr::null_mut()), 1);
            assert_eq!(flow_engine_update(handle, 0, f64::NAN, std::ptr::null_mut()), 2);
            flow_engine_free(handle);
        }
    }
}
