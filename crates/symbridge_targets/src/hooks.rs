//! `extern "C"` entry points for instrumentation that cannot call Rust directly.
//!
//! Every hook takes the [`RuntimeContext`] it works on as its first argument. A null context
//! turns the tracing hooks into no-ops and makes every site look unmocked.

use crate::{
    ObjectIdentity, RuntimeContext,
    engine::{Intrinsic, interception_failure},
};

/// Records an executed instruction, see [`RuntimeContext::record_instruction`].
///
/// # Safety
/// `ctx` must be null or point to a live [`RuntimeContext`] that nothing else accesses
/// during the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __symbridge_trace_instruction(ctx: *mut RuntimeContext, id: u64) {
    if let Some(ctx) = unsafe { ctx.as_mut() } {
        ctx.record_instruction(id);
    }
}

/// Records a static field access, see [`RuntimeContext::record_static_field_access`].
///
/// # Safety
/// `ctx` must be null or point to a live [`RuntimeContext`] that nothing else accesses
/// during the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __symbridge_trace_static_field_access(
    ctx: *mut RuntimeContext,
    id: u64,
) {
    if let Some(ctx) = unsafe { ctx.as_mut() } {
        ctx.record_static_field_access(id);
    }
}

/// Is there a mocked value for `site_id` on the object at address `receiver`?
///
/// Pass `0` as `receiver` for static calls.
///
/// # Safety
/// `ctx` must be null or point to a live [`RuntimeContext`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __symbridge_is_mocked(
    ctx: *const RuntimeContext,
    site_id: u64,
    receiver: usize,
) -> bool {
    unsafe { ctx.as_ref() }
        .is_some_and(|ctx| ctx.mocks().is_mocked(site_id, ObjectIdentity::from_addr(receiver)))
}

/// Is the test body executing, see [`crate::MockRegistry::enter_execution`]?
///
/// # Safety
/// `ctx` must be null or point to a live [`RuntimeContext`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __symbridge_is_in_execution(ctx: *const RuntimeContext) -> bool {
    unsafe { ctx.as_ref() }.is_some_and(|ctx| ctx.mocks().is_in_execution())
}

/// Is there a global value for `site_id` that applies right now?
///
/// If so, read it with [`__symbridge_get_mock_bits`] and receiver `0`.
///
/// # Safety
/// `ctx` must be null or point to a live [`RuntimeContext`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __symbridge_is_global_mocked(
    ctx: *const RuntimeContext,
    site_id: u64,
) -> bool {
    unsafe { ctx.as_ref() }.is_some_and(|ctx| ctx.mocks().is_global_mocked(site_id))
}

/// The raw bits of the value mocked for `site_id` on the object at address `receiver`.
///
/// The caller reinterprets the bits as the type of the mocked call.
///
/// # Safety
/// `ctx` must point to a live [`RuntimeContext`], and [`__symbridge_is_mocked`] must have
/// returned `true` for the same arguments.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __symbridge_get_mock_bits(
    ctx: *const RuntimeContext,
    site_id: u64,
    receiver: usize,
) -> u64 {
    let mocks = unsafe { (*ctx).mocks() };
    unsafe { mocks.get_mock_value(site_id, ObjectIdentity::from_addr(receiver)) }.to_bits()
}

/// Called by stubs whose [`Intrinsic`] body was reached. Never returns.
#[unsafe(no_mangle)]
pub extern "C" fn __symbridge_intrinsic_not_intercepted(intrinsic: u16) -> ! {
    match Intrinsic::try_from(intrinsic) {
        Ok(intrinsic) => interception_failure(intrinsic.name()),
        Err(_) => interception_failure(&format!("unknown intrinsic #{intrinsic}")),
    }
}
