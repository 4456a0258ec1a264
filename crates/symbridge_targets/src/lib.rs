//! `symbridge_targets` contains runtime code, linked into the analyzed program itself.
//!
//! Everything in here runs while instrumented code is concretely re-executed: the event
//! buffers the interpreter drains after a run, the mock registry it fills before a run,
//! the symbolic collection approximations and the intrinsic call targets it intercepts.
#![cfg_attr(feature = "document-features", doc = document_features::document_features!())]
#![no_std]
#![cfg_attr(not(test), warn(
    missing_debug_implementations,
    missing_docs,
    //trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    //unused_results
))]
#![cfg_attr(test, deny(
    missing_debug_implementations,
    //trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_must_use,
    //unused_results
))]
#![cfg_attr(
    test,
    deny(
        bad_style,
        dead_code,
        improper_ctypes,
        non_shorthand_field_patterns,
        no_mangle_generic_items,
        overflowing_literals,
        path_statements,
        patterns_in_fns_without_body,
        unconditional_recursion,
        unused,
        unused_allocation,
        unused_comparisons,
        unused_parens,
        while_true
    )
)]

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub use symbridge_core::{Error, HasLen};

/// The bootstrap buffer every other component stores its data in
pub mod buffer;
pub use buffer::*;

pub mod location;
pub use location::*;

pub mod trace;
pub use trace::*;

pub mod mock;
pub use mock::*;

pub mod collections;
pub use collections::*;

pub mod engine;

pub mod options;
pub use options::*;

pub mod context;
pub use context::*;

#[cfg(feature = "c_hooks")]
pub mod hooks;
#[cfg(feature = "c_hooks")]
pub use hooks::*;
