/*!
 * `symbridge_core` contains the pieces shared by every `symbridge` crate: the [`Error`] enum,
 * the [`HasLen`] trait and the [`StderrLogger`] the runtime reports through.
 */
#![doc = include_str!("../../../README.md")]
/*! */
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
    missing_docs,
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
#[doc(hidden)]
pub extern crate alloc;

/// Re-export of the "format" macro
pub use alloc::format;
use alloc::string::String;
use core::{
    fmt::{self, Display},
    num::ParseIntError,
    str::ParseBoolError,
};
#[cfg(feature = "std")]
use std::{env::VarError, io::Write};

#[cfg(feature = "std")]
use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "errors_backtrace")]
/// Error Backtrace type when `errors_backtrace` feature is enabled (== [`Backtrace`](std::backtrace::Backtrace))
pub type ErrorBacktrace = std::backtrace::Backtrace;

#[cfg(not(feature = "errors_backtrace"))]
#[derive(Debug, Default)]
/// ZST to use when `errors_backtrace` is disabled
pub struct ErrorBacktrace;

#[cfg(not(feature = "errors_backtrace"))]
impl ErrorBacktrace {
    /// Nop
    #[must_use]
    pub fn capture() -> Self {
        Self
    }
}

#[cfg(feature = "errors_backtrace")]
fn display_error_backtrace(f: &mut fmt::Formatter, err: &ErrorBacktrace) -> fmt::Result {
    write!(f, "\nBacktrace: {err:?}")
}
#[cfg(not(feature = "errors_backtrace"))]
#[expect(clippy::unnecessary_wraps)]
fn display_error_backtrace(_f: &mut fmt::Formatter, _err: &ErrorBacktrace) -> fmt::Result {
    fmt::Result::Ok(())
}

/// Everything that can go wrong in the `symbridge` runtime
#[derive(Debug)]
pub enum Error {
    /// A trace or record could not be (de)serialized
    Serialize(String, ErrorBacktrace),
    /// Something the runtime looked up was not there
    Empty(String, ErrorBacktrace),
    /// The argument passed to this method or function is not valid
    IllegalArgument(String, ErrorBacktrace),
    /// A call the interpreter must intercept reached its real body.
    ///
    /// Analysis results for the current run are unreliable once this happened.
    NotIntercepted(String, ErrorBacktrace),
    /// Something outside the runtime refused to cooperate
    Unknown(String, ErrorBacktrace),
}

impl Error {
    /// A trace or record could not be (de)serialized
    #[must_use]
    pub fn serialize<S>(arg: S) -> Self
    where
        S: Into<String>,
    {
        Error::Serialize(arg.into(), ErrorBacktrace::capture())
    }

    /// Something the runtime looked up was not there
    #[must_use]
    pub fn empty<S>(arg: S) -> Self
    where
        S: Into<String>,
    {
        Error::Empty(arg.into(), ErrorBacktrace::capture())
    }

    /// The argument passed to this method or function is not valid
    #[must_use]
    pub fn illegal_argument<S>(arg: S) -> Self
    where
        S: Into<String>,
    {
        Error::IllegalArgument(arg.into(), ErrorBacktrace::capture())
    }

    /// The body of an intercepted call target was executed
    #[must_use]
    pub fn not_intercepted<S>(arg: S) -> Self
    where
        S: Into<String>,
    {
        Error::NotIntercepted(arg.into(), ErrorBacktrace::capture())
    }

    /// Something outside the runtime refused to cooperate
    #[must_use]
    pub fn unknown<S>(arg: S) -> Self
    where
        S: Into<String>,
    {
        Error::Unknown(arg.into(), ErrorBacktrace::capture())
    }
}

impl core::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Serialize(s, b) => {
                write!(f, "Failed to (de)serialize: {s}")?;
                display_error_backtrace(f, b)
            }
            Self::Empty(s, b) => {
                write!(f, "Nothing found: {s}")?;
                display_error_backtrace(f, b)
            }
            Self::IllegalArgument(s, b) => {
                write!(f, "Illegal argument: {s}")?;
                display_error_backtrace(f, b)
            }
            Self::NotIntercepted(s, b) => {
                write!(f, "Call target was not intercepted by the interpreter: {s}")?;
                display_error_backtrace(f, b)
            }
            Self::Unknown(s, b) => {
                write!(f, "Unknown error: {s}")?;
                display_error_backtrace(f, b)
            }
        }
    }
}

/// Stringify the postcard serializer error
impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Self::serialize(format!("{err:?}"))
    }
}

#[cfg(feature = "std")]
impl From<VarError> for Error {
    fn from(err: VarError) -> Self {
        Self::empty(format!("Could not read env var: {err:?}"))
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Self::illegal_argument(format!("Failed to parse number: {err}"))
    }
}

impl From<ParseBoolError> for Error {
    fn from(err: ParseBoolError) -> Self {
        Self::illegal_argument(format!("Failed to parse bool: {err}"))
    }
}

/// Has a length field
pub trait HasLen {
    /// The length
    fn len(&self) -> usize;

    /// Returns `true` if it has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(feature = "std")]
static STDERR_LOGGER: StderrLogger = StderrLogger;

/// Sends the runtime's [`log`] records to stderr.
///
/// The analyzed program owns stdout, so the runtime only ever writes to stderr. Every line
/// carries the pid, since the interpreter usually drives several analyzed processes at once.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogger;

#[cfg(feature = "std")]
impl StderrLogger {
    /// Installs the stderr logger as the process wide [`log`] sink, reporting up to `level`.
    ///
    /// Fails with [`Error::Unknown`] if a logger is already installed, in which case the max
    /// level stays untouched.
    pub fn install(level: LevelFilter) -> Result<(), Error> {
        log::set_logger(&STDERR_LOGGER)
            .map_err(|err| Error::unknown(format!("Could not install the stderr logger: {err}")))?;
        log::set_max_level(level);
        Ok(())
    }
}

#[cfg(feature = "std")]
impl Log for StderrLogger {
    #[inline]
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "[symbridge {} {:<5}] {}: {}",
            std::process::id(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        // Nothing useful to do if stderr is gone.
        let _ = std::io::stderr().flush();
    }
}
