//! The intrinsic call targets instrumented code uses to talk to the interpreter.
//!
//! The interpreter recognizes a call to one of these functions by its exact path and signature
//! (see [`Intrinsic`]) and replaces it with its own effect before the body runs: an assumption
//! on the current path, a fresh symbolic value, or a type check on symbolic references.
//! None of the bodies does anything useful. Reaching one means interception failed and every
//! result of the current run is unreliable, so each body logs the failure and panics.
//!
//! Renaming any function in here, or changing its signature, breaks interception.

use alloc::vec::Vec;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use paste::paste;
use symbridge_core::Error;

use crate::{SymbolicList, SymbolicMap};

/// Logs and panics because `target` ran concretely although the interpreter had to replace it.
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn interception_failure(target: &str) -> ! {
    let err = Error::not_intercepted(target);
    log::error!("{err}");
    panic!("{err}");
}

#[track_caller]
fn not_intercepted(intrinsic: Intrinsic) -> ! {
    interception_failure(intrinsic.name())
}

macro_rules! intrinsic_catalogue {
    ($($variant:ident = $fn_name:ident $signature:literal,)*) => {
        /// Every call target the interpreter intercepts, numbered for the C hooks.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive,
        )]
        #[repr(u16)]
        pub enum Intrinsic {
            $(
                #[doc = concat!("[`", stringify!($fn_name), "`]")]
                $variant,
            )*
        }

        impl Intrinsic {
            /// The whole catalogue, in discriminant order
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// The fully qualified path the interpreter matches on.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => concat!(module_path!(), "::", stringify!($fn_name)),)*
                }
            }

            /// The signature the interpreter matches on.
            #[must_use]
            pub const fn signature(self) -> &'static str {
                match self {
                    $(Self::$variant => $signature,)*
                }
            }
        }
    };
}

intrinsic_catalogue! {
    Assume = assume "fn(bool)",
    MakeSymbolicBoolean = make_symbolic_boolean "fn() -> bool",
    MakeSymbolicByte = make_symbolic_byte "fn() -> i8",
    MakeSymbolicChar = make_symbolic_char "fn() -> u16",
    MakeSymbolicShort = make_symbolic_short "fn() -> i16",
    MakeSymbolicInt = make_symbolic_int "fn() -> i32",
    MakeSymbolicLong = make_symbolic_long "fn() -> i64",
    MakeSymbolicFloat = make_symbolic_float "fn() -> f32",
    MakeSymbolicDouble = make_symbolic_double "fn() -> f64",
    MakeSymbolic = make_symbolic "fn<T>() -> T",
    MakeSymbolicBooleanArray = make_symbolic_boolean_array "fn(usize) -> Vec<bool>",
    MakeSymbolicByteArray = make_symbolic_byte_array "fn(usize) -> Vec<i8>",
    MakeSymbolicCharArray = make_symbolic_char_array "fn(usize) -> Vec<u16>",
    MakeSymbolicShortArray = make_symbolic_short_array "fn(usize) -> Vec<i16>",
    MakeSymbolicIntArray = make_symbolic_int_array "fn(usize) -> Vec<i32>",
    MakeSymbolicLongArray = make_symbolic_long_array "fn(usize) -> Vec<i64>",
    MakeSymbolicFloatArray = make_symbolic_float_array "fn(usize) -> Vec<f32>",
    MakeSymbolicDoubleArray = make_symbolic_double_array "fn(usize) -> Vec<f64>",
    MakeSymbolicList = make_symbolic_list "fn<T>() -> SymbolicList<T>",
    MakeSymbolicMap = make_symbolic_map "fn<K, V>() -> SymbolicMap<K, V>",
    TypeEquals = type_equals "fn<A, B>(&A, &B) -> bool",
}

impl Intrinsic {
    /// Looks up the intrinsic with exactly this path and signature.
    #[must_use]
    pub fn resolve(name: &str, signature: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|intrinsic| intrinsic.name() == name && intrinsic.signature() == signature)
    }
}

impl core::fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.name(), self.signature())
    }
}

/// Restricts the current path to executions where `condition` holds.
#[inline(never)]
pub fn assume(_condition: bool) {
    not_intercepted(Intrinsic::Assume)
}

macro_rules! make_symbolic_primitives {
    ($($kind:ident: $ty:ty;)*) => {
        paste! {
            $(
                #[doc = concat!("A fresh, unconstrained symbolic `", stringify!($ty), "`.")]
                #[inline(never)]
                #[must_use]
                pub fn [<make_symbolic_ $kind>]() -> $ty {
                    not_intercepted(Intrinsic::[<MakeSymbolic $kind:camel>])
                }

                #[doc = concat!("A `", stringify!($ty), "` array of `size` fresh symbolic elements.")]
                #[inline(never)]
                #[must_use]
                pub fn [<make_symbolic_ $kind _array>](_size: usize) -> Vec<$ty> {
                    not_intercepted(Intrinsic::[<MakeSymbolic $kind:camel Array>])
                }
            )*
        }
    };
}

make_symbolic_primitives! {
    boolean: bool;
    byte: i8;
    char: u16;
    short: i16;
    int: i32;
    long: i64;
    float: f32;
    double: f64;
}

/// A fresh symbolic value of type `T`; references inside it may alias anything of a
/// compatible type.
#[inline(never)]
#[must_use]
pub fn make_symbolic<T>() -> T {
    not_intercepted(Intrinsic::MakeSymbolic)
}

/// A list of unbounded symbolic size and contents.
#[inline(never)]
#[must_use]
pub fn make_symbolic_list<T>() -> SymbolicList<T> {
    not_intercepted(Intrinsic::MakeSymbolicList)
}

/// A map of unbounded symbolic size and contents.
#[inline(never)]
#[must_use]
pub fn make_symbolic_map<K, V>() -> SymbolicMap<K, V> {
    not_intercepted(Intrinsic::MakeSymbolicMap)
}

/// `true` if the dynamic types of `a` and `b` are the same.
#[inline(never)]
#[must_use]
pub fn type_equals<A, B>(_a: &A, _b: &B) -> bool
where
    A: ?Sized,
    B: ?Sized,
{
    not_intercepted(Intrinsic::TypeEquals)
}
