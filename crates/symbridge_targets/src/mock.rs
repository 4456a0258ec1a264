//! Identity-keyed replay of mocked call results.
//!
//! When the interpreter decides not to analyze a call, it picks a substitution value and stores
//! it here before the concrete run. The instrumented call site then asks
//! [`MockRegistry::is_mocked`] and, if so, returns the stored value instead of running the real
//! body. Every hit of the same site on the same receiver within one run yields the same value,
//! so the concrete run keeps following the symbolic trace that produced it.
//!
//! Global mocks are keyed by [`ObjectIdentity::NULL`] and only fire while the interpreter's test
//! body executes (see [`MockRegistry::enter_execution`]). The code that sets up the test runs
//! against the real implementation.

use core::{
    fmt::{self, Debug, Formatter},
    ptr,
};

use paste::paste;
use serde::{Deserialize, Serialize};
use symbridge_core::HasLen;
use unchecked_unwrap::UncheckedUnwrap;

use crate::{GrowableBuffer, MOCK_INITIAL_CAPACITY};

/// The identity of an object: its address, never its value.
///
/// Two objects that compare equal but live at different addresses have different identities.
/// Static and global mocks use [`ObjectIdentity::NULL`] as their receiver.
/// Zero-sized values do not have a meaningful address and should not be used as receivers.
/// A receiver has to outlive the run and every record keyed by it: once it is freed, its address
/// can be reused by an unrelated object, which would then silently pick up its mocks.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct ObjectIdentity(usize);

impl ObjectIdentity {
    /// The receiver of static calls
    pub const NULL: Self = Self(0);

    /// The identity of the object behind `object`.
    ///
    /// Never looks at the object itself, so it is fine to call on partially initialized receivers.
    #[inline]
    #[must_use]
    pub fn of<T>(object: &T) -> Self
    where
        T: ?Sized,
    {
        Self(ptr::from_ref(object).cast::<()>().addr())
    }

    /// An identity handed over as a raw address, e.g. through the C hooks.
    #[inline]
    #[must_use]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// The raw address
    #[inline]
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }

    /// `true` for the receiver of static calls
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A mocked value, stored as a raw 64-bit slot.
///
/// Conversions in and out are plain bit reinterpretations. Reading a slot as a different kind
/// than it was stored as is not detected; it yields whatever those bits mean for that kind.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MockValue(u64);

impl MockValue {
    /// A slot from its raw bits
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bits of this slot
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

impl Debug for MockValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MockValue({:#018x})", self.0)
    }
}

macro_rules! mock_value_kinds {
    ($($kind:ident: $ty:ty, |$v:ident| $to_bits:expr, |$bits:ident| $from_bits:expr;)*) => {
        paste! {
            impl MockValue {
                $(
                    #[doc = concat!("Stores a `", stringify!($ty), "`")]
                    #[inline]
                    #[must_use]
                    pub fn [<from_ $kind>]($v: $ty) -> Self {
                        Self($to_bits)
                    }

                    #[doc = concat!("Reads the slot as a `", stringify!($ty), "`, unchecked")]
                    #[inline]
                    #[must_use]
                    pub fn [<as_ $kind>](self) -> $ty {
                        let $bits = self.0;
                        $from_bits
                    }
                )*
            }

            $(
                impl From<$ty> for MockValue {
                    fn from(value: $ty) -> Self {
                        Self::[<from_ $kind>](value)
                    }
                }
            )*

            impl MockRegistry {
                $(
                    #[doc = concat!(
                        "The value mocked for `site_id` on `receiver`, read as a `",
                        stringify!($ty),
                        "`.\n\n# Safety\nThe site must be mocked, check [`MockRegistry::is_mocked`] first."
                    )]
                    #[inline]
                    #[must_use]
                    pub unsafe fn [<get_ $kind _mock_value>](
                        &self,
                        site_id: u64,
                        receiver: ObjectIdentity,
                    ) -> $ty {
                        unsafe { self.get_mock_value(site_id, receiver) }.[<as_ $kind>]()
                    }
                )*
            }
        }
    };
}

mock_value_kinds! {
    boolean: bool, |v| u64::from(v), |bits| bits != 0;
    byte: i8, |v| i64::from(v) as u64, |bits| bits as i8;
    char: u16, |v| u64::from(v), |bits| bits as u16;
    short: i16, |v| i64::from(v) as u64, |bits| bits as i16;
    int: i32, |v| i64::from(v) as u64, |bits| bits as i32;
    long: i64, |v| v as u64, |bits| bits as i64;
    float: f32, |v| u64::from(v.to_bits()), |bits| f32::from_bits(bits as u32);
    double: f64, |v| v.to_bits(), |bits| f64::from_bits(bits);
    object: ObjectIdentity, |v| v.addr() as u64, |bits| ObjectIdentity::from_addr(bits as usize);
}

/// One substitution: the value `site_id` returns when called on `receiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockRecord {
    /// The mocked call site (see [`crate::InstructionLocation::method_site_id`])
    pub site_id: u64,
    /// The receiver, compared by identity
    pub receiver: ObjectIdentity,
    /// The value to return
    pub value: MockValue,
}

impl MockRecord {
    /// Creates a new record
    #[must_use]
    pub fn new<V>(site_id: u64, receiver: ObjectIdentity, value: V) -> Self
    where
        V: Into<MockValue>,
    {
        Self {
            site_id,
            receiver,
            value: value.into(),
        }
    }
}

/// All substitutions of the current concrete run.
///
/// Lookups are a linear scan: a run rarely mocks more than a handful of sites, and the scan
/// needs neither hashing nor equality on the receiver.
#[derive(Debug, Clone)]
pub struct MockRegistry {
    records: GrowableBuffer<MockRecord>,
    in_execution: bool,
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegistry {
    /// Creates an empty registry with the build-time default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MOCK_INITIAL_CAPACITY)
    }

    /// Creates an empty registry with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: GrowableBuffer::with_capacity(capacity),
            in_execution: false,
        }
    }

    /// Appends a record.
    ///
    /// There is no deduplication: the interpreter must never add a second record for a
    /// `(site_id, receiver)` pair that is already present. If it does, lookups keep returning
    /// the first one.
    #[inline]
    pub fn add(&mut self, record: MockRecord) {
        self.records.add(record);
    }

    /// Shorthand for [`MockRegistry::add`] with a freshly built record.
    #[inline]
    pub fn add_value<V>(&mut self, site_id: u64, receiver: ObjectIdentity, value: V)
    where
        V: Into<MockValue>,
    {
        self.add(MockRecord::new(site_id, receiver, value));
    }

    /// The first record for `site_id` on `receiver`, in insertion order.
    #[inline]
    #[must_use]
    pub fn find(&self, site_id: u64, receiver: ObjectIdentity) -> Option<MockRecord> {
        self.records
            .iter()
            .find(|record| record.site_id == site_id && record.receiver == receiver)
            .copied()
    }

    /// Is there a value for `site_id` on `receiver`?
    #[inline]
    #[must_use]
    pub fn is_mocked(&self, site_id: u64, receiver: ObjectIdentity) -> bool {
        self.find(site_id, receiver).is_some()
    }

    /// Is there a global value for `site_id` that applies right now?
    ///
    /// Global mocks only apply while the test body executes, see
    /// [`MockRegistry::enter_execution`]. Outside of it the real implementation runs even if a
    /// record exists. Read the value with `receiver` [`ObjectIdentity::NULL`].
    #[inline]
    #[must_use]
    pub fn is_global_mocked(&self, site_id: u64) -> bool {
        self.in_execution && self.is_mocked(site_id, ObjectIdentity::NULL)
    }

    /// Marks the start of the test body. Global mocks fire from now on.
    #[inline]
    pub fn enter_execution(&mut self) {
        self.in_execution = true;
    }

    /// Marks the end of the test body. Global mocks stop firing.
    #[inline]
    pub fn leave_execution(&mut self) {
        self.in_execution = false;
    }

    /// Is the test body executing?
    #[inline]
    #[must_use]
    pub fn is_in_execution(&self) -> bool {
        self.in_execution
    }

    /// The raw value mocked for `site_id` on `receiver`.
    ///
    /// # Safety
    /// The site must be mocked, check [`MockRegistry::is_mocked`] first.
    /// Calling this for a site without a record is undefined behavior.
    #[inline]
    #[must_use]
    pub unsafe fn get_mock_value(&self, site_id: u64, receiver: ObjectIdentity) -> MockValue {
        unsafe { self.find(site_id, receiver).unchecked_unwrap() }.value
    }

    /// All records, in insertion order
    #[must_use]
    pub fn records(&self) -> &[MockRecord] {
        self.records.as_slice()
    }

    /// Drops all records. Has to happen before every concrete run.
    ///
    /// Leaves the execution state alone.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl HasLen for MockRegistry {
    fn len(&self) -> usize {
        self.records.len()
    }
}
