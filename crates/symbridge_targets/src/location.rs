//! Encoding of the 64-bit event ids instrumentation assigns to code locations.
//!
//! Instruction ids pack a class, a method and an instruction index:
//!
//! ```text
//!  63            40 39        24 23             0
//! +----------------+------------+----------------+
//! |   class (24)   | method(16) | instruction(24)|
//! +----------------+------------+----------------+
//! ```
//!
//! The upper 40 bits (class and method) double as the call-site id of a mocked method.
//! Static field access ids carry the field id in the upper 63 bits and the access kind in bit 0.

use core::fmt::{self, Display, Formatter};

use num_enum::IntoPrimitive;
use serde::{Deserialize, Serialize};
use symbridge_core::Error;

/// Number of bits reserved for the class id
pub const CLASS_ID_BITS: u32 = 24;
/// Number of bits reserved for the method id inside a class
pub const METHOD_ID_BITS: u32 = 16;
/// Number of bits reserved for the instruction index inside a method
pub const INSTRUCTION_INDEX_BITS: u32 = 24;

const METHOD_SHIFT: u32 = INSTRUCTION_INDEX_BITS;
const CLASS_SHIFT: u32 = INSTRUCTION_INDEX_BITS + METHOD_ID_BITS;

const fn mask(bits: u32) -> u64 {
    (1 << bits) - 1
}

/// A decoded instruction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstructionLocation {
    class_id: u32,
    method_id: u16,
    instruction_index: u32,
}

impl InstructionLocation {
    /// Creates a location, failing if `class_id` or `instruction_index` do not fit into 24 bits.
    pub fn new(class_id: u32, method_id: u16, instruction_index: u32) -> Result<Self, Error> {
        if u64::from(class_id) > mask(CLASS_ID_BITS) {
            return Err(Error::illegal_argument(format!(
                "class id {class_id} does not fit into {CLASS_ID_BITS} bits"
            )));
        }
        if u64::from(instruction_index) > mask(INSTRUCTION_INDEX_BITS) {
            return Err(Error::illegal_argument(format!(
                "instruction index {instruction_index} does not fit into {INSTRUCTION_INDEX_BITS} bits"
            )));
        }
        Ok(Self {
            class_id,
            method_id,
            instruction_index,
        })
    }

    /// Packs this location into the id recorded by the trace collector.
    #[must_use]
    pub const fn encode(self) -> u64 {
        ((self.class_id as u64) << CLASS_SHIFT)
            | ((self.method_id as u64) << METHOD_SHIFT)
            | self.instruction_index as u64
    }

    /// Unpacks an id recorded by the trace collector.
    #[must_use]
    pub const fn decode(id: u64) -> Self {
        Self {
            class_id: ((id >> CLASS_SHIFT) & mask(CLASS_ID_BITS)) as u32,
            method_id: ((id >> METHOD_SHIFT) & mask(METHOD_ID_BITS)) as u16,
            instruction_index: (id & mask(INSTRUCTION_INDEX_BITS)) as u32,
        }
    }

    /// The call-site id of the enclosing method, as used by the mock registry.
    #[must_use]
    pub const fn method_site_id(self) -> u64 {
        self.encode() & !mask(INSTRUCTION_INDEX_BITS)
    }

    /// The class part
    #[must_use]
    pub const fn class_id(self) -> u32 {
        self.class_id
    }

    /// The method part
    #[must_use]
    pub const fn method_id(self) -> u16 {
        self.method_id
    }

    /// The instruction part
    #[must_use]
    pub const fn instruction_index(self) -> u32 {
        self.instruction_index
    }
}

impl Display for InstructionLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}#{}",
            self.class_id, self.method_id, self.instruction_index
        )
    }
}

/// How a static field was touched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum StaticFieldAccessKind {
    /// The field was read
    Get = 0,
    /// The field was written
    Set = 1,
}

/// A decoded static field access id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaticFieldAccess {
    field_id: u64,
    kind: StaticFieldAccessKind,
}

impl StaticFieldAccess {
    /// The largest field id that can be encoded
    pub const MAX_FIELD_ID: u64 = u64::MAX >> 1;

    /// Creates an access, failing if `field_id` does not fit into 63 bits.
    pub fn new(field_id: u64, kind: StaticFieldAccessKind) -> Result<Self, Error> {
        if field_id > Self::MAX_FIELD_ID {
            return Err(Error::illegal_argument(format!(
                "static field id {field_id:#x} does not fit into 63 bits"
            )));
        }
        Ok(Self { field_id, kind })
    }

    /// Packs this access into the id recorded by the trace collector.
    #[must_use]
    pub fn encode(self) -> u64 {
        (self.field_id << 1) | u64::from(u8::from(self.kind))
    }

    /// Unpacks an id recorded by the trace collector.
    #[must_use]
    pub const fn decode(id: u64) -> Self {
        let kind = if id & 1 == 0 {
            StaticFieldAccessKind::Get
        } else {
            StaticFieldAccessKind::Set
        };
        Self {
            field_id: id >> 1,
            kind,
        }
    }

    /// The accessed field
    #[must_use]
    pub const fn field_id(self) -> u64 {
        self.field_id
    }

    /// Read or write
    #[must_use]
    pub const fn kind(self) -> StaticFieldAccessKind {
        self.kind
    }
}
