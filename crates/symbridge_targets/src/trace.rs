//! Coverage and static field access traces of one concrete run.
//!
//! Instrumented code appends to the [`TraceCollector`] while it runs; the interpreter drains
//! the collector into a [`Trace`] afterwards, checks that the concrete run followed the path it
//! meant to explore, and feeds the covered ids into its path selection.

use alloc::vec::Vec;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use symbridge_core::{Error, HasLen};

use crate::{GrowableBuffer, InstructionLocation, StaticFieldAccess};

/// Two independent, append-only event streams.
///
/// There is no ordering contract between the instruction stream and the static field stream.
#[derive(Debug, Clone, Default)]
pub struct TraceCollector {
    instructions: GrowableBuffer<u64>,
    static_field_accesses: GrowableBuffer<u64>,
}

impl TraceCollector {
    /// Creates an empty collector with the build-time default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collector whose streams start out with `capacity` slots each.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instructions: GrowableBuffer::with_capacity(capacity),
            static_field_accesses: GrowableBuffer::with_capacity(capacity),
        }
    }

    /// Records that the instruction with the given id was executed.
    #[inline]
    pub fn record_instruction(&mut self, id: u64) {
        self.instructions.add(id);
    }

    /// Records an access to a static field.
    #[inline]
    pub fn record_static_field_access(&mut self, id: u64) {
        self.static_field_accesses.add(id);
    }

    /// Drops the last recorded instruction, undoing a speculative record.
    #[inline]
    pub fn undo_instruction(&mut self) {
        self.instructions.remove_last();
    }

    /// The executed instruction ids, in execution order
    #[must_use]
    pub fn instructions(&self) -> &[u64] {
        self.instructions.as_slice()
    }

    /// The static field access ids, in execution order
    #[must_use]
    pub fn static_field_accesses(&self) -> &[u64] {
        self.static_field_accesses.as_slice()
    }

    /// `true` if neither stream holds an event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty() && self.static_field_accesses.is_empty()
    }

    /// Resets both streams. Has to happen before every concrete run.
    pub fn clear(&mut self) {
        self.instructions.clear();
        self.static_field_accesses.clear();
    }

    /// Copies both streams out and clears the collector.
    #[must_use]
    pub fn drain(&mut self) -> Trace {
        let trace = Trace {
            instructions: self.instructions.as_slice().to_vec(),
            static_field_accesses: self.static_field_accesses.as_slice().to_vec(),
        };
        self.clear();
        trace
    }
}

/// The drained events of one concrete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    instructions: Vec<u64>,
    static_field_accesses: Vec<u64>,
}

impl Trace {
    /// Builds a trace from raw streams, e.g. when replaying a recorded run.
    #[must_use]
    pub fn new(instructions: Vec<u64>, static_field_accesses: Vec<u64>) -> Self {
        Self {
            instructions,
            static_field_accesses,
        }
    }

    /// The executed instruction ids, in execution order
    #[must_use]
    pub fn instructions(&self) -> &[u64] {
        &self.instructions
    }

    /// The static field access ids, in execution order
    #[must_use]
    pub fn static_field_accesses(&self) -> &[u64] {
        &self.static_field_accesses
    }

    /// The executed instructions, decoded
    pub fn locations(&self) -> impl Iterator<Item = InstructionLocation> + '_ {
        self.instructions
            .iter()
            .map(|id| InstructionLocation::decode(*id))
    }

    /// Returns the first position at which this trace leaves `expected`.
    ///
    /// `expected` is the path prefix the interpreter wanted to replay; the concrete run may go on
    /// after the prefix ends. A trace that stops before the prefix is exhausted diverges at its
    /// own length.
    #[must_use]
    pub fn first_divergence(&self, expected: &[u64]) -> Option<usize> {
        expected
            .iter()
            .enumerate()
            .find(|(idx, id)| self.instructions.get(*idx) != Some(*id))
            .map(|(idx, _)| idx)
    }

    /// The distinct instruction ids covered by this run.
    #[must_use]
    pub fn covered_instructions(&self) -> HashSet<u64> {
        self.instructions.iter().copied().collect()
    }

    /// The distinct static field accesses of this run, in first-seen order.
    #[must_use]
    pub fn accessed_statics(&self) -> Vec<StaticFieldAccess> {
        let mut seen = HashSet::new();
        self.static_field_accesses
            .iter()
            .filter(|id| seen.insert(**id))
            .map(|id| StaticFieldAccess::decode(*id))
            .collect()
    }

    /// Serializes the trace for the interpreter side.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Reads a trace serialized with [`Trace::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

impl HasLen for Trace {
    /// The number of executed instructions
    fn len(&self) -> usize {
        self.instructions.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::{Trace, TraceCollector};
    use crate::{InstructionLocation, StaticFieldAccess, StaticFieldAccessKind};

    #[test]
    fn test_streams_are_independent() {
        let mut collector = TraceCollector::with_capacity(2);
        collector.record_instruction(1);
        collector.record_static_field_access(100);
        collector.record_instruction(2);
        collector.record_instruction(3);

        assert_eq!(collector.instructions(), &[1, 2, 3]);
        assert_eq!(collector.static_field_accesses(), &[100]);
    }

    #[test]
    fn test_drain_resets_collector() {
        let mut collector = TraceCollector::new();
        collector.record_instruction(10);
        collector.record_instruction(11);
        collector.record_static_field_access(5);

        let trace = collector.drain();
        assert_eq!(trace.instructions(), &[10, 11]);
        assert_eq!(trace.static_field_accesses(), &[5]);
        assert!(collector.is_empty());

        collector.record_instruction(12);
        let trace = collector.drain();
        assert_eq!(trace.instructions(), &[12]);
        assert!(trace.static_field_accesses().is_empty());
    }

    #[test]
    fn test_undo_instruction() {
        let mut collector = TraceCollector::new();
        collector.record_instruction(1);
        collector.record_instruction(2);
        collector.undo_instruction();
        assert_eq!(collector.instructions(), &[1]);
        collector.undo_instruction();
        collector.undo_instruction();
        assert!(collector.is_empty());
    }

    #[test]
    fn test_first_divergence() {
        let trace = Trace::new(vec![1, 2, 3, 4], vec![]);
        assert_eq!(trace.first_divergence(&[1, 2]), None);
        assert_eq!(trace.first_divergence(&[1, 2, 3, 4]), None);
        assert_eq!(trace.first_divergence(&[1, 5, 3]), Some(1));
        assert_eq!(trace.first_divergence(&[1, 2, 3, 4, 5]), Some(4));
        assert_eq!(trace.first_divergence(&[]), None);
    }

    #[test]
    fn test_coverage_and_statics() {
        let get = StaticFieldAccess::new(3, StaticFieldAccessKind::Get).unwrap();
        let set = StaticFieldAccess::new(3, StaticFieldAccessKind::Set).unwrap();
        let trace = Trace::new(
            vec![7, 8, 7, 7, 9],
            vec![set.encode(), get.encode(), set.encode()],
        );

        let covered = trace.covered_instructions();
        assert_eq!(covered.len(), 3);
        assert!(covered.contains(&8));

        assert_eq!(trace.accessed_statics(), vec![set, get]);
    }

    #[test]
    fn test_locations_decode() {
        let location = InstructionLocation::new(1, 2, 3).unwrap();
        let trace = Trace::new(vec![location.encode()], vec![]);
        assert_eq!(trace.locations().collect::<Vec<_>>(), vec![location]);
    }

    #[test]
    fn test_trace_bytes() {
        let trace = Trace::new(vec![1, u64::MAX, 3], vec![42]);
        let bytes = trace.to_bytes().unwrap();
        assert_eq!(Trace::from_bytes(&bytes).unwrap(), trace);
        assert!(Trace::from_bytes(&[0xff]).is_err());
    }
}
