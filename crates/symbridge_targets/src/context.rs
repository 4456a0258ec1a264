//! The per-analysis state the host threads through instrumented code.

use symbridge_core::HasLen;

use crate::{MockRegistry, RuntimeOptions, Trace, TraceCollector};

/// Everything one analyzed thread records and replays.
///
/// The host creates one context per analysis session and hands it to the instrumented code,
/// directly or through the C hooks. It must not be touched by two analyzed threads at once.
/// Between two concrete runs the host either drains it with [`RuntimeContext::finish_run`] or
/// throws the run away with [`RuntimeContext::reset`]; [`RuntimeContext::begin_run`] resets the
/// trace either way.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    options: RuntimeOptions,
    trace: TraceCollector,
    mocks: MockRegistry,
    runs: u64,
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new(RuntimeOptions::default())
    }
}

impl RuntimeContext {
    /// Creates a context, sizing its buffers from `options`.
    #[must_use]
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            trace: TraceCollector::with_capacity(options.buffer_capacity()),
            mocks: MockRegistry::with_capacity(options.mock_capacity()),
            options,
            runs: 0,
        }
    }

    /// The options this context was created with
    #[must_use]
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Starts a concrete run: forgets the trace of any abandoned run.
    ///
    /// Mocks are kept, the interpreter registers them for the upcoming run before calling this.
    pub fn begin_run(&mut self) {
        if !self.trace.is_empty() {
            log::debug!(
                "Dropping {} undrained instructions of an abandoned run",
                self.trace.instructions().len()
            );
        }
        self.trace.clear();
        self.runs += 1;
        log::debug!(
            "Starting concrete run {} with {} mocks",
            self.runs,
            self.mocks.len()
        );
    }

    /// Runs the test body `body`, with global mocks active for its duration.
    ///
    /// Setup code that runs before, and assertions that run after, see the real implementation
    /// of globally mocked sites.
    pub fn execute<R, F>(&mut self, body: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        log::trace!("Entering test body of run {}", self.runs);
        self.mocks.enter_execution();
        let result = body(self);
        self.mocks.leave_execution();
        log::trace!("Left test body of run {}", self.runs);
        result
    }

    /// Ends the current run and hands its trace to the interpreter.
    ///
    /// Drops the mocks of this run.
    #[must_use]
    pub fn finish_run(&mut self) -> Trace {
        let trace = self.trace.drain();
        self.mocks.leave_execution();
        self.mocks.clear();
        log::debug!(
            "Finished concrete run {}: {} instructions, {} static field accesses",
            self.runs,
            trace.instructions().len(),
            trace.static_field_accesses().len()
        );
        trace
    }

    /// Drops the trace and all mocks, e.g. after an abandoned run.
    pub fn reset(&mut self) {
        log::trace!("Resetting runtime context");
        self.trace.clear();
        self.mocks.leave_execution();
        self.mocks.clear();
    }

    /// Records an executed instruction, unless instruction tracing is off.
    #[inline]
    pub fn record_instruction(&mut self, id: u64) {
        if self.options.trace_instructions() {
            self.trace.record_instruction(id);
        }
    }

    /// Records a static field access, unless static tracing is off.
    #[inline]
    pub fn record_static_field_access(&mut self, id: u64) {
        if self.options.trace_statics() {
            self.trace.record_static_field_access(id);
        }
    }

    /// The events of the current run so far
    #[must_use]
    pub fn trace(&self) -> &TraceCollector {
        &self.trace
    }

    /// The events of the current run so far, mutable
    pub fn trace_mut(&mut self) -> &mut TraceCollector {
        &mut self.trace
    }

    /// The mocks of the current run
    #[must_use]
    pub fn mocks(&self) -> &MockRegistry {
        &self.mocks
    }

    /// The mocks of the current run, mutable, for the interpreter to fill
    pub fn mocks_mut(&mut self) -> &mut MockRegistry {
        &mut self.mocks
    }

    /// How many runs were started with this context
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }
}
