//! Run time configuration of the runtime.

use serde::{Deserialize, Serialize};
use symbridge_core::Error;
use typed_builder::TypedBuilder;

use crate::{BUFFER_INITIAL_CAPACITY, MOCK_INITIAL_CAPACITY};

/// The environment variable [`RuntimeOptions::parse_env_options`] reads
pub const SYMBRIDGE_OPTIONS_ENV: &str = "SYMBRIDGE_OPTIONS";

/// What the runtime records, and how much room it reserves up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct RuntimeOptions {
    /// Record executed instructions
    #[builder(default = true)]
    trace_instructions: bool,
    /// Record static field accesses
    #[builder(default = true)]
    trace_statics: bool,
    /// Initial capacity of each trace stream
    #[builder(default = BUFFER_INITIAL_CAPACITY)]
    buffer_capacity: usize,
    /// Initial capacity of the mock registry
    #[builder(default = MOCK_INITIAL_CAPACITY)]
    mock_capacity: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn parse_capacity(name: &str, value: &str) -> Result<usize, Error> {
    let capacity: usize = value.parse()?;
    if capacity == 0 {
        return Err(Error::illegal_argument(format!(
            "symbridge option '{name}' has to be larger than zero"
        )));
    }
    Ok(capacity)
}

impl RuntimeOptions {
    /// Parses options from a string.
    ///
    /// Options are `:` separated, and each option is a `name=value` string. Options that are
    /// not mentioned keep their default.
    pub fn parse(options: &str) -> Result<Self, Error> {
        let mut parsed = Self::default();

        for option in options.trim().split(':').filter(|option| !option.is_empty()) {
            let (name, value) = option.split_once('=').ok_or_else(|| {
                Error::illegal_argument(format!("Expected a '=' in option string '{option}'"))
            })?;
            match name {
                "trace-instructions" => parsed.trace_instructions = value.parse()?,
                "trace-statics" => parsed.trace_statics = value.parse()?,
                "buffer-capacity" => parsed.buffer_capacity = parse_capacity(name, value)?,
                "mock-capacity" => parsed.mock_capacity = parse_capacity(name, value)?,
                _ => {
                    return Err(Error::illegal_argument(format!(
                        "unknown symbridge option: '{option}'"
                    )));
                }
            }
        }

        Ok(parsed)
    }

    /// Parses options from the `SYMBRIDGE_OPTIONS` environment variable.
    ///
    /// A missing variable yields the defaults.
    #[cfg(feature = "std")]
    pub fn parse_env_options() -> Result<Self, Error> {
        match std::env::var(SYMBRIDGE_OPTIONS_ENV) {
            Ok(options) => Self::parse(&options),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Record executed instructions?
    #[must_use]
    pub fn trace_instructions(&self) -> bool {
        self.trace_instructions
    }

    /// Record static field accesses?
    #[must_use]
    pub fn trace_statics(&self) -> bool {
        self.trace_statics
    }

    /// Initial capacity of each trace stream
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Initial capacity of the mock registry
    #[must_use]
    pub fn mock_capacity(&self) -> usize {
        self.mock_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::RuntimeOptions;
    use crate::{BUFFER_INITIAL_CAPACITY, Error, MOCK_INITIAL_CAPACITY};

    #[test]
    fn test_defaults() {
        let options = RuntimeOptions::parse("").unwrap();
        assert_eq!(options, RuntimeOptions::default());
        assert!(options.trace_instructions());
        assert!(options.trace_statics());
        assert_eq!(options.buffer_capacity(), BUFFER_INITIAL_CAPACITY);
        assert_eq!(options.mock_capacity(), MOCK_INITIAL_CAPACITY);
    }

    #[test]
    fn test_parse_all() {
        let options = RuntimeOptions::parse(
            "trace-instructions=false:trace-statics=false:buffer-capacity=4096:mock-capacity=3",
        )
        .unwrap();
        assert_eq!(
            options,
            RuntimeOptions::builder()
                .trace_instructions(false)
                .trace_statics(false)
                .buffer_capacity(4096)
                .mock_capacity(3)
                .build()
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RuntimeOptions::parse("trace-statics"),
            Err(Error::IllegalArgument(..))
        ));
        assert!(matches!(
            RuntimeOptions::parse("trace-statics=maybe"),
            Err(Error::IllegalArgument(..))
        ));
        assert!(matches!(
            RuntimeOptions::parse("buffer-capacity=0"),
            Err(Error::IllegalArgument(..))
        ));
        assert!(matches!(
            RuntimeOptions::parse("mock-capacity=-1"),
            Err(Error::IllegalArgument(..))
        ));
        assert!(matches!(
            RuntimeOptions::parse("coverage=true"),
            Err(Error::IllegalArgument(..))
        ));
    }

    #[test]
    fn test_trailing_separator() {
        let options = RuntimeOptions::parse("trace-statics=false:").unwrap();
        assert!(!options.trace_statics());
        assert!(options.trace_instructions());
    }

    #[cfg(feature = "std")]
    #[test]
    #[serial_test::serial]
    fn test_parse_env_options() {
        use super::SYMBRIDGE_OPTIONS_ENV;

        // # Safety
        // Tests touching the environment are serialized.
        unsafe {
            std::env::remove_var(SYMBRIDGE_OPTIONS_ENV);
        }
        assert_eq!(
            RuntimeOptions::parse_env_options().unwrap(),
            RuntimeOptions::default()
        );

        unsafe {
            std::env::set_var(SYMBRIDGE_OPTIONS_ENV, "mock-capacity=64");
        }
        let options = RuntimeOptions::parse_env_options();
        unsafe {
            std::env::remove_var(SYMBRIDGE_OPTIONS_ENV);
        }
        assert_eq!(options.unwrap().mock_capacity(), 64);
    }
}
