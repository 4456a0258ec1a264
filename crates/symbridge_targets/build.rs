// build.rs

use std::{env, fs::File, io::Write, path::Path};

const BUFFER_INITIAL_CAPACITY_DEFAULT: usize = 10;
const MOCK_INITIAL_CAPACITY_DEFAULT: usize = 10;

fn capacity_from_env(var: &str, default: usize) -> usize {
    println!("cargo:rerun-if-env-changed={var}");
    let capacity = option_env_at_build(var).map_or(default, |value| {
        value
            .parse()
            .unwrap_or_else(|_| panic!("Could not parse {var}: `{value}` is not a number"))
    });
    assert!(capacity > 0, "{var} must be larger than zero");
    capacity
}

fn option_env_at_build(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.is_empty())
}

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let out_dir = out_dir.to_string_lossy().to_string();
    let dest_path = Path::new(&out_dir).join("constants.rs");
    let mut constants_file = File::create(dest_path).expect("Could not create file");

    let buffer_initial_capacity = capacity_from_env(
        "SYMBRIDGE_BUFFER_INITIAL_CAPACITY",
        BUFFER_INITIAL_CAPACITY_DEFAULT,
    );
    let mock_initial_capacity =
        capacity_from_env("SYMBRIDGE_MOCK_INITIAL_CAPACITY", MOCK_INITIAL_CAPACITY_DEFAULT);

    write!(
        constants_file,
        "// These constants are autogenerated by build.rs

        /// The initial capacity of every event buffer
        pub const BUFFER_INITIAL_CAPACITY: usize = {buffer_initial_capacity};
        /// The initial capacity of the mock registry
        pub const MOCK_INITIAL_CAPACITY: usize = {mock_initial_capacity};
"
    )
    .expect("Could not write file");

    println!("cargo:rerun-if-changed=build.rs");
}
