//! Configuration and constants for span profiling.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default number of entries kept by top-K reports
pub const DEFAULT_TOP_COUNT: usize = 5;

/// Separator between frames of a collapsed stack
pub const STACK_SEPARATOR: &str = ";";

// Text summary layout
pub const SUMMARY_NAME_WIDTH: usize = 40;
pub const SUMMARY_BAR_WIDTH: usize = 50;
