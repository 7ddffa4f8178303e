//! Parsing options and configuration.

/// Options for walking a statement grid.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Literal that marks an activity continuation row
    pub continuation_marker: String,

    /// Rows of running header reprinted at the top of continuation pages
    pub running_header_rows: usize,

    /// Year used for `MM/DD` dates when the statement period has none
    pub statement_year: Option<i32>,

    /// Whether to NFKC-normalize cell text before walking
    pub normalize_text: bool,

    /// Ceiling on run loop iterations (None = unlimited)
    pub max_steps: Option<usize>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip malformed repeated lines).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the continuation row marker.
    pub fn with_continuation_marker(mut self, marker: impl Into<String>) -> Self {
        self.continuation_marker = marker.into();
        self
    }

    /// Set the number of running header rows after a page break.
    pub fn with_running_header_rows(mut self, rows: usize) -> Self {
        self.running_header_rows = rows;
        self
    }

    /// Set the fallback statement year.
    pub fn with_statement_year(mut self, year: i32) -> Self {
        self.statement_year = Some(year);
        self
    }

    /// Enable or disable text normalization.
    pub fn with_normalize_text(mut self, normalize: bool) -> Self {
        self.normalize_text = normalize;
        self
    }

    /// Limit the number of run loop iterations.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub(crate) fn is_lenient(&self) -> bool {
        self.error_mode == ErrorMode::Lenient
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            continuation_marker: "Machine".to_string(),
            running_header_rows: 2,
            statement_year: None,
            normalize_text: true,
            max_steps: None,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any malformed field
    #[default]
    Strict,
    /// Log and skip malformed repeated lines
    Lenient,
}
