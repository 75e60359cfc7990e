//! Configuration for the AST manager and the parse pipeline.
//!
//! Both structs are plain values with `Default` and `with_*` builders; the CLI fills them from
//! flags and the language server uses the defaults.

/// Content type the manager treats as JavaScript when handling file-change batches.
pub const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Default number of trees kept by the manager's cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Options applied to every parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Attach line/column locations to comments.
    pub locations: bool,
    /// Tag comment locations and errors with the file identity.
    pub source_file: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            locations: true,
            source_file: true,
        }
    }
}

impl ParseOptions {
    pub fn with_locations(mut self, locations: bool) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_source_file(mut self, source_file: bool) -> Self {
        self.source_file = source_file;
        self
    }
}

/// Configuration for [`crate::manager::AstManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstManagerConfig {
    /// Maximum number of cached trees. Zero is treated as one.
    pub cache_capacity: usize,
    /// Files in a content-changed batch are invalidated only when their content type matches.
    pub javascript_content_type: String,
    pub parse: ParseOptions,
}

impl Default for AstManagerConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            javascript_content_type: JAVASCRIPT_CONTENT_TYPE.to_string(),
            parse: ParseOptions::default(),
        }
    }
}

impl AstManagerConfig {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_javascript_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.javascript_content_type = content_type.into();
        self
    }

    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }
}
