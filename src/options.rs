//! Parser configuration.

use rustc_hash::FxHashSet;

/// What to do with `#...` lines found at declaration boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreprocessorLines {
    Ignore,
    #[default]
    Retain,
}

/// What to do with function bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodBody {
    /// Bodies are consumed and discarded; only `has_body` is recorded.
    #[default]
    Skip,
    /// Bodies are stored as opaque balanced token runs.
    RetainTokens,
}

/// What to do with `extern template` / explicit instantiations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternTemplate {
    #[default]
    Record,
    Skip,
}

/// Options that control parsing behavior.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Surface or drop preprocessor lines.
    pub preprocessor_lines: PreprocessorLines,
    /// Attach doxygen comments (`///`, `//!`, `/**`, `/*!`) to declarations.
    pub retain_doxygen_comments: bool,
    /// Skip or capture function bodies.
    pub method_body: MethodBody,
    /// Record or skip explicit/extern template instantiations.
    pub extern_template_handling: ExternTemplate,
    /// Identifiers seeded into the global scope's type table, for headers
    /// that use types declared elsewhere.
    pub known_type_names: FxHashSet<String>,
    /// Refuse vendor extensions that are not explicitly enabled.
    pub strict: bool,
    /// Accept `__attribute__((...))`.
    pub gnu_attributes: bool,
    /// Accept `__declspec(...)` and MSVC calling conventions.
    pub msvc_attributes: bool,
    /// Accept `concept` declarations and `requires` clauses.
    pub concepts: bool,
    /// Record `fn(void)` as zero parameters.
    pub convert_void_to_zero_params: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            preprocessor_lines: PreprocessorLines::default(),
            retain_doxygen_comments: true,
            method_body: MethodBody::default(),
            extern_template_handling: ExternTemplate::default(),
            known_type_names: FxHashSet::default(),
            strict: false,
            gnu_attributes: true,
            msvc_attributes: true,
            concepts: true,
            convert_void_to_zero_params: true,
        }
    }
}

impl ParserOptions {
    /// Seed the global type table with externally declared type names.
    pub fn with_known_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_type_names
            .extend(names.into_iter().map(Into::into));
        self
    }
}
