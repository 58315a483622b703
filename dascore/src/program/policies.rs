/// Compilation settings chosen by the host embedding the language.
///
/// Per-program overrides are given as options, see `Program::options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeOfPolicies {
    /// Size of the evaluation stack of a context, in bytes.
    pub stack: u32,

    /// Upper bound on the rounds of `Program::optimize`. `None` means no bound.
    pub max_optimization_passes: Option<usize>,

    pub optimize: bool,

    /// Carried for hosts that require ahead-of-time compiled functions. Unused by the front end.
    pub fail_on_lack_of_aot: bool,
}

impl Default for CodeOfPolicies {
    fn default() -> CodeOfPolicies {
        CodeOfPolicies {
            stack: 16 * 1024,
            max_optimization_passes: Some(1000),
            optimize: true,
            fail_on_lack_of_aot: false,
        }
    }
}
