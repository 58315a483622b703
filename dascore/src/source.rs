use std::fmt::{self, Display};

/// A range of bytes in one of the compiled source files.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub struct InputSpan {
    pub file: InputSpanFile,
    pub start: usize,
    pub end: usize,
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum InputSpanFile {
    /// Declarations registered by native modules have no source text.
    Builtin,

    /// Index of a file as assigned by the driver that feeds sources to the parser.
    Source(usize),
}

impl InputSpan {
    pub fn new(file: usize, start: usize, end: usize) -> InputSpan {
        InputSpan {
            file: InputSpanFile::Source(file),
            start,
            end,
        }
    }

    /// Returns a span that does not point anywhere.
    /// Used for synthesised declarations and for errors not tied to code.
    pub fn builtin() -> InputSpan {
        InputSpan {
            file: InputSpanFile::Builtin,
            start: 0,
            end: 0,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.file == InputSpanFile::Builtin
    }

    /// Returns a span covering both `self` and `other`.
    ///
    /// Spans from different files can't be merged, and `self` is returned in that case.
    pub fn merge(&self, other: &InputSpan) -> InputSpan {
        if self.file != other.file {
            return *self;
        }
        InputSpan {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Default for InputSpan {
    fn default() -> InputSpan {
        InputSpan::builtin()
    }
}

impl Display for InputSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file {
            InputSpanFile::Builtin => write!(f, "<builtin>"),
            InputSpanFile::Source(file) => write!(f, "#{}:{}..{}", file, self.start, self.end),
        }
    }
}
