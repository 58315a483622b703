//! Compilation error definitions.

mod kinds;

use crate::source::{InputSpan, InputSpanFile};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use std::fmt::{self, Display};

/// A user-caused error detected during compilation.
///
/// Compilation errors are collected by `Program` and cause compilation to fail, but never stop
/// resolution: the program keeps going so that one run reports as many errors as possible.
#[derive(Debug, Clone)]
pub struct CompilationError {
    /// Category of the error. Determines the error code.
    pub kind: CompilationErrorKind,

    /// Short (single-line) message describing the problem.
    pub message: String,

    /// Additional details, e.g. a list of candidates for an ambiguous name.
    pub extra: Option<String>,

    /// Suggestion on how the problem can be fixed.
    pub fixme: Option<String>,

    /// Location in code where the problem occurred.
    pub location: Option<InputSpan>,

    /// Extended description of the problem that is shown directly next to code.
    pub subtitle: Option<String>,

    /// Useful information related to the error, bound to some location in code.
    pub bound_notes: Vec<(InputSpan, String)>,

    /// Useful information related to the error, not bound to any location.
    pub free_notes: Vec<String>,
}

/// Categories of user-facing errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompilationErrorKind {
    SyntaxError,
    ModuleNotFound,
    ArgumentAlreadyDeclared,
    InvalidAnnotation,
    FunctionAlreadyDeclared,
    CantPipe,
    LocalVariableAlreadyDeclared,
    EnumerationNotFound,
    GlobalVariableAlreadyDeclared,
    EnumerationValueAlreadyDeclared,
    EnumerationAlreadyDeclared,
    StructureFieldAlreadyDeclared,
    StructureAlreadyDeclared,
    AnnotationNotFound,
    TypeNotFound,
    StructureNotFound,
    HandleNotFound,
    TypeAliasNotFound,
    FunctionNotFound,
    TypeAliasAlreadyDeclared,
    AnnotationAlreadyDeclared,
    StructureFieldCycle,
    OptimizationMacroFailed,
    OptimizationDidNotConverge,
    Unspecified,
}

impl CompilationErrorKind {
    /// Unique code identifying the class of errors.
    pub fn code(&self) -> &'static str {
        use CompilationErrorKind::*;
        match self {
            SyntaxError => "E0001",
            ModuleNotFound => "E0002",
            ArgumentAlreadyDeclared => "E0003",
            InvalidAnnotation => "E0004",
            FunctionAlreadyDeclared => "E0005",
            CantPipe => "E0006",
            LocalVariableAlreadyDeclared => "E0007",
            EnumerationNotFound => "E0008",
            GlobalVariableAlreadyDeclared => "E0009",
            EnumerationValueAlreadyDeclared => "E0010",
            EnumerationAlreadyDeclared => "E0011",
            StructureFieldAlreadyDeclared => "E0012",
            StructureAlreadyDeclared => "E0013",
            AnnotationNotFound => "E0014",
            TypeNotFound => "E0015",
            StructureNotFound => "E0016",
            HandleNotFound => "E0017",
            TypeAliasNotFound => "E0018",
            FunctionNotFound => "E0019",
            TypeAliasAlreadyDeclared => "E0020",
            AnnotationAlreadyDeclared => "E0021",
            StructureFieldCycle => "E0022",
            OptimizationMacroFailed => "E0023",
            OptimizationDidNotConverge => "E0024",
            Unspecified => "E0099",
        }
    }
}

/// Kinds of named declarations, used for phrasing diagnostics.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Structure,
    Handle,
    Enumeration,
    Alias,
    Annotation,
    Function,
    Variable,
}

impl DeclarationKind {
    pub fn text(&self) -> &'static str {
        match self {
            DeclarationKind::Structure => "structure",
            DeclarationKind::Handle => "handled type",
            DeclarationKind::Enumeration => "enumeration",
            DeclarationKind::Alias => "type alias",
            DeclarationKind::Annotation => "annotation",
            DeclarationKind::Function => "function",
            DeclarationKind::Variable => "variable",
        }
    }
}

pub use kinds::constructors::*;

impl CompilationError {
    /// Creates a new compilation error.
    ///
    /// Constructor functions from `kinds` are preferred. This one backs `Program::error`, which
    /// callers use when they phrase the message themselves.
    pub fn new(kind: CompilationErrorKind, message: impl Into<String>) -> CompilationError {
        CompilationError {
            kind,
            message: message.into(),
            extra: None,
            fixme: None,
            location: None,
            subtitle: None,
            bound_notes: Vec::new(),
            free_notes: Vec::new(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Annotates an error with a location in source code which refers to the primary cause.
    ///
    /// Builtin locations carry no information and are dropped.
    pub fn with_location(self, location: InputSpan) -> CompilationError {
        let location = if location.is_builtin() {
            None
        } else {
            Some(location)
        };
        CompilationError { location, ..self }
    }

    /// Annotates an error with a subtitle to be displayed next to the primary cause location.
    pub fn with_subtitle(self, subtitle: impl Into<String>) -> CompilationError {
        CompilationError {
            subtitle: Some(subtitle.into()),
            ..self
        }
    }

    pub fn with_extra(self, extra: impl Into<String>) -> CompilationError {
        let extra = extra.into();
        CompilationError {
            extra: if extra.is_empty() { None } else { Some(extra) },
            ..self
        }
    }

    pub fn with_fixme(self, fixme: impl Into<String>) -> CompilationError {
        let fixme = fixme.into();
        CompilationError {
            fixme: if fixme.is_empty() { None } else { Some(fixme) },
            ..self
        }
    }

    /// Annotates an error with a note referring to an auxiliary location in code.
    pub fn with_bound_note(mut self, location: InputSpan, note: impl Into<String>) -> CompilationError {
        if !location.is_builtin() {
            self.bound_notes.push((location, note.into()));
        }
        self
    }

    /// Annotates an error with a note only when `location` is present.
    pub fn maybe_with_bound_note<N: Into<String>>(
        self,
        location: Option<InputSpan>,
        note: impl FnOnce() -> N,
    ) -> CompilationError {
        if let Some(location) = location {
            self.with_bound_note(location, note())
        } else {
            self
        }
    }

    /// Annotates an error with a note that cannot be linked to source code in a meaningful way.
    pub fn with_free_note(mut self, note: impl Into<String>) -> CompilationError {
        self.free_notes.push(note.into());
        self
    }

    /// Builds a `codespan_reporting` diagnostic that can be used for displaying the error.
    ///
    /// `file_id` maps source file indices (see `InputSpanFile::Source`) to the ids of the
    /// `codespan_reporting` file database.
    pub fn to_codespan<I: Copy>(&self, file_id: impl Fn(usize) -> I) -> Diagnostic<I> {
        let mut labels = Vec::new();

        if let Some(ref location) = self.location {
            if let InputSpanFile::Source(file) = location.file {
                let label = Label::primary(file_id(file), location.start..location.end);
                labels.push(match self.subtitle {
                    Some(ref subtitle) => label.with_message(subtitle),
                    None => label,
                });
            }
        }

        for (location, note) in &self.bound_notes {
            if let InputSpanFile::Source(file) = location.file {
                labels.push(
                    Label::secondary(file_id(file), location.start..location.end)
                        .with_message(note),
                );
            }
        }

        let mut notes = Vec::new();
        if let Some(ref extra) = self.extra {
            notes.push(extra.clone());
        }
        if let Some(ref fixme) = self.fixme {
            notes.push(format!("fixme: {}", fixme));
        }
        notes.extend(self.free_notes.iter().cloned());

        Diagnostic::error()
            .with_code(self.code())
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(notes)
    }
}

impl Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code(), self.message)?;
        if let Some(ref location) = self.location {
            write!(f, " at {}", location)?;
        }
        if let Some(ref extra) = self.extra {
            write!(f, "\n{}", extra)?;
        }
        if let Some(ref fixme) = self.fixme {
            write!(f, "\nfixme: {}", fixme)?;
        }
        Ok(())
    }
}

/// Formats a list of candidates for an ambiguous lookup.
fn candidates_note(kind: DeclarationKind, candidates: &[String]) -> String {
    let mut note = format!("candidate {}s are:", kind.text());
    for candidate in candidates {
        note.push_str("\n    ");
        note.push_str(candidate);
    }
    note
}
