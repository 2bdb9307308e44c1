use crate::lexer::Position;

/// Everything that can go wrong between source text and a finished run.
///
/// Each variant pairs a human-readable message with the source position it
/// refers to. The pipeline stops at the first error; nothing downstream of
/// a failed stage runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("syntax error at {pos}: {message}")]
    Syntax { message: String, pos: Position },

    #[error("reference error at {pos}: {message}")]
    Reference { message: String, pos: Position },

    #[error("type mismatch at {pos}: {message}")]
    TypeMismatch { message: String, pos: Position },

    #[error("runtime error at {pos}: {message}")]
    Runtime { message: String, pos: Position },
}

/// Discriminant of [`Error`], for callers that dispatch on the category
/// without caring about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Reference,
    TypeMismatch,
    Runtime,
}

impl Error {
    pub fn syntax(message: impl Into<String>, pos: Position) -> Self {
        Error::Syntax {
            message: message.into(),
            pos,
        }
    }

    pub fn reference(message: impl Into<String>, pos: Position) -> Self {
        Error::Reference {
            message: message.into(),
            pos,
        }
    }

    pub fn type_mismatch(message: impl Into<String>, pos: Position) -> Self {
        Error::TypeMismatch {
            message: message.into(),
            pos,
        }
    }

    pub fn runtime(message: impl Into<String>, pos: Position) -> Self {
        Error::Runtime {
            message: message.into(),
            pos,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::Reference { .. } => ErrorKind::Reference,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Runtime { .. } => ErrorKind::Runtime,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Error::Syntax { pos, .. }
            | Error::Reference { pos, .. }
            | Error::TypeMismatch { pos, .. }
            | Error::Runtime { pos, .. } => *pos,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Syntax { message, .. }
            | Error::Reference { message, .. }
            | Error::TypeMismatch { message, .. }
            | Error::Runtime { message, .. } => message,
        }
    }
}
