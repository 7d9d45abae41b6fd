use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn type_mismatch(field: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::TypeMismatch {
                field: field.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn empty_struct() -> Error {
        Error(ErrorKind::EmptyStruct.into())
    }

    pub fn out_of_range(start: usize, len: usize, bound: usize) -> Error {
        Error(ErrorKind::OutOfRange { start, len, bound }.into())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, len }.into())
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::TypeMismatch { .. })
    }

    pub fn is_empty_struct(&self) -> bool {
        matches!(self.kind(), ErrorKind::EmptyStruct)
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::OutOfRange { .. })
    }

    pub fn is_index_out_of_range(&self) -> bool {
        matches!(self.kind(), ErrorKind::IndexOutOfRange { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("type mismatch for field '{field}': {message}")]
    TypeMismatch { field: String, message: String },

    #[error("cannot flatten a struct with no fields")]
    EmptyStruct,

    #[error("slice {start}..{start}+{len} is out of range for length {bound}")]
    OutOfRange {
        start: usize,
        len: usize,
        bound: usize,
    },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
