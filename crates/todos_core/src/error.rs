use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{} - {}", self.code(), self.message())]
    NotFound(u32),
    #[error("{} - {}", self.code(), self.message())]
    InvalidStatus(String),
    #[error("{} - {}", self.code(), self.message())]
    InvalidFormat(String),
    #[error("{} - {}", self.code(), self.message())]
    InvalidInput(String),
    #[error("{} - {}", self.code(), self.message())]
    InvalidData(String),
    #[error("{} - {}", self.code(), self.message())]
    Io(String),
}

impl AppError {
    pub fn invalid_status<M: Into<String>>(input: M) -> Self {
        Self::InvalidStatus(input.into())
    }

    pub fn invalid_format<M: Into<String>>(message: M) -> Self {
        Self::InvalidFormat(message.into())
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidStatus(_) => "invalid_status",
            Self::InvalidFormat(_) => "invalid_format",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::NotFound(id) => format!("task {id} not found"),
            Self::InvalidStatus(input) => format!("invalid status: {input}"),
            Self::InvalidFormat(message)
            | Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message) => message.clone(),
        }
    }
}
