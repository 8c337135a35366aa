//! 错误类型与状态码

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DlogError>;

/// 日志操作错误
#[derive(Error, Debug)]
pub enum DlogError {
    #[error("queue is empty")]
    EmptyQueue,
    #[error("queue is full")]
    FullQueue,
    #[error("bad parameter: {0}")]
    BadParam(String),
    #[error("message too long: {len} bytes (max {max})")]
    MsgSize { len: usize, max: usize },
    #[error("message contains reserved byte {byte:#04x}")]
    ReservedByte { byte: u8 },
    #[error("corrupt log file: {0}")]
    Corrupt(String),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot open or create {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl DlogError {
    /// 映射为状态码
    pub fn status(&self) -> Status {
        match self {
            DlogError::EmptyQueue => Status::EmptyQueue,
            DlogError::FullQueue => Status::FullQueue,
            DlogError::BadParam(_) | DlogError::ReservedByte { .. } | DlogError::Config(_) => {
                Status::BadParam
            }
            DlogError::MsgSize { .. } => Status::MsgSizeError,
            DlogError::Corrupt(_) | DlogError::Io(_) => Status::InternalError,
            DlogError::Filesystem { .. } => Status::FilesystemError,
        }
    }
}

/// 状态码（数值与 C 版本兼容）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum Status {
    Ok = 1,
    EmptyQueue = 0,
    FullQueue = -1,
    /// 安全 API 不会产生，仅为保持编码兼容
    NullPointer = -2,
    BadParam = -3,
    InternalError = -4,
    FilesystemError = -5,
    MsgSizeError = -6,
}

impl Status {
    pub fn code(self) -> i8 {
        self as i8
    }
}

impl From<i8> for Status {
    fn from(v: i8) -> Self {
        match v {
            1 => Status::Ok,
            0 => Status::EmptyQueue,
            -1 => Status::FullQueue,
            -2 => Status::NullPointer,
            -3 => Status::BadParam,
            -5 => Status::FilesystemError,
            -6 => Status::MsgSizeError,
            _ => Status::InternalError,
        }
    }
}

impl<T> From<&Result<T>> for Status {
    fn from(r: &Result<T>) -> Self {
        match r {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::EmptyQueue => write!(f, "EMPTY_QUEUE"),
            Status::FullQueue => write!(f, "FULL_QUEUE"),
            Status::NullPointer => write!(f, "NULL_PTR"),
            Status::BadParam => write!(f, "BAD_PARAM"),
            Status::InternalError => write!(f, "INTERNAL_ERR"),
            Status::FilesystemError => write!(f, "FILESYSTEM_ERR"),
            Status::MsgSizeError => write!(f, "MSG_SIZE_ERR"),
        }
    }
}
