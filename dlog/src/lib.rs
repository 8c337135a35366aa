//! dlog - 嵌入式持久化 FIFO 消息日志
//!
//! 特性：
//! - 单个文本文件，无需数据库
//! - 固定容量环形队列，写满后可覆盖最旧消息
//! - 定宽槽位，按索引直接计算偏移
//! - 读写游标持久化在文件头，重启后继续
//!
//! # 示例
//!
//! ```rust,no_run
//! use dlog::DLog;
//!
//! let mut log = DLog::open("mylog", 20).unwrap();
//! log.put("hello").unwrap();
//! assert_eq!(log.get_message().unwrap(), "hello");
//! log.close().unwrap();
//! ```

pub mod config;
pub mod constants;
pub mod dlog;
pub mod error;
pub mod header;
pub mod ledger;
pub mod options;
pub mod position;
pub mod store;


pub use config::DlogConfig;
pub use constants::LINE_MAX;
pub use dlog::{DLog, DlogStats, QueueState};
pub use error::{DlogError, Result, Status};
pub use header::{Cursors, HeaderLayout};
pub use ledger::{FileLedger, Ledger, MemLedger};
pub use options::{Options, OPT_ALL, OPT_AUTO_CLEAR, OPT_INTEGRITY_CHECK, OPT_OVERWRITE};
