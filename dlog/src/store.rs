//! 日志文件的打开与创建

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{DEFAULT_NAME, LINE_MAX, LOG_EXT, PREALLOC_BATCH};
use crate::error::{DlogError, Result};
use crate::header::{self, Cursors, HeaderLayout};
use crate::ledger::{FileLedger, Ledger};

/// 解析日志文件名：空名使用默认名，没有 `.log` 扩展名时追加
pub fn resolve_log_path<P: AsRef<Path>>(name: P) -> PathBuf {
    let name = name.as_ref();
    if name.as_os_str().is_empty() {
        return PathBuf::from(format!("{}.{}", DEFAULT_NAME, LOG_EXT));
    }
    if name.extension().is_some_and(|ext| ext == LOG_EXT) {
        return name.to_path_buf();
    }
    let mut os = name.as_os_str().to_os_string();
    os.push(".");
    os.push(LOG_EXT);
    PathBuf::from(os)
}

/// 打开已有文件
///
/// 文件不存在或长度为 0 时返回 `None`，由调用方重新创建。
pub fn open_existing(path: &Path, sync_data: bool) -> Result<Option<FileLedger>> {
    let file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(DlogError::Filesystem {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let mut ledger = FileLedger::new(file, sync_data);
    let len = ledger.len().map_err(|e| DlogError::Filesystem {
        path: path.to_path_buf(),
        source: e,
    })?;
    if len == 0 {
        debug!("{} is empty, will be recreated", path.display());
        return Ok(None);
    }

    Ok(Some(ledger))
}

/// 创建新文件并预分配全部槽位
pub fn create_new(path: &Path, capacity: u32, filler: u8, sync_data: bool) -> Result<FileLedger> {
    let fs_err = |e: io::Error| DlogError::Filesystem {
        path: path.to_path_buf(),
        source: e,
    };

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(fs_err)?;

    let mut ledger = FileLedger::new(file, sync_data);
    format(&mut ledger, capacity, filler).map_err(fs_err)?;
    Ok(ledger)
}

/// 写入全零头部、分隔行和 `capacity` 个填充槽位
///
/// 预分配之后 put 只在已有范围内原位写，不会再扩展文件。
pub fn format<L: Ledger>(ledger: &mut L, capacity: u32, filler: u8) -> io::Result<()> {
    let head = header::render(HeaderLayout::Sized, capacity, &Cursors::default());
    ledger.write_at(0, &head)?;

    let mut slot = vec![filler; LINE_MAX];
    slot.push(b'\n');

    let mut offset = head.len() as u64;
    let mut remaining = capacity;
    while remaining > 0 {
        let batch = remaining.min(PREALLOC_BATCH);
        let chunk = slot.repeat(batch as usize);
        ledger.write_at(offset, &chunk)?;
        offset += chunk.len() as u64;
        remaining -= batch;
    }

    ledger.flush()
}
