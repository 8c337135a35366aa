//! 随机访问存储
//!
//! 环形缓冲区状态机只通过偏移量读写，不关心底层是文件还是内存。

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// 按绝对偏移读写的字节账本
pub trait Ledger {
    /// 当前总长度
    fn len(&mut self) -> io::Result<u64>;

    /// 从 `offset` 读取，返回实际读取的字节数（到末尾时可能少于 `buf.len()`）
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// 在 `offset` 写入全部数据
    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()>;

    /// 强制刷新
    fn flush(&mut self) -> io::Result<()>;
}

/// 文件实现
#[derive(Debug)]
pub struct FileLedger {
    file: File,
    sync_data: bool,
}

impl FileLedger {
    pub fn new(file: File, sync_data: bool) -> Self {
        Self { file, sync_data }
    }
}

impl Ledger for FileLedger {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.sync_data {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

/// 内存实现，写越界时自动扩展
#[derive(Debug, Default, Clone)]
pub struct MemLedger {
    buf: Vec<u8>,
}

impl MemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Ledger for MemLedger {
    fn len(&mut self) -> io::Result<u64> {
        Ok(self.buf.len() as u64)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = (offset as usize).min(self.buf.len());
        let n = buf.len().min(self.buf.len() - start);
        buf[..n].copy_from_slice(&self.buf[start..start + n]);
        Ok(n)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        let start = offset as usize;
        let end = start + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[start..end].copy_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_ledger_grows_and_reads_short() {
        let mut ledger = MemLedger::new();
        ledger.write_at(4, b"abc").unwrap();
        assert_eq!(ledger.len().unwrap(), 7);
        assert_eq!(ledger.as_bytes(), b"\0\0\0\0abc");

        let mut buf = [0u8; 8];
        let n = ledger.read_at(5, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"bc");
        assert_eq!(ledger.read_at(100, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_file_ledger_roundtrip() {
        let file = tempfile::tempfile().unwrap();
        let mut ledger = FileLedger::new(file, false);
        ledger.write_at(0, b"hello world").unwrap();
        ledger.write_at(6, b"WORLD").unwrap();
        ledger.flush().unwrap();

        let mut buf = [0u8; 32];
        let n = ledger.read_at(0, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello WORLD");
        assert_eq!(ledger.len().unwrap(), 11);
    }
}
