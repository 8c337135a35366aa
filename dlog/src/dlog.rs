//! 环形日志核心
//!
//! 状态只有三种：空（count=0）、部分（0<count<capacity）、满（count=capacity），
//! 只由 put/get 驱动转换。每次 put/get 成功后都会原位重写头部并强制刷新，
//! 头部始终反映最后一次完成的调用。

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::DlogConfig;
use crate::constants::LINE_MAX;
use crate::error::{DlogError, Result};
use crate::header::{self, Cursors, HeaderLayout, HeaderMap};
use crate::ledger::{FileLedger, Ledger};
use crate::options::{Options, OPT_ALL};
use crate::position::{advance, slot_offset};
use crate::store::{self, resolve_log_path};

/// 队列状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Empty,
    Partial,
    Full,
}

/// 统计信息
#[derive(Debug, Clone)]
pub struct DlogStats {
    pub capacity: u32,
    pub count: u32,
    pub head: u32,
    pub tail: u32,
    pub layout: HeaderLayout,
    pub body_start: u64,
    pub file_len: u64,
    pub options: Options,
}

impl std::fmt::Display for DlogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dlog Statistics:")?;
        writeln!(f, "  Layout: {}", self.layout)?;
        writeln!(
            f,
            "  Messages: {} / {} ({:.1}%)",
            self.count,
            self.capacity,
            self.count as f64 / self.capacity as f64 * 100.0
        )?;
        writeln!(f, "  Head: {}  Tail: {}", self.head, self.tail)?;
        writeln!(f, "  Body start: {}", self.body_start)?;
        writeln!(
            f,
            "  File size: {} bytes ({:.1} KB)",
            self.file_len,
            self.file_len as f64 / 1024.0
        )?;
        writeln!(f, "  Options: {}", self.options)?;
        Ok(())
    }
}

/// 持久化环形消息日志
#[derive(Debug)]
pub struct DLog<L: Ledger = FileLedger> {
    path: Option<PathBuf>,
    ledger: L,
    map: HeaderMap,
    capacity: u32,
    cursors: Cursors,
    options: Options,
    terminator: u8,
    filler: u8,
    head_pos: u64,
    tail_pos: u64,
}

impl DLog<FileLedger> {
    /// 打开或创建日志文件，使用默认选项
    pub fn open<P: AsRef<Path>>(name: P, capacity: u32) -> Result<Self> {
        Self::open_with(&DlogConfig::new(name, capacity))
    }

    /// 按配置打开或创建日志文件
    pub fn open_with(config: &DlogConfig) -> Result<Self> {
        config.validate()?;
        let path = resolve_log_path(&config.path);

        let ledger = match store::open_existing(&path, config.sync_data)? {
            Some(ledger) => {
                info!("dlog: resuming {}", path.display());
                ledger
            }
            None => {
                info!(
                    "dlog: creating {} ({} slots)",
                    path.display(),
                    config.capacity
                );
                store::create_new(&path, config.capacity, config.filler_byte(), config.sync_data)?
            }
        };

        let mut log = Self::attach(ledger, config)?;
        log.path = Some(path);
        Ok(log)
    }
}

impl<L: Ledger> DLog<L> {
    /// 在任意账本上打开日志，空账本会先格式化
    pub fn from_ledger(mut ledger: L, config: &DlogConfig) -> Result<Self> {
        config.validate()?;
        if ledger.len()? == 0 {
            store::format(&mut ledger, config.capacity, config.filler_byte())?;
        }
        Self::attach(ledger, config)
    }

    fn attach(mut ledger: L, config: &DlogConfig) -> Result<Self> {
        let map = header::scan_layout(&mut ledger)?;

        let capacity = match header::read_size(&mut ledger, &map)? {
            Some(0) => return Err(DlogError::Corrupt("stored size is 0".into())),
            Some(size) => {
                if size != config.capacity {
                    warn!(
                        "dlog: file was created with {} slots, ignoring requested capacity {}",
                        size, config.capacity
                    );
                }
                size
            }
            None => config.capacity,
        };

        if map.body_lines < capacity as u64 {
            return Err(DlogError::Corrupt(format!(
                "body holds {} slots, capacity is {}",
                map.body_lines, capacity
            )));
        }

        let cursors = header::read_header(&mut ledger, &map, capacity)?;
        let options = config.options();
        if options.integrity_check {
            warn!("dlog: integrity check is reserved and not implemented");
        }

        let mut log = Self {
            path: None,
            ledger,
            map,
            capacity,
            cursors,
            options,
            terminator: config.terminator_byte(),
            filler: config.filler_byte(),
            head_pos: 0,
            tail_pos: 0,
        };
        log.refresh_positions();

        debug!(
            "dlog: opened {} layout, capacity={} count={} head={} tail={}",
            log.map.layout, capacity, cursors.count, cursors.head, cursors.tail
        );
        Ok(log)
    }

    fn refresh_positions(&mut self) {
        self.head_pos = slot_offset(self.map.body_start, self.cursors.head, self.capacity);
        self.tail_pos = slot_offset(self.map.body_start, self.cursors.tail, self.capacity);
    }

    /// 设置选项开关
    pub fn set_option(&mut self, mask: u8, enabled: bool) -> Result<()> {
        if mask == 0 || mask & !OPT_ALL != 0 {
            return Err(DlogError::BadParam(format!("invalid option mask {:#04x}", mask)));
        }
        self.options.apply(mask, enabled);
        if self.options.integrity_check {
            warn!("dlog: integrity check is reserved and not implemented");
        }
        debug!("dlog: options now {}", self.options);
        Ok(())
    }

    /// 写入一条消息
    ///
    /// 消息长度必须小于 `LINE_MAX`，且不能包含结束符或换行符。
    /// 队列已满时，开启覆盖则丢弃最旧的一条，否则返回 `FullQueue`。
    pub fn put(&mut self, msg: &str) -> Result<()> {
        let bytes = msg.as_bytes();
        if bytes.len() >= LINE_MAX {
            return Err(DlogError::MsgSize {
                len: bytes.len(),
                max: LINE_MAX - 1,
            });
        }
        if let Some(&byte) = bytes
            .iter()
            .find(|&&b| b == self.terminator || b == b'\n')
        {
            return Err(DlogError::ReservedByte { byte });
        }

        // 必须用写入前的状态判断是否覆盖
        let was_full = self.is_full();
        if was_full && !self.options.overwrite {
            return Err(DlogError::FullQueue);
        }

        let mut slot = Vec::with_capacity(LINE_MAX);
        slot.extend_from_slice(bytes);
        slot.push(self.terminator);
        if self.options.auto_clear {
            slot.resize(LINE_MAX, self.filler);
        }
        self.ledger.write_at(self.tail_pos, &slot)?;

        let mut next = self.cursors;
        if was_full {
            debug!("dlog: overwriting oldest message in slot {}", next.head);
            next.head = advance(next.head, self.capacity);
        }
        next.tail = advance(next.tail, self.capacity);
        if next.count < self.capacity {
            next.count += 1;
        }

        self.persist(next)
    }

    /// 读取最旧的一条消息到 `buf`，返回拷贝的字节数
    ///
    /// 遇到结束符、内容区结束或 `buf` 写满时停止。读过的槽位不清除。
    pub fn get(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.is_empty() {
            return Err(DlogError::EmptyQueue);
        }
        if buf.is_empty() {
            return Err(DlogError::BadParam("output buffer is empty".into()));
        }

        let mut slot = [0u8; LINE_MAX];
        let n = self.ledger.read_at(self.head_pos, &mut slot)?;
        let content = &slot[..n];
        let len = content
            .iter()
            .position(|&b| b == self.terminator)
            .unwrap_or(content.len());
        let copied = len.min(buf.len());
        buf[..copied].copy_from_slice(&content[..copied]);

        let next = Cursors {
            count: self.cursors.count - 1,
            tail: self.cursors.tail,
            head: advance(self.cursors.head, self.capacity),
        };
        self.persist(next)?;
        Ok(copied)
    }

    /// 读取最旧的一条消息
    pub fn get_message(&mut self) -> Result<String> {
        let mut buf = [0u8; LINE_MAX];
        let n = self.get(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
    }

    /// 重写头部并刷新，成功后才更新内存中的游标
    ///
    /// 写入或刷新失败时把头部恢复为当前游标，文件与内存保持一致。
    /// 覆盖写入的槽位内容不会恢复。
    fn persist(&mut self, next: Cursors) -> Result<()> {
        let written = header::update_header(&mut self.ledger, &self.map, self.capacity, &next)
            .and_then(|()| self.ledger.flush());
        if let Err(e) = written {
            warn!("dlog: header update failed ({}), restoring previous cursors", e);
            if let Err(restore) =
                header::update_header(&mut self.ledger, &self.map, self.capacity, &self.cursors)
            {
                warn!("dlog: restoring header failed: {}", restore);
            }
            return Err(e.into());
        }
        self.cursors = next;
        self.refresh_positions();
        Ok(())
    }

    /// 关闭日志，释放文件句柄
    pub fn close(mut self) -> Result<()> {
        self.ledger.flush()?;
        debug!(
            "dlog: closed with {} of {} messages pending",
            self.cursors.count, self.capacity
        );
        Ok(())
    }

    pub fn len(&self) -> u32 {
        self.cursors.count
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.cursors.count == self.capacity
    }

    pub fn state(&self) -> QueueState {
        if self.is_empty() {
            QueueState::Empty
        } else if self.is_full() {
            QueueState::Full
        } else {
            QueueState::Partial
        }
    }

    pub fn cursors(&self) -> Cursors {
        self.cursors
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn layout(&self) -> HeaderLayout {
        self.map.layout
    }

    /// 文件路径，内存账本为 `None`
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    pub fn stats(&self) -> DlogStats {
        DlogStats {
            capacity: self.capacity,
            count: self.cursors.count,
            head: self.cursors.head,
            tail: self.cursors.tail,
            layout: self.map.layout,
            body_start: self.map.body_start,
            file_len: self.map.file_len,
            options: self.options,
        }
    }
}
