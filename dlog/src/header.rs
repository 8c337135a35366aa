//! 文件头
//!
//! 每个计数器占一行，格式固定为 `name: NNNNNNNNNN\n`（10 位十进制，补零），
//! 之后是数据区起始分隔行：
//! ```text
//! size: 0000000020        <- Sized 布局才有
//! count: 0000000003
//! tail: 0000000005
//! head: 0000000002
//! ########### LOG BEGIN #############
//! msg;.............................
//! ```
//! 旧版文件（Legacy）没有 `size` 行，容量由调用方给出。

use tracing::warn;

use crate::constants::{
    FIELD_COUNT, FIELD_DIGITS, FIELD_HEAD, FIELD_SIZE, FIELD_TAIL, LOG_BEGIN_LINE,
    LOG_BEGIN_MARKER, SCAN_CHUNK, SLOT_WIDTH,
};
use crate::error::{DlogError, Result};
use crate::ledger::Ledger;

/// 头部布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// size + count + tail + head
    Sized,
    /// count + tail + head
    Legacy,
}

impl HeaderLayout {
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            HeaderLayout::Sized => &[FIELD_SIZE, FIELD_COUNT, FIELD_TAIL, FIELD_HEAD],
            HeaderLayout::Legacy => &[FIELD_COUNT, FIELD_TAIL, FIELD_HEAD],
        }
    }
}

impl std::fmt::Display for HeaderLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderLayout::Sized => write!(f, "sized"),
            HeaderLayout::Legacy => write!(f, "legacy"),
        }
    }
}

/// 读写游标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursors {
    pub count: u32,
    pub tail: u32,
    pub head: u32,
}

/// 打开时扫描得到的文件结构
#[derive(Debug, Clone)]
pub struct HeaderMap {
    pub layout: HeaderLayout,
    pub size_at: Option<u64>,
    pub count_at: u64,
    pub tail_at: u64,
    pub head_at: u64,
    pub body_start: u64,
    /// 数据区换行符个数，即可用槽位数
    pub body_lines: u64,
    pub file_len: u64,
}

/// 单行字段文本
pub fn field_line(name: &str, value: u64) -> String {
    format!("{}: {:0width$}\n", name, value, width = FIELD_DIGITS)
}

fn field_line_len(name: &str) -> usize {
    name.len() + 2 + FIELD_DIGITS + 1
}

/// 生成完整的头部（含分隔行）
pub fn render(layout: HeaderLayout, capacity: u32, cursors: &Cursors) -> Vec<u8> {
    let mut out = String::new();
    for &name in layout.fields() {
        let value = match name {
            FIELD_SIZE => capacity,
            FIELD_COUNT => cursors.count,
            FIELD_TAIL => cursors.tail,
            _ => cursors.head,
        };
        out.push_str(&field_line(name, value as u64));
    }
    out.push_str(LOG_BEGIN_LINE);
    out.push('\n');
    out.into_bytes()
}

fn detect_layout<L: Ledger>(ledger: &mut L) -> Result<HeaderLayout> {
    let mut first = [0u8; 8];
    let n = ledger.read_at(0, &mut first)?;
    let first = &first[..n];
    if first.starts_with(format!("{}:", FIELD_SIZE).as_bytes()) {
        Ok(HeaderLayout::Sized)
    } else if first.starts_with(format!("{}:", FIELD_COUNT).as_bytes()) {
        Ok(HeaderLayout::Legacy)
    } else {
        Err(DlogError::Corrupt("unrecognized header".into()))
    }
}

/// 线性扫描整个文件，定位各头部字段和数据区起点
///
/// 代价与文件大小成正比，只在打开时执行一次。顺带统计数据区行数，
/// 并检查每个换行符都落在槽位边界上。
pub fn scan_layout<L: Ledger>(ledger: &mut L) -> Result<HeaderMap> {
    let file_len = ledger.len()?;
    let layout = detect_layout(ledger)?;
    let marker_line = layout.fields().len();

    // line_starts[i] 为第 i 行的起始偏移，收集到数据区第一行为止
    let mut line_starts: Vec<u64> = vec![0];
    let mut body_start: Option<u64> = None;
    let mut body_lines = 0u64;
    let mut misaligned = 0u64;

    let mut chunk = vec![0u8; SCAN_CHUNK];
    let mut offset = 0u64;
    loop {
        let n = ledger.read_at(offset, &mut chunk)?;
        if n == 0 {
            break;
        }
        for (i, &b) in chunk[..n].iter().enumerate() {
            if b != b'\n' {
                continue;
            }
            let next = offset + i as u64 + 1;
            match body_start {
                Some(start) => {
                    body_lines += 1;
                    if (next - start) % SLOT_WIDTH != 0 {
                        misaligned += 1;
                    }
                }
                None => {
                    line_starts.push(next);
                    if line_starts.len() == marker_line + 2 {
                        body_start = Some(next);
                    }
                }
            }
        }
        offset += n as u64;
    }

    let body_start = body_start
        .ok_or_else(|| DlogError::Corrupt("header is incomplete, no body found".into()))?;

    // 分隔行不得长于标准分隔行
    let marker_at = line_starts[marker_line];
    let marker_len = (body_start - marker_at) as usize;
    if marker_len > LOG_BEGIN_LINE.len() + 1 {
        return Err(DlogError::Corrupt(format!(
            "separator line is {} bytes, expected at most {}",
            marker_len,
            LOG_BEGIN_LINE.len() + 1
        )));
    }
    let mut marker = vec![0u8; marker_len];
    let n = ledger.read_at(marker_at, &mut marker)?;
    if !String::from_utf8_lossy(&marker[..n]).contains(LOG_BEGIN_MARKER) {
        return Err(DlogError::Corrupt("missing LOG BEGIN separator".into()));
    }

    // 末尾不完整的槽位
    if (file_len - body_start) % SLOT_WIDTH != 0 {
        misaligned += 1;
    }
    if misaligned > 0 {
        return Err(DlogError::Corrupt(format!(
            "{} body lines are not aligned to {}-byte slots",
            misaligned, SLOT_WIDTH
        )));
    }

    let (size_at, rest) = match layout {
        HeaderLayout::Sized => (Some(line_starts[0]), &line_starts[1..]),
        HeaderLayout::Legacy => (None, &line_starts[..]),
    };

    Ok(HeaderMap {
        layout,
        size_at,
        count_at: rest[0],
        tail_at: rest[1],
        head_at: rest[2],
        body_start,
        body_lines,
        file_len,
    })
}

/// 读取并解析一个字段行
pub fn read_field<L: Ledger>(ledger: &mut L, offset: u64, name: &str) -> Result<u64> {
    let len = field_line_len(name);
    let mut buf = vec![0u8; len];
    let n = ledger.read_at(offset, &mut buf)?;

    let bad = || DlogError::Corrupt(format!("cannot parse '{}' field at offset {}", name, offset));

    if n < len {
        return Err(bad());
    }
    let prefix = format!("{}: ", name);
    if !buf.starts_with(prefix.as_bytes()) || buf[len - 1] != b'\n' {
        return Err(bad());
    }
    let digits = &buf[prefix.len()..len - 1];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(bad());
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(bad)
}

/// 读取 Sized 布局中记录的容量
pub fn read_size<L: Ledger>(ledger: &mut L, map: &HeaderMap) -> Result<Option<u32>> {
    let Some(at) = map.size_at else {
        return Ok(None);
    };
    let size = read_field(ledger, at, FIELD_SIZE)?;
    u32::try_from(size)
        .map(Some)
        .map_err(|_| DlogError::Corrupt(format!("size {} out of range", size)))
}

/// 读取游标
///
/// 超出容量的值清零；清零后仍不一致则视为空队列。
pub fn read_header<L: Ledger>(ledger: &mut L, map: &HeaderMap, capacity: u32) -> Result<Cursors> {
    let cap = capacity as u64;
    let mut count = read_field(ledger, map.count_at, FIELD_COUNT)?;
    let mut tail = read_field(ledger, map.tail_at, FIELD_TAIL)?;
    let mut head = read_field(ledger, map.head_at, FIELD_HEAD)?;

    if count > cap {
        warn!("header count {} exceeds capacity {}, reset to 0", count, cap);
        count = 0;
    }
    if tail >= cap {
        warn!("header tail {} out of range (capacity {}), reset to 0", tail, cap);
        tail = 0;
    }
    if head >= cap {
        warn!("header head {} out of range (capacity {}), reset to 0", head, cap);
        head = 0;
    }

    let consistent = if count == 0 || count == cap {
        head == tail
    } else {
        (tail + cap - head) % cap == count
    };
    if !consistent {
        warn!(
            "inconsistent header (count={}, head={}, tail={}), treating log as empty",
            count, head, tail
        );
        count = 0;
        head = tail;
    }

    Ok(Cursors {
        count: count as u32,
        tail: tail as u32,
        head: head as u32,
    })
}

/// 原位重写全部字段
pub fn update_header<L: Ledger>(
    ledger: &mut L,
    map: &HeaderMap,
    capacity: u32,
    cursors: &Cursors,
) -> std::io::Result<()> {
    if let Some(at) = map.size_at {
        ledger.write_at(at, field_line(FIELD_SIZE, capacity as u64).as_bytes())?;
    }
    ledger.write_at(map.count_at, field_line(FIELD_COUNT, cursors.count as u64).as_bytes())?;
    ledger.write_at(map.tail_at, field_line(FIELD_TAIL, cursors.tail as u64).as_bytes())?;
    ledger.write_at(map.head_at, field_line(FIELD_HEAD, cursors.head as u64).as_bytes())?;
    Ok(())
}
