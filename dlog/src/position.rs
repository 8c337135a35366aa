//! 槽位偏移计算
//!
//! 槽位定宽，偏移量 = 数据区起点 + (index mod capacity) * SLOT_WIDTH，
//! 回绕到 0 不需要特殊处理。

use crate::constants::SLOT_WIDTH;

/// 槽位的绝对字节偏移
pub fn slot_offset(body_start: u64, index: u32, capacity: u32) -> u64 {
    body_start + (index % capacity) as u64 * SLOT_WIDTH
}

/// 环上的下一个索引
pub fn advance(index: u32, capacity: u32) -> u32 {
    ((index as u64 + 1) % capacity as u64) as u32
}

/// `capacity` 个槽位占用的字节数
pub fn body_len(capacity: u32) -> u64 {
    capacity as u64 * SLOT_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_offset() {
        assert_eq!(slot_offset(100, 0, 3), 100);
        assert_eq!(slot_offset(100, 1, 3), 100 + SLOT_WIDTH);
        assert_eq!(slot_offset(100, 2, 3), 100 + 2 * SLOT_WIDTH);
        // 回绕
        assert_eq!(slot_offset(100, 3, 3), 100);
        assert_eq!(slot_offset(100, 7, 3), 100 + SLOT_WIDTH);
    }

    #[test]
    fn test_advance_wraps() {
        assert_eq!(advance(0, 3), 1);
        assert_eq!(advance(2, 3), 0);
        assert_eq!(advance(0, 1), 0);
        assert_eq!(advance(u32::MAX - 1, u32::MAX), 0);
    }

    #[test]
    fn test_body_len() {
        assert_eq!(body_len(0), 0);
        assert_eq!(body_len(20), 20 * 81);
    }
}
