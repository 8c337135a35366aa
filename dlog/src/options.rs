//! 选项位掩码

/// 写入后用填充字符清除槽位中残留的旧字符
pub const OPT_AUTO_CLEAR: u8 = 1 << 0;
/// 写满后覆盖最旧的消息
pub const OPT_OVERWRITE: u8 = 1 << 1;
/// 完整性校验（保留，尚未实现）
pub const OPT_INTEGRITY_CHECK: u8 = 1 << 2;

pub const OPT_ALL: u8 = OPT_AUTO_CLEAR | OPT_OVERWRITE | OPT_INTEGRITY_CHECK;
pub const OPT_DEFAULT_ON: u8 = OPT_AUTO_CLEAR | OPT_OVERWRITE;

/// 选项开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub auto_clear: bool,
    pub overwrite: bool,
    pub integrity_check: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_mask(OPT_DEFAULT_ON)
    }
}

impl Options {
    pub fn from_mask(mask: u8) -> Self {
        Self {
            auto_clear: mask & OPT_AUTO_CLEAR != 0,
            overwrite: mask & OPT_OVERWRITE != 0,
            integrity_check: mask & OPT_INTEGRITY_CHECK != 0,
        }
    }

    pub fn mask(&self) -> u8 {
        let mut mask = 0;
        if self.auto_clear {
            mask |= OPT_AUTO_CLEAR;
        }
        if self.overwrite {
            mask |= OPT_OVERWRITE;
        }
        if self.integrity_check {
            mask |= OPT_INTEGRITY_CHECK;
        }
        mask
    }

    /// 按掩码设置开关，调用方负责校验掩码
    pub fn apply(&mut self, mask: u8, enabled: bool) {
        if mask & OPT_AUTO_CLEAR != 0 {
            self.auto_clear = enabled;
        }
        if mask & OPT_OVERWRITE != 0 {
            self.overwrite = enabled;
        }
        if mask & OPT_INTEGRITY_CHECK != 0 {
            self.integrity_check = enabled;
        }
    }
}

impl std::fmt::Display for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let on_off = |b: bool| if b { "on" } else { "off" };
        write!(
            f,
            "auto_clear={} overwrite={} integrity_check={}",
            on_off(self.auto_clear),
            on_off(self.overwrite),
            on_off(self.integrity_check)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert!(opts.auto_clear);
        assert!(opts.overwrite);
        assert!(!opts.integrity_check);
        assert_eq!(opts.mask(), OPT_DEFAULT_ON);
    }

    #[test]
    fn test_apply_mask() {
        let mut opts = Options::default();
        opts.apply(OPT_OVERWRITE, false);
        assert!(!opts.overwrite);
        assert!(opts.auto_clear);

        opts.apply(OPT_ALL, true);
        assert_eq!(opts.mask(), OPT_ALL);

        opts.apply(OPT_AUTO_CLEAR | OPT_INTEGRITY_CHECK, false);
        assert_eq!(opts.mask(), OPT_OVERWRITE);
    }
}
