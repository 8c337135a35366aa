//! 日志配置
//!
//! 可从 JSON 文件加载，缺省字段使用默认值：
//! ```json
//! { "path": "mylog", "capacity": 20, "overwrite": false }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CAPACITY, DEFAULT_FILLER, DEFAULT_NAME, DEFAULT_TERMINATOR};
use crate::error::{DlogError, Result};
use crate::options::Options;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DlogConfig {
    /// 日志文件名，没有 `.log` 扩展名时自动追加
    pub path: PathBuf,
    /// 槽位数
    pub capacity: u32,
    pub auto_clear: bool,
    pub overwrite: bool,
    /// 保留选项
    pub integrity_check: bool,
    /// 消息结束符，必须与创建文件时一致
    pub terminator: char,
    /// 对齐填充字符
    pub filler: char,
    /// 每次 put/get 后调用 fsync
    pub sync_data: bool,
}

impl Default for DlogConfig {
    fn default() -> Self {
        let opts = Options::default();
        Self {
            path: PathBuf::from(DEFAULT_NAME),
            capacity: DEFAULT_CAPACITY,
            auto_clear: opts.auto_clear,
            overwrite: opts.overwrite,
            integrity_check: opts.integrity_check,
            terminator: DEFAULT_TERMINATOR as char,
            filler: DEFAULT_FILLER as char,
            sync_data: true,
        }
    }
}

impl DlogConfig {
    pub fn new<P: AsRef<Path>>(path: P, capacity: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            capacity,
            ..Self::default()
        }
    }

    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| DlogError::Filesystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: DlogConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn options(&self) -> Options {
        Options {
            auto_clear: self.auto_clear,
            overwrite: self.overwrite,
            integrity_check: self.integrity_check,
        }
    }

    pub fn terminator_byte(&self) -> u8 {
        self.terminator as u8
    }

    pub fn filler_byte(&self) -> u8 {
        self.filler as u8
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(DlogError::BadParam("capacity must be at least 1".into()));
        }
        for (name, c) in [("terminator", self.terminator), ("filler", self.filler)] {
            if !c.is_ascii() || c == '\n' {
                return Err(DlogError::BadParam(format!(
                    "{} must be a single ASCII byte other than newline, got {:?}",
                    name, c
                )));
            }
        }
        if self.terminator == self.filler {
            return Err(DlogError::BadParam(
                "terminator and filler must differ".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DlogConfig =
            serde_json::from_str(r#"{ "path": "mylog", "overwrite": false }"#).unwrap();
        assert_eq!(config.path, PathBuf::from("mylog"));
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert!(!config.overwrite);
        assert!(config.auto_clear);
        assert_eq!(config.terminator_byte(), b';');
        assert_eq!(config.filler_byte(), b'.');
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero = DlogConfig::new("x", 0);
        assert!(matches!(zero.validate(), Err(DlogError::BadParam(_))));

        let same = DlogConfig {
            filler: ';',
            ..DlogConfig::default()
        };
        assert!(same.validate().is_err());

        let newline = DlogConfig {
            terminator: '\n',
            ..DlogConfig::default()
        };
        assert!(newline.validate().is_err());

        let wide = DlogConfig {
            filler: 'é',
            ..DlogConfig::default()
        };
        assert!(wide.validate().is_err());
    }

    #[test]
    fn test_missing_config_file_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        let err = DlogConfig::from_file(&missing).unwrap_err();
        assert!(matches!(err, DlogError::Filesystem { ref path, .. } if path == &missing));
        assert_eq!(err.status(), crate::error::Status::FilesystemError);
    }
}
