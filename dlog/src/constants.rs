//! 常量定义
//!
//! 文件布局、槽位宽度和默认参数

/// 单条消息内容区的最大字节数（消息 + 结束符 + 填充）
pub const LINE_MAX: usize = 80;
/// 槽位宽度：内容区 + 换行符
pub const SLOT_WIDTH: u64 = LINE_MAX as u64 + 1;

/// 头部计数器宽度（十进制，补零）
pub const FIELD_DIGITS: usize = 10;
/// 头部字段名
pub const FIELD_SIZE: &str = "size";
pub const FIELD_COUNT: &str = "count";
pub const FIELD_TAIL: &str = "tail";
pub const FIELD_HEAD: &str = "head";

/// 数据区起始分隔行（不含换行）
pub const LOG_BEGIN_LINE: &str = "########### LOG BEGIN #############";
/// 分隔行识别标记
pub const LOG_BEGIN_MARKER: &str = "LOG BEGIN";

/// 日志文件扩展名
pub const LOG_EXT: &str = "log";
/// 未指定文件名时的默认名称
pub const DEFAULT_NAME: &str = "dlog";

/// 默认结束符
pub const DEFAULT_TERMINATOR: u8 = b';';
/// 默认对齐填充字符
pub const DEFAULT_FILLER: u8 = b'.';
/// 默认容量（槽位数）
pub const DEFAULT_CAPACITY: u32 = 20;

/// 扫描文件时的读块大小
pub const SCAN_CHUNK: usize = 4096;
/// 预分配时每次写入的槽位数
pub const PREALLOC_BATCH: u32 = 256;
