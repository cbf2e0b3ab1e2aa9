//! 日志处理器模块

use crate::config::{LogEvent, Severity, ColorConfig, TIMESTAMP_FORMAT};

/// 日志处理器 trait
pub trait Sink: Send + Sync {
    /// 最低接收级别
    fn threshold(&self) -> Severity;

    /// 渲染一条事件（不含换行）
    fn format(&self, event: &LogEvent) -> String;

    /// 输出事件，失败不得向调用者传播
    fn emit(&self, event: &LogEvent);

    /// 刷新处理器
    fn flush(&self) {}

    /// 获取处理器类型
    fn sink_type(&self) -> SinkType;
}

/// 处理器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkType {
    File,
    Console,
    RemoteAlert,
    Custom,
}

pub mod file;
pub mod term;
pub mod alert;

pub use file::FileSink;
pub use term::ConsoleSink;
pub use alert::{RemoteAlertSink, AlertStats};

/// 文件与终端共用的行格式: `<时间> - [<来源>] - <级别> - <消息>`
pub fn plain_line(event: &LogEvent) -> String {
    format!(
        "{} - [{}] - {} - {}",
        event.timestamp().format(TIMESTAMP_FORMAT),
        event.source(),
        event.level(),
        event.message()
    )
}

/// 整行着色，末尾追加重置序列
pub fn colored_line(event: &LogEvent, colors: &ColorConfig) -> String {
    format!(
        "{}{}{}",
        colors.for_level(event.level()),
        plain_line(event),
        colors.reset
    )
}
