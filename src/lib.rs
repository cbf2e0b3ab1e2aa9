//! alert_logger - 多路输出日志库
//!
//! 一条日志事件按注册顺序分发给文件、彩色终端和远程告警三类处理器，
//! 每个处理器有独立的最低级别。远程告警是尽力而为的，失败不会影响调用者或其他处理器。

pub mod core;
pub mod handler;
pub mod config;
pub mod error;
mod fmt_impl;

// 重新导出主要类型
pub use core::{Logger, LoggerBuilder, LoggerCore};
pub use handler::{Sink, SinkType, FileSink, ConsoleSink, RemoteAlertSink, AlertStats};
pub use config::{Severity, LogEvent, FileConfig, ConsoleConfig, ColorConfig, AlertConfig, LoggerConfig, meets_threshold};
pub use error::{LoggerError, AlertError};
pub use fmt_impl::{setup, from_config};

// 日志宏，第一个参数是日志器，来源标签取调用处的文件名
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)*) => ($crate::__private_log!($logger, $crate::Severity::Critical, $($arg)*));
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)*) => ($crate::__private_log!($logger, $crate::Severity::Error, $($arg)*));
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)*) => ($crate::__private_log!($logger, $crate::Severity::Warning, $($arg)*));
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => ($crate::__private_log!($logger, $crate::Severity::Info, $($arg)*));
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)*) => ($crate::__private_log!($logger, $crate::Severity::Debug, $($arg)*));
}

#[macro_export]
#[doc(hidden)]
macro_rules! __private_log {
    ($logger:expr, $level:expr, $($arg:tt)*) => {{
        use $crate::Logger as _;
        ($logger).log($level, $crate::source_label(file!()), &format!($($arg)*))
    }};
}

/// 取路径的文件名部分作为来源标签
pub fn source_label(path: &str) -> &str {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label() {
        assert_eq!(source_label("src/app/db.rs"), "db.rs");
        assert_eq!(source_label("main.rs"), "main.rs");
        assert_eq!(source_label(file!()), "lib.rs");
    }
}
