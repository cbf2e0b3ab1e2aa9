//! 错误类型

use std::path::PathBuf;
use thiserror::Error;

/// 日志器构建错误，只在构建阶段返回，记录日志时从不出现
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("{message}")]
    Config { message: String },

    #[error("无法打开日志文件 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// 告警发送失败，在告警处理器内部被丢弃
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("告警请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("告警服务返回状态码 {0}")]
    Status(u16),

    #[error("告警运行时不可用: {0}")]
    Runtime(#[from] std::io::Error),
}
