//! 快速初始化模块 - 一次调用完成默认的三路输出配置
//!
//! # 使用示例
//!
//! ```no_run
//! use alert_logger::{critical, info, Logger};
//!
//! let logger = alert_logger::setup("123:token", "-100200300").unwrap();
//!
//! info!(logger, "El sistema ha iniciado correctamente.");
//! critical!(logger, "FALLO DEL SISTEMA: {}", "servidor detenido");
//! logger.flush();
//! ```

use crate::config::LoggerConfig;
use crate::core::{LoggerBuilder, LoggerCore};
use crate::error::LoggerError;

/// 按配置构建日志器
///
/// 处理器注册顺序固定为：文件、终端、告警。
pub fn from_config(config: LoggerConfig) -> Result<LoggerCore, LoggerError> {
    let mut builder = LoggerBuilder::new().with_level(config.level);

    if let Some(file) = config.file {
        builder = builder.add_file(file);
    }
    if let Some(console) = config.console {
        builder = builder.add_console_with_config(console);
    }
    if let Some(alert) = config.alert {
        builder = builder.add_alert(alert);
    }

    builder.build()
}

/// 默认配置：`actividad_app.log` 与终端接收 Debug 及以上，告警只接收 Critical
///
/// 令牌或会话 ID 为空时告警处理器不发送任何请求。
pub fn setup(token: &str, chat_id: &str) -> Result<LoggerCore, LoggerError> {
    from_config(LoggerConfig::with_alert(token, chat_id))
}
