//! 配置模块

use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use std::str::FromStr;
use chrono::NaiveDateTime;

use crate::error::LoggerError;

/// 时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 日志级别，按序号比较：Debug < Info < Warning < Error < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// 全部级别，从低到高
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// 级别名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// 从 `to_u8` 的结果还原级别，其他值不会出现
    pub(crate) fn load(value: u8) -> Severity {
        Self::ALL
            .get(value as usize)
            .copied()
            .unwrap_or(Severity::Critical)
    }

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }
}

/// 事件级别是否达到阈值
pub fn meets_threshold(level: Severity, threshold: Severity) -> bool {
    level >= threshold
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(LoggerError::config(format!("未知的日志级别: {}", other))),
        }
    }
}

/// 日志事件，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    timestamp: NaiveDateTime,
    source: String,
    level: Severity,
    message: String,
}

impl LogEvent {
    /// 以当前本地时间创建事件
    pub fn new(level: Severity, source: impl Into<String>, message: impl Into<String>) -> Self {
        let now = chrono::Local::now().naive_local();
        Self::at(now, level, source, message)
    }

    /// 以指定时间创建事件（秒级精度）
    pub fn at(
        timestamp: NaiveDateTime,
        level: Severity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        use chrono::Timelike;
        Self {
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
            source: source.into(),
            level,
            message: message.into(),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// 来源标签（文件名或模块名）
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 文件日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub path: PathBuf,
    pub threshold: Severity,
}

impl FileConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("配置错误: 日志文件路径不能为空"));
        }
        Ok(())
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("actividad_app.log"),
            threshold: Severity::Debug,
        }
    }
}

/// 终端颜色配置（ANSI 转义序列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub debug: String,
    pub info: String,
    pub warning: String,
    pub error: String,
    pub critical: String,
    pub reset: String,
}

impl ColorConfig {
    /// 级别对应的颜色
    pub fn for_level(&self, level: Severity) -> &str {
        match level {
            Severity::Debug => &self.debug,
            Severity::Info => &self.info,
            Severity::Warning => &self.warning,
            Severity::Error => &self.error,
            Severity::Critical => &self.critical,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            debug: "\x1b[38;20m".to_string(),    // 灰
            info: "\x1b[34;20m".to_string(),     // 蓝
            warning: "\x1b[33;20m".to_string(),  // 黄
            error: "\x1b[31;20m".to_string(),    // 红
            critical: "\x1b[31;1m".to_string(),  // 粗体红
            reset: "\x1b[0m".to_string(),
        }
    }
}

/// 终端输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// 是否启用颜色输出
    pub enable_color: bool,
    pub threshold: Severity,
    pub colors: ColorConfig,
}

impl ConsoleConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.enable_color && self.colors.reset.is_empty() {
            return Err(LoggerError::config(
                "配置冲突: 启用颜色时必须提供重置序列，否则颜色会延续到后续输出",
            ));
        }
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enable_color: true,
            threshold: Severity::Debug,
            colors: ColorConfig::default(),
        }
    }
}

/// 告警服务默认地址
pub const DEFAULT_ALERT_API: &str = "https://api.telegram.org";

/// 远程告警配置
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// 机器人访问令牌，为空时告警处理器不发送任何请求
    pub token: String,
    /// 目标会话 ID
    pub chat_id: String,
    pub api_base: String,
    pub timeout_ms: u64,
    /// 待发送队列容量，队列满时新告警直接计为失败
    pub queue_capacity: usize,
    pub threshold: Severity,
}

impl AlertConfig {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    /// 令牌和会话 ID 是否都已配置
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }

    /// 发送地址
    pub fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), self.token)
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.api_base.is_empty() {
            return Err(LoggerError::config("配置错误: 告警服务地址不能为空"));
        }
        if self.timeout_ms == 0 {
            return Err(LoggerError::config("配置错误: 告警超时不能为 0"));
        }
        if self.timeout_ms > 60000 {
            return Err(LoggerError::config("配置错误: 告警超时过长 (最大 60秒)"));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::config("配置错误: 告警队列容量不能为 0"));
        }
        if self.queue_capacity > 4096 {
            return Err(LoggerError::config("配置错误: 告警队列容量过大 (最大 4096)"));
        }
        Ok(())
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chat_id: String::new(),
            api_base: DEFAULT_ALERT_API.to_string(),
            timeout_ms: 5000,
            queue_capacity: 64,
            threshold: Severity::Critical,
        }
    }
}

// 令牌不进入调试输出
impl std::fmt::Debug for AlertConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertConfig")
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("timeout_ms", &self.timeout_ms)
            .field("queue_capacity", &self.queue_capacity)
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// 完整日志配置，由宿主应用负责加载
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// 全局最低级别
    pub level: Severity,
    pub file: Option<FileConfig>,
    pub console: Option<ConsoleConfig>,
    pub alert: Option<AlertConfig>,
}

impl LoggerConfig {
    /// 使用给定的告警令牌和会话 ID，其余取默认值
    pub fn with_alert(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            alert: Some(AlertConfig::new(token, chat_id)),
            ..Self::default()
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Severity::Debug,
            file: Some(FileConfig::default()),
            console: Some(ConsoleConfig::default()),
            alert: Some(AlertConfig::default()),
        }
    }
}
