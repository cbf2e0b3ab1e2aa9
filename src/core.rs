//! 日志核心模块 - 同步扇出到各处理器

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::{Severity, LogEvent, FileConfig, ConsoleConfig, AlertConfig, meets_threshold};
use crate::handler::{Sink, FileSink, ConsoleSink, RemoteAlertSink};
use crate::error::LoggerError;

/// 日志器 trait - 极简接口
///
/// 任何处理器的失败都不会从这里的方法传出。
pub trait Logger: Send + Sync {
    fn log(&self, level: Severity, source: &str, message: &str);
    fn flush(&self);
    fn set_level(&self, level: Severity);
    fn level(&self) -> Severity;

    fn debug(&self, source: &str, message: &str) {
        self.log(Severity::Debug, source, message);
    }

    fn info(&self, source: &str, message: &str) {
        self.log(Severity::Info, source, message);
    }

    fn warning(&self, source: &str, message: &str) {
        self.log(Severity::Warning, source, message);
    }

    fn error(&self, source: &str, message: &str) {
        self.log(Severity::Error, source, message);
    }

    fn critical(&self, source: &str, message: &str) {
        self.log(Severity::Critical, source, message);
    }
}

/// 日志核心实现
///
/// 处理器列表在构建后固定，按注册顺序依次分发。
pub struct LoggerCore {
    level: AtomicU8,
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerCore {
    /// 创建新的日志核心
    pub fn new(level: Severity, sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self {
            level: AtomicU8::new(level.to_u8()),
            sinks,
        }
    }

    /// 检查是否应该记录该级别的日志
    pub fn should_log(&self, level: Severity) -> bool {
        meets_threshold(level, self.level())
    }

    /// 把事件交给每个阈值满足的处理器，全局级别已由调用方检查
    fn dispatch(&self, event: &LogEvent) {
        for sink in &self.sinks {
            if meets_threshold(event.level(), sink.threshold()) {
                sink.emit(event);
            }
        }
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Logger for LoggerCore {
    fn log(&self, level: Severity, source: &str, message: &str) {
        // 低于全局级别时不创建事件
        if !self.should_log(level) {
            return;
        }
        self.dispatch(&LogEvent::new(level, source, message));
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }

    fn set_level(&self, level: Severity) {
        self.level.store(level.to_u8(), Ordering::Relaxed);
    }

    fn level(&self) -> Severity {
        Severity::load(self.level.load(Ordering::Relaxed))
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(&self, level: Severity, source: &str, message: &str) {
        (**self).log(level, source, message);
    }

    fn flush(&self) {
        (**self).flush();
    }

    fn set_level(&self, level: Severity) {
        (**self).set_level(level);
    }

    fn level(&self) -> Severity {
        (**self).level()
    }
}

/// 待构建的处理器
enum PendingSink {
    File(FileConfig),
    Console(ConsoleConfig),
    Alert(AlertConfig),
    Custom(Arc<dyn Sink>),
}

/// 日志构建器
///
/// 处理器按添加顺序注册，实际创建推迟到 [`LoggerBuilder::build`]。
pub struct LoggerBuilder {
    level: Severity,
    pending: Vec<PendingSink>,
}

impl LoggerBuilder {
    /// 创建新的日志构建器，默认级别 Debug
    pub fn new() -> Self {
        Self {
            level: Severity::Debug,
            pending: Vec::new(),
        }
    }

    /// 设置全局日志级别
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// 添加文件处理器
    pub fn add_file(mut self, config: FileConfig) -> Self {
        self.pending.push(PendingSink::File(config));
        self
    }

    /// 添加终端处理器
    pub fn add_console(self) -> Self {
        self.add_console_with_config(ConsoleConfig::default())
    }

    /// 添加带配置的终端处理器
    pub fn add_console_with_config(mut self, config: ConsoleConfig) -> Self {
        self.pending.push(PendingSink::Console(config));
        self
    }

    /// 添加远程告警处理器
    pub fn add_alert(mut self, config: AlertConfig) -> Self {
        self.pending.push(PendingSink::Alert(config));
        self
    }

    /// 添加自定义处理器
    pub fn add_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.pending.push(PendingSink::Custom(sink));
        self
    }

    /// 构建日志器
    pub fn build(self) -> Result<LoggerCore, LoggerError> {
        // 验证是否有处理器
        if self.pending.is_empty() {
            return Err(LoggerError::config("配置错误: 必须至少添加一个处理器（文件、终端或告警）"));
        }

        let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(self.pending.len());
        for pending in self.pending {
            let sink: Arc<dyn Sink> = match pending {
                PendingSink::File(config) => Arc::new(FileSink::new(config)?),
                PendingSink::Console(config) => Arc::new(ConsoleSink::new(config)?),
                PendingSink::Alert(config) => Arc::new(RemoteAlertSink::new(config)?),
                PendingSink::Custom(sink) => sink,
            };
            sinks.push(sink);
        }

        Ok(LoggerCore::new(self.level, sinks))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
