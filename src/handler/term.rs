//! 终端日志处理器

use std::io::{self, Write};
use parking_lot::Mutex;

use crate::handler::{Sink, SinkType, plain_line, colored_line};
use crate::config::{LogEvent, Severity, ConsoleConfig};
use crate::error::LoggerError;

/// 终端日志处理器 - 每条记录同步写出并刷新
pub struct ConsoleSink {
    config: ConsoleConfig,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// 输出到标准输出
    pub fn new(config: ConsoleConfig) -> Result<Self, LoggerError> {
        Self::with_writer(config, io::stdout())
    }

    /// 输出到指定的写入端
    pub fn with_writer<W>(config: ConsoleConfig, writer: W) -> Result<Self, LoggerError>
    where
        W: Write + Send + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            writer: Mutex::new(Box::new(writer)),
        })
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()
    }
}

impl Sink for ConsoleSink {
    fn threshold(&self) -> Severity {
        self.config.threshold
    }

    fn format(&self, event: &LogEvent) -> String {
        if self.config.enable_color {
            colored_line(event, &self.config.colors)
        } else {
            plain_line(event)
        }
    }

    fn emit(&self, event: &LogEvent) {
        if let Err(e) = self.write_line(&self.format(event)) {
            eprintln!("[console] 写入失败: {}", e);
        }
    }

    fn flush(&self) {
        if let Err(e) = self.writer.lock().flush() {
            eprintln!("[console] 刷新失败: {}", e);
        }
    }

    fn sink_type(&self) -> SinkType {
        SinkType::Console
    }
}
