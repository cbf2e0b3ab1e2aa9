//! 文件日志处理器

use std::fs::{File, OpenOptions};
use std::io::{self, Write, BufWriter};
use std::path::{Path, PathBuf};
use parking_lot::Mutex;

use crate::handler::{Sink, SinkType, plain_line};
use crate::config::{LogEvent, Severity, FileConfig};
use crate::error::LoggerError;

/// 文件日志处理器，以追加方式写入，进程生命周期内独占文件句柄
pub struct FileSink {
    path: PathBuf,
    threshold: Severity,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    /// 打开（不存在则创建）日志文件
    pub fn new(config: FileConfig) -> Result<Self, LoggerError> {
        config.validate()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .map_err(|e| LoggerError::io(&config.path, e))?;

        Ok(Self {
            path: config.path,
            threshold: config.threshold,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入一行并立即刷新，锁内完成避免行交错
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl Sink for FileSink {
    fn threshold(&self) -> Severity {
        self.threshold
    }

    fn format(&self, event: &LogEvent) -> String {
        plain_line(event)
    }

    fn emit(&self, event: &LogEvent) {
        if let Err(e) = self.write_line(&self.format(event)) {
            eprintln!("[file] 写入 {} 失败: {}", self.path.display(), e);
        }
    }

    fn flush(&self) {
        if let Err(e) = self.writer.lock().flush() {
            eprintln!("[file] 刷新失败: {}", e);
        }
    }

    fn sink_type(&self) -> SinkType {
        SinkType::File
    }
}
