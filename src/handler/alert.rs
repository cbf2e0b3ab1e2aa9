//! 远程告警处理器 - 通过聊天机器人 API 发送严重告警
//!
//! 发送在独立的工作线程中进行，调用者从不等待网络。
//! 任何发送失败（超时、网络错误、非 2xx 状态）都只计数，不会向外传播。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use crossbeam_channel::{Sender, Receiver, RecvTimeoutError, TrySendError, bounded};
use parking_lot::Mutex;
use tokio::runtime::Runtime;

use crate::handler::{Sink, SinkType};
use crate::config::{LogEvent, Severity, AlertConfig};
use crate::error::{AlertError, LoggerError};

/// 告警指令枚举 - 生产者消费者模式
enum AlertCommand {
    /// 发送告警文本
    Send(String),
    /// 处理完队列后应答
    Flush(Sender<()>),
}

/// 发送统计
#[derive(Debug, Default)]
pub struct AlertStats {
    delivered: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl AlertStats {
    /// 成功送达的告警数
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// 发送失败、队列已满或关闭时被丢弃的告警数
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// 未配置令牌或会话 ID 而跳过的告警数
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// 远程告警处理器
pub struct RemoteAlertSink {
    config: AlertConfig,
    stats: Arc<AlertStats>,
    /// 关闭时置为 None，工作线程在队列取空后退出
    command_sender: Option<Sender<AlertCommand>>,
    /// 关闭截止时间，超过后剩余告警不再发送
    deadline: Arc<Mutex<Option<Instant>>>,
    done_receiver: Receiver<()>,
    worker_thread: Option<thread::JoinHandle<()>>,
}

impl RemoteAlertSink {
    /// 创建告警处理器并启动工作线程
    pub fn new(config: AlertConfig) -> Result<Self, LoggerError> {
        config.validate()?;

        let (command_sender, command_receiver) = bounded(config.queue_capacity);
        let (done_sender, done_receiver) = bounded(1);
        let stats = Arc::new(AlertStats::default());
        let deadline = Arc::new(Mutex::new(None));
        let config_clone = config.clone();
        let stats_clone = Arc::clone(&stats);
        let deadline_clone = Arc::clone(&deadline);

        let worker_thread = thread::Builder::new()
            .name("alert-sink".to_string())
            .spawn(move || {
                Self::worker_thread(config_clone, command_receiver, stats_clone, deadline_clone);
                let _ = done_sender.send(());
            })
            .map_err(|e| LoggerError::config(format!("无法启动告警线程: {}", e)))?;

        Ok(Self {
            config,
            stats,
            command_sender: Some(command_sender),
            deadline,
            done_receiver,
            worker_thread: Some(worker_thread),
        })
    }

    pub fn stats(&self) -> &AlertStats {
        &self.stats
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// 单次等待上限：请求超时加一秒
    fn wait_limit(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms) + Duration::from_secs(1)
    }

    /// 工作线程 - 处理所有告警发送
    fn worker_thread(
        config: AlertConfig,
        receiver: Receiver<AlertCommand>,
        stats: Arc<AlertStats>,
        deadline: Arc<Mutex<Option<Instant>>>,
    ) {
        let timeout = Duration::from_millis(config.timeout_ms);
        let transport = build_transport(timeout).ok();
        let endpoint = config.endpoint();

        while let Ok(command) = receiver.recv() {
            match command {
                AlertCommand::Send(text) => {
                    if !config.is_configured() {
                        stats.skipped.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }
                    let Some((runtime, client)) = &transport else {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        continue;
                    };

                    // 关闭中：只在截止时间之前继续发送
                    let budget = match *deadline.lock() {
                        Some(at) => at.saturating_duration_since(Instant::now()),
                        None => timeout,
                    };
                    if budget.is_zero() {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        continue;
                    }

                    // 结果在此丢弃，只计数
                    let result = runtime.block_on(async {
                        tokio::time::timeout(budget, send_alert(client, &endpoint, &config.chat_id, &text)).await
                    });
                    match result {
                        Ok(Ok(())) => stats.delivered.fetch_add(1, Ordering::Relaxed),
                        _ => stats.failed.fetch_add(1, Ordering::Relaxed),
                    };
                }

                AlertCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    }
}

/// 工作线程独占的单线程运行时和带超时的客户端
fn build_transport(timeout: Duration) -> Result<(Runtime, reqwest::Client), AlertError> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let client = {
        let _guard = runtime.enter();
        reqwest::Client::builder().timeout(timeout).build()?
    };
    Ok((runtime, client))
}

/// 发送一条告警，返回值由调用方丢弃
async fn send_alert(client: &reqwest::Client, endpoint: &str, chat_id: &str, text: &str) -> Result<(), AlertError> {
    let response = client
        .post(endpoint)
        .form(&[("chat_id", chat_id), ("text", text), ("parse_mode", "HTML")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AlertError::Status(status.as_u16()));
    }
    Ok(())
}

/// 转义 HTML 标记中的特殊字符
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 告警文本
pub fn alert_text(event: &LogEvent) -> String {
    format!(
        "🚨 <b>ALERTA CRÍTICA</b> 🚨\n\nArchivo: {}\nMensaje: {}",
        escape_html(event.source()),
        escape_html(event.message())
    )
}

impl Sink for RemoteAlertSink {
    fn threshold(&self) -> Severity {
        self.config.threshold
    }

    fn format(&self, event: &LogEvent) -> String {
        alert_text(event)
    }

    fn emit(&self, event: &LogEvent) {
        let Some(sender) = &self.command_sender else {
            return;
        };
        // 队列满或工作线程已退出时直接丢弃，调用者从不等待
        if let Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) =
            sender.try_send(AlertCommand::Send(self.format(event)))
        {
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 等待队列中的告警处理完毕，最长等待超时时间加一秒
    fn flush(&self) {
        let Some(sender) = &self.command_sender else {
            return;
        };
        let until = Instant::now() + self.wait_limit();
        let (ack_sender, ack_receiver) = bounded(1);
        if sender.send_deadline(AlertCommand::Flush(ack_sender), until).is_ok() {
            let _ = ack_receiver.recv_deadline(until);
        }
    }

    fn sink_type(&self) -> SinkType {
        SinkType::RemoteAlert
    }
}

impl Drop for RemoteAlertSink {
    /// 尽量发完队列中的告警，但最多等待超时时间加一秒
    fn drop(&mut self) {
        let window = self.wait_limit();
        *self.deadline.lock() = Some(Instant::now() + Duration::from_millis(self.config.timeout_ms));

        // 断开通道，工作线程取空队列后退出
        self.command_sender.take();

        match self.done_receiver.recv_timeout(window) {
            Err(RecvTimeoutError::Timeout) => {
                // 不再等待，线程在截止时间后自行结束
                eprintln!("[alert] 关闭超时，剩余告警已丢弃");
            }
            _ => {
                if let Some(thread) = self.worker_thread.take() {
                    let _ = thread.join();
                }
            }
        }
    }
}
