//! 远程告警测试
//! 用本地 TCP 监听模拟聊天机器人 API

use alert_logger::{AlertConfig, FileConfig, Logger, LoggerBuilder, RemoteAlertSink, Severity};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// 读取一个完整的 HTTP 请求（头部加 Content-Length 指定的正文）
fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

/// 启动只应答一次的假服务，返回地址和收到的请求
fn fake_api(status_line: &'static str) -> (String, mpsc::Receiver<String>) {
    fake_api_n(status_line, 1)
}

/// 启动应答 `count` 次的假服务
fn fake_api_n(status_line: &'static str, count: usize) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for _ in 0..count {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let request = read_request(&mut stream);
            let response = format!("{}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok", status_line);
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(request);
        }
    });

    (addr, rx)
}

fn alert_config(api_base: String, timeout_ms: u64) -> AlertConfig {
    AlertConfig {
        api_base,
        timeout_ms,
        ..AlertConfig::new("abc123", "42")
    }
}

#[test]
fn test_alert_posts_form_to_bot_endpoint() {
    let (addr, requests) = fake_api("HTTP/1.1 200 OK");
    let alert = Arc::new(RemoteAlertSink::new(alert_config(addr, 5000)).unwrap());
    let logger = LoggerBuilder::new().add_sink(alert.clone()).build().unwrap();

    logger.error("main.rs", "no se envia");
    logger.critical("main.rs", "servidor detenido");
    logger.flush();

    let request = requests.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.starts_with("POST /botabc123/sendMessage HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.contains("chat_id=42"));
    assert!(request.contains("parse_mode=HTML"));
    assert!(request.contains("text="));
    assert!(request.contains("ALERTA+CR%C3%8DTICA"));
    assert!(request.contains("servidor+detenido"));

    assert_eq!(alert.stats().delivered(), 1);
    assert_eq!(alert.stats().failed(), 0);
}

#[test]
fn test_connection_refused_is_swallowed() {
    // 绑定后立即释放，得到一个无人监听的端口
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let dir = tempfile::tempdir().unwrap();
    let alert = Arc::new(
        RemoteAlertSink::new(alert_config(format!("http://127.0.0.1:{}", port), 2000)).unwrap(),
    );
    let logger = LoggerBuilder::new()
        .add_file(FileConfig {
            path: dir.path().join("app.log"),
            threshold: Severity::Debug,
        })
        .add_sink(alert.clone())
        .build()
        .unwrap();

    logger.critical("main.rs", "FALLO DEL SISTEMA");

    let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
    assert!(content.ends_with(" - [main.rs] - CRITICAL - FALLO DEL SISTEMA\n"));

    logger.flush();
    assert_eq!(alert.stats().failed(), 1);
    assert_eq!(alert.stats().delivered(), 0);
}

#[test]
fn test_error_status_is_swallowed() {
    let (addr, requests) = fake_api("HTTP/1.1 401 Unauthorized");
    let alert = Arc::new(RemoteAlertSink::new(alert_config(addr, 5000)).unwrap());
    let logger = LoggerBuilder::new().add_sink(alert.clone()).build().unwrap();

    logger.critical("main.rs", "token invalido");
    logger.flush();

    assert!(requests.recv_timeout(Duration::from_secs(5)).is_ok());
    assert_eq!(alert.stats().failed(), 1);
    assert_eq!(alert.stats().delivered(), 0);
}

#[test]
fn test_slow_service_does_not_block_caller() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    thread::spawn(move || {
        // 接受连接但从不应答
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        }
    });

    let alert = Arc::new(RemoteAlertSink::new(alert_config(addr, 300)).unwrap());
    let logger = LoggerBuilder::new().add_sink(alert.clone()).build().unwrap();

    let started = Instant::now();
    logger.critical("main.rs", "sin respuesta");
    assert!(started.elapsed() < Duration::from_millis(300));

    logger.flush();
    assert_eq!(alert.stats().failed(), 1);
}

#[test]
fn test_drop_delivers_queued_alerts() {
    let (addr, requests) = fake_api_n("HTTP/1.1 200 OK", 3);
    let logger = LoggerBuilder::new()
        .add_alert(alert_config(addr, 2000))
        .build()
        .unwrap();

    logger.critical("main.rs", "alerta 1");
    logger.critical("main.rs", "alerta 2");
    logger.critical("main.rs", "alerta 3");

    // 不调用 flush，直接释放
    let started = Instant::now();
    drop(logger);
    assert!(started.elapsed() < Duration::from_secs(3));

    for i in 1..=3 {
        let request = requests.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(request.contains(&format!("alerta+{}", i)));
    }
}

#[test]
fn test_drop_with_backlog_is_time_limited() {
    // 监听但从不接受连接
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    let logger = LoggerBuilder::new()
        .add_alert(alert_config(addr, 500))
        .build()
        .unwrap();

    for i in 0..20 {
        logger.critical("main.rs", &format!("caida {}", i));
    }

    let started = Instant::now();
    drop(logger);
    assert!(started.elapsed() < Duration::from_secs(2), "drop took {:?}", started.elapsed());
    drop(listener);
}

#[test]
fn test_full_queue_drops_new_alerts() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());
    let config = AlertConfig {
        queue_capacity: 4,
        ..alert_config(addr, 500)
    };
    let alert = Arc::new(RemoteAlertSink::new(config).unwrap());
    let logger = LoggerBuilder::new().add_sink(alert.clone()).build().unwrap();

    let started = Instant::now();
    for i in 0..20 {
        logger.critical("main.rs", &format!("rafaga {}", i));
    }
    assert!(started.elapsed() < Duration::from_millis(500));

    // 一条在途加队列中的 4 条，其余立即计为失败
    assert!(alert.stats().failed() >= 15);
    assert_eq!(alert.stats().delivered(), 0);
    drop(listener);
}
