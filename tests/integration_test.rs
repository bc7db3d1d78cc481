use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::assert_ok;

use trivia_question_stats::logger;
use trivia_question_stats::{App, Config, FetchOutcome};

/// 构造一条完整的 HTTP/1.1 响应
fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    )
}

fn http_429() -> String {
    http_response("429 Too Many Requests", "")
}

/// 上游接口的样例响应体（字符串字段按 RFC 3986 百分号编码）
fn sample_body() -> &'static str {
    r#"{"response_code":0,"results":[
        {"type":"multiple","category":"General%20Knowledge","difficulty":"easy","question":"q1","correct_answer":"a","incorrect_answers":["b","c","d"]},
        {"type":"multiple","category":"General%20Knowledge","difficulty":"easy","question":"q2","correct_answer":"a","incorrect_answers":["b","c","d"]},
        {"type":"boolean","category":"Entertainment%3A%20Film","difficulty":"hard","question":"q3","correct_answer":"True","incorrect_answers":["False"]}
    ]}"#
}

/// 启动本地桩服务器，按脚本顺序逐个返回预设响应
///
/// 每个连接视为一次请求并计数；脚本耗尽后一律返回 500
async fn spawn_stub_server(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("绑定本地端口失败");
    let addr = listener.local_addr().expect("获取本地地址失败");

    let hits = Arc::new(AtomicUsize::new(0));
    let queue = Arc::new(Mutex::new(VecDeque::from(responses)));

    {
        let hits = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                hits.fetch_add(1, Ordering::SeqCst);

                let response = queue
                    .lock()
                    .expect("响应队列锁异常")
                    .pop_front()
                    .unwrap_or_else(|| http_response("500 Internal Server Error", ""));

                // 读掉请求内容即可，桩服务器不做解析
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
    }

    (format!("http://{}", addr), hits)
}

/// 指向桩服务器的测试配置，重试延迟压缩到 80 毫秒
fn test_config(base_url: &str, tag: &str) -> Config {
    let mut config = Config::default();
    config.api_base_url = base_url.to_string();
    config.batch_size = 5;
    config.retry_delay_ms = 80;
    config.output_log_file = std::env::temp_dir()
        .join(format!("trivia_stats_test_{}.txt", tag))
        .to_string_lossy()
        .to_string();
    config
}

#[tokio::test]
async fn test_fetch_success_replaces_question_set() {
    logger::init();

    let (base_url, hits) =
        spawn_stub_server(vec![http_response("200 OK", sample_body())]).await;
    let app = App::initialize(test_config(&base_url, "success")).expect("初始化失败");

    let outcome = tokio_test::assert_ok!(app.fetch_questions().await);
    assert_eq!(outcome, FetchOutcome::Loaded(3));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let snapshot = app.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.view.total_filtered, 3);
    // 分类字段已做百分号解码并按字典序排列
    assert_eq!(
        snapshot.view.categories,
        ["Entertainment: Film", "General Knowledge"]
    );
}

/// 场景：429 后不立即报错，约定延迟后恰好一次重试；
/// 第二个 429 只会再安排一次重试，不会出现并行定时器
#[tokio::test]
async fn test_rate_limit_schedules_single_retry() {
    logger::init();

    let (base_url, hits) = spawn_stub_server(vec![
        http_429(),
        http_429(),
        http_response("200 OK", sample_body()),
    ])
    .await;
    let app = App::initialize(test_config(&base_url, "retry")).expect("初始化失败");

    let outcome = app.fetch_questions().await.expect("调用失败");
    assert_eq!(outcome, FetchOutcome::RetryScheduled);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let snapshot = app.snapshot();
    assert!(snapshot.loading, "等待重试期间应保持加载状态");
    assert!(snapshot.error.is_none(), "频率限制不应立即浮出错误");

    // 第一次重试约 80ms 后触发，再次命中 429
    tokio::time::sleep(Duration::from_millis(140)).await;
    assert_eq!(
        hits.load(Ordering::SeqCst),
        2,
        "同一时刻最多一个重试定时器"
    );
    assert!(app.snapshot().loading);

    // 第二次重试成功，数据落地
    tokio::time::sleep(Duration::from_millis(140)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    let snapshot = app.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.view.total_filtered, 3);
}

/// 重新调用 fetch 会取消挂起的重试定时器（后启动者胜出）
#[tokio::test]
async fn test_new_fetch_supersedes_pending_retry() {
    logger::init();

    let (base_url, hits) = spawn_stub_server(vec![
        http_429(),
        http_response("200 OK", sample_body()),
    ])
    .await;
    let app = App::initialize(test_config(&base_url, "supersede")).expect("初始化失败");

    let outcome = app.fetch_questions().await.expect("调用失败");
    assert_eq!(outcome, FetchOutcome::RetryScheduled);

    // 立即发起新的拉取，旧的重试定时器应被取消
    let outcome = app.fetch_questions().await.expect("调用失败");
    assert_eq!(outcome, FetchOutcome::Loaded(3));
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    // 跨过原定的重试时刻，不应再有第三个请求
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(!app.snapshot().loading);
}

/// 终态失败只记录文案，上一份数据与筛选静默保留
#[tokio::test]
async fn test_terminal_error_retains_previous_data() {
    logger::init();

    let (base_url, _hits) = spawn_stub_server(vec![
        http_response("200 OK", sample_body()),
        http_response("500 Internal Server Error", ""),
    ])
    .await;
    let app = App::initialize(test_config(&base_url, "terminal")).expect("初始化失败");

    let outcome = app.fetch_questions().await.expect("调用失败");
    assert_eq!(outcome, FetchOutcome::Loaded(3));
    app.add_category("General Knowledge");

    let err = app.fetch_questions().await.expect_err("HTTP 500 应是终态错误");
    assert!(err.to_string().contains("HTTP 500"));

    let snapshot = app.snapshot();
    assert!(!snapshot.loading);
    let message = snapshot.error.expect("应记录错误文案");
    assert!(message.contains("HTTP 500"));
    // 旧数据和筛选保持原样
    assert_eq!(snapshot.selected_categories, ["General Knowledge"]);
    assert_eq!(snapshot.view.total_filtered, 2);
}

/// response_code != 0 属于应用层失败，与 HTTP 状态无关
#[tokio::test]
async fn test_api_response_code_error() {
    logger::init();

    let (base_url, _hits) =
        spawn_stub_server(vec![http_response("200 OK", r#"{"response_code":5}"#)]).await;
    let app = App::initialize(test_config(&base_url, "api_error")).expect("初始化失败");

    let err = app.fetch_questions().await.expect_err("应返回应用层错误");
    assert!(err.to_string().contains("response_code 5"));

    let snapshot = app.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_some());
    assert_eq!(snapshot.view.total_filtered, 0);
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_fetch_from_opentdb() {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    let app = App::initialize(config).expect("初始化失败");

    let outcome = app.fetch_questions().await;
    println!("拉取结果: {:?}", outcome);

    app.render_report();
}
