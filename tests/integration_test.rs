use chrono::NaiveDate;
use paced_publisher::browser::{open_browser, StorageState};
use paced_publisher::config::Config;
use paced_publisher::infrastructure::ChromeConnector;
use paced_publisher::logger;
use paced_publisher::services::{
    AuditLog, ContentGenerator, FileLineStore, LineStore, LlmService, PublishingSession,
    TopicStore,
};
use paced_publisher::PostContent;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[tokio::test]
async fn test_topic_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prompts.txt");
    std::fs::write(&path, "Rust 2024 edition\n\nrust 2024 EDITION\nWebGPU\n").unwrap();

    let mut store = TopicStore::new(
        Box::new(FileLineStore::new(&path)),
        StdRng::seed_from_u64(1),
    );
    assert_eq!(store.load().await, 2);
    assert!(store.add("Local-first apps").await);
    assert!(!store.add("webgpu").await);

    // 重新打开：新增的话题已经落盘
    let mut reopened = TopicStore::new(
        Box::new(FileLineStore::new(&path)),
        StdRng::seed_from_u64(2),
    );
    assert_eq!(reopened.load().await, 3);
    assert!(reopened.contains("local-first apps"));
}

#[tokio::test]
async fn test_multiline_topic_reloads_as_single_topic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prompts.txt");

    let mut store = TopicStore::new(
        Box::new(FileLineStore::new(&path)),
        StdRng::seed_from_u64(1),
    );
    assert!(store.add("Rust async\nGo generics").await);
    assert_eq!(store.len(), 1);

    let mut reopened = TopicStore::new(
        Box::new(FileLineStore::new(&path)),
        StdRng::seed_from_u64(2),
    );
    assert_eq!(reopened.load().await, 1);
    assert_eq!(reopened.topics()[0].text(), "Rust async Go generics");
}

#[tokio::test]
async fn test_missing_topic_file_is_created_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prompts.txt");

    let mut store = TopicStore::new(
        Box::new(FileLineStore::new(&path)),
        StdRng::seed_from_u64(1),
    );
    assert_eq!(store.load().await, 0);
    assert!(store.pick().is_none());
    assert!(path.exists());
}

#[tokio::test]
async fn test_audit_log_appends_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posted_tweets.log");
    let mut log = AuditLog::new(Box::new(FileLineStore::new(&path)));

    let at = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let poll = PostContent::Poll {
        question: "Tabs or spaces?".to_string(),
        options: vec!["Tabs".to_string(), "Spaces".to_string()],
    };
    assert!(log.record(at, &poll).await);

    let lines = FileLineStore::new(&path).load().await.unwrap();
    assert_eq!(lines, vec!["2024-01-02 08:00:00 - Tabs or spaces? [Tabs / Spaces]"]);
}

/// 真实发布一条帖子
///
/// 运行方式：
/// ```bash
/// AUTH_FILE=playwright_auth.json cargo test test_publish_single_post_live -- --ignored --nocapture
/// ```
#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_publish_single_post_live() {
    logger::init(true);

    let mut config = Config::default();
    config.apply_env().expect("环境变量无效");

    let credentials = StorageState::load(&config.auth_file).expect("读取会话凭据失败");
    let browser = open_browser(&config).await.expect("启动浏览器失败");
    let connector = ChromeConnector::new(
        browser,
        config.browser_debug_port.is_none(),
        &credentials,
        config.user_agent.clone(),
        config.home_url.clone(),
    );

    let mut session = PublishingSession::open(
        connector,
        config.max_attempts,
        config.max_post_chars,
        Some(config.diagnostics_dir.clone()),
    )
    .await
    .expect("建立发布会话失败");

    let post = PostContent::Single {
        text: format!("Integration check {}", chrono::Local::now().timestamp()),
    };
    let outcome = session.submit(&post).await;
    session.close().await;

    assert!(outcome.is_published(), "发布应该成功: {:?}", outcome);
}

#[tokio::test]
#[ignore]
async fn test_browser_launch() {
    logger::init(false);

    let config = Config::default();
    let mut browser = open_browser(&config).await.expect("应该能够启动浏览器");
    let _ = browser.close().await;
}

#[tokio::test]
#[ignore]
async fn test_discover_topics_live() {
    logger::init(false);

    let mut config = Config::default();
    config.apply_env().expect("环境变量无效");

    let topics = LlmService::new(&config).discover_topics(5).await;
    println!("发现 {} 个话题: {:#?}", topics.len(), topics);
    assert!(!topics.is_empty());
}
