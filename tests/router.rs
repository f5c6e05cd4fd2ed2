use async_trait::async_trait;
use hu_reach_bot::bot::{ChatOutput, Command, CommandRouter, Lang, LanguageStore};
use hu_reach_bot::proxy::{
    HttpProbe, ProbeError, ProbeRoute, ProberConfig, ProxyCandidate, ProxyScheme,
    ReachabilityProber,
};
use hu_reach_bot::screenshot::{Screenshot, ScreenshotError, Screenshotter};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
enum Reply {
    Text(String),
    Photo { bytes: usize, caption: String },
}

struct RecordingChat {
    id: i64,
    replies: Mutex<Vec<Reply>>,
}

impl RecordingChat {
    fn new(id: i64) -> Self {
        Self {
            id,
            replies: Mutex::new(Vec::new()),
        }
    }

    fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    fn last_text(&self) -> String {
        match self.replies().last() {
            Some(Reply::Text(text)) => text.clone(),
            other => panic!("expected a text reply, got {:?}", other),
        }
    }
}

#[async_trait]
impl ChatOutput for RecordingChat {
    fn chat_id(&self) -> i64 {
        self.id
    }

    async fn send_text(&self, text: String) -> hu_reach_bot::Result<()> {
        self.replies.lock().unwrap().push(Reply::Text(text));
        Ok(())
    }

    async fn send_photo(&self, png: Vec<u8>, caption: String) -> hu_reach_bot::Result<()> {
        self.replies.lock().unwrap().push(Reply::Photo {
            bytes: png.len(),
            caption,
        });
        Ok(())
    }
}

/// Status per route key ("direct" or "host:port"); other routes are refused
struct FakeNetwork {
    answers: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl FakeNetwork {
    fn new(answers: &[(&str, u16)]) -> Arc<Self> {
        Arc::new(Self {
            answers: answers.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpProbe for FakeNetwork {
    async fn get(&self, _url: &str, route: &ProbeRoute) -> Result<u16, ProbeError> {
        let key = route.to_string();
        self.calls.lock().unwrap().push(key.clone());
        self.answers
            .get(&key)
            .copied()
            .ok_or_else(|| ProbeError::Request("connection refused".to_string()))
    }
}

enum FakeShot {
    Ok,
    Hang,
    Fail,
}

#[async_trait]
impl Screenshotter for FakeShot {
    async fn capture(&self, _url: &str) -> Result<Screenshot, ScreenshotError> {
        match self {
            FakeShot::Ok => Ok(Screenshot {
                png: vec![0x89, b'P', b'N', b'G'],
                title: "Index - Hírek".to_string(),
            }),
            FakeShot::Hang => futures::future::pending().await,
            FakeShot::Fail => Err(ScreenshotError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string())),
        }
    }
}

fn proxies(n: usize) -> Vec<ProxyCandidate> {
    (1..=n)
        .map(|i| ProxyCandidate::new(format!("84.0.0.{}", i), 8080, ProxyScheme::Http))
        .collect()
}

fn router(
    candidates: Vec<ProxyCandidate>,
    network: Arc<FakeNetwork>,
    shot: FakeShot,
) -> CommandRouter {
    let prober = ReachabilityProber::new(ProberConfig::default(), Arc::new(candidates), network);
    CommandRouter::new(
        prober,
        Arc::new(shot),
        Arc::new(LanguageStore::new(Lang::Hu)),
        Duration::from_secs(20),
    )
}

#[tokio::test]
async fn check_reports_first_working_proxy() {
    let network = FakeNetwork::new(&[("84.0.0.1:8080", 200), ("84.0.0.2:8080", 200)]);
    let router = router(proxies(3), network.clone(), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Check("index.hu".to_string()), &chat)
        .await
        .unwrap();

    assert_eq!(network.calls(), vec!["84.0.0.1:8080"]);
    let replies = chat.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], Reply::Text("🔎 Ellenőrzöm: index.hu ...".to_string()));
    let report = chat.last_text();
    assert!(report.starts_with("✅ index.hu"));
    assert!(report.contains("84.0.0.1:8080"));
    assert!(report.contains("Próbálkozások: 1"));
}

#[tokio::test]
async fn check_falls_back_to_direct() {
    let network = FakeNetwork::new(&[("direct", 200)]);
    let router = router(proxies(3), network.clone(), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Check("https://index.hu".to_string()), &chat)
        .await
        .unwrap();

    assert_eq!(
        network.calls(),
        vec!["84.0.0.1:8080", "84.0.0.2:8080", "84.0.0.3:8080", "direct"]
    );
    let report = chat.last_text();
    assert!(report.starts_with("✅"));
    assert!(report.contains("közvetlen"));
}

#[tokio::test]
async fn check_unreachable_tries_every_path_once() {
    let network = FakeNetwork::new(&[]);
    let router = router(proxies(4), network.clone(), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Check("blocked.example".to_string()), &chat)
        .await
        .unwrap();

    assert_eq!(network.calls().len(), 5);
    let report = chat.last_text();
    assert!(report.starts_with("⚠️ blocked.example"));
    assert!(report.contains("84.0.0.4:8080: connection refused"));
    assert!(report.contains("közvetlen (proxy nélkül): connection refused"));
    assert!(!report.contains("direct:"));
}

#[tokio::test]
async fn check_with_empty_proxy_list_goes_direct_once() {
    let network = FakeNetwork::new(&[]);
    let router = router(Vec::new(), network.clone(), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Check("index.hu".to_string()), &chat)
        .await
        .unwrap();

    assert_eq!(network.calls(), vec!["direct"]);
    assert!(chat.last_text().contains("Nem sikerült magyar proxykat találni"));
}

#[tokio::test]
async fn check_without_argument_shows_usage() {
    let network = FakeNetwork::new(&[]);
    let router = router(proxies(1), network.clone(), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Check(String::new()), &chat)
        .await
        .unwrap();

    assert!(network.calls().is_empty());
    assert_eq!(
        chat.replies(),
        vec![Reply::Text("Használat: /check <domain vagy URL>".to_string())]
    );
}

#[tokio::test]
async fn check_rejects_invalid_target() {
    let network = FakeNetwork::new(&[]);
    let router = router(proxies(1), network.clone(), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Check("https://".to_string()), &chat)
        .await
        .unwrap();

    assert!(network.calls().is_empty());
    assert_eq!(chat.last_text(), "Érvénytelen URL.");
}

#[tokio::test]
async fn lang_switches_only_the_issuing_chat() {
    let network = FakeNetwork::new(&[("direct", 200)]);
    let router = router(Vec::new(), network, FakeShot::Ok);
    let english = RecordingChat::new(10);
    let hungarian = RecordingChat::new(20);

    router
        .handle(Command::Lang("en".to_string()), &english)
        .await
        .unwrap();
    assert_eq!(english.last_text(), "OK, I will reply in English from now on.");

    router
        .handle(Command::Check("index.hu".to_string()), &english)
        .await
        .unwrap();
    assert!(english.last_text().contains("is reachable from Hungary"));

    router
        .handle(Command::Check("index.hu".to_string()), &hungarian)
        .await
        .unwrap();
    assert!(hungarian.last_text().contains("elérhető magyarországról"));

    router
        .handle(Command::Lang("hu".to_string()), &english)
        .await
        .unwrap();
    router.handle(Command::Help, &english).await.unwrap();
    assert!(english.last_text().contains("elérhetőségi teszt"));
}

#[tokio::test]
async fn lang_with_unknown_code_shows_usage() {
    let router = router(Vec::new(), FakeNetwork::new(&[]), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Lang("de".to_string()), &chat)
        .await
        .unwrap();

    assert_eq!(chat.last_text(), "Használat: /lang <hu|en>");
}

#[tokio::test]
async fn shot_sends_photo_with_caption() {
    let router = router(Vec::new(), FakeNetwork::new(&[]), FakeShot::Ok);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Screenshot("index.hu".to_string()), &chat)
        .await
        .unwrap();

    match chat.replies().last() {
        Some(Reply::Photo { bytes, caption }) => {
            assert_eq!(*bytes, 4);
            assert!(caption.contains("index.hu"));
            assert!(caption.contains("Index - Hírek"));
        }
        other => panic!("expected a photo, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn shot_that_never_loads_reports_failure() {
    let router = router(Vec::new(), FakeNetwork::new(&[]), FakeShot::Hang);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Shot("slow.example".to_string()), &chat)
        .await
        .unwrap();

    let replies = chat.replies();
    assert_eq!(replies.len(), 2);
    assert!(chat.last_text().starts_with("Nem sikerült a képernyőkép"));
    assert!(chat.last_text().contains("Időtúllépés"));
}

#[tokio::test]
async fn shot_navigation_error_is_reported() {
    let router = router(Vec::new(), FakeNetwork::new(&[]), FakeShot::Fail);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Lang("en".to_string()), &chat)
        .await
        .unwrap();
    router
        .handle(Command::Shot("nope.invalid".to_string()), &chat)
        .await
        .unwrap();

    let text = chat.last_text();
    assert!(text.starts_with("Could not take the screenshot: the page could not be loaded"));
    assert!(text.contains("ERR_NAME_NOT_RESOLVED"));
    assert!(!text.contains("navigation failed"));
}

#[tokio::test]
async fn shot_error_is_reported_in_hungarian() {
    let router = router(Vec::new(), FakeNetwork::new(&[]), FakeShot::Fail);
    let chat = RecordingChat::new(1);

    router
        .handle(Command::Shot("nope.invalid".to_string()), &chat)
        .await
        .unwrap();

    let text = chat.last_text();
    assert!(text.starts_with("Nem sikerült a képernyőkép: az oldal nem tölthető be"));
    assert!(!text.contains("navigation failed"));
}
