use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    date: String,
    mood: u8,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TodayResponse {
    date: String,
    entry: Option<Entry>,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    entry: Entry,
    persisted: bool,
}

#[derive(Debug, Deserialize)]
struct HistoryItem {
    id: String,
    date: String,
    day_label: String,
    mood_label: String,
}

#[derive(Debug, Deserialize)]
struct ChartDay {
    date: String,
    mood: u8,
    has_entry: bool,
}

#[derive(Debug, Deserialize)]
struct InsightsResponse {
    total_entries: usize,
    average_mood: Option<f64>,
    last_7_days: Vec<ChartDay>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("mood_journal_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = unique_data_dir();
    let child = Command::new(env!("CARGO_BIN_EXE_mood_journal"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", data_dir)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json<T: serde::de::DeserializeOwned>(client: &Client, url: String) -> T {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn http_save_then_update_keeps_one_entry_for_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let first: SaveResponse = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "mood": 2, "note": "  long day  " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(first.persisted);
    assert_eq!(first.entry.mood, 2);
    assert_eq!(first.entry.note.as_deref(), Some("long day"));

    let second: SaveResponse = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "mood": 5, "note": "   " }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second.entry.id, first.entry.id);
    assert_eq!(second.entry.note, None);

    let today: TodayResponse = get_json(&client, format!("{}/api/today", server.base_url)).await;
    let entry = today.entry.expect("entry for today");
    assert_eq!(entry.date, today.date);
    assert_eq!(entry.mood, 5);
    assert_eq!(entry.id, first.entry.id);

    let history: Vec<HistoryItem> =
        get_json(&client, format!("{}/api/history", server.base_url)).await;
    let todays: Vec<_> = history.iter().filter(|item| item.date == today.date).collect();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].id, first.entry.id);
    assert_eq!(todays[0].day_label, "Today");
    assert_eq!(todays[0].mood_label, "Very Happy");
}

#[tokio::test]
async fn http_rejects_out_of_range_mood() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before: TodayResponse = get_json(&client, format!("{}/api/today", server.base_url)).await;

    for mood in [
        serde_json::json!(0),
        serde_json::json!(6),
        serde_json::json!(300),
        serde_json::json!(-1),
        serde_json::json!(2.5),
        serde_json::json!("three"),
    ] {
        let response = client
            .post(format!("{}/api/entries", server.base_url))
            .json(&serde_json::json!({ "mood": mood, "note": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            reqwest::StatusCode::BAD_REQUEST,
            "mood {mood} should be rejected"
        );
    }

    let response = client
        .post(format!("{}/mood", server.base_url))
        .form(&[("mood", "9"), ("note", "x")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/mood", server.base_url))
        .form(&[("mood", "-1")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let after: TodayResponse = get_json(&client, format!("{}/api/today", server.base_url)).await;
    assert_eq!(
        before.entry.map(|e| (e.id, e.mood)),
        after.entry.map(|e| (e.id, e.mood))
    );
}

#[tokio::test]
async fn http_insights_cover_last_seven_days() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/entries", server.base_url))
        .json(&serde_json::json!({ "mood": 3 }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let insights: InsightsResponse =
        get_json(&client, format!("{}/api/insights", server.base_url)).await;
    assert!(insights.total_entries >= 1);
    assert!(insights.average_mood.is_some());
    assert_eq!(insights.last_7_days.len(), 7);

    let dates: Vec<_> = insights.last_7_days.iter().map(|d| d.date.clone()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let last = insights.last_7_days.last().unwrap();
    assert!(last.has_entry);
    assert_eq!(last.mood, 3);
    assert!(insights
        .last_7_days
        .iter()
        .filter(|d| !d.has_entry)
        .all(|d| d.mood == 0));
}

#[tokio::test]
async fn http_form_post_redirects_home() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(format!("{}/mood", server.base_url))
        .form(&[("mood", "4"), ("note", "form note")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let today: TodayResponse = get_json(&client, format!("{}/api/today", server.base_url)).await;
    let entry = today.entry.expect("entry for today");
    assert_eq!(entry.mood, 4);
    assert_eq!(entry.note.as_deref(), Some("form note"));

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Update Today's Mood"));
    assert!(page.contains("form note"));
}
