//! Router 级测试：经过完整中间件栈

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

use super::{build_router, AppPorts, AppSettings, AppState, ServerConfig};
use crate::infrastructure::adapters::capture::pcm16_wav;
use crate::infrastructure::adapters::{
    FakeSpeechRecognizer, FileAudioStorage, SymphoniaMetadataProbe,
};
use crate::infrastructure::memory::InMemorySessionStore;
use crate::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteMusicFileRepository,
    SqlitePlaybackPositionRepository, SqliteVoiceCommandRepository,
};
use crate::infrastructure::worker::{TranscriptionWorker, TranscriptionWorkerConfig};

const BOUNDARY: &str = "melo-test-boundary";

struct TestApp {
    _dir: TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_recognizer(FakeSpeechRecognizer::transcript("再生して")).await
    }

    async fn with_recognizer(recognizer: FakeSpeechRecognizer) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let (worker, queue) =
            TranscriptionWorker::new(TranscriptionWorkerConfig::default(), Arc::new(recognizer));
        tokio::spawn(worker.run());

        let ports = AppPorts {
            session_store: Arc::new(InMemorySessionStore::new()),
            music_repo: Arc::new(SqliteMusicFileRepository::new(pool.clone())),
            position_repo: Arc::new(SqlitePlaybackPositionRepository::new(pool.clone())),
            voice_command_repo: Arc::new(SqliteVoiceCommandRepository::new(pool)),
            storage: Arc::new(FileAudioStorage::new(dir.path()).await.unwrap()),
            metadata: Arc::new(SymphoniaMetadataProbe::new()),
            transcription_queue: Arc::new(queue),
        };
        let state = AppState::new(ports, AppSettings::default());
        let router = build_router(&ServerConfig::default(), Arc::new(state));

        Self { _dir: dir, router }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        (status, cookie, body)
    }

    async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// 发起一次请求拿到会话 cookie
    async fn new_session(&self) -> String {
        let (_, cookie, _) = self.send(get("/api/ping", None)).await;
        cookie.unwrap()
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, cookie, Body::empty())
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

fn json_request(method: Method, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_upload(uri: &str, cookie: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn one_second_wav() -> Vec<u8> {
    pcm16_wav(16000, 1, &vec![0i16; 16000])
}

#[tokio::test]
async fn test_ping_and_test_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.json(get("/api/ping", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.json(get("/api/test", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API is working!");
}

#[tokio::test]
async fn test_session_cookie_issued_once() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;
    assert!(cookie.starts_with("melo_session="));

    let (_, again, _) = app.send(get("/api/files", Some(&cookie))).await;
    assert!(again.is_none());
}

#[tokio::test]
async fn test_upload_retrieve_delete_flow() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;
    let wav = one_second_wav();

    let (status, body) = app
        .json(multipart_upload("/api/upload", &cookie, "Song.WAV", &wav))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "ファイルが正常にアップロードされました");
    assert_eq!(body["file"]["title"], "Song.WAV");
    assert_eq!(body["file"]["duration"], 1);
    assert_eq!(body["file"]["file_size"], wav.len() as u64);
    assert_eq!(body["file"]["storage"], "inline");
    assert!(body["file"].get("file_base64").is_none());

    let file_id = body["file"]["id"].as_str().unwrap().to_string();
    assert!(body["file"]["filename"].as_str().unwrap().ends_with(".wav"));

    let (status, body) = app
        .json(get(&format!("/api/file-data/{}", file_id), Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file_base64"], STANDARD.encode(&wav));
    assert_eq!(body["file_info"]["id"], file_id.as_str());

    // 其他会话不可见
    let other = app.new_session().await;
    let (status, body) = app
        .json(get(&format!("/api/file-data/{}", file_id), Some(&other)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ファイルが見つかりません");

    let uri = format!("/api/delete/{}", file_id);
    let (status, body) = app
        .json(request(Method::DELETE, &uri, Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ファイルが削除されました");

    let (status, _) = app
        .json(request(Method::DELETE, &uri, Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_second_upload_replaces_first() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;

    let (_, first) = app
        .json(multipart_upload("/api/upload", &cookie, "a.wav", &one_second_wav()))
        .await;
    let (_, second) = app
        .json(multipart_upload("/api/upload", &cookie, "b.wav", &one_second_wav()))
        .await;

    let (_, body) = app.json(get("/api/files", Some(&cookie))).await;
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], second["file"]["id"]);

    let (status, _) = app
        .json(get(
            &format!("/api/file-data/{}", first["file"]["id"].as_str().unwrap()),
            Some(&cookie),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_validation_errors() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;

    let (status, body) = app
        .json(multipart_upload("/api/upload", &cookie, "notes.txt", b"hello"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "対応していないファイル形式です: txt");

    // 音乐库不接受 ogg
    let (status, _) = app
        .json(multipart_upload("/api/library/upload", &cookie, "a.ogg", b"OggS"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let empty_form = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::COOKIE, &cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(format!("--{}--\r\n", BOUNDARY)))
        .unwrap();
    let (status, body) = app.json(empty_form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ファイルが選択されていません");

    let too_big = vec![0u8; 12 * 1024 * 1024 + 1];
    let (status, _) = app
        .json(multipart_upload("/api/upload", &cookie, "big.mp3", &too_big))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lightweight_upload_streams_media() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;
    let wav = one_second_wav();

    let (status, body) = app
        .json(multipart_upload("/api/upload-lightweight", &cookie, "voice.wav", &wav))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file"]["storage"], "filesystem");
    let file_id = body["file"]["id"].as_str().unwrap().to_string();
    let filename = body["file"]["filename"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(get(&format!("/api/file-url/{}", file_id), Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["file_url"].as_str().unwrap().to_string();
    assert_eq!(url, format!("/media/temp_uploads/{}", filename));

    let (status, _, bytes) = app.send(get(&url, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, wav);

    // file-data 从磁盘读取
    let (_, body) = app
        .json(get(&format!("/api/file-data/{}", file_id), Some(&cookie)))
        .await;
    assert_eq!(body["file_base64"], STANDARD.encode(&wav));

    let other = app.new_session().await;
    let (status, _, _) = app.send(get(&url, Some(&other))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inline_file_has_no_url() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;

    let (_, body) = app
        .json(multipart_upload("/api/upload", &cookie, "a.wav", &one_second_wav()))
        .await;
    let file_id = body["file"]["id"].as_str().unwrap();

    let (status, _) = app
        .json(get(&format!("/api/file-url/{}", file_id), Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_playback_position() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;

    let (status, body) = app.json(get("/api/get-position/song-1", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"], 0.0);
    assert!(body.get("last_played_at").is_none());

    let (status, body) = app
        .json(json_request(
            Method::POST,
            "/api/save-position",
            &cookie,
            json!({"music_file_id": "song-1", "position": 42.5}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"], 42.5);

    app.json(json_request(
        Method::POST,
        "/api/save-position",
        &cookie,
        json!({"file_id": "song-1", "position": 90.0}),
    ))
    .await;

    let (_, body) = app.json(get("/api/get-position/song-1", Some(&cookie))).await;
    assert_eq!(body["position"], 90.0);
    assert!(body["last_played_at"].is_string());

    // 其他会话看不到
    let other = app.new_session().await;
    let (_, body) = app.json(get("/api/get-position/song-1", Some(&other))).await;
    assert_eq!(body["position"], 0.0);

    let (status, body) = app
        .json(json_request(
            Method::POST,
            "/api/save-position",
            &cookie,
            json!({"position": 1.0}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "file_id is required");
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;
    let raw = |uri: &str, content_type: &str, body: &'static str| {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::COOKIE, cookie.as_str())
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    };

    // 语法错误、类型不符、缺少 Content-Type 都按 400 `{error}` 返回
    let cases = [
        ("/api/save-position", "application/json", "{not json"),
        (
            "/api/save-position",
            "application/json",
            r#"{"file_id": "a", "position": "x"}"#,
        ),
        (
            "/api/save-position",
            "text/plain",
            r#"{"file_id": "a", "position": 1.0}"#,
        ),
        ("/api/admin/voice-commands", "application/json", "[1, 2"),
    ];
    for (uri, content_type, body) in cases {
        let (status, body) = app.json(raw(uri, content_type, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, content_type);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_cleanup_removes_files_and_positions() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;

    let (_, body) = app
        .json(multipart_upload("/api/upload-lightweight", &cookie, "a.wav", &one_second_wav()))
        .await;
    let url = format!("/media/temp_uploads/{}", body["file"]["filename"].as_str().unwrap());
    app.json(json_request(
        Method::POST,
        "/api/save-position",
        &cookie,
        json!({"file_id": "a", "position": 3.0}),
    ))
    .await;

    let (status, body) = app
        .json(request(Method::POST, "/api/cleanup", Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "セッションファイルがクリーンアップされました");

    let (_, body) = app.json(get("/api/files", Some(&cookie))).await;
    assert!(body["files"].as_array().unwrap().is_empty());
    let (_, body) = app.json(get("/api/get-position/a", Some(&cookie))).await;
    assert_eq!(body["position"], 0.0);
    let (status, _, _) = app.send(get(&url, Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn voice_request(cookie: &str, data: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/voice-command")
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "audio/wav")
        .body(Body::from(data))
        .unwrap()
}

#[tokio::test]
async fn test_voice_command_dispatch() {
    let recognizer = FakeSpeechRecognizer::transcript("もどってください");
    let app = TestApp::with_recognizer(recognizer).await;
    let cookie = app.new_session().await;

    let (status, body) = app.json(voice_request(&cookie, one_second_wav())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["command"], "go_back");
    assert_eq!(body["message"], "前回再生位置に戻ります");
}

#[tokio::test]
async fn test_voice_command_rejections() {
    let app = TestApp::with_recognizer(FakeSpeechRecognizer::transcript("こんにちは")).await;
    let cookie = app.new_session().await;

    let (status, body) = app.json(voice_request(&cookie, one_second_wav())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "認識された音声: \"こんにちは\" は対応していないコマンドです"
    );

    // 空请求体视为没有语音
    let (status, body) = app.json(voice_request(&cookie, Vec::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "音声を認識できませんでした");

    let app = TestApp::with_recognizer(FakeSpeechRecognizer::service_error("quota")).await;
    let (status, body) = app.json(voice_request(&cookie, one_second_wav())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "音声認識サービスでエラーが発生しました: quota");
}

#[tokio::test]
async fn test_library_flow() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;
    let wav = one_second_wav();

    let (status, first) = app
        .json(multipart_upload("/api/library/upload", &cookie, "first.wav", &wav))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = app
        .json(multipart_upload("/api/library/upload", &cookie, "second.flac", &wav))
        .await;

    let (_, body) = app.json(get("/api/library", Some(&cookie))).await;
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["id"], second["file"]["id"]);
    assert_eq!(files[1]["id"], first["file"]["id"]);

    let first_id = first["file"]["id"].as_str().unwrap();
    let (status, body) = app
        .json(get(&format!("/api/library/{}/url", first_id), Some(&cookie)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["file_url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/music/"));

    // 音乐库不按会话隔离
    let other = app.new_session().await;
    let (status, _, bytes) = app.send(get(&url, Some(&other))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, wav);

    let uri = format!("/api/library/{}", first_id);
    let (status, _) = app
        .json(request(Method::DELETE, &uri, Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .json(request(Method::DELETE, &uri, Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.json(get("/api/library", Some(&cookie))).await;
    assert_eq!(body["files"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_voice_command_admin() {
    let app = TestApp::new().await;
    let cookie = app.new_session().await;
    let mapping = json!({"command": "つぎ", "action": "next", "owner": "alice"});

    let (status, body) = app
        .json(json_request(
            Method::POST,
            "/api/admin/voice-commands",
            &cookie,
            mapping.clone(),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["command"]["is_active"], true);
    let id = body["command"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .json(json_request(
            Method::POST,
            "/api/admin/voice-commands",
            &cookie,
            mapping,
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .json(json_request(
            Method::POST,
            "/api/admin/voice-commands",
            &cookie,
            json!({"command": "", "action": "next", "owner": "alice"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, body) = app
        .json(get("/api/admin/voice-commands?owner=alice", Some(&cookie)))
        .await;
    assert_eq!(body["commands"].as_array().unwrap().len(), 1);
    let (_, body) = app
        .json(get("/api/admin/voice-commands?owner=bob", Some(&cookie)))
        .await;
    assert!(body["commands"].as_array().unwrap().is_empty());

    let uri = format!("/api/admin/voice-commands/{}", id);
    let (status, _) = app
        .json(request(Method::DELETE, &uri, Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .json(request(Method::DELETE, &uri, Some(&cookie), Body::empty()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
