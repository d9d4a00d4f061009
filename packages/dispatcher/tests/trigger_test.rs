//! Integration tests for the trigger endpoint.
//!
//! The dispatcher router runs against local fakes of the FCM and Firestore
//! REST APIs, each bound to an ephemeral port.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::{patch, post},
};
use serde_json::{Value, json};
use tsuchi_dispatcher::{
    domain::{DocumentPath, FcmToken, NotificationRecord, PushError, PushMessage, PushProvider},
    infrastructure::{
        auth::StaticAccessToken,
        push::FcmPushProvider,
        store::{FirestoreNotificationStore, InMemoryNotificationStore},
    },
    ui::{Server, TRIGGER_PATH},
    usecase::DispatchNotificationUseCase,
};

const PROJECT: &str = "demo";
const ACCESS_TOKEN: &str = "test-token";

// ========================================
// Fake Google APIs
// ========================================

#[derive(Debug, Clone)]
struct RecordedRequest {
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    body: Value,
}

/// Records every request and answers with the configured status.
struct FakeGoogleApis {
    fcm_status: StatusCode,
    firestore_status: StatusCode,
    fcm_requests: Mutex<Vec<RecordedRequest>>,
    firestore_requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeGoogleApis {
    fn new(fcm_status: StatusCode, firestore_status: StatusCode) -> Arc<Self> {
        Arc::new(Self {
            fcm_status,
            firestore_status,
            fcm_requests: Mutex::new(Vec::new()),
            firestore_requests: Mutex::new(Vec::new()),
        })
    }

    fn fcm_requests(&self) -> Vec<RecordedRequest> {
        self.fcm_requests.lock().unwrap().clone()
    }

    fn firestore_requests(&self) -> Vec<RecordedRequest> {
        self.firestore_requests.lock().unwrap().clone()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn fake_fcm_send(
    State(fake): State<Arc<FakeGoogleApis>>,
    Path(project): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut requests = fake.fcm_requests.lock().unwrap();
    requests.push(RecordedRequest {
        path: format!("/v1/projects/{}/messages:send", project),
        query: None,
        authorization: authorization(&headers),
        body,
    });

    if fake.fcm_status.is_success() {
        (
            StatusCode::OK,
            Json(json!({"name": format!("projects/{}/messages/{}", project, requests.len())})),
        )
    } else {
        (
            fake.fcm_status,
            Json(json!({
                "error": {
                    "code": fake.fcm_status.as_u16(),
                    "message": "The registration token is not a valid FCM registration token",
                    "status": "INVALID_ARGUMENT"
                }
            })),
        )
    }
}

async fn fake_firestore_patch(
    State(fake): State<Arc<FakeGoogleApis>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    fake.firestore_requests
        .lock()
        .unwrap()
        .push(RecordedRequest {
            path: path.clone(),
            query,
            authorization: authorization(&headers),
            body: body.clone(),
        });

    if fake.firestore_status.is_success() {
        (StatusCode::OK, Json(json!({"name": path, "fields": body["fields"]})))
    } else {
        (
            fake.firestore_status,
            Json(json!({
                "error": {
                    "code": fake.firestore_status.as_u16(),
                    "message": format!("No document to update: {}", path),
                    "status": "NOT_FOUND"
                }
            })),
        )
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Start FCM and Firestore fakes plus the dispatcher wired to them.
/// Returns the dispatcher base URL.
async fn spawn_dispatcher(fake: &Arc<FakeGoogleApis>) -> String {
    let fcm_url = serve(
        Router::new()
            .route("/v1/projects/{project}/messages:send", post(fake_fcm_send))
            .with_state(fake.clone()),
    )
    .await;
    let firestore_url = serve(
        Router::new()
            .route("/v1/{*path}", patch(fake_firestore_patch))
            .with_state(fake.clone()),
    )
    .await;

    let client = reqwest::Client::new();
    let tokens = Arc::new(StaticAccessToken::new(ACCESS_TOKEN));
    let push_provider = Arc::new(FcmPushProvider::new(
        client.clone(),
        &fcm_url,
        PROJECT,
        tokens.clone(),
    ));
    let store = Arc::new(FirestoreNotificationStore::new(client, &firestore_url, tokens));
    let usecase = Arc::new(DispatchNotificationUseCase::new(push_provider, store));

    serve(Server::new(usecase, "notifications".to_string()).router()).await
}

fn document_name(collection: &str, id: &str) -> String {
    format!(
        "projects/{}/databases/(default)/documents/{}/{}",
        PROJECT, collection, id
    )
}

fn created_event(name: &str, fields: Value) -> Value {
    json!({
        "oldValue": {},
        "value": {
            "name": name,
            "fields": fields,
            "createTime": "2024-05-01T09:00:00.000000Z",
            "updateTime": "2024-05-01T09:00:00.000000Z"
        },
        "updateMask": {}
    })
}

fn hi_there_fields() -> Value {
    json!({
        "title": {"stringValue": "Hi"},
        "body": {"stringValue": "There"},
        "fcmToken": {"stringValue": "abc"},
        "data": {"mapValue": {"fields": {"k": {"stringValue": "v"}}}}
    })
}

async fn post_event(base_url: &str, event: &Value) -> StatusCode {
    reqwest::Client::new()
        .post(format!("{}{}", base_url, TRIGGER_PATH))
        .json(event)
        .send()
        .await
        .unwrap()
        .status()
}

// ========================================
// Tests
// ========================================

#[tokio::test]
async fn test_created_notification_is_sent_and_marked() {
    // テスト項目: 作成された通知が FCM に1回送信され、sent が true に部分更新される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let name = document_name("notifications", "n1");

    // when (操作):
    let status = post_event(&base_url, &created_event(&name, hi_there_fields())).await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);

    let fcm_requests = fake.fcm_requests();
    assert_eq!(fcm_requests.len(), 1);
    assert_eq!(fcm_requests[0].path, "/v1/projects/demo/messages:send");
    assert_eq!(
        fcm_requests[0].authorization.as_deref(),
        Some("Bearer test-token")
    );
    assert_eq!(
        fcm_requests[0].body,
        json!({
            "message": {
                "notification": {"title": "Hi", "body": "There"},
                "data": {"k": "v"},
                "token": "abc"
            }
        })
    );

    let firestore_requests = fake.firestore_requests();
    assert_eq!(firestore_requests.len(), 1);
    assert_eq!(firestore_requests[0].path, name);
    let query = firestore_requests[0].query.clone().unwrap_or_default();
    assert!(query.contains("updateMask.fieldPaths=sent"), "{}", query);
    assert!(query.contains("currentDocument.exists=true"), "{}", query);
    assert_eq!(
        firestore_requests[0].body,
        json!({"fields": {"sent": {"booleanValue": true}}})
    );
}

#[tokio::test]
async fn test_notification_without_data_sends_empty_map() {
    // テスト項目: data がない通知は空の data で送信される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let fields = json!({
        "title": {"stringValue": "Hi"},
        "body": {"stringValue": "There"},
        "fcmToken": {"stringValue": "abc"}
    });

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n2"), fields),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    let fcm_requests = fake.fcm_requests();
    assert_eq!(fcm_requests.len(), 1);
    assert_eq!(fcm_requests[0].body["message"]["data"], json!({}));
    assert_eq!(fake.firestore_requests().len(), 1);
}

#[tokio::test]
async fn test_already_sent_notification_is_noop() {
    // テスト項目: sent が true の通知は送信も更新もされない
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let mut fields = hi_there_fields();
    fields["sent"] = json!({"booleanValue": true});

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n3"), fields),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
    assert!(fake.firestore_requests().is_empty());
}

#[tokio::test]
async fn test_provider_rejection_leaves_record_untouched() {
    // テスト項目: FCM が拒否した場合は sent を更新せず、トリガーは成功を返す
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::BAD_REQUEST, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n4"), hi_there_fields()),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fake.fcm_requests().len(), 1);
    assert!(fake.firestore_requests().is_empty());
}

#[tokio::test]
async fn test_store_failure_after_send_is_swallowed() {
    // テスト項目: 送信後の更新失敗はログのみでトリガーは成功を返す
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::NOT_FOUND);
    let base_url = spawn_dispatcher(&fake).await;

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n5"), hi_there_fields()),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fake.fcm_requests().len(), 1);
    assert_eq!(fake.firestore_requests().len(), 1);
}

#[tokio::test]
async fn test_missing_token_is_swallowed() {
    // テスト項目: トークンのない通知は FCM を呼ばずにトリガーは成功を返す
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let fields = json!({"title": {"stringValue": "Hi"}, "body": {"stringValue": "There"}});

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n6"), fields),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
    assert!(fake.firestore_requests().is_empty());
}

#[tokio::test]
async fn test_update_event_is_ignored() {
    // テスト項目: 作成以外のイベント（oldValue あり）は無視される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let name = document_name("notifications", "n7");
    let mut event = created_event(&name, hi_there_fields());
    event["oldValue"] = json!({"name": name, "fields": hi_there_fields()});

    // when (操作):
    let status = post_event(&base_url, &event).await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
}

#[tokio::test]
async fn test_other_collection_is_ignored() {
    // テスト項目: 対象外のコレクションのドキュメントは無視される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("messages", "m1"), hi_there_fields()),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
}

#[tokio::test]
async fn test_document_id_with_reserved_characters_updates_same_document() {
    // テスト項目: ID に ? や # を含むドキュメントでも、同じドキュメントの sent が更新される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let name = document_name("notifications", "victim?x=1#frag");

    // when (操作):
    let status = post_event(&base_url, &created_event(&name, hi_there_fields())).await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fake.fcm_requests().len(), 1);
    let firestore_requests = fake.firestore_requests();
    assert_eq!(firestore_requests.len(), 1);
    assert_eq!(firestore_requests[0].path, name);
    assert_eq!(
        firestore_requests[0].query.as_deref(),
        Some("updateMask.fieldPaths=sent&currentDocument.exists=true")
    );
}

#[tokio::test]
async fn test_subcollection_document_is_ignored() {
    // テスト項目: サブコレクション内の同名コレクションのドキュメントは配信されない
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let name = format!(
        "projects/{}/databases/(default)/documents/users/u1/notifications/n1",
        PROJECT
    );

    // when (操作):
    let status = post_event(&base_url, &created_event(&name, hi_there_fields())).await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
    assert!(fake.firestore_requests().is_empty());
}

#[tokio::test]
async fn test_unrelated_unknown_fields_do_not_block_dispatch() {
    // テスト項目: 無関係なフィールドに NaN や未知の値の種類があっても配信される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let mut fields = hi_there_fields();
    fields["score"] = json!({"doubleValue": "NaN"});
    fields["embedding"] = json!({"vectorValue": {"values": [0.1, 0.2]}});

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n10"), fields),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fake.fcm_requests().len(), 1);
    assert_eq!(fake.firestore_requests().len(), 1);
}

#[tokio::test]
async fn test_empty_token_is_swallowed() {
    // テスト項目: fcmToken が空文字列の通知は FCM を呼ばず、sent も更新しない
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let mut fields = hi_there_fields();
    fields["fcmToken"] = json!({"stringValue": ""});

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n11"), fields),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
    assert!(fake.firestore_requests().is_empty());
}

#[tokio::test]
async fn test_null_old_value_is_treated_as_create() {
    // テスト項目: oldValue が null のイベントは作成イベントとして配信される
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let mut event = created_event(&document_name("notifications", "n12"), hi_there_fields());
    event["oldValue"] = Value::Null;

    // when (操作):
    let status = post_event(&base_url, &event).await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fake.fcm_requests().len(), 1);
    assert_eq!(fake.firestore_requests().len(), 1);
}

#[tokio::test]
async fn test_malformed_payload_is_bad_request() {
    // テスト項目: イベントとして読めないボディは 400 を返す
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;

    // when (操作):
    let status = reqwest::Client::new()
        .post(format!("{}{}", base_url, TRIGGER_PATH))
        .header("content-type", "application/json")
        .body(r#"{"oldValue": {}}"#)
        .send()
        .await
        .unwrap()
        .status();

    // then (期待する結果):
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(fake.fcm_requests().is_empty());
}

#[tokio::test]
async fn test_malformed_record_is_swallowed() {
    // テスト項目: data に文字列以外を含むレコードはログのみで成功を返す
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;
    let mut fields = hi_there_fields();
    fields["data"] = json!({"mapValue": {"fields": {"count": {"integerValue": "3"}}}});

    // when (操作):
    let status = post_event(
        &base_url,
        &created_event(&document_name("notifications", "n8"), fields),
    )
    .await;

    // then (期待する結果):
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(fake.fcm_requests().is_empty());
    assert!(fake.firestore_requests().is_empty());
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let fake = FakeGoogleApis::new(StatusCode::OK, StatusCode::OK);
    let base_url = spawn_dispatcher(&fake).await;

    // when (操作):
    let body: Value = reqwest::get(format!("{}/api/health", base_url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, json!({"status": "ok"}));
}

// ========================================
// In-memory wiring
// ========================================

/// PushProvider that records messages instead of sending them
#[derive(Default)]
struct RecordingPushProvider {
    sent: Mutex<Vec<PushMessage>>,
}

#[async_trait]
impl PushProvider for RecordingPushProvider {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(format!("projects/{}/messages/{}", PROJECT, sent.len()))
    }
}

#[tokio::test]
async fn test_in_memory_store_is_marked_sent() {
    // テスト項目: インメモリストアのレコードが送信後に delivered になる
    // given (前提条件):
    let push_provider = Arc::new(RecordingPushProvider::default());
    let store = Arc::new(InMemoryNotificationStore::new());
    let path = DocumentPath::new(document_name("notifications", "n9")).unwrap();
    let record = NotificationRecord {
        title: Some("Hi".to_string()),
        body: Some("There".to_string()),
        data: Some(BTreeMap::from([("k".to_string(), "v".to_string())])),
        fcm_token: Some(FcmToken::new("abc").unwrap()),
        sent: false,
    };
    store.insert(path.clone(), record.clone()).await;
    let usecase = DispatchNotificationUseCase::new(push_provider.clone(), store.clone());

    // when (操作):
    let first = usecase.execute(&record, &path).await;
    let stored = store.get(&path).await.unwrap();
    let replay = usecase.execute(&stored, &path).await;

    // then (期待する結果): 再実行は保存済みの sent を見て何もしない
    assert!(first.is_delivered());
    assert!(stored.sent);
    assert_eq!(
        replay,
        tsuchi_dispatcher::usecase::DispatchOutcome::AlreadySent
    );
    assert_eq!(push_provider.sent.lock().unwrap().len(), 1);
}
