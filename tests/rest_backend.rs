use async_trait::async_trait;
use declarest::query::Condition;
use declarest::{
    ApiClient, AppError, Authentication, BackendError, ColumnDefinition, ColumnKind, Columns, ConfigError, InputOutput,
    ModelSchema, Models, RestfulApiAdvancedSearchBackend, SortDirection,
};
use mockito::{Matcher, Server};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn users(base_url: &str) -> Models {
    users_with(ApiClient::new(base_url))
}

fn users_with(api: ApiClient) -> Models {
    let columns = Columns::configure(
        &[
            ("id".to_string(), ColumnDefinition::new(ColumnKind::Integer)),
            ("name".to_string(), ColumnDefinition::new(ColumnKind::String)),
            ("age".to_string(), ColumnDefinition::new(ColumnKind::Integer)),
        ],
        &[],
    )
    .unwrap();
    Models::new(
        ModelSchema::new("users", columns),
        Arc::new(RestfulApiAdvancedSearchBackend::new(api)),
    )
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn searches_with_the_query_as_post_body() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("POST", "/users/search")
        .match_body(Matcher::Json(json!({
            "where": [{"column": "age", "operator": "<", "value": 7}],
            "sort": [{"column": "name", "direction": "DESC"}],
            "limit": 2
        })))
        .with_header("content-type", "application/json")
        .with_body(json!({"status": "success", "data": [{"id": 1, "name": "b"}, {"id": 2, "name": "a"}]}).to_string())
        .create_async()
        .await;

    let (records, next_page) = users(&server.url())
        .where_condition(Condition::new("age", "<", vec![json!(7)]))
        .unwrap()
        .sort_by("name", SortDirection::Desc)
        .unwrap()
        .limit(2)
        .records_with_next_page()
        .await
        .unwrap();

    search.assert_async().await;
    assert_eq!(2, records.len());
    assert_eq!(json!("b"), records[0].get("name"));
    assert_eq!(json!({"start": 2}), Value::Object(next_page));
}

#[tokio::test]
async fn short_page_has_no_next_page() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/users/search")
        .match_body(Matcher::Json(json!({"start": 4, "limit": 2})))
        .with_body(json!({"data": [{"id": 5, "name": "e"}]}).to_string())
        .create_async()
        .await;

    let (records, next_page) = users(&server.url())
        .limit(2)
        .pagination(object(json!({"start": 4})))
        .records_with_next_page()
        .await
        .unwrap();
    assert_eq!(1, records.len());
    assert!(next_page.is_empty());
}

#[tokio::test]
async fn last_possible_start_has_no_next_page() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/users/search")
        .match_body(Matcher::Json(json!({"start": u64::MAX, "limit": 1})))
        .with_body(json!({"data": [{"id": 5, "name": "e"}]}).to_string())
        .create_async()
        .await;

    let (records, next_page) = users(&server.url())
        .limit(1)
        .pagination(object(json!({"start": u64::MAX})))
        .records_with_next_page()
        .await
        .unwrap();
    assert_eq!(1, records.len());
    assert!(next_page.is_empty());
}

#[tokio::test]
async fn counts_with_count_only() {
    let mut server = Server::new_async().await;
    let count = server
        .mock("POST", "/users/search")
        .match_body(Matcher::Json(json!({
            "count_only": true,
            "where": [{"column": "name", "operator": "=", "value": "ronoc"}]
        })))
        .with_body(json!({"total_matches": 3}).to_string())
        .create_async()
        .await;

    let total = users(&server.url()).where_("name=ronoc").unwrap().count().await.unwrap();
    count.assert_async().await;
    assert_eq!(3, total);
}

#[tokio::test]
async fn creates_updates_and_deletes() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/users")
        .match_body(Matcher::Json(json!({"name": "ronoc", "age": 6})))
        .with_body(json!({"status": "success", "data": {"id": 10, "name": "ronoc", "age": 6}}).to_string())
        .create_async()
        .await;
    let update = server
        .mock("PATCH", "/users/10")
        .match_body(Matcher::Json(json!({"age": 7})))
        .with_body(json!({"status": "success", "data": {"id": 10, "name": "ronoc", "age": 7}}).to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/users/10")
        .with_body(json!({"status": "success"}).to_string())
        .create_async()
        .await;

    let mut user = users(&server.url())
        .create(object(json!({"name": "ronoc", "age": "6"})))
        .await
        .unwrap();
    assert_eq!(Some(&json!(10)), user.id());

    user.save(object(json!({"age": 7}))).await.unwrap();
    assert_eq!(json!(7), user.get("age"));

    user.delete().await.unwrap();
    assert!(!user.exists());

    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn empty_update_response_keeps_the_sent_data() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/users")
        .with_body(json!({"data": {"id": 3, "name": "conor", "age": 8}}).to_string())
        .create_async()
        .await;
    server.mock("PATCH", "/users/3").with_status(204).create_async().await;

    let mut user = users(&server.url())
        .create(object(json!({"name": "conor", "age": 8})))
        .await
        .unwrap();
    user.save(object(json!({"name": "ronoc"}))).await.unwrap();
    assert_eq!(json!({"id": 3, "name": "ronoc", "age": 8}), Value::Object(user.data()));
}

#[tokio::test]
async fn reports_unexpected_responses() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/users/search")
        .with_body(json!({"total": 3}).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/users")
        .with_status(422)
        .with_body("nope")
        .create_async()
        .await;

    let users = users(&server.url());
    let err = users.count().await.unwrap_err();
    assert_eq!("Unexpected API response when executing count request", err.to_string());
    let err = users.records().await.unwrap_err();
    assert_eq!("Unexpected response from records request", err.to_string());

    let err = users.create(object(json!({"name": "x"}))).await.unwrap_err();
    assert!(matches!(err, BackendError::RequestFailed { status: 422, .. }), "{:?}", err);
}

/// Hands out a new token each time its cache is cleared.
#[derive(Default)]
struct RotatingToken {
    generation: AtomicUsize,
}

#[async_trait]
impl Authentication for RotatingToken {
    async fn authenticate(&self, _: &mut InputOutput) -> Result<bool, AppError> {
        Ok(true)
    }

    fn headers(&self) -> Result<Vec<(String, String)>, ConfigError> {
        let generation = self.generation.load(Ordering::SeqCst);
        Ok(vec![("Authorization".to_string(), format!("Bearer token-{}", generation))])
    }

    fn clear_credential_cache(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn retries_once_with_fresh_credentials() {
    let mut server = Server::new_async().await;
    let stale = server
        .mock("POST", "/users/search")
        .match_header("authorization", "Bearer token-0")
        .with_status(401)
        .create_async()
        .await;
    let fresh = server
        .mock("POST", "/users/search")
        .match_header("authorization", "Bearer token-1")
        .with_body(json!({"data": []}).to_string())
        .create_async()
        .await;

    let token = Arc::new(RotatingToken::default());
    let users = users_with(ApiClient::new(server.url()).with_authentication(token.clone()));
    assert!(users.records().await.unwrap().is_empty());

    stale.assert_async().await;
    fresh.assert_async().await;
    assert_eq!(1, token.generation.load(Ordering::SeqCst));
}

#[tokio::test]
async fn writes_are_not_retried() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/users")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let token = Arc::new(RotatingToken::default());
    let users = users_with(ApiClient::new(server.url()).with_authentication(token.clone()));
    let err = users.create(object(json!({"name": "x"}))).await.unwrap_err();
    assert!(matches!(err, BackendError::RequestFailed { status: 401, .. }));
    create.assert_async().await;
    assert_eq!(0, token.generation.load(Ordering::SeqCst));
}
