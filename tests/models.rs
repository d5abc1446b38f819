use declarest::config::{maximum_length, minimum_value, required};
use declarest::{
    ColumnDefinition, ColumnKind, Columns, ConfigError, MemoryBackend, ModelSchema, Models, SortDirection,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn posts() -> Models {
    let definitions = vec![
        (
            "title".to_string(),
            ColumnDefinition::new(ColumnKind::String).with_requirements(vec![required(), maximum_length(20)]),
        ),
        ("score".to_string(), ColumnDefinition::new(ColumnKind::Integer)),
        ("published_at".to_string(), ColumnDefinition::new(ColumnKind::DateTime)),
    ];
    let overrides = vec![(
        "score".to_string(),
        ColumnDefinition::requirements_only(vec![minimum_value(0.0)]),
    )];
    let columns = Columns::configure(&definitions, &overrides).unwrap();
    Models::new(
        ModelSchema::new("posts", columns).with_table_name("blog_posts"),
        Arc::new(MemoryBackend::new()),
    )
}

async fn seeded() -> Models {
    let posts = posts();
    for (title, score) in [("first", 3), ("second", 10), ("third", 7)] {
        posts.create(object(json!({"title": title, "score": score}))).await.unwrap();
    }
    posts
}

#[tokio::test]
async fn creates_with_generated_ids() {
    let posts = seeded().await;
    let ids: Vec<Value> = posts
        .records()
        .await
        .unwrap()
        .iter()
        .map(|p| p.id().cloned().unwrap())
        .collect();
    assert_eq!(vec![json!(1), json!(2), json!(3)], ids);
    assert_eq!(3, posts.count().await.unwrap());
}

#[tokio::test]
async fn filters_sorts_and_finds() {
    let posts = seeded().await;
    let high: Vec<Value> = posts
        .where_("score>=5")
        .unwrap()
        .sort_by("score", SortDirection::Desc)
        .unwrap()
        .records()
        .await
        .unwrap()
        .iter()
        .map(|p| p.get("title"))
        .collect();
    assert_eq!(vec![json!("second"), json!("third")], high);

    let third = posts.find("title=third").await.unwrap().unwrap();
    assert_eq!(json!(7), third.get("score"));
    assert!(posts.find("title=missing").await.unwrap().is_none());

    let first = posts.sort_by("title", SortDirection::Asc).unwrap().first().await.unwrap().unwrap();
    assert_eq!(json!("first"), first.get("title"));
}

#[tokio::test]
async fn rejects_unknown_columns() {
    let posts = posts();
    assert_eq!(
        ConfigError::UnknownColumn {
            model: "posts".to_string(),
            column: "author".to_string(),
        },
        posts.where_("author=me").unwrap_err()
    );
    assert!(posts.sort_by("author", SortDirection::Asc).is_err());
    assert!(posts.where_("id=1").is_ok());
}

#[tokio::test]
async fn refining_leaves_the_base_query_alone() {
    let posts = seeded().await;
    let refined = posts.where_("score<5").unwrap().limit(1);
    assert_eq!(1, refined.count().await.unwrap());
    assert_eq!(3, posts.count().await.unwrap());
    assert!(posts.query().wheres.is_empty());
}

#[tokio::test]
async fn saves_updates_and_deletes() {
    let posts = posts();
    let mut post = posts
        .create(object(json!({"title": "draft", "score": "4", "published_at": "2024-03-01T12:00:00+02:00"})))
        .await
        .unwrap();
    assert!(post.exists());
    assert_eq!(json!(4), post.raw_data()["score"]);
    assert_eq!(json!("2024-03-01T10:00:00Z"), post.raw_data()["published_at"]);

    post.save(object(json!({"title": "final"}))).await.unwrap();
    let stored = posts.find("title=final").await.unwrap().unwrap();
    assert_eq!(post.id(), stored.id());
    assert_eq!(json!(4), stored.get("score"));

    post.delete().await.unwrap();
    assert!(!post.exists());
    assert_eq!(0, posts.count().await.unwrap());
    assert!(post.delete().await.is_err());
}

#[tokio::test]
async fn validates_input_for_creates_and_updates() {
    let posts = posts();
    let new_post = posts.empty_model();
    let errors = new_post.input_errors(&object(json!({"score": -1})));
    assert_eq!("'title' is required.", errors["title"]);
    assert_eq!("'score' must be at least 0.", errors["score"]);

    let errors = new_post.input_errors(&object(json!({"title": "x".repeat(21), "published_at": "yesterday"})));
    assert_eq!("'title' must be at most 20 characters long.", errors["title"]);
    assert_eq!(
        "Invalid input: published_at must be a date/time in RFC 3339 format",
        errors["published_at"]
    );

    let existing = posts.create(object(json!({"title": "kept"}))).await.unwrap();
    assert!(existing.input_errors(&object(json!({"score": 2}))).is_empty());
}
