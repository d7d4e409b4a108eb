//! Integration tests against a live MongoDB server.
//!
//! These tests require a MongoDB server to be running.
//! Set MONGO_DATABASE_URI (and optionally MONGO_DATABASE_NAME) and run with
//! `cargo test -p mongo-helper -- --ignored`.

use bson::{doc, oid::ObjectId, Bson, Document as BsonDocument};
use mongo_helper::{
    Connection, Model, MongoConfig, MongoHelper, ModelFactory, QueryBuilder, QueryResult,
    RawDocuments, SortDirection, TypedFactory,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, PartialEq)]
struct Player {
    id: ObjectId,
    name: String,
    score: i32,
}

impl Model for Player {
    fn fields() -> &'static [&'static str] {
        &["id", "name", "score"]
    }
}

fn test_config() -> MongoConfig {
    let uri = std::env::var("MONGO_DATABASE_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let database = std::env::var("MONGO_DATABASE_NAME")
        .unwrap_or_else(|_| "mongo_helper_test".to_string());
    MongoConfig::new(uri, database)
}

async fn helper_for<F: ModelFactory>(
    prefix: &str,
    factory: F,
) -> Result<(Connection, MongoHelper<F>), Box<dyn std::error::Error>> {
    let connection = Connection::connect(&test_config()).await?;
    let name = format!("{}_{}", prefix, ObjectId::new().to_hex());
    let helper = MongoHelper::new(&connection, &name, factory)?;
    Ok((connection, helper))
}

async fn insert_scores<F: ModelFactory>(
    helper: &MongoHelper<F>,
    scores: impl IntoIterator<Item = i32>,
) -> Result<(), Box<dyn std::error::Error>> {
    for score in scores {
        helper
            .insert(doc! { "name": format!("player-{}", score), "score": score })
            .await?;
    }
    Ok(())
}

#[tokio::test]
#[ignore] // Only run with --ignored flag when MongoDB is available
async fn test_insert_and_query_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("round_trip", RawDocuments).await?;

    let inserted_id = helper.insert(doc! { "a": 1, "b": "x" }).await?;

    let result = helper.query(QueryBuilder::new()).await?;
    let records = result.into_vec();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], doc! { "a": 1, "b": "x", "id": inserted_id });

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_sorted_pages_map_to_models() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("players", TypedFactory::<Player>::new()).await?;

    helper.insert(doc! { "name": "a", "score": 5 }).await?;
    helper.insert(doc! { "name": "b", "score": 9 }).await?;

    let query = QueryBuilder::new()
        .sort("score", SortDirection::Descending)
        .page_size(1);

    let page_one = helper.query(query.clone().page(1)).await?.into_vec();
    let page_two = helper.query(query.clone().page(2)).await?.into_vec();
    let page_three = helper.query(query.page(3)).await?;

    assert_eq!(page_one.len(), 1);
    assert_eq!((page_one[0].name.as_str(), page_one[0].score), ("b", 9));
    assert_eq!(page_two.len(), 1);
    assert_eq!((page_two[0].name.as_str(), page_two[0].score), ("a", 5));
    assert_eq!(page_three, QueryResult::NoResults);

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_pages_concatenate_to_larger_page() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("pages", RawDocuments).await?;
    insert_scores(&helper, 0..10).await?;

    let base = QueryBuilder::new().sort("score", SortDirection::Ascending);

    let mut concatenated: Vec<BsonDocument> = Vec::new();
    for page in 1..=3 {
        let records = helper.query(base.clone().page(page).page_size(3)).await?;
        assert!(records.len() <= 3);
        concatenated.extend(records.into_vec());
    }

    let single = helper
        .query(base.page(1).page_size(9))
        .await?
        .into_vec();

    assert_eq!(concatenated.len(), 9);
    assert_eq!(concatenated, single);

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_page_never_exceeds_page_size() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("page_bound", RawDocuments).await?;
    insert_scores(&helper, 0..7).await?;

    for page_size in 1..=8 {
        let filter = doc! { "score": { "$gte": 2 } };
        let result = helper
            .query(QueryBuilder::new().filter(filter).page_size(page_size))
            .await?;
        assert!(result.len() as u64 <= page_size);
    }

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_sort_by_id_matches_primary_key() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("id_sort", RawDocuments).await?;
    insert_scores(&helper, [3, 1, 2]).await?;

    let by_alias = helper
        .query(QueryBuilder::new().sort("id", SortDirection::Descending))
        .await?;
    let by_key = helper
        .query(QueryBuilder::new().sort("_id", SortDirection::Descending))
        .await?;

    assert_eq!(by_alias, by_key);
    assert_eq!(by_alias.len(), 3);

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_no_match_returns_no_results() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("no_match", RawDocuments).await?;
    insert_scores(&helper, [1]).await?;

    let filter = doc! { "score": 100 };
    let result = helper.query(QueryBuilder::new().filter(filter.clone())).await?;
    assert_eq!(result, QueryResult::NoResults);

    let result = helper
        .query(QueryBuilder::new().filter(filter).first_record(true))
        .await?;
    assert_eq!(result, QueryResult::NoResults);

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_first_record_and_projection() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("first", RawDocuments).await?;
    insert_scores(&helper, [4, 8]).await?;

    let result = helper
        .query(
            QueryBuilder::new()
                .sort("score", SortDirection::Descending)
                .returned_fields(["score"])
                .no_cursor_timeout(true)
                .first_record(true),
        )
        .await?;

    match result {
        QueryResult::First(record) => {
            assert_eq!(record.get_i32("score")?, 8);
            assert!(record.contains_key("id"));
            assert!(!record.contains_key("name"));
        }
        other => panic!("Expected a single record, got {:?}", other),
    }

    let err = helper
        .query(QueryBuilder::new().returned_fields(Vec::<String>::new()))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_single_field_helpers() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("helpers", RawDocuments).await?;
    insert_scores(&helper, [10, 20, 30]).await?;

    let found = helper.find_one_by("score", 20).await?.expect("score 20 exists");
    assert_eq!(found.get_str("name")?, "player-20");

    let greater = helper.find_greater_than("score", 20, false).await?.expect("score > 20");
    assert_eq!(greater.get_i32("score")?, 30);
    let greater_eq = helper
        .find_greater_than("score", 30, true)
        .await?
        .expect("score >= 30");
    assert_eq!(greater_eq.get_i32("score")?, 30);
    assert!(helper.find_greater_than("score", 30, false).await?.is_none());

    let less = helper.find_less_than("score", 20, false).await?.expect("score < 20");
    assert_eq!(less.get_i32("score")?, 10);
    assert!(helper.find_less_than("score", 10, false).await?.is_none());
    assert!(helper.find_less_than("score", 10, true).await?.is_some());

    assert_eq!(helper.find(None).await?.len(), 3);
    assert_eq!(helper.find(Some(doc! { "score": { "$gt": 15 } })).await?.len(), 2);
    assert!(helper.find_one(doc! { "score": 30 }).await?.is_some());

    let names = helper
        .find_specific_fields(Some(("score", Bson::Int32(10))), &["name"])
        .await?;
    assert_eq!(names.len(), 1);
    assert!(names[0].contains_key("name"));
    assert!(!names[0].contains_key("score"));

    let all_names = helper.find_specific_fields(None, &["name"]).await?;
    assert_eq!(all_names.len(), 3);
    assert!(helper.find_specific_fields(None, &[]).await.unwrap_err().is_validation());

    let updated = helper
        .update_one_doc("score", 10, doc! { "name": "renamed" })
        .await?;
    assert_eq!(updated.modified_count, 1);
    assert!(helper.find_one_by("name", "renamed").await?.is_some());

    let updated = helper
        .update_many_doc("team", Bson::Null, doc! { "team": "red" })
        .await?;
    assert_eq!(updated.modified_count, 3);

    let deleted = helper.delete_one_doc("score", 20).await?;
    assert_eq!(deleted.deleted_count, 1);
    assert_eq!(helper.get_document_count().await?, 2);

    helper.drop_collection().await?;
    assert_eq!(helper.get_document_count().await?, 0);

    connection.shutdown().await;
    Ok(())
}

#[derive(Serialize)]
struct NewPlayer {
    name: String,
    score: i32,
}

#[tokio::test]
#[ignore]
async fn test_insert_serialized() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("serialized", TypedFactory::<Player>::new()).await?;

    let id = helper
        .insert_serialized(&NewPlayer {
            name: "zed".to_string(),
            score: 42,
        })
        .await?;

    let stored = helper.find_one_by("name", "zed").await?.expect("zed exists");
    assert_eq!(stored.get("_id"), Some(&id));
    assert_eq!(stored.get_i32("score")?, 42);

    match helper.query(QueryBuilder::new().first_record(true)).await? {
        QueryResult::First(player) => {
            assert_eq!(Bson::ObjectId(player.id), id);
            assert_eq!(player.name, "zed");
        }
        other => panic!("expected first record, got {:?}", other),
    }

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_mapping_error_propagates() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, helper) = helper_for("mapping", TypedFactory::<Player>::new()).await?;
    helper.insert(doc! { "name": "a", "score": 1, "team": "red" }).await?;

    let err = helper.query(QueryBuilder::new()).await.unwrap_err();
    assert!(matches!(err, mongo_helper::MongoHelperError::Mapping(_)));

    helper.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}
