//! Basic Usage Example
//!
//! Connects with MONGO_DATABASE_URI / MONGO_DATABASE_NAME, fills a scratch
//! collection, pages through it and cleans up.
//!
//! Run with:
//! ```bash
//! MONGO_DATABASE_URI=mongodb://localhost:27017 MONGO_DATABASE_NAME=demo \
//!     cargo run -p mongo-helper --example basic_usage
//! ```

use bson::{doc, oid::ObjectId};
use mongo_helper::{
    Connection, Model, MongoConfig, MongoHelper, QueryBuilder, QueryResult, SortDirection,
    TypedFactory, UnknownFieldPolicy,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Serialize, Deserialize)]
struct Player {
    id: ObjectId,
    name: String,
    score: i32,
}

impl Model for Player {
    fn fields() -> &'static [&'static str] {
        &["id", "name", "score"]
    }

    fn unknown_fields() -> UnknownFieldPolicy {
        UnknownFieldPolicy::Ignore
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .ok();

    let config = MongoConfig::from_env()?;
    let connection = Connection::connect(&config).await?;
    connection.ping().await?;

    let players = MongoHelper::new(&connection, "demo_players", TypedFactory::<Player>::new())?;

    for (name, score) in [("ada", 12), ("bob", 7), ("cyd", 21), ("dee", 3)] {
        players.insert(doc! { "name": name, "score": score }).await?;
    }
    println!("Inserted {} players", players.get_document_count().await?);

    let by_score = QueryBuilder::new()
        .sort("score", SortDirection::Descending)
        .page_size(2);

    for page in 1.. {
        match players.query(by_score.clone().page(page)).await? {
            QueryResult::NoResults => break,
            result => {
                println!("Page {}:", page);
                for player in result.into_vec() {
                    println!("  {}", serde_json::to_string(&player)?);
                }
            }
        }
    }

    if let QueryResult::First(best) = players
        .query(QueryBuilder::new().sort("score", SortDirection::Descending).first_record(true))
        .await?
    {
        println!("Top scorer: {} ({})", best.name, best.score);
    }

    players.update_one_doc("name", "dee", doc! { "score": 30 }).await?;
    players.delete_one_doc("name", "bob").await?;
    println!("After update/delete: {} players", players.get_document_count().await?);

    players.drop_collection().await?;
    connection.shutdown().await;
    Ok(())
}
