//! Tests for the named scope source connector against a live database

use dataflow_source::{
    Model, NamedScopeSource, RecordSource, ScopeQuery, ScopeRegistry, ScopeSelect, SourceError,
};
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
struct Product {
    id: i64,
    name: String,
    active: bool,
    price_cents: i64,
}

impl Model for Product {
    const TABLE: &'static str = "products";
    const PRIMARY_KEY: &'static str = "id";
    const MODEL_CLASS: &'static str = "Product";

    fn primary_key(&self) -> i64 {
        self.id
    }
}

impl Product {
    /// Scope: active - products currently available for sale
    fn active() -> ScopeQuery<Product> {
        ScopeQuery::named("active", |_args| {
            let mut query = ScopeSelect::for_model::<Product>();
            query.condition("products.active = TRUE");
            Ok(query)
        })
    }

    /// Scope: priced_above - products above a price floor
    fn priced_above() -> ScopeQuery<Product> {
        ScopeQuery::named("priced_above", |args| {
            let floor = args.integer(0)?;
            let mut query = ScopeSelect::for_model::<Product>();
            query.condition("products.price_cents > ");
            query.bind(floor);
            Ok(query)
        })
    }
}

async fn seed_products(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE products (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            active BOOLEAN NOT NULL,
            price_cents BIGINT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let rows: [(i64, &str, bool, i64); 6] = [
        (1, "anvil", true, 1000),
        (2, "bellows", true, 2500),
        (3, "crucible", true, 400),
        (4, "die", true, 8000),
        (5, "emery", true, 150),
        (6, "flux", false, 9000),
    ];
    for (id, name, active, price_cents) in rows {
        sqlx::query("INSERT INTO products (id, name, active, price_cents) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(name)
            .bind(active)
            .bind(price_cents)
            .execute(pool)
            .await?;
    }
    Ok(())
}

fn ids(batch: &[Product]) -> Vec<i64> {
    batch.iter().map(Product::primary_key).collect()
}

#[sqlx::test]
async fn iterates_in_batches_of_at_most_two(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::active()), vec![])?;

    let mut batches = source.iterate(&pool, 2, None);
    let mut seen = Vec::new();
    let mut batch_sizes = Vec::new();
    while let Some(batch) = batches.next_batch().await? {
        batch_sizes.push(batch.len());
        seen.extend(ids(&batch));
    }

    // The inactive row (id 6) is outside the scope
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(batch_sizes, vec![2, 2, 1]);
    Ok(())
}

#[sqlx::test]
async fn resumes_strictly_after_the_start_id(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::active()), vec![])?;

    let rows: Vec<Product> = source.iterate(&pool, 2, Some(2)).records().try_collect().await?;
    assert_eq!(ids(&rows), vec![3, 4, 5]);
    Ok(())
}

#[sqlx::test]
async fn exhausted_iterator_keeps_returning_none(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::active()), vec![])?;

    let mut batches = source.iterate(&pool, 10, None);
    assert!(batches.next_batch().await?.is_some());
    assert!(batches.next_batch().await?.is_none());
    assert!(batches.next_batch().await?.is_none());
    Ok(())
}

#[sqlx::test]
async fn empty_scope_yields_no_batches(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::priced_above()), vec![json!(100_000)])?;

    let mut batches = source.iterate(&pool, 2, None);
    assert!(batches.next_batch().await?.is_none());
    Ok(())
}

#[sqlx::test]
async fn scope_params_filter_the_rows(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::priced_above()), vec![json!(1500)])?;

    let rows: Vec<Product> = source.batches(&pool).records().try_collect().await?;
    assert_eq!(ids(&rows), vec![2, 4, 6]);
    Ok(())
}

#[sqlx::test]
async fn cursor_tracks_the_last_row_seen(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::active()), vec![])?;

    let mut batches = source.iterate(&pool, 2, None);
    batches.next_batch().await?;
    assert_eq!(batches.cursor(), Some(2));

    // Resuming from that cursor picks up exactly where the batch stopped
    let rest: Vec<Product> = source
        .iterate(&pool, 2, batches.cursor())
        .records()
        .try_collect()
        .await?;
    assert_eq!(ids(&rest), vec![3, 4, 5]);
    Ok(())
}

#[sqlx::test]
async fn descriptor_round_trip_iterates_identically(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;

    let mut registry = ScopeRegistry::new();
    registry.register::<Product, _>("priced_above", |args| {
        let floor = args.integer(0)?;
        let mut query = ScopeSelect::for_model::<Product>();
        query.condition("products.price_cents > ");
        query.bind(floor);
        Ok(query)
    });

    let original = NamedScopeSource::new(Some(Product::priced_above()), vec![json!(500)])?
        .with_batch_size(2)?;
    let restored = registry.resolve(&original.to_descriptor())?;

    let original_rows: Vec<Value> = RecordSource::iterate(&original, &pool, 2, None)
        .try_collect()
        .await?;
    let restored_rows: Vec<Value> = restored.iterate(&pool, 2, None).try_collect().await?;

    assert!(!original_rows.is_empty());
    assert_eq!(original_rows, restored_rows);
    assert_eq!(restored.to_descriptor(), original.to_descriptor());
    Ok(())
}

#[sqlx::test]
async fn erased_rows_are_flat_json_objects(pool: PgPool) -> Result<(), SourceError> {
    seed_products(&pool).await?;
    let source = NamedScopeSource::new(Some(Product::active()), vec![])?;

    let rows: Vec<Value> = RecordSource::iterate(&source, &pool, 3, Some(4))
        .try_collect()
        .await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(5));
    assert_eq!(rows[0]["name"], json!("emery"));
    Ok(())
}
