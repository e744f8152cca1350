mod common;

use common::{Admin, Order, Stray, User, context};
use docrepo::{async_trait, memory::InMemoryStore, prelude::*};
use std::sync::Arc;

#[tokio::test]
async fn collection_handle_is_cached_per_type() {
    let ctx = context("ctx_cache");

    let first = ctx.collection::<User>().unwrap();
    let second = ctx.collection::<User>().unwrap();
    let admins = ctx.collection::<Admin>().unwrap();

    assert!(first.same_handle(&second));
    assert_eq!(first.name(), "users");
    assert_eq!(admins.name(), "users");
}

#[tokio::test]
async fn unregistered_type_has_no_collection() {
    let ctx = context("ctx_unregistered");

    match ctx.collection::<Stray>() {
        Err(DocumentStoreError::CollectionNotRegistered(name)) => assert_eq!(name, "Stray"),
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn create_collections_is_idempotent() {
    let ctx = context("ctx_create");

    assert!(!ctx.check_collection_exists::<User>().await.unwrap());

    ctx.create_collections().await.unwrap();
    ctx.create_collections().await.unwrap();

    let mut names = ctx.backend().list_collections().await.unwrap();
    names.sort();
    assert_eq!(names, vec!["orders".to_string(), "users".to_string()]);
    assert!(ctx.check_collection_exists::<User>().await.unwrap());
    assert!(ctx.check_collection_exists::<Admin>().await.unwrap());
}

#[tokio::test]
async fn create_collections_keeps_existing_data() {
    let ctx = context("ctx_keep");
    let users = BaseRepository::<_, User>::new(Arc::clone(&ctx));
    let mut alice = User::new("alice", 31);
    users.insert_one(&mut alice).await.unwrap();

    ctx.create_collections().await.unwrap();

    assert_eq!(users.count_all().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_collection_drops_documents() {
    let ctx = context("ctx_drop");
    ctx.create_collections().await.unwrap();
    let orders = BaseRepository::<_, Order>::new(Arc::clone(&ctx));
    let mut order = Order { id: orders.empty_id(), total: 12 };
    orders.insert_one(&mut order).await.unwrap();

    ctx.delete_collection::<Order>().await.unwrap();

    assert!(!ctx.check_collection_exists::<Order>().await.unwrap());
    assert_eq!(orders.count_all().await.unwrap(), 0);
    ctx.delete_collection::<Order>().await.unwrap();
}

struct AppIndices;

#[async_trait]
impl<B: StoreBackend + 'static> IndexFactory<B> for AppIndices {
    async fn create_indices(&self, ctx: &DbContext<B>) -> DocumentStoreResult<()> {
        ctx.create_index::<User>(IndexSpec::ascending("name").unique()).await?;
        ctx.create_index::<Order>(
            IndexSpec::descending("total")
                .then("_id", IndexOrder::Ascending)
                .named("by_total"),
        )
        .await
    }
}

#[tokio::test]
async fn index_factory_creates_indices_through_the_context() {
    let ctx = context("ctx_indices");

    ctx.create_indices(&AppIndices).await.unwrap();

    let users = ctx.backend().indexes("users").await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].index_name(), "name_1");
    assert!(users[0].unique);
    assert_eq!(ctx.backend().indexes("orders").await[0].index_name(), "by_total");
}

#[tokio::test]
async fn sessions_are_distinct() {
    let ctx = context("ctx_sessions");

    let first = ctx.start_transaction_session().await.unwrap();
    let second = ctx.start_transaction_session().await.unwrap();

    assert_ne!(first, second);
}

#[test]
fn session_can_be_started_without_a_runtime() {
    let ctx = context("ctx_sessions_sync");

    let session = ctx.start_transaction_session_sync().unwrap();

    assert_eq!(session.id, 1);
}

#[test]
fn one_context_per_database_per_factory() {
    common::init_tracing();
    let factory = DbContextFactory::new();

    let first = factory
        .builder(InMemoryStore::new("ctx_unique"))
        .registry(common::collections())
        .build();
    let second = factory
        .builder(InMemoryStore::new("ctx_unique"))
        .registry(common::collections())
        .build();

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(DocumentStoreError::DatabaseAlreadyInitialized(name)) if name == "ctx_unique"
    ));
    assert_eq!(factory.initialized_databases(), vec!["ctx_unique".to_string()]);
}

#[test]
fn context_exposes_registered_collections() {
    let ctx = context("ctx_introspection");

    assert_eq!(ctx.database_name(), "ctx_introspection");
    assert_eq!(ctx.collection_names(), vec!["users", "orders"]);
    assert_eq!(
        ctx.collection_kinds(),
        vec![DocumentKind::of::<User>(), DocumentKind::of::<Order>()]
    );
    assert_eq!(ctx.collection_name::<Admin>().unwrap(), "users");
}

#[tokio::test]
async fn shutdown_requires_released_handles() {
    let held = context("ctx_shutdown_held");
    let handle = held.collection::<User>().unwrap();
    let ctx = Arc::try_unwrap(held).unwrap();

    assert!(matches!(ctx.shutdown().await, Err(DocumentStoreError::Backend(_))));
    drop(handle);

    let ctx = Arc::try_unwrap(context("ctx_shutdown")).unwrap();
    ctx.collection::<User>().unwrap();
    ctx.shutdown().await.unwrap();
}
