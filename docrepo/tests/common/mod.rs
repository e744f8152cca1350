#![allow(dead_code)]

use docrepo::{memory::InMemoryStore, prelude::*};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub age: i32,
}

impl User {
    pub fn new(name: &str, age: i32) -> Self {
        Self { id: docrepo::id::empty_id(), name: name.to_string(), age }
    }
}

impl Document for User {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }
}

/// Stored alongside `User` through a declared lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub age: i32,
    pub level: u8,
}

impl Document for Admin {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub total: i64,
}

impl Document for Order {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }
}

/// Never registered with any context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stray {
    #[serde(rename = "_id")]
    pub id: ObjectId,
}

impl Document for Stray {
    fn id(&self) -> &ObjectId {
        &self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn collections() -> CollectionRegistry {
    CollectionRegistry::builder()
        .register::<User>("users")
        .register::<Order>("orders")
        .extends::<Admin, User>()
        .build()
        .unwrap()
}

pub fn context(database: &str) -> Arc<DbContext<InMemoryStore>> {
    init_tracing();

    Arc::new(
        DbContextFactory::new()
            .builder(InMemoryStore::new(database))
            .registry(collections())
            .build()
            .unwrap(),
    )
}
