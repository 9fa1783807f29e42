#![allow(clippy::result_large_err)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router, extract::Path};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use backoffice::gateway::{MutationCommand, MutationResponse, UploadResponse};
use backoffice::model::{EntityId, ResourceKind};

#[path = "backoffice_fixture/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "backoffice_fixture/store.rs"]
mod store;
use self::store::*;
#[path = "backoffice_fixture/seed.rs"]
mod seed;
#[path = "backoffice_fixture/handlers.rs"]
mod handlers;
use self::handlers::*;
#[path = "backoffice_fixture/routes.rs"]
mod routes;
#[path = "backoffice_fixture/runtime.rs"]
mod runtime;

struct AppState {
    dev_token: String,
    store: RwLock<Store>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
