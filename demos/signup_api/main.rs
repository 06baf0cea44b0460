//! Signup API guarded by payload validators
//!
//! ```text
//! cargo run --example signup_api
//! curl -X POST localhost:3000/users -H 'content-type: application/json' -d '{"age":"x"}'
//! curl 'localhost:3000/users/search?q=alice'
//! curl localhost:3000/users/not-a-uuid
//! ```

use anyhow::Result;
use axum::Json;
use axum::extract::{Path, Query};
use payload_guard::prelude::*;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const SEARCH_RULES: &str = r#"
options:
  reject_undeclared_fields: true
fields:
  q: { type: string }
  page: { type: string, optional: true }
"#;

async fn create_user(Json(user): Json<Value>) -> Json<Value> {
    Json(json!({ "created": user }))
}

async fn search_users(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({ "query": params, "results": [] }))
}

async fn get_user(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,payload_guard=debug")),
        )
        .init();

    let signup = ValidatorSet::builder()
        .field("name", string_length(1, 64).required())
        .field("email", string().required())
        .field("age", integer().optional())
        .field("newsletter", boolean().optional())
        .build()?;
    let signup = PayloadValidator::new(
        signup,
        ValidationOptions::default()
            .reject_undeclared_fields(true)
            .error_group_key("violations"),
    )?;

    let search = ValidatorConfig::from_yaml_str(SEARCH_RULES)?.build()?;

    let lookup = ValidatorSet::builder()
        .field("id", uuid().required())
        .build()?;
    let lookup = PayloadValidator::with_defaults(lookup);

    let users = Router::new()
        .route("/users", post(create_user))
        .route_layer(signup.into_layer());
    let search = Router::new()
        .route("/users/search", get(search_users))
        .route_layer(search.into_layer());
    let lookup = Router::new()
        .route("/users/{id}", get(get_user))
        .route_layer(lookup.into_layer());

    let app = users
        .merge(search)
        .merge(lookup)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
