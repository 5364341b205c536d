//! Article Site Example
//!
//! This example serves a tiny content site whose article and media pages
//! advertise their related entities and REST representations:
//! - `rel="related"` links for every referenced author, tag and credit
//! - `rel="alternate"` links for every REST format
//! - Tags are only advertised to authenticated users (send `x-user-id`)
//!
//! Try it:
//!   curl -I http://127.0.0.1:3000/node/1
//!   curl -I http://127.0.0.1:3000/node/1?_format=json
//!   curl -I -H "x-user-id: 6f1c2a4e-2b7c-4d8e-9a51-0c3b8f2d1e77" http://127.0.0.1:3000/node/1

use axum::Json;
use axum::http::StatusCode;
use linkhead::prelude::*;
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
base_url: http://127.0.0.1:3000
routes:
  - name: entity.node.canonical
    path: /node/{node}
    methods: [GET, HEAD]
    parameters:
      node: entity:node
  - name: entity.media.canonical
    path: /media/{media}
    methods: [GET, HEAD]
    parameters:
      media: entity:media
  - name: entity.user.canonical
    path: /user/{user}
    methods: [GET, HEAD]
    parameters:
      user: entity:user
  - name: entity.taxonomy_term.canonical
    path: /taxonomy/term/{taxonomy_term}
    methods: [GET, HEAD]
    parameters:
      taxonomy_term: entity:taxonomy_term
fields:
  - entity_type: node
    bundle: article
    fields:
      - { name: uid, type: entity_reference, label: Authored by, base_field: true }
      - { name: field_author, type: entity_reference, label: Author }
      - { name: field_tags, type: entity_reference, label: Tags }
      - { name: field_image, type: entity_reference, label: Image }
  - entity_type: media
    bundle: image
    fields:
      - { name: field_credit, type: entity_reference, label: Photographer }
rest_resources:
  - id: entity.node
    methods:
      GET:
        formats: [json, hal_json, xml]
  - id: entity.media
    methods:
      GET:
        formats: [json]
access:
  default: public
  entities:
    taxonomy_term: authenticated
"#;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,linkhead=debug,tower_http=debug")),
        )
        .init();

    let config = LinkHeaderConfig::from_yaml_str(CONFIG)?;
    let store = InMemoryEntityStore::new();
    populate_test_data(&store)?;

    let links = LinkHeaderBuilder::new()
        .with_config(config)
        .with_entity_loader(store)
        .with_auth_provider(HeaderAuthProvider)
        .build()?;

    let pages = Router::new()
        .route("/node/{node}", get(show_page))
        .route("/media/{media}", get(show_page))
        .route("/user/{user}", get(show_page))
        .route("/taxonomy/term/{taxonomy_term}", get(show_page));

    let app = links
        .apply(pages)
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;

    println!("🚀 Article site running on http://127.0.0.1:3000");
    println!("\n📚 Decorated pages:");
    println!("    GET    /node/{{node}}                     - Article (node 1)");
    println!("    GET    /node/{{node}}?_format=json        - Article as JSON");
    println!("    GET    /media/{{media}}                   - Image (media 7)");
    println!("\n📋 Plain pages:");
    println!("    GET    /user/{{user}}                     - Author profile");
    println!("    GET    /taxonomy/term/{{taxonomy_term}}   - Tag page");
    println!("    GET    /health                          - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Article site stopped");
    Ok(())
}

async fn show_page(
    Path(params): Path<HashMap<String, String>>,
) -> (StatusCode, Json<HashMap<String, String>>) {
    (StatusCode::OK, Json(params))
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

/// Populate the store with an article, its image and the entities they reference
fn populate_test_data(store: &InMemoryEntityStore) -> Result<()> {
    store.insert(
        StoredEntity::new("node", "article", "1")
            .with_reference("uid", EntityReference::new("user", "1"))
            .with_reference("field_author", EntityReference::new("user", "5"))
            .with_reference("field_tags", EntityReference::new("taxonomy_term", "3"))
            .with_reference("field_tags", EntityReference::new("taxonomy_term", "4"))
            .with_reference("field_image", EntityReference::new("media", "7")),
    )?;
    store.insert(
        StoredEntity::new("media", "image", "7")
            .with_reference("field_credit", EntityReference::new("user", "5")),
    )?;
    store.insert(StoredEntity::new("user", "user", "5"))?;
    store.insert(StoredEntity::new("taxonomy_term", "tags", "3"))?;
    store.insert(StoredEntity::new("taxonomy_term", "tags", "4"))?;

    println!("\n✅ Test data created:");
    println!("   📦 1 article, 1 image, 1 author, 2 tags");

    Ok(())
}
