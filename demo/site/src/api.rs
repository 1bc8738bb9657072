/* demo/site/src/api.rs */

//! Mock data endpoints the fetchers read from.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path as UrlPath, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::records::{Metadata, Page, Service};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
  pub homepage: Page,
  pub services: Vec<Service>,
}

impl Content {
  pub fn load(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
  }

  /// Services whose id renders as `id`. Empty when none match.
  pub fn services_by_id(&self, id: &str) -> Vec<Service> {
    self.services.iter().filter(|s| s.id.to_string() == id).cloned().collect()
  }
}

fn metadata(description: &str, keywords: &str) -> Option<Metadata> {
  Some(Metadata { title: None, description: description.into(), keywords: keywords.into() })
}

fn service(id: u32, name: &str, items: &[&str], keywords: &str) -> Service {
  Service {
    id,
    name: name.into(),
    items: items.iter().map(ToString::to_string).collect(),
    metadata: metadata(&format!("{name} services"), keywords),
  }
}

impl Default for Content {
  fn default() -> Self {
    Self {
      homepage: Page {
        title: "Welcome".into(),
        content: "We build apps, websites and brands that people enjoy using.".into(),
        metadata: metadata("Digital agency homepage", "apps, web, design"),
      },
      services: vec![
        service(1, "App Development", &["iOS", "Android", "Cross-platform"], "apps, mobile"),
        service(2, "Web Development", &["Websites", "Web applications", "E-commerce"], "web"),
        service(3, "Design", &["Branding", "UI design", "UX research"], "design, branding"),
      ],
    }
  }
}

pub fn router(content: Arc<Content>) -> Router {
  Router::new()
    .route("/api/homepage", get(homepage))
    .route("/api/services/{id}", get(services))
    .with_state(content)
}

async fn homepage(State(content): State<Arc<Content>>) -> Json<Page> {
  Json(content.homepage.clone())
}

async fn services(
  State(content): State<Arc<Content>>,
  UrlPath(id): UrlPath<String>,
) -> Json<Vec<Service>> {
  let found = content.services_by_id(&id);
  tracing::debug!(id = %id, count = found.len(), "services lookup");
  Json(found)
}
