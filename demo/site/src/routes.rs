/* demo/site/src/routes.rs */

//! The site declaration shared by the server and the client.

use tandem_core::{Result, Route, Site};

use crate::fetchers::{ApiClient, FETCH_HOMEPAGE, FETCH_SERVICE, fetch_homepage, fetch_service};
use crate::views::{self, AppShell};

/// Route table in match order.
pub fn routes() -> Result<Vec<Route>> {
  Ok(vec![
    Route::new("/", "Homepage")?.exact(true).fetcher(FETCH_HOMEPAGE),
    Route::new("/services/:id", "Service")?.fetcher(FETCH_SERVICE),
    Route::new("/about", "About")?.exact(true),
  ])
}

pub fn build_site(api: &ApiClient, title: &str) -> Result<Site> {
  let mut builder = Site::builder();
  for route in routes()? {
    builder = builder.route(route);
  }
  builder
    .view("Homepage", views::homepage)
    .view("Service", views::service)
    .view("About", views::about)
    .fetcher(fetch_homepage(api.clone()))
    .fetcher(fetch_service(api.clone()))
    .shell(AppShell::new(title))
    .build()
}

#[cfg(test)]
mod tests {
  use tandem_core::RouteTable;

  use super::*;

  #[test]
  fn table_resolves_pages() {
    let table = RouteTable::new(routes().unwrap());
    assert_eq!(table.match_path("/").unwrap().route.view_id(), "Homepage");
    let service = table.match_path("/services/3").unwrap();
    assert_eq!(service.route.view_id(), "Service");
    assert_eq!(service.params["id"], "3");
    assert_eq!(table.match_path("/about/").unwrap().route.view_id(), "About");
    assert!(table.match_path("/about/team").is_err());
    assert!(table.match_path("/contact").is_err());
  }

  #[test]
  fn site_builds() {
    let site = build_site(&ApiClient::new("http://localhost:3000"), "React Demo").unwrap();
    let matched = site.match_path("/services/1").unwrap();
    assert_eq!(site.fetcher_for(matched.route).unwrap().name, FETCH_SERVICE);
  }
}
