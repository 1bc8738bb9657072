/* demo/site/src/views.rs */

use tandem_core::tandem_engine::{Element, Node, el, fragment};
use tandem_core::{RenderContext, Result, Shell};

use crate::records::{Metadata, Notification, Page, Service};

const NAV_LINKS: [(&str, &str); 4] =
  [("/", "Home"), ("/services/1", "App"), ("/services/2", "Web"), ("/services/3", "Design")];

/// Application frame around every route: logo, navigation, banner, and
/// the matched route's content.
#[derive(Debug, Clone)]
pub struct AppShell {
  title: String,
}

impl AppShell {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into() }
  }
}

impl Shell for AppShell {
  fn render(
    &self,
    ctx: &mut RenderContext<'_>,
    outlet: &dyn Fn(&mut RenderContext<'_>) -> Result<Node>,
  ) -> Result<Node> {
    ctx.title(self.title.clone());
    let current = ctx.path.split(['?', '#']).next().unwrap_or_default();
    let nav = el("nav").child(
      el("ul").children(
        NAV_LINKS.iter().map(|(href, label)| el("li").child(nav_link(current, href, label))),
      ),
    );
    Ok(
      el("div")
        .class("app")
        .child(el("img").class("logo").attr("src", "/images/logo.svg").attr("alt", "Logo"))
        .child(nav)
        .child(
          el("img")
            .attr("src", "/images/banner.png")
            .attr("alt", format!("{} banner", self.title)),
        )
        .child(outlet(ctx)?)
        .into(),
    )
  }
}

fn nav_link(current: &str, href: &str, label: &str) -> Element {
  let active = if href == "/" {
    current == "/" || current.is_empty()
  } else {
    current == href || current.starts_with(&format!("{href}/"))
  };
  let link = el("a").attr("href", href);
  let link = if active { link.class("active").attr("aria-current", "page") } else { link };
  link.child(label)
}

/// Title plus description and keywords meta tags.
fn page_metadata(ctx: &mut RenderContext<'_>, title: &str, metadata: Option<&Metadata>) {
  let title = metadata.and_then(|m| m.title.as_deref()).unwrap_or(title);
  ctx.title(title.to_string());
  if let Some(metadata) = metadata {
    ctx.meta("description", metadata.description.clone());
    ctx.meta("keywords", metadata.keywords.clone());
  }
}

fn page_header(heading: &str) -> Element {
  el("div").class("page-header").child(el("h1").child(heading))
}

fn page_content(body: impl Into<Node>) -> Element {
  el("div").class("page-content").child(body)
}

fn notification(note: &Notification) -> Element {
  el("div")
    .class(format!("notification notification--{}", note.kind))
    .attr("role", "status")
    .child(note.message.clone())
}

pub fn homepage(ctx: &mut RenderContext<'_>) -> Result<Node> {
  let page: Page = ctx.require()?;
  let note = ctx.record::<Notification>()?;
  page_metadata(ctx, &page.title, page.metadata.as_ref());
  Ok(
    el("div")
      .class("page")
      .children(note.as_ref().map(notification))
      .child(page_header(&page.title))
      .child(page_content(el("p").child(page.content)))
      .into(),
  )
}

pub fn service(ctx: &mut RenderContext<'_>) -> Result<Node> {
  let service: Service = ctx.require()?;
  page_metadata(ctx, &service.name, service.metadata.as_ref());
  let items = el("ul").children(service.items.into_iter().map(|item| el("li").child(item)));
  Ok(
    el("div")
      .class("page")
      .child(page_header(&service.name))
      .child(page_content(items))
      .into(),
  )
}

pub fn about(ctx: &mut RenderContext<'_>) -> Result<Node> {
  ctx.title("About");
  Ok(fragment([
    el("h1").child("About me").into(),
    el("p")
      .child("This site renders on the server and picks up where it left off in the browser.")
      .into(),
  ]))
}
