//! # Quotes Demo Application
//!
//! A small quote board wired onto a [`RouteRegistry`]; it exercises every
//! reply shape and early exit the dispatcher supports. Quotes live in memory.
//!
//! | Route | Behaviour |
//! |---|---|
//! | `GET /` | redirect to `/quotes` |
//! | `GET /quotes` | HTML list, shows and clears the flash message |
//! | `GET /quotes.json` | JSON list |
//! | `GET /quotes.txt` | plain-text list, streamed one line per quote |
//! | `GET /quotes/new` | HTML form |
//! | `GET /quotes/:id` | one quote, `404` for unknown ids |
//! | `POST /quotes` | add a quote, flash a message, redirect (`303`) |
//! | `GET /set_value` | store `msg` in the session and echo it |
//! | `GET /get_value` | echo the session's `msg` |
//!
//! HTML pages are rendered from `templates/quotes/*.html` with `minijinja`.
//!
//! `/quotes/new` is registered before `/quotes/:id`, otherwise "new" would be
//! taken for an id.

use crate::dispatcher::{halt, Halt, HandlerResult, RequestContext};
use crate::router::RouteRegistry;
use crate::server::{Headers, Reply};
use anyhow::{anyhow, Context, Result};
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Session key holding the one-shot flash message.
pub const FLASH_KEY: &str = "message";
pub const FLASH_ADDED: &str = "The quote has been added.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u64,
    pub author: String,
    pub quote: String,
}

#[derive(Debug)]
struct StoreInner {
    next_id: u64,
    quotes: BTreeMap<u64, Quote>,
}

/// In-memory quote storage shared by the handlers.
#[derive(Debug)]
pub struct QuoteStore {
    inner: Mutex<StoreInner>,
}

impl QuoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                next_id: 1,
                quotes: BTreeMap::new(),
            }),
        }
    }

    /// A store pre-filled with a few quotes.
    pub fn seeded() -> Result<Self> {
        let store = Self::new();
        store.insert("Alan Kay", "The best way to predict the future is to invent it.")?;
        store.insert("Grace Hopper", "A ship in port is safe, but that's not what ships are built for.")?;
        store.insert("Edsger Dijkstra", "Simplicity is prerequisite for reliability.")?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("quote store lock poisoned"))
    }

    /// Add a quote and return its id.
    pub fn insert(&self, author: &str, quote: &str) -> Result<u64> {
        let mut inner = self.lock()?;
        let id = inner.next_id;
        inner.quotes.insert(
            id,
            Quote {
                id,
                author: author.to_string(),
                quote: quote.to_string(),
            },
        );
        inner.next_id += 1;
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Result<Option<Quote>> {
        Ok(self.lock()?.quotes.get(&id).cloned())
    }

    /// All quotes, ordered by id.
    pub fn all(&self) -> Result<Vec<Quote>> {
        Ok(self.lock()?.quotes.values().cloned().collect())
    }
}

impl Default for QuoteStore {
    fn default() -> Self {
        Self::new()
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/quotes/layout.html")),
    ("index.html", include_str!("../templates/quotes/index.html")),
    ("show.html", include_str!("../templates/quotes/show.html")),
    ("new_quote.html", include_str!("../templates/quotes/new_quote.html")),
];

/// The quote board's HTML pages.
///
/// Template names end in `.html`, so every interpolated value is
/// HTML-escaped.
#[derive(Debug)]
pub struct QuoteTemplates {
    env: Environment<'static>,
}

impl QuoteTemplates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .with_context(|| format!("compiling template {name}"))?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|tpl| tpl.render(ctx))
            .with_context(|| format!("rendering template {name}"))
    }
}

/// Register the quote board's routes on `registry`.
pub fn register_routes(registry: &mut RouteRegistry, store: Arc<QuoteStore>) -> Result<()> {
    let pages = Arc::new(QuoteTemplates::new()?);

    registry.get("/", |ctx| ctx.redirect("/quotes"));

    let (s, p) = (Arc::clone(&store), Arc::clone(&pages));
    registry.get("/quotes", move |ctx| list_quotes(ctx, &s, &p));

    let s = Arc::clone(&store);
    registry.get("/quotes.json", move |_ctx| {
        let quotes = s.all()?;
        let json = serde_json::to_string(&quotes).context("serializing quotes")?;
        Ok(Reply::full(
            200,
            [("Content-Type", "application/json")],
            json,
        ))
    });

    let s = Arc::clone(&store);
    registry.get("/quotes.txt", move |ctx| {
        let quotes = s.all()?;
        ctx.response_mut()
            .set_header("Content-Type", "text/plain; charset=utf-8");
        Ok(Reply::stream(
            quotes
                .into_iter()
                .map(|q| format!("{}: {}\n", q.author, q.quote)),
        ))
    });

    let p = Arc::clone(&pages);
    registry.get("/quotes/new", move |_ctx| {
        Ok(p.render("new_quote.html", context! { title => "New quote" })?
            .into())
    });

    let (s, p) = (Arc::clone(&store), Arc::clone(&pages));
    registry.get("/quotes/:id", move |ctx| {
        let quote = find_quote(ctx, &s)?;
        let title = format!("Quote #{}", quote.id);
        Ok(p.render("show.html", context! { title, quote })?.into())
    });

    registry.post("/quotes", move |ctx| create_quote(ctx, &store, &pages));

    registry.get("/set_value", |ctx| {
        ctx.session_mut()
            .insert("msg".to_string(), "new message".to_string());
        Ok("new message".into())
    });

    registry.get("/get_value", |ctx| {
        Ok(ctx
            .session()
            .get("msg")
            .cloned()
            .map_or(Reply::Empty, Reply::from))
    });

    Ok(())
}

/// A registry holding only the quote board.
pub fn routes(store: Arc<QuoteStore>) -> Result<RouteRegistry> {
    let mut registry = RouteRegistry::new();
    register_routes(&mut registry, store)?;
    Ok(registry)
}

fn list_quotes(ctx: &mut RequestContext, store: &QuoteStore, pages: &QuoteTemplates) -> HandlerResult {
    let quotes = store.all()?;
    let flash = ctx.session_mut().remove(FLASH_KEY);
    let body = pages.render("index.html", context! { title => "Quotes", flash, quotes })?;
    Ok(body.into())
}

/// Resolve `:id` to a stored quote, leaving the handler with a 404 otherwise.
fn find_quote(ctx: &RequestContext, store: &QuoteStore) -> Result<Quote, Halt> {
    let id = ctx
        .param("id")
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or(Halt::NotFound)?;
    store.get(id)?.ok_or(Halt::NotFound)
}

fn create_quote(ctx: &mut RequestContext, store: &QuoteStore, pages: &QuoteTemplates) -> HandlerResult {
    let author = ctx.param("author").map(str::trim).unwrap_or_default();
    let quote = ctx.param("quote").map(str::trim).unwrap_or_default();
    if author.is_empty() || quote.is_empty() {
        let page = pages.render(
            "new_quote.html",
            context! {
                title => "New quote",
                error => "Author and quote are both required.",
                author,
                quote,
            },
        )?;
        return halt((
            422u16,
            Headers::from([("Content-Type", "text/html; charset=utf-8")]),
            page,
        ));
    }

    let id = store.insert(author, quote)?;
    info!(
        request_id = %ctx.request_id(),
        quote_id = id,
        "Quote added"
    );
    ctx.session_mut()
        .insert(FLASH_KEY.to_string(), FLASH_ADDED.to_string());
    ctx.redirect("/quotes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_assigns_increasing_ids() {
        let store = QuoteStore::new();
        assert_eq!(store.insert("a", "one").unwrap(), 1);
        assert_eq!(store.insert("b", "two").unwrap(), 2);
        assert_eq!(store.all().unwrap().len(), 2);
        assert_eq!(store.get(2).unwrap().unwrap().author, "b");
        assert!(store.get(3).unwrap().is_none());
    }

    #[test]
    fn test_seeded_store() {
        let store = QuoteStore::seeded().unwrap();
        assert_eq!(store.all().unwrap().len(), 3);
    }

    #[test]
    fn test_templates_escape_values() {
        let pages = QuoteTemplates::new().unwrap();
        let quote = Quote {
            id: 9,
            author: "<b>Eve</b>".to_string(),
            quote: "1 < 2 & \"3\"".to_string(),
        };
        let html = pages
            .render("show.html", context! { title => "Quote #9", quote })
            .unwrap();
        assert!(html.contains("<title>Quote #9</title>"));
        assert!(html.contains("&lt;b&gt;Eve"));
        assert!(html.contains("1 &lt; 2 &amp; &quot;3&quot;"));
        assert!(!html.contains("<b>Eve"));
    }

    #[test]
    fn test_list_without_flash() {
        let pages = QuoteTemplates::new().unwrap();
        let quotes = QuoteStore::seeded().unwrap().all().unwrap();
        let flash: Option<String> = None;
        let html = pages
            .render("index.html", context! { title => "Quotes", flash, quotes })
            .unwrap();
        assert!(!html.contains("class=\"flash\""));
        assert!(html.contains("<a href=\"/quotes/2\">"));
        assert!(html.contains("Grace Hopper"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let pages = QuoteTemplates::new().unwrap();
        let err = pages.render("missing.html", context! {}).unwrap_err();
        assert!(err.to_string().contains("missing.html"));
    }

    #[test]
    fn test_route_order() {
        let registry = routes(Arc::new(QuoteStore::new())).unwrap();
        let summaries = registry.route_summaries();
        let new_pos = summaries.iter().position(|r| r == "GET /quotes/new");
        let id_pos = summaries.iter().position(|r| r == "GET /quotes/:id");
        assert!(new_pos.is_some() && new_pos < id_pos);
    }
}
