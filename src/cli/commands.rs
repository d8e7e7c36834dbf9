use crate::dispatcher::Dispatcher;
use crate::quotes::{self, QuoteStore};
use crate::server::{status_reason, CanonicalResponse, InboundRequest};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

/// Command-line interface for switchyard
///
/// Drives the bundled quotes application through the dispatcher without a
/// network listener.
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "First-match HTTP route dispatcher", long_about = None)]
pub struct Cli {
    /// Log level (trace/debug/info/warn/error)
    #[arg(long, global = true, default_value = "warn", env = "SWITCHYARD_LOG_LEVEL")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the demo application's routes in matching order
    Routes,
    /// Dispatch one request through the demo application
    Request {
        /// HTTP method (GET, POST, ...)
        method: String,

        /// Request target, optionally with a query string (e.g. `/quotes?x=1`)
        target: String,

        /// Form field sent in the body (repeatable)
        #[arg(short, long = "form", value_parser = parse_key_val)]
        form: Vec<(String, String)>,

        /// Session entry visible to the handler (repeatable)
        #[arg(short, long = "session", value_parser = parse_key_val)]
        session: Vec<(String, String)>,

        /// Print the response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Parse `key=value`; the value may be empty, the key may not.
pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Build the dispatcher serving the seeded quotes application.
pub fn demo_dispatcher() -> Result<Dispatcher> {
    let store = QuoteStore::seeded().context("seeding quote store")?;
    let registry = quotes::routes(Arc::new(store)).context("building quote routes")?;
    Ok(Dispatcher::new(registry))
}

/// Execute a parsed command, writing its output to `out`.
pub fn run_cli<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let dispatcher = demo_dispatcher()?;
    match cli.command {
        Commands::Routes => {
            for line in dispatcher.registry().route_summaries() {
                writeln!(out, "{line}")?;
            }
        }
        Commands::Request {
            method,
            target,
            form,
            session,
            json,
        } => {
            let body = (!form.is_empty()).then(|| {
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(form.iter())
                    .finish()
            });
            let request = InboundRequest::parse(&method, &target, body.as_deref())
                .context("parsing request")?
                .with_session(session.into_iter().collect());

            let (response, ctx) = dispatcher
                .call(request)
                .context("dispatching request")?;
            let session = ctx.into_session();
            if json {
                write_json(out, response, &session)?;
            } else {
                write_text(out, response)?;
            }
        }
    }
    Ok(())
}

fn write_text<W: Write>(out: &mut W, response: CanonicalResponse) -> Result<()> {
    writeln!(
        out,
        "HTTP {} {}",
        response.status,
        status_reason(response.status)
    )?;
    for (name, value) in response.headers.iter() {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    out.write_all(&response.body.into_bytes())?;
    Ok(())
}

fn write_json<W: Write>(
    out: &mut W,
    response: CanonicalResponse,
    session: &HashMap<String, String>,
) -> Result<()> {
    let headers: serde_json::Map<String, serde_json::Value> = response
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect();
    let body = String::from_utf8_lossy(&response.body.into_bytes()).into_owned();
    let value = serde_json::json!({
        "status": response.status,
        "headers": headers,
        "body": body,
        "session": session,
    });
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}
