//! # CLI Module
//!
//! Command-line access to the dispatcher, using the bundled quotes
//! application as the route table.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! ```bash
//! switchyard routes
//! ```
//!
//! ### `request`
//!
//! ```bash
//! switchyard request GET /quotes/1
//! switchyard request POST /quotes --form author=Ada --form quote="Hello" --json
//! switchyard request GET /get_value --session msg=hi
//! ```
//!
//! Logging goes through `tracing`; `--log-level` (or `SWITCHYARD_LOG_LEVEL`)
//! controls verbosity.

mod commands;


pub use commands::{demo_dispatcher, parse_key_val, run_cli, Cli, Commands};
