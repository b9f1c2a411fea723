//! Route registration and lookup for Alacrity.
//!
//! This crate maps request paths to registered routes. A route template is
//! either *literal* (no captures, matched by exact string equality through a
//! hash lookup) or *parametric* (one or more `/:name` segments, compiled to a
//! capturing regular expression at registration time).
//!
//! # Template Syntax
//!
//! A `/:name` segment captures any run of non-`/` characters. Everything else
//! in the template is matched literally; regex metacharacters in the literal
//! text are escaped during compilation, so templates like `/foo)bar/:id` are
//! valid.
//!
//! A compiled parametric template also accepts a trailing `/...` or `?...`
//! suffix: `/a/:b` matches `/a/5`, `/a/5/`, and `/a/5?x=1`, but not
//! `/a/5extra`.
//!
//! # Match Order
//!
//! Literal routes win over parametric ones. Overlapping parametric routes are
//! tried in registration order and the first match wins, so register the more
//! specific template first.
//!
//! # Example
//!
//! ```rust
//! use alacrity_router::RouteTable;
//! use http::Method;
//!
//! let mut table = RouteTable::new();
//! table.add_route(&Method::GET, "/users", "listUsers").unwrap();
//! table.add_route(&Method::GET, "/users/:id", "getUser").unwrap();
//!
//! let m = table.map_route(&Method::GET, "/users/123?expand=1").unwrap();
//! assert_eq!(*m.payload(), "getUser");
//! assert_eq!(m.vars().get("id"), Some("123"));
//! assert_eq!(m.tail(), "expand=1");
//! ```

mod matcher;
mod params;
mod table;

pub use matcher::{Matched, PathMatcher, PatternError, RouteId};
pub use params::Params;
pub use table::{RouteHandle, RouteMatch, RouteTable};
