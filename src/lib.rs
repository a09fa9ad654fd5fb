//! Basee - shared toolkit for host-CMS add-ons.
//!
//! Basee smooths over the host application's breaking changes across major
//! versions and provides the plumbing every add-on ends up rebuilding:
//! a typed settings store, scoped caching, throttled license and version
//! pings, a template-variable parser, versioned migrations, and an admin
//! settings controller base.
//!
//! # Modules
//!
//! - [`cache`] - Cache driver seam, namespace/scope prefixing, request cache
//! - [`controller`] - Admin settings page controller base
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host version and environment context
//! - [`license`] - Throttled remote license validation
//! - [`parser`] - Template tag scanner and variable substitution
//! - [`ping`] - Time-window gate for periodic remote checks
//! - [`settings`] - Namespaced key/value settings store
//! - [`strings`] - Slug/camel-case string transforms
//! - [`trial`] - Trial-period gate
//! - [`updates`] - Version comparison, remote checks, migrations
//!
//! # Example
//!
//! ```
//! use basee::parser::Parser;
//!
//! let mut parser = Parser::new(r#"{blog:set name="title" value="Hi"}{blog:title}"#);
//! parser.find_variables("blog", "set").unwrap();
//! parser.parse_variables("blog", None);
//! assert_eq!(parser.template(), "Hi");
//! ```

pub mod cache;
pub mod controller;
pub mod error;
pub mod host;
pub mod license;
pub mod parser;
pub mod ping;
pub mod settings;
pub mod strings;
pub mod trial;
pub mod updates;

pub use error::{BaseeError, Result};
