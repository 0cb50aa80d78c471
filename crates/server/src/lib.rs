//! Inspection Server - HTTP surface for substation inspection reports
//!
//! Serves a browser form that uploads substation photographs, runs the
//! inspection pipeline and offers the resulting Markdown report as a
//! `.md` or `.pdf` download.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - Upload form
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check (reports credential and detector status)
//! - `POST /api/v1/reports` - Generate a report (multipart: `images`, `inspection_days`)
//! - `POST /api/v1/export/markdown` - Download the report as `.md`
//! - `POST /api/v1/export/pdf` - Download the report as `.pdf`
//!
//! # Configuration
//!
//! An optional `server.{toml,yaml,json}` file, overridden by `SUBSTATION__*`
//! environment variables (`__` separates nested keys, e.g.
//! `SUBSTATION__MODEL__MODE=stub`). The API key is read from the secrets file
//! named by `secrets_path`, then from `GEMINI_API_KEY` in the environment or
//! `.env`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::{ModelStatus, ServerState};
