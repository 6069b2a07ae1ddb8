//! # proposta-service: Service Layer
//!
//! Configuration, logging, reference-data loading and the [`ProposalService`]
//! facade the HTTP layer calls. All domain decisions are delegated to
//! `proposta-core`.
//!
//! ## Startup
//! ```text
//!   logging::init()
//!        │
//!        ▼
//!   ServiceConfig::load(None) ── defaults → proposta.toml → PROPOSTA_* env
//!        │
//!        ▼
//!   ProposalService::from_config(config) ── loads the locality table once
//!        │
//!        ▼
//!   share via Arc / clone per handler (immutable)
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod reference;
pub mod service;

pub use config::ServiceConfig;
pub use error::{ErrorCode, ErrorResponse, ServiceError, ServiceResult};
pub use reference::load_locality_table;
pub use service::ProposalService;
