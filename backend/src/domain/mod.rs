//! Domain primitives, the entity lifecycle core and its services.
//!
//! Purpose: track sequencing lab entities (project, sample, libprep, seqrun)
//! as revisioned documents. Validation, dirty tracking, audit logging,
//! cascades and rollups live here; transports and storage sit behind ports.
//!
//! Public surface:
//! - DomainError: transport-agnostic error payload.
//! - ErrorCode: stable error identifier.
//! - Document, DocumentMeta, DocId, Revision, Doctype: document identity.
//! - RequestContext: store handle, operator, clock and query cache for one
//!   request.
//! - Saver: unit of work for one create or update.
//! - TrackingService, UserAccountsService: driving port implementations.

pub mod audit;
pub mod config;
pub mod context;
pub mod document;
pub mod entities;
pub mod error;
pub mod field;
pub mod hierarchy;
pub mod ports;
pub mod rollup;
pub mod saver;
pub mod tracking_service;
pub mod user_accounts_service;

pub use self::config::{ConfigError, EntityConfig, SEQRUN_ID_POLICY_ENV, SeqRunIdPolicy};
pub use self::context::{Operator, QueryCache, RequestContext};
pub use self::document::{DocId, Doctype, Document, DocumentMeta, InvalidDocId, Revision};
pub use self::entities::{LibPrep, LogEntry, Project, Sample, SeqRun, User, UserRole, UserStatus};
pub use self::error::{DomainError, ErrorCode, ErrorValidationError};
pub use self::hierarchy::DeleteReport;
pub use self::saver::Saver;
pub use self::tracking_service::TrackingService;
pub use self::user_accounts_service::UserAccountsService;

