//! CosmoSorter demo workspace.
//!
//! This crate provides:
//! - Multi-modal ingestion (text, image, document, audio)
//! - An analysis pipeline with a mocked or remote analyzer
//! - The editable four-category record and its JSON export
//! - Debounced persistence with restore on open
//!
//! # Quick Start
//!
//! ```ignore
//! use cosmo_core::{Workspace, WorkspaceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut workspace = Workspace::from_config(WorkspaceConfig::from_env()).await?;
//!     workspace.open().await;
//!
//!     workspace.set_text("Elira wakes in a frozen forest");
//!     workspace.submit().await?;
//!
//!     let receipt = workspace.export().await?;
//!     println!("exported to {}", receipt.location);
//!
//!     workspace.close().await;
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod debounce;
pub mod export;
pub mod ingest;
pub mod notify;
pub mod persist;
pub mod record;
pub mod resource;
pub mod testing;
pub mod view;
pub mod workspace;

// Re-export for convenience
pub use cosmo_macros::CategoryFields;

// Primary public API
pub use analysis::{AnalysisError, Analyzer, MockAnalyzer, Phase, RemoteAnalyzer};
pub use config::WorkspaceConfig;
pub use ingest::{MediaFile, MediaKind};
pub use record::{Category, Record};
pub use testing::TestHarness;
pub use workspace::{AnalysisOutcome, ErrorClass, Resume, Workspace, WorkspaceError};
