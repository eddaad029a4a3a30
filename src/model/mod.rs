//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (phases, results, progress snapshots)
//! - `extractor`: Album/EP extraction from the raw search response
//! - `search_client`: Search endpoint client
//! - `app_model`: Retained UI state owned by the event loop

mod types;
pub mod extractor;
mod search_client;
mod app_model;

// Re-export all public types for convenient access
pub use types::{
    AppState, Notice, NoticeKind, Outcome, ProgressSnapshot, ProgressStatus,
    SearchResult, SelectedItem, Termination,
};

pub use search_client::SearchClient;

pub use app_model::AppModel;
