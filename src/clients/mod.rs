//! Clients - HTTP Clients for External APIs
//!
//! This module contains the file storage contract and its Google Drive client.

pub mod google_auth;
pub mod google_drive;
pub mod photo_storage;

// Re-export main types for convenience
pub use google_drive::GoogleDriveClient;
pub use photo_storage::{FolderRequest, PhotoStorage, StoredPhoto};
