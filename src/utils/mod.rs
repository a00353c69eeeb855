pub mod archive;

// Trait-based transport abstraction for testability
pub mod connection;

// Re-export commonly used types and traits (used by test crate)
pub use archive::FolderArchive;
pub use connection::{Connection, FilePart, HttpConnection, Method, Response};
