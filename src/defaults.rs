//! Centralized default values and constants
//!
//! This module consolidates the default values and well-known names used
//! throughout the codebase, making them easy to find, modify, and document.

// ============================================================================
// Collection / Files
// ============================================================================

/// Default name of the document collection
pub const DEFAULT_COLLECTION_NAME: &str = "resources_db";

/// Default location of the ACL file
pub const DEFAULT_ACL_PATH: &str = "config/acl.json";

/// Default directory scanned by resource ingestion
pub const DEFAULT_RESOURCES_DIR: &str = "resources";

// ============================================================================
// Search Parameters
// ============================================================================

/// Default number of results to return (k)
pub const DEFAULT_TOP_K: usize = 5;

// ============================================================================
// Embedding Parameters
// ============================================================================

/// Default dimensionality of the hashing embedder
pub const DEFAULT_EMBEDDING_DIMS: usize = 256;

/// Weight of a whole word token
pub const TOKEN_WEIGHT: f32 = 1.0;

/// Weight of each character trigram of a token
pub const TRIGRAM_WEIGHT: f32 = 0.5;

// ============================================================================
// Metadata
// ============================================================================

/// Metadata key joining a document to its ACL entry
pub const RESOURCE_ID_KEY: &str = "resource_id";

/// Version stamped into ingested resource metadata
pub const METADATA_VERSION: &str = "1.0";

/// Content type used when the extension is not recognized
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

// ============================================================================
// Server Configuration
// ============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;
