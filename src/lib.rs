//! secretsync - provision Azure credentials and publish them as GitHub
//! repository secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── upload        # Upload a secrets document
//! │   ├── sync          # Credentials straight to GitHub, no document
//! │   ├── rotate        # New service principal, rewrite, upload
//! │   ├── setup         # New service principal, fresh document, upload
//! │   ├── show          # List a document's secrets
//! │   ├── validate      # Check AZURE_CREDENTIALS
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # .secretsync.toml management
//!     ├── document/     # Name:/Value: secrets document
//!     │   ├── mod       # Document model and rendering
//!     │   └── parser    # Line state machine
//!     ├── credentials   # AZURE_CREDENTIALS validation
//!     ├── database      # DB URI decomposition
//!     ├── exec          # Subprocess helper for az/gh
//!     ├── provider/     # Identity providers
//!     │   ├── mod       # IdentityProvider trait
//!     │   └── azure     # az CLI implementation
//!     ├── store/        # Secret stores
//!     │   ├── mod       # SecretStore trait
//!     │   └── github    # gh CLI implementation
//!     └── secrets       # Secret sets and uploads
//! ```
//!
//! # Features
//!
//! - Round-trip parsing of multi-line JSON values
//! - Credential validation before anything is uploaded
//! - Per-secret upload results with a summary
//! - Dry runs that touch neither the cloud nor the document

pub mod cli;
pub mod core;
pub mod error;
