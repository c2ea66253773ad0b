//! opsync - declarative 1Password vaults, group grants and vault members.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── plan          # Show pending changes
//! │   ├── apply         # Converge the account to the manifest
//! │   ├── refresh       # Re-read state from the backend
//! │   ├── import        # Adopt an existing resource
//! │   ├── state         # Inspect and edit state
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── id            # Composite relationship ids
//!     ├── relation      # Group-vault and vault-member relations
//!     ├── backend/      # Backend trait
//!     │   ├── op        # 1Password CLI implementation
//!     │   └── memory    # In-memory implementation
//!     ├── lookup        # Present/absent lookups
//!     ├── resource/     # Vault and membership controllers
//!     ├── manifest      # opsync.toml
//!     ├── state         # .opsync/state.json
//!     ├── plan          # Manifest vs. state diff
//!     └── reconcile     # Refresh, apply, import
//! ```
//!
//! # Features
//!
//! - Composite ids for relationships that have no id of their own
//! - Membership existence derived from member listings
//! - Safety lock against deleting vaults
//! - Incognito vault creation (creator removed afterwards)

pub mod cli;
pub mod core;
pub mod error;
