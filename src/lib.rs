//! Primer - container startup bootstrap for web application services.
//!
//! Turns a freshly scheduled container into a ready-to-serve instance:
//!
//! 1. apply schema migrations
//! 2. fetch the superuser password from the parameter store
//! 3. ensure the administrative account exists
//! 4. collect static assets
//! 5. replace itself with the application server
//!
//! Any failing phase aborts the start with a phase-specific exit code.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── output        # Terminal output helpers
//! │   └── plan          # --dry-run rendering
//! └── core/             # Core library components
//!     ├── bootstrap     # Phase sequencing (Steps trait)
//!     ├── phase         # Phases and the startup state machine
//!     ├── startup       # Positional startup parameters
//!     ├── settings      # primer.toml management
//!     ├── command       # External command invocation
//!     ├── django        # manage.py-backed Steps
//!     ├── server        # Server exec hand-off
//!     └── secrets/      # Parameter store backends
//!         ├── mod       # SecretStore trait, Secret
//!         ├── aws_cli   # aws ssm get-parameter
//!         ├── aws       # aws-sdk-ssm (feature `aws`)
//!         └── file      # Local JSON file
//! ```

pub mod cli;
pub mod core;
pub mod error;
