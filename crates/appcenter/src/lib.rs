//! Client for the App Center distribution API
//!
//! Uploads release binaries, distributes them to groups, stores and
//! testers, updates release notes and uploads debug symbols.
//!
//! ## Release creation
//!
//! Two paths produce a release:
//! - **API** ([`App::create_release`]): chunked upload over REST, followed by
//!   polling until the service has processed the binary.
//! - **CLI** ([`App::create_release_with_cli`]): delegates the upload to the
//!   `appcenter` command line tool through a [`CommandRunner`].
//!
//! ## Usage
//!
//! ```ignore
//! use appcenter::{Client, ReleaseOptions};
//!
//! let client = Client::new(token)?;
//! let app = client.app("my-org", "my-app");
//!
//! let release = app.create_release(&ReleaseOptions {
//!     file_path: "build/app.apk".into(),
//!     group_names: vec!["Beta".into()],
//!     ..Default::default()
//! }).await?;
//!
//! let group = app.group("Beta").await?;
//! app.add_release_to_group(&group, release.id, &opts).await?;
//! ```
//!
//! For a whole CI step driven by `appcenter.toml`, see [`deploy::deploy`].

pub mod app;
pub mod cli_upload;
pub mod client;
pub mod config;
pub mod deploy;
pub mod error;
pub mod observer;
pub mod runner;
pub mod symbols;
pub mod types;
pub mod upload;

pub use app::App;
pub use client::{ApiResponse, Client, ClientBuilder, DEFAULT_BASE_URL};
pub use config::{DeployConfig, UploadMode};
pub use deploy::{deploy, DeployReport};
pub use error::{AppCenterError, ConfigError, Result};
pub use observer::{HttpObserver, TracingObserver};
pub use runner::{CommandRunner, ProcessRunner};
pub use types::*;
