//! AppDeploy Core - Configuration and Templating for Application Packaging
//!
//! This crate holds the configuration and text-templating core of an
//! application deployment tool. Package builders (AppImage, Flatpak, RPM,
//! Debian, Windows Setup) consume its output; they are not part of this crate.
//!
//! # Pipeline
//!
//! ```text
//! app.conf ──► RawConfigMap ──► DeployConfig ──┐
//!                                              ├──► MacroTable ──► expanded text
//!                             BuildContext ────┘
//! CHANGES  ──► Changelog ──► plain text | <release> markup
//! ```
//!
//! 1. [`RawConfigMap`] reads the `key = value` file format (comments,
//!    `"""` multi-line blocks, case-insensitive unique keys)
//! 2. [`DeployConfig`] validates every field and fails on the first violation
//! 3. [`MacroTable`] expands `${NAME}` references; unknown names are kept and
//!    reported through [`MacroWarnings`]
//! 4. [`Changelog`] parses `+ version;date` / `- change` text
//!
//! # Quick Start
//!
//! ```no_run
//! use appdeploy_core::{
//!     BuildContext, Changelog, DeployConfig, MacroTable, MacroWarnings, ValidateOptions,
//! };
//!
//! # fn main() -> appdeploy_core::DeployResult<()> {
//! let config = DeployConfig::from_file("HelloWorld.conf", ValidateOptions::default())?;
//! let changelog = match config.app().change_file.path() {
//!     Some(path) => Changelog::from_file(path)?,
//!     None => Changelog::default(),
//! };
//!
//! let ctx = BuildContext::new(&config)
//!     .with_deploy_kind("appimage")
//!     .with_runtime("linux-x64", "x86_64")
//!     .with_changelog(&changelog);
//! let macros = MacroTable::new(&config, &ctx);
//!
//! let mut warnings = MacroWarnings::new();
//! let desktop = macros.expand("Name=${APP_FRIENDLY_NAME}", false, &mut warnings, Some("desktop"));
//! # let _ = desktop;
//! # Ok(())
//! # }
//! ```

mod changelog;
mod config;
mod error;
pub mod macros;
pub mod markup;
mod reader;
mod writer;

pub use changelog::{ChangeEntry, Changelog, MAX_VERSION_LEN};
pub use config::{
    keys, parse_version_release, split_list, split_multi_text, AppImageSection, AppSection,
    DebianSection, DeployConfig, DesktopSection, DotnetSection, FlatpakSection, OutputSection,
    PathValue, PublisherSection, RpmSection, Safety, SetupSection, ValidateOptions,
    DEFAULT_OUTPUT_DIRECTORY, DISABLE_SENTINEL,
};
pub use error::{DeployError, DeployResult};
pub use macros::{BuildContext, MacroId, MacroTable, MacroWarnings};
pub use reader::{RawConfigMap, RawValue, MULTI_QUOTE};
pub use writer::{ConfWriter, WriterStyle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
