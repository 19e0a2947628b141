//! Macro table and `${NAME}` expansion
//!
//! A [`MacroTable`] maps every [`MacroId`] to a string, built from a validated
//! [`DeployConfig`] plus caller-supplied [`BuildContext`] values. Expansion is
//! a single pass over the input: substituted values are never rescanned, so a
//! value that itself contains `${...}` is inserted literally.
//!
//! ```text
//! Exec=${INSTALL_EXEC}          ->  Exec=/opt/helloworld/HelloWorld
//! Name=${APP_FRIENDLY_NAME}     ->  Name=Hello World
//! ${UNKNOWN}                    ->  ${UNKNOWN}  (recorded as a warning)
//! ```

use chrono::{Datelike, Local, NaiveDate};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::changelog::Changelog;
use crate::config::DeployConfig;
use crate::error::DeployResult;
use crate::markup;

/// Maximum characters after `${` kept when reporting an unterminated token
const TRUNCATE_LEN: usize = 16;

// ============================================================================
// Macro Identifiers
// ============================================================================

/// Closed set of macro identifiers
///
/// Names are referenced by externally authored templates and must never be
/// renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MacroId {
    LocalDirectory,
    AppBaseName,
    AppFriendlyName,
    AppId,
    AppShortSummary,
    AppLicenseId,
    AppVersion,
    PackageRelease,
    PackageName,
    PublisherName,
    PublisherId,
    PublisherCopyright,
    PublisherLinkName,
    PublisherLinkUrl,
    PublisherEmail,
    DesktopNoDisplay,
    DesktopIntegrate,
    DesktopTerminal,
    PrimeCategory,
    DeployKind,
    DotnetRuntime,
    BuildArch,
    BuildTarget,
    BuildDate,
    BuildYear,
    BuildRoot,
    BuildShare,
    BuildAppBin,
    PublishBin,
    InstallBin,
    InstallExec,
    AppstreamDescriptionXml,
    AppstreamChangelogXml,
}

impl MacroId {
    /// Every identifier, in table order
    pub const ALL: [MacroId; 33] = [
        MacroId::LocalDirectory,
        MacroId::AppBaseName,
        MacroId::AppFriendlyName,
        MacroId::AppId,
        MacroId::AppShortSummary,
        MacroId::AppLicenseId,
        MacroId::AppVersion,
        MacroId::PackageRelease,
        MacroId::PackageName,
        MacroId::PublisherName,
        MacroId::PublisherId,
        MacroId::PublisherCopyright,
        MacroId::PublisherLinkName,
        MacroId::PublisherLinkUrl,
        MacroId::PublisherEmail,
        MacroId::DesktopNoDisplay,
        MacroId::DesktopIntegrate,
        MacroId::DesktopTerminal,
        MacroId::PrimeCategory,
        MacroId::DeployKind,
        MacroId::DotnetRuntime,
        MacroId::BuildArch,
        MacroId::BuildTarget,
        MacroId::BuildDate,
        MacroId::BuildYear,
        MacroId::BuildRoot,
        MacroId::BuildShare,
        MacroId::BuildAppBin,
        MacroId::PublishBin,
        MacroId::InstallBin,
        MacroId::InstallExec,
        MacroId::AppstreamDescriptionXml,
        MacroId::AppstreamChangelogXml,
    ];

    /// Name as written inside `${...}`
    pub fn name(self) -> &'static str {
        match self {
            MacroId::LocalDirectory => "LOCAL_DIRECTORY",
            MacroId::AppBaseName => "APP_BASE_NAME",
            MacroId::AppFriendlyName => "APP_FRIENDLY_NAME",
            MacroId::AppId => "APP_ID",
            MacroId::AppShortSummary => "APP_SHORT_SUMMARY",
            MacroId::AppLicenseId => "APP_LICENSE_ID",
            MacroId::AppVersion => "APP_VERSION",
            MacroId::PackageRelease => "PACKAGE_RELEASE",
            MacroId::PackageName => "PACKAGE_NAME",
            MacroId::PublisherName => "PUBLISHER_NAME",
            MacroId::PublisherId => "PUBLISHER_ID",
            MacroId::PublisherCopyright => "PUBLISHER_COPYRIGHT",
            MacroId::PublisherLinkName => "PUBLISHER_LINK_NAME",
            MacroId::PublisherLinkUrl => "PUBLISHER_LINK_URL",
            MacroId::PublisherEmail => "PUBLISHER_EMAIL",
            MacroId::DesktopNoDisplay => "DESKTOP_NODISPLAY",
            MacroId::DesktopIntegrate => "DESKTOP_INTEGRATE",
            MacroId::DesktopTerminal => "DESKTOP_TERMINAL",
            MacroId::PrimeCategory => "PRIME_CATEGORY",
            MacroId::DeployKind => "DEPLOY_KIND",
            MacroId::DotnetRuntime => "DOTNET_RUNTIME",
            MacroId::BuildArch => "BUILD_ARCH",
            MacroId::BuildTarget => "BUILD_TARGET",
            MacroId::BuildDate => "BUILD_DATE",
            MacroId::BuildYear => "BUILD_YEAR",
            MacroId::BuildRoot => "BUILD_ROOT",
            MacroId::BuildShare => "BUILD_SHARE",
            MacroId::BuildAppBin => "BUILD_APP_BIN",
            MacroId::PublishBin => "PUBLISH_BIN",
            MacroId::InstallBin => "INSTALL_BIN",
            MacroId::InstallExec => "INSTALL_EXEC",
            MacroId::AppstreamDescriptionXml => "APPSTREAM_DESCRIPTION_XML",
            MacroId::AppstreamChangelogXml => "APPSTREAM_CHANGELOG_XML",
        }
    }

    /// Short description for help output
    pub fn hint(self) -> &'static str {
        match self {
            MacroId::LocalDirectory => "Directory containing the configuration file",
            MacroId::AppBaseName => "AppBaseName value",
            MacroId::AppFriendlyName => "AppFriendlyName value",
            MacroId::AppId => "AppId value",
            MacroId::AppShortSummary => "AppShortSummary value",
            MacroId::AppLicenseId => "AppLicenseId value",
            MacroId::AppVersion => "Application version, excluding package release",
            MacroId::PackageRelease => "Package release number",
            MacroId::PackageName => "PackageName value, or AppBaseName if not set",
            MacroId::PublisherName => "PublisherName value",
            MacroId::PublisherId => "PublisherId value",
            MacroId::PublisherCopyright => "PublisherCopyright value",
            MacroId::PublisherLinkName => "PublisherLinkName value",
            MacroId::PublisherLinkUrl => "PublisherLinkUrl value",
            MacroId::PublisherEmail => "PublisherEmail value",
            MacroId::DesktopNoDisplay => "DesktopNoDisplay value (true or false)",
            MacroId::DesktopIntegrate => "Logical NOT of DesktopNoDisplay",
            MacroId::DesktopTerminal => "DesktopTerminal value (true or false)",
            MacroId::PrimeCategory => "PrimeCategory value",
            MacroId::DeployKind => "Package kind being built (e.g. appimage, deb, setup)",
            MacroId::DotnetRuntime => "Runtime identifier used for publish (e.g. linux-x64)",
            MacroId::BuildArch => "Target architecture (e.g. x64, arm64)",
            MacroId::BuildTarget => "Build configuration (Release or Debug)",
            MacroId::BuildDate => "Build date in yyyy-MM-dd format",
            MacroId::BuildYear => "Build year as yyyy",
            MacroId::BuildRoot => "Root of the temporary build directory",
            MacroId::BuildShare => "Shared data directory under the build root",
            MacroId::BuildAppBin => "Application binary directory under the build root",
            MacroId::PublishBin => "Directory receiving published binaries",
            MacroId::InstallBin => "Installed binary directory on the target system",
            MacroId::InstallExec => "Installed executable path on the target system",
            MacroId::AppstreamDescriptionXml => "AppDescription rendered as escaped markup",
            MacroId::AppstreamChangelogXml => "Changelog rendered as release markup",
        }
    }

    /// Value is already escaped markup and is never re-escaped
    pub fn is_markup(self) -> bool {
        matches!(
            self,
            MacroId::AppstreamDescriptionXml | MacroId::AppstreamChangelogXml
        )
    }

    /// Look up an identifier by its exact name
    pub fn from_name(name: &str) -> Option<MacroId> {
        MacroId::ALL.iter().copied().find(|id| id.name() == name)
    }

    /// The `${NAME}` token
    pub fn token(self) -> String {
        format!("${{{}}}", self.name())
    }
}

impl std::fmt::Display for MacroId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Build Context
// ============================================================================

/// Values known only at build time, supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub deploy_kind: String,
    pub runtime_id: String,
    pub build_arch: String,
    pub build_target: String,
    pub app_version: String,
    pub package_release: String,
    pub build_date: NaiveDate,
    pub local_directory: PathBuf,
    pub build_root: PathBuf,
    pub build_share: PathBuf,
    pub build_app_bin: PathBuf,
    pub publish_bin: PathBuf,
    pub install_bin: String,
    pub install_exec: String,
    /// Changelog rendered as `APPSTREAM_CHANGELOG_XML`
    pub changelog: Option<Changelog>,
}

impl BuildContext {
    /// Context seeded from the configuration's version and directory, dated today
    pub fn new(config: &DeployConfig) -> Self {
        Self {
            deploy_kind: String::new(),
            runtime_id: String::new(),
            build_arch: String::new(),
            build_target: "Release".to_string(),
            app_version: config.app_version().to_string(),
            package_release: config.package_release().to_string(),
            build_date: Local::now().date_naive(),
            local_directory: config.base_dir().to_path_buf(),
            build_root: PathBuf::new(),
            build_share: PathBuf::new(),
            build_app_bin: PathBuf::new(),
            publish_bin: PathBuf::new(),
            install_bin: String::new(),
            install_exec: String::new(),
            changelog: None,
        }
    }

    pub fn with_deploy_kind(mut self, kind: impl Into<String>) -> Self {
        self.deploy_kind = kind.into();
        self
    }

    pub fn with_runtime(mut self, runtime_id: impl Into<String>, arch: impl Into<String>) -> Self {
        self.runtime_id = runtime_id.into();
        self.build_arch = arch.into();
        self
    }

    pub fn with_build_target(mut self, target: impl Into<String>) -> Self {
        self.build_target = target.into();
        self
    }

    /// Override version and release (e.g. from the command line)
    pub fn with_version(mut self, version: impl Into<String>, release: impl Into<String>) -> Self {
        self.app_version = version.into();
        self.package_release = release.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.build_date = date;
        self
    }

    /// Set build directories
    pub fn with_build_dirs(
        mut self,
        root: impl Into<PathBuf>,
        share: impl Into<PathBuf>,
        app_bin: impl Into<PathBuf>,
        publish_bin: impl Into<PathBuf>,
    ) -> Self {
        self.build_root = root.into();
        self.build_share = share.into();
        self.build_app_bin = app_bin.into();
        self.publish_bin = publish_bin.into();
        self
    }

    /// Set install locations on the target system
    pub fn with_install(mut self, bin: impl Into<String>, exec: impl Into<String>) -> Self {
        self.install_bin = bin.into();
        self.install_exec = exec.into();
        self
    }

    /// Attach a changelog to render as release markup
    ///
    /// An empty changelog renders as a single empty release block for the
    /// version and date the context holds when the table is built.
    pub fn with_changelog(mut self, changelog: &Changelog) -> Self {
        self.changelog = Some(changelog.clone());
        self
    }

    fn changelog_markup(&self) -> String {
        match &self.changelog {
            None => String::new(),
            Some(log) if log.is_empty() => format!(
                "<release version=\"{}\" date=\"{}\"/>",
                markup::escape(&self.app_version),
                self.build_date.format("%Y-%m-%d")
            ),
            Some(log) => log.to_markup(),
        }
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// De-duplicated warnings collected across expansion calls
#[derive(Debug, Clone, Default)]
pub struct MacroWarnings {
    messages: Vec<String>,
    seen: HashSet<String>,
}

impl MacroWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unresolved token; returns false if already recorded
    pub fn record(&mut self, token: &str, item: Option<&str>) -> bool {
        let message = match item {
            Some(item) => format!("Invalid macro {} in {}", token, item),
            None => format!("Invalid macro {}", token),
        };
        if !self.seen.insert(message.clone()) {
            return false;
        }
        tracing::warn!("{}", message);
        self.messages.push(message);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.messages
    }
}

// ============================================================================
// Macro Table
// ============================================================================

/// Resolved value for every [`MacroId`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTable {
    values: Vec<String>,
}

impl MacroTable {
    /// Build the table from configuration and build context
    pub fn new(config: &DeployConfig, ctx: &BuildContext) -> Self {
        let values = MacroId::ALL
            .iter()
            .map(|&id| resolve(id, config, ctx))
            .collect();
        Self { values }
    }

    /// Value for an identifier
    pub fn get(&self, id: MacroId) -> &str {
        &self.values[id as usize]
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (MacroId, &str)> {
        MacroId::ALL
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Name/value pairs for exporting as process environment variables
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(id, value)| (id.name().to_string(), value.to_string()))
            .collect()
    }

    /// Serialize as a pretty JSON object keyed by macro name
    pub fn to_json(&self) -> DeployResult<String> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(id, value)| (id.name().to_string(), serde_json::Value::from(value)))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// Expand `${NAME}` references in `text`
    ///
    /// With `escape` set, values of non-markup macros are markup-escaped.
    /// Unknown or unterminated tokens are left in place and recorded in
    /// `warnings`, annotated with `item` when given.
    pub fn expand(
        &self,
        text: &str,
        escape: bool,
        warnings: &mut MacroWarnings,
        item: Option<&str>,
    ) -> String {
        if !text.contains("${") {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let next_open = after.find("${");

            match after.find('}') {
                Some(end) if next_open.is_none_or(|n| end < n) => {
                    let name = &after[..end];
                    match MacroId::from_name(name) {
                        Some(id) if escape && !id.is_markup() => {
                            out.push_str(&markup::escape(self.get(id)))
                        }
                        Some(id) => out.push_str(self.get(id)),
                        None => {
                            let token = &rest[start..start + end + 3];
                            warnings.record(token, item);
                            out.push_str(token);
                        }
                    }
                    rest = &after[end + 1..];
                }
                _ => {
                    let limit = next_open.unwrap_or(after.len());
                    let tail: String = after[..limit].chars().take(TRUNCATE_LEN).collect();
                    warnings.record(&format!("${{{}", tail), item);
                    out.push_str("${");
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

fn resolve(id: MacroId, config: &DeployConfig, ctx: &BuildContext) -> String {
    let app = config.app();
    let publisher = config.publisher();
    let desktop = config.desktop();
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();

    match id {
        MacroId::LocalDirectory => ctx.local_directory.display().to_string(),
        MacroId::AppBaseName => app.base_name.clone(),
        MacroId::AppFriendlyName => app.friendly_name.clone(),
        MacroId::AppId => app.id.clone(),
        MacroId::AppShortSummary => app.short_summary.clone(),
        MacroId::AppLicenseId => app.license_id.clone(),
        MacroId::AppVersion => ctx.app_version.clone(),
        MacroId::PackageRelease => ctx.package_release.clone(),
        MacroId::PackageName => config.package_name().to_string(),
        MacroId::PublisherName => publisher.name.clone(),
        MacroId::PublisherId => opt(&publisher.id),
        MacroId::PublisherCopyright => opt(&publisher.copyright),
        MacroId::PublisherLinkName => opt(&publisher.link_name),
        MacroId::PublisherLinkUrl => opt(&publisher.link_url),
        MacroId::PublisherEmail => opt(&publisher.email),
        MacroId::DesktopNoDisplay => desktop.no_display.to_string(),
        MacroId::DesktopIntegrate => (!desktop.no_display).to_string(),
        MacroId::DesktopTerminal => desktop.terminal.to_string(),
        MacroId::PrimeCategory => opt(&desktop.prime_category),
        MacroId::DeployKind => ctx.deploy_kind.clone(),
        MacroId::DotnetRuntime => ctx.runtime_id.clone(),
        MacroId::BuildArch => ctx.build_arch.clone(),
        MacroId::BuildTarget => ctx.build_target.clone(),
        MacroId::BuildDate => ctx.build_date.format("%Y-%m-%d").to_string(),
        MacroId::BuildYear => ctx.build_date.year().to_string(),
        MacroId::BuildRoot => ctx.build_root.display().to_string(),
        MacroId::BuildShare => ctx.build_share.display().to_string(),
        MacroId::BuildAppBin => ctx.build_app_bin.display().to_string(),
        MacroId::PublishBin => ctx.publish_bin.display().to_string(),
        MacroId::InstallBin => ctx.install_bin.clone(),
        MacroId::InstallExec => ctx.install_exec.clone(),
        MacroId::AppstreamDescriptionXml => markup::description_markup(&app.description),
        MacroId::AppstreamChangelogXml => ctx.changelog_markup(),
    }
}

/// Help text listing every macro
pub fn reference() -> String {
    let width = MacroId::ALL
        .iter()
        .map(|id| id.token().len())
        .max()
        .unwrap_or(0);
    let mut out = String::from("Macros may be used in text assets and script commands.\n\n");
    for id in MacroId::ALL {
        let note = if id.is_markup() { " (markup)" } else { "" };
        out.push_str(&format!(
            "{:width$}  {}{}\n",
            id.token(),
            id.hint(),
            note,
            width = width
        ));
    }
    out
}
