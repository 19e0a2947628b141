//! Validated deployment configuration
//!
//! [`DeployConfig`] is built once from a [`RawConfigMap`] and a base directory.
//! Each field is looked up once, in declaration order, and the first rule
//! violation aborts construction with a [`DeployError::Validation`] naming
//! the field.
//!
//! ## Configuration Sections
//!
//! ```text
//! App*          - AppSection: identity, version, summary, description, license
//! Publisher*    - PublisherSection: publisher name and links
//! Desktop*      - DesktopSection: desktop entry, icons, metadata
//! Dotnet*       - DotnetSection: publish project and scripts
//! PackageName   - OutputSection: output naming and location
//! AppImage*     - AppImageSection
//! Flatpak*      - FlatpakSection
//! Rpm*          - RpmSection
//! Debian*       - DebianSection
//! Setup*        - SetupSection: Windows installer
//! ```

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::{DeployError, DeployResult};
use crate::reader::RawConfigMap;

/// Reserved value meaning "intentionally no path"
pub const DISABLE_SENTINEL: &str = "NONE";

/// Default output directory, relative to the configuration's base directory
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "Deploy/OUT";

/// Characters rejected by the "safe" character classes
const UNSAFE_CHARS: &[char] = &['*', '?', '"', '<', '>', '|'];

/// Configuration key names
///
/// These are part of the file format and must not be renamed.
pub mod keys {
    pub const APP_BASE_NAME: &str = "AppBaseName";
    pub const APP_FRIENDLY_NAME: &str = "AppFriendlyName";
    pub const APP_ID: &str = "AppId";
    pub const APP_VERSION_RELEASE: &str = "AppVersionRelease";
    pub const APP_SHORT_SUMMARY: &str = "AppShortSummary";
    pub const APP_DESCRIPTION: &str = "AppDescription";
    pub const APP_LICENSE_ID: &str = "AppLicenseId";
    pub const APP_LICENSE_FILE: &str = "AppLicenseFile";
    pub const APP_CHANGE_FILE: &str = "AppChangeFile";

    pub const PUBLISHER_NAME: &str = "PublisherName";
    pub const PUBLISHER_ID: &str = "PublisherId";
    pub const PUBLISHER_COPYRIGHT: &str = "PublisherCopyright";
    pub const PUBLISHER_LINK_NAME: &str = "PublisherLinkName";
    pub const PUBLISHER_LINK_URL: &str = "PublisherLinkUrl";
    pub const PUBLISHER_EMAIL: &str = "PublisherEmail";

    pub const DESKTOP_NO_DISPLAY: &str = "DesktopNoDisplay";
    pub const DESKTOP_TERMINAL: &str = "DesktopTerminal";
    pub const DESKTOP_FILE: &str = "DesktopFile";
    pub const START_COMMAND: &str = "StartCommand";
    pub const PRIME_CATEGORY: &str = "PrimeCategory";
    pub const META_FILE: &str = "MetaFile";
    pub const ICON_FILES: &str = "IconFiles";

    pub const DOTNET_PROJECT_PATH: &str = "DotnetProjectPath";
    pub const DOTNET_PUBLISH_ARGS: &str = "DotnetPublishArgs";
    pub const DOTNET_POST_PUBLISH: &str = "DotnetPostPublish";
    pub const DOTNET_POST_PUBLISH_ON_WINDOWS: &str = "DotnetPostPublishOnWindows";

    pub const PACKAGE_NAME: &str = "PackageName";
    pub const OUTPUT_DIRECTORY: &str = "OutputDirectory";

    pub const APPIMAGE_ARGS: &str = "AppImageArgs";
    pub const APPIMAGE_VERSION_OUTPUT: &str = "AppImageVersionOutput";

    pub const FLATPAK_PLATFORM_RUNTIME: &str = "FlatpakPlatformRuntime";
    pub const FLATPAK_PLATFORM_SDK: &str = "FlatpakPlatformSdk";
    pub const FLATPAK_PLATFORM_VERSION: &str = "FlatpakPlatformVersion";
    pub const FLATPAK_FINISH_ARGS: &str = "FlatpakFinishArgs";
    pub const FLATPAK_BUILDER_ARGS: &str = "FlatpakBuilderArgs";

    pub const RPM_AUTO_REQ: &str = "RpmAutoReq";
    pub const RPM_AUTO_PROV: &str = "RpmAutoProv";
    pub const RPM_REQUIRES: &str = "RpmRequires";

    pub const DEBIAN_RECOMMENDS: &str = "DebianRecommends";

    pub const SETUP_GROUP_NAME: &str = "SetupGroupName";
    pub const SETUP_ADMIN_INSTALL: &str = "SetupAdminInstall";
    pub const SETUP_COMMAND_PROMPT: &str = "SetupCommandPrompt";
    pub const SETUP_MIN_WINDOWS_VERSION: &str = "SetupMinWindowsVersion";
    pub const SETUP_SIGN_TOOL: &str = "SetupSignTool";
    pub const SETUP_SUFFIX_OUTPUT: &str = "SetupSuffixOutput";
    pub const SETUP_VERSION_OUTPUT: &str = "SetupVersionOutput";
}

/// Normalize a path by removing `.` and resolving `..` components
fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            _ => components.push(component),
        }
    }
    components.iter().collect()
}

// ============================================================================
// Value Types
// ============================================================================

/// Character class applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    /// No character restriction
    Any,
    /// No control characters and none of `*?"<>|`
    Safe,
    /// As [`Safety::Safe`], and no whitespace
    SafeNoSpace,
    /// ASCII letters, digits, `-`, `+` and `.` only, at least 2 characters
    StrictSafe,
}

impl Safety {
    /// Check a value, returning a description of the first violation
    pub fn check(self, value: &str) -> Result<(), String> {
        match self {
            Safety::Any => Ok(()),
            Safety::Safe | Safety::SafeNoSpace => {
                for c in value.chars() {
                    if c.is_control() || UNSAFE_CHARS.contains(&c) {
                        return Err(format!("invalid character {:?}", c));
                    }
                    if self == Safety::SafeNoSpace && c.is_whitespace() {
                        return Err("spaces not allowed".to_string());
                    }
                }
                Ok(())
            }
            Safety::StrictSafe => {
                if value.chars().count() < 2 {
                    return Err("must be at least 2 characters".to_string());
                }
                match value
                    .chars()
                    .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.')))
                {
                    Some(c) => Err(format!(
                        "invalid character {:?} (only letters, digits, '-', '+' and '.' allowed)",
                        c
                    )),
                    None => Ok(()),
                }
            }
        }
    }
}

/// A path-valued setting
///
/// The `NONE` sentinel of the file format maps to [`PathValue::Disabled`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum PathValue {
    /// Not specified; the packager applies its default behavior
    #[default]
    Unset,
    /// Explicitly disabled
    Disabled,
    /// Resolved absolute (or base-relative) path
    Resolved(PathBuf),
}

impl PathValue {
    /// The resolved path, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            PathValue::Resolved(p) => Some(p),
            _ => None,
        }
    }

    /// Check if explicitly disabled
    pub fn is_disabled(&self) -> bool {
        matches!(self, PathValue::Disabled)
    }

    /// Check if not specified
    pub fn is_unset(&self) -> bool {
        matches!(self, PathValue::Unset)
    }
}

/// Validation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Fail when a referenced path does not exist
    pub assert_paths: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self { assert_paths: true }
    }
}

impl ValidateOptions {
    /// Options that skip path existence checks
    pub fn no_assert() -> Self {
        Self {
            assert_paths: false,
        }
    }
}

/// Per-item constraint for list fields
#[derive(Debug, Clone, Copy, Default)]
struct ItemRule {
    prefix: Option<&'static str>,
    contains: Option<&'static str>,
}

// ============================================================================
// Configuration Sections
// ============================================================================

/// Application identity and description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSection {
    /// `AppBaseName`: file and command base name, no spaces
    pub base_name: String,
    /// `AppFriendlyName`: display name
    pub friendly_name: String,
    /// `AppId`: reverse DNS application identifier
    pub id: String,
    /// `AppVersionRelease`, raw `VERSION[RELEASE]` value
    pub version_release: String,
    /// Version part of `AppVersionRelease`
    pub version: String,
    /// Release part of `AppVersionRelease`, `"1"` when omitted
    pub release: String,
    /// `AppShortSummary`: one-line summary
    pub short_summary: String,
    /// `AppDescription` paragraphs; empty strings separate paragraphs
    pub description: Vec<String>,
    /// `AppLicenseId`: SPDX license identifier
    pub license_id: String,
    /// `AppLicenseFile`
    pub license_file: PathValue,
    /// `AppChangeFile`: changelog in `+ version;date` format
    pub change_file: PathValue,
}

/// Publisher details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublisherSection {
    /// `PublisherName`
    pub name: String,
    /// `PublisherId`: reverse DNS publisher identifier
    pub id: Option<String>,
    /// `PublisherCopyright`
    pub copyright: Option<String>,
    /// `PublisherLinkName`: display text for [`PublisherSection::link_url`]
    pub link_name: Option<String>,
    /// `PublisherLinkUrl`
    pub link_url: Option<String>,
    /// `PublisherEmail`
    pub email: Option<String>,
}

/// Desktop integration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DesktopSection {
    /// `DesktopNoDisplay`, default `false`
    pub no_display: bool,
    /// `DesktopTerminal`, default `true`
    pub terminal: bool,
    /// `DesktopFile`: desktop entry template
    pub desktop_file: PathValue,
    /// `StartCommand`: launcher name installed on the target
    pub start_command: Option<String>,
    /// `PrimeCategory`: main desktop menu category
    pub prime_category: Option<String>,
    /// `MetaFile`: AppStream metadata template
    pub meta_file: PathValue,
    /// `IconFiles`, in the order given
    pub icon_files: Vec<PathBuf>,
}

/// Publish step inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DotnetSection {
    /// `DotnetProjectPath`: project or solution to publish
    pub project_path: PathValue,
    /// `DotnetPublishArgs`: extra publish arguments
    pub publish_args: Option<String>,
    /// `DotnetPostPublish`: script run after publishing
    pub post_publish: PathValue,
    /// `DotnetPostPublishOnWindows`: script run after publishing on Windows
    pub post_publish_on_windows: PathValue,
}

/// Output naming and location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSection {
    /// `PackageName`; [`DeployConfig::package_name`] falls back to the base name
    pub package_name: Option<String>,
    /// `OutputDirectory`, default `Deploy/OUT` under the base directory
    pub output_directory: PathBuf,
}

/// AppImage builder options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppImageSection {
    /// `AppImageArgs`: extra appimagetool arguments
    pub args: Option<String>,
    /// `AppImageVersionOutput`: add the version to the output file name
    pub version_output: bool,
}

/// Flatpak builder options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatpakSection {
    /// `FlatpakPlatformRuntime`, default `org.freedesktop.Platform`
    pub platform_runtime: String,
    /// `FlatpakPlatformSdk`, default `org.freedesktop.Sdk`
    pub platform_sdk: String,
    /// `FlatpakPlatformVersion`, default `23.08`
    pub platform_version: String,
    /// `FlatpakFinishArgs`: `--name=value` items
    pub finish_args: Vec<String>,
    /// `FlatpakBuilderArgs`: `--` prefixed items
    pub builder_args: Vec<String>,
}

/// RPM package options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpmSection {
    /// `RpmAutoReq`, default `false`
    pub auto_req: bool,
    /// `RpmAutoProv`, default `true`
    pub auto_prov: bool,
    /// `RpmRequires`: package dependencies
    pub requires: Vec<String>,
}

/// Debian package options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebianSection {
    /// `DebianRecommends`: recommended packages
    pub recommends: Vec<String>,
}

/// Windows installer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupSection {
    /// `SetupGroupName`: start menu group
    pub group_name: Option<String>,
    /// `SetupAdminInstall`, default `false`
    pub admin_install: bool,
    /// `SetupCommandPrompt`: title of a command prompt shortcut
    pub command_prompt: Option<String>,
    /// `SetupMinWindowsVersion`, default `10`
    pub min_windows_version: String,
    /// `SetupSignTool`: signing command
    pub sign_tool: Option<String>,
    /// `SetupSuffixOutput`: output file name suffix
    pub suffix_output: Option<String>,
    /// `SetupVersionOutput`: add the version to the output file name
    pub version_output: bool,
}

// ============================================================================
// Deploy Configuration
// ============================================================================

/// Immutable, fully validated deployment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployConfig {
    base_dir: PathBuf,
    app: AppSection,
    publisher: PublisherSection,
    desktop: DesktopSection,
    dotnet: DotnetSection,
    output: OutputSection,
    appimage: AppImageSection,
    flatpak: FlatpakSection,
    rpm: RpmSection,
    debian: DebianSection,
    setup: SetupSection,
    #[serde(skip)]
    unknown_keys: Vec<String>,
}

impl DeployConfig {
    /// Read, parse and validate a configuration file
    ///
    /// Relative paths are resolved against the file's directory, made absolute
    /// from the current directory when `path` is relative.
    pub fn from_file(path: impl AsRef<Path>, options: ValidateOptions) -> DeployResult<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let raw = RawConfigMap::from_file(&path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Self::from_raw(&raw, base_dir, options)
    }

    /// Parse and validate configuration text
    pub fn parse(
        content: &str,
        base_dir: impl AsRef<Path>,
        options: ValidateOptions,
    ) -> DeployResult<Self> {
        let raw = RawConfigMap::parse("config", content)?;
        Self::from_raw(&raw, base_dir, options)
    }

    /// Validate a raw map
    pub fn from_raw(
        raw: &RawConfigMap,
        base_dir: impl AsRef<Path>,
        options: ValidateOptions,
    ) -> DeployResult<Self> {
        let base_dir = normalize_path(base_dir.as_ref());
        let mut r = FieldReader::new(raw, &base_dir, options);

        let app = {
            let base_name = r.get_mandatory(keys::APP_BASE_NAME, Safety::SafeNoSpace)?;
            let friendly_name = r.get_mandatory(keys::APP_FRIENDLY_NAME, Safety::Safe)?;
            let id = r.get_mandatory(keys::APP_ID, Safety::SafeNoSpace)?;
            let version_release = r.get_mandatory(keys::APP_VERSION_RELEASE, Safety::SafeNoSpace)?;
            let (version, release) = parse_version_release(&version_release).ok_or_else(|| {
                DeployError::validation(
                    keys::APP_VERSION_RELEASE,
                    format!("expected VERSION or VERSION[RELEASE], got {}", version_release),
                )
            })?;
            AppSection {
                base_name,
                friendly_name,
                id,
                version_release,
                version,
                release,
                short_summary: r.get_mandatory(keys::APP_SHORT_SUMMARY, Safety::Any)?,
                description: r.get_multi_text(keys::APP_DESCRIPTION, Safety::Any)?,
                license_id: r.get_mandatory(keys::APP_LICENSE_ID, Safety::Safe)?,
                license_file: r.get_path(keys::APP_LICENSE_FILE, true)?,
                change_file: r.get_path(keys::APP_CHANGE_FILE, true)?,
            }
        };

        let publisher = PublisherSection {
            name: r.get_mandatory(keys::PUBLISHER_NAME, Safety::Safe)?,
            id: r.get_optional(keys::PUBLISHER_ID, Safety::SafeNoSpace)?,
            copyright: r.get_optional(keys::PUBLISHER_COPYRIGHT, Safety::Safe)?,
            link_name: r.get_optional(keys::PUBLISHER_LINK_NAME, Safety::Safe)?,
            link_url: r.get_optional(keys::PUBLISHER_LINK_URL, Safety::SafeNoSpace)?,
            email: r.get_optional(keys::PUBLISHER_EMAIL, Safety::SafeNoSpace)?,
        };

        let desktop = DesktopSection {
            no_display: r.get_bool(keys::DESKTOP_NO_DISPLAY, false)?,
            terminal: r.get_bool(keys::DESKTOP_TERMINAL, true)?,
            desktop_file: r.get_path(keys::DESKTOP_FILE, true)?,
            start_command: r.get_optional(keys::START_COMMAND, Safety::SafeNoSpace)?,
            prime_category: r.get_optional(keys::PRIME_CATEGORY, Safety::SafeNoSpace)?,
            meta_file: r.get_path(keys::META_FILE, true)?,
            icon_files: r.get_path_list(keys::ICON_FILES)?,
        };

        let dotnet = DotnetSection {
            project_path: r.get_path(keys::DOTNET_PROJECT_PATH, true)?,
            publish_args: r.get_optional(keys::DOTNET_PUBLISH_ARGS, Safety::Safe)?,
            post_publish: r.get_path(keys::DOTNET_POST_PUBLISH, true)?,
            post_publish_on_windows: r.get_path(keys::DOTNET_POST_PUBLISH_ON_WINDOWS, true)?,
        };

        let output = OutputSection {
            package_name: r.get_optional(keys::PACKAGE_NAME, Safety::StrictSafe)?,
            output_directory: match r.get_path(keys::OUTPUT_DIRECTORY, false)? {
                PathValue::Resolved(p) => p,
                _ => base_dir.join(DEFAULT_OUTPUT_DIRECTORY),
            },
        };

        let appimage = AppImageSection {
            args: r.get_optional(keys::APPIMAGE_ARGS, Safety::Safe)?,
            version_output: r.get_bool(keys::APPIMAGE_VERSION_OUTPUT, false)?,
        };

        let flatpak = FlatpakSection {
            platform_runtime: r.get_or(
                keys::FLATPAK_PLATFORM_RUNTIME,
                Safety::SafeNoSpace,
                "org.freedesktop.Platform",
            )?,
            platform_sdk: r.get_or(
                keys::FLATPAK_PLATFORM_SDK,
                Safety::SafeNoSpace,
                "org.freedesktop.Sdk",
            )?,
            platform_version: r.get_or(
                keys::FLATPAK_PLATFORM_VERSION,
                Safety::SafeNoSpace,
                "23.08",
            )?,
            finish_args: r.get_list(
                keys::FLATPAK_FINISH_ARGS,
                Safety::Safe,
                ItemRule {
                    prefix: Some("--"),
                    contains: Some("="),
                },
            )?,
            builder_args: r.get_list(
                keys::FLATPAK_BUILDER_ARGS,
                Safety::Safe,
                ItemRule {
                    prefix: Some("--"),
                    contains: None,
                },
            )?,
        };

        let rpm = RpmSection {
            auto_req: r.get_bool(keys::RPM_AUTO_REQ, false)?,
            auto_prov: r.get_bool(keys::RPM_AUTO_PROV, true)?,
            requires: r.get_list(keys::RPM_REQUIRES, Safety::Safe, ItemRule::default())?,
        };

        let debian = DebianSection {
            recommends: r.get_list(keys::DEBIAN_RECOMMENDS, Safety::Safe, ItemRule::default())?,
        };

        let setup = SetupSection {
            group_name: r.get_optional(keys::SETUP_GROUP_NAME, Safety::Safe)?,
            admin_install: r.get_bool(keys::SETUP_ADMIN_INSTALL, false)?,
            command_prompt: r.get_optional(keys::SETUP_COMMAND_PROMPT, Safety::Safe)?,
            min_windows_version: r.get_or(
                keys::SETUP_MIN_WINDOWS_VERSION,
                Safety::SafeNoSpace,
                "10",
            )?,
            sign_tool: r.get_optional(keys::SETUP_SIGN_TOOL, Safety::Safe)?,
            suffix_output: r.get_optional(keys::SETUP_SUFFIX_OUTPUT, Safety::SafeNoSpace)?,
            version_output: r.get_bool(keys::SETUP_VERSION_OUTPUT, false)?,
        };

        let unknown_keys = r.unknown_keys();
        for key in &unknown_keys {
            tracing::warn!("Unknown configuration key ignored: {}", key);
        }

        tracing::debug!(
            "Validated configuration for {} {}",
            app.base_name,
            app.version_release
        );

        Ok(Self {
            base_dir,
            app,
            publisher,
            desktop,
            dotnet,
            output,
            appimage,
            flatpak,
            rpm,
            debian,
            setup,
            unknown_keys,
        })
    }

    /// Directory relative paths were resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn app(&self) -> &AppSection {
        &self.app
    }

    pub fn publisher(&self) -> &PublisherSection {
        &self.publisher
    }

    pub fn desktop(&self) -> &DesktopSection {
        &self.desktop
    }

    pub fn dotnet(&self) -> &DotnetSection {
        &self.dotnet
    }

    pub fn output(&self) -> &OutputSection {
        &self.output
    }

    pub fn appimage(&self) -> &AppImageSection {
        &self.appimage
    }

    pub fn flatpak(&self) -> &FlatpakSection {
        &self.flatpak
    }

    pub fn rpm(&self) -> &RpmSection {
        &self.rpm
    }

    pub fn debian(&self) -> &DebianSection {
        &self.debian
    }

    pub fn setup(&self) -> &SetupSection {
        &self.setup
    }

    /// Application version without the release suffix
    pub fn app_version(&self) -> &str {
        &self.app.version
    }

    /// Package release number (defaults to "1")
    pub fn package_release(&self) -> &str {
        &self.app.release
    }

    /// Effective package name (falls back to the application base name)
    pub fn package_name(&self) -> &str {
        self.output
            .package_name
            .as_deref()
            .unwrap_or(&self.app.base_name)
    }

    /// Keys present in the source that no field consumed
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown_keys
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> DeployResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Split `VERSION[RELEASE]` into its parts; release defaults to "1"
pub fn parse_version_release(value: &str) -> Option<(String, String)> {
    let value = value.trim();
    match value.find('[') {
        Some(open) => {
            let inner = value[open + 1..].strip_suffix(']')?;
            let version = value[..open].trim();
            let release = inner.trim();
            if version.is_empty() || release.is_empty() || release.contains(['[', ']']) {
                return None;
            }
            Some((version.to_string(), release.to_string()))
        }
        None if value.is_empty() || value.contains(']') => None,
        None => Some((value.to_string(), "1".to_string())),
    }
}

/// Split a collection value on newlines (if any) or `;`, dropping empty items
pub fn split_list(value: &str) -> Vec<String> {
    let sep = if value.contains('\n') { '\n' } else { ';' };
    value
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split multi-paragraph text into lines, keeping single blank separators
pub fn split_multi_text(value: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for line in value.lines().map(str::trim) {
        if line.is_empty() && items.last().is_some_and(|l| l.is_empty()) {
            continue;
        }
        items.push(line.to_string());
    }
    if items.first().is_some_and(|l| l.is_empty()) {
        items.remove(0);
    }
    if items.last().is_some_and(|l| l.is_empty()) {
        items.pop();
    }
    items
}

// ============================================================================
// Field Reader
// ============================================================================

/// Looks up fields one at a time, applying rules and tracking consumed keys
struct FieldReader<'a> {
    raw: &'a RawConfigMap,
    base_dir: &'a Path,
    options: ValidateOptions,
    consumed: HashSet<String>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a RawConfigMap, base_dir: &'a Path, options: ValidateOptions) -> Self {
        Self {
            raw,
            base_dir,
            options,
            consumed: HashSet::new(),
        }
    }

    /// Trimmed non-blank value
    fn lookup(&mut self, name: &str) -> Option<&'a str> {
        self.consumed.insert(name.to_lowercase());
        self.raw
            .get(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn get_optional(&mut self, name: &str, safety: Safety) -> DeployResult<Option<String>> {
        let Some(value) = self.lookup(name) else {
            return Ok(None);
        };
        if value.contains('\n') {
            return Err(DeployError::validation(name, "line breaks not allowed"));
        }
        safety
            .check(value)
            .map_err(|msg| DeployError::validation(name, msg))?;
        Ok(Some(value.to_string()))
    }

    fn get_mandatory(&mut self, name: &str, safety: Safety) -> DeployResult<String> {
        self.get_optional(name, safety)?
            .ok_or_else(|| DeployError::validation(name, format!("value required for {}", name)))
    }

    fn get_or(&mut self, name: &str, safety: Safety, default: &str) -> DeployResult<String> {
        Ok(self
            .get_optional(name, safety)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_bool(&mut self, name: &str, default: bool) -> DeployResult<bool> {
        match self.lookup(name) {
            None => Ok(default),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
            Some(v) => Err(DeployError::validation(
                name,
                format!("must be true or false, got {}", v),
            )),
        }
    }

    fn get_path(&mut self, name: &str, assert: bool) -> DeployResult<PathValue> {
        let Some(value) = self.get_optional(name, Safety::Safe)? else {
            return Ok(PathValue::Unset);
        };
        if value.eq_ignore_ascii_case(DISABLE_SENTINEL) {
            return Ok(PathValue::Disabled);
        }
        Ok(PathValue::Resolved(self.resolve(name, &value, assert)?))
    }

    fn get_path_list(&mut self, name: &str) -> DeployResult<Vec<PathBuf>> {
        self.get_list(name, Safety::Safe, ItemRule::default())?
            .iter()
            .map(|item| self.resolve(name, item, true))
            .collect()
    }

    fn resolve(&self, name: &str, value: &str, assert: bool) -> DeployResult<PathBuf> {
        let path = Path::new(value);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            normalize_path(&self.base_dir.join(path))
        };
        if assert && self.options.assert_paths && !path.is_file() && !path.is_dir() {
            return Err(DeployError::validation(
                name,
                format!("path not found: {}", path.display()),
            ));
        }
        Ok(path)
    }

    fn get_list(
        &mut self,
        name: &str,
        safety: Safety,
        rule: ItemRule,
    ) -> DeployResult<Vec<String>> {
        let Some(value) = self.lookup(name) else {
            return Ok(Vec::new());
        };
        let items = split_list(value);
        for item in &items {
            safety
                .check(item)
                .map_err(|msg| DeployError::validation(name, format!("{} in {}", msg, item)))?;
            if let Some(prefix) = rule.prefix {
                if !item.starts_with(prefix) {
                    return Err(DeployError::validation(
                        name,
                        format!("item {} must start with {}", item, prefix),
                    ));
                }
            }
            if let Some(needle) = rule.contains {
                if !item.contains(needle) {
                    return Err(DeployError::validation(
                        name,
                        format!("item {} must contain {}", item, needle),
                    ));
                }
            }
        }
        Ok(items)
    }

    fn get_multi_text(&mut self, name: &str, safety: Safety) -> DeployResult<Vec<String>> {
        let Some(value) = self.lookup(name) else {
            return Ok(Vec::new());
        };
        let items = split_multi_text(value);
        for item in &items {
            safety
                .check(item)
                .map_err(|msg| DeployError::validation(name, msg))?;
        }
        Ok(items)
    }

    /// Raw keys never looked up
    fn unknown_keys(&self) -> Vec<String> {
        self.raw
            .iter()
            .filter(|e| !self.consumed.contains(&e.key.to_lowercase()))
            .map(|e| e.key.clone())
            .collect()
    }
}
