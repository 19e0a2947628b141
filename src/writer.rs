//! Configuration writer
//!
//! Renders a [`DeployConfig`] back into the configuration file format. Used to
//! upgrade an older configuration to the current layout and to produce a new
//! project template. Reading the output back yields an equal configuration.

use std::path::Path;

use crate::config::{keys, DeployConfig, PathValue, ValidateOptions, DISABLE_SENTINEL};
use crate::error::DeployResult;
use crate::reader::MULTI_QUOTE;

/// Indentation for items inside `"""` blocks
const INDENT: &str = "    ";

const RULE: &str = "########################################";

/// Sample project used by [`ConfWriter::template`]
const TEMPLATE_SOURCE: &str = r#"
AppBaseName = HelloWorld
AppFriendlyName = Hello World
AppId = com.example.helloworld
AppVersionRelease = 1.0.0[1]
AppShortSummary = A HelloWorld application
AppDescription = """
    HelloWorld is a demonstration application.

    It is the starting point for a new project.
"""
AppLicenseId = MIT
PublisherName = The Hello World Team
PublisherCopyright = Copyright (C) Hello World Team
PublisherLinkName = Home Page
PublisherLinkUrl = https://example.com
DesktopTerminal = false
PrimeCategory = Utility
IconFiles = """
    Deploy/HelloWorld.16x16.png
    Deploy/HelloWorld.svg
"""
DotnetProjectPath = HelloWorld.csproj
DotnetPublishArgs = -p:Version=${APP_VERSION} --self-contained true
FlatpakFinishArgs = """
    --socket=wayland
    --socket=x11
    --filesystem=host
    --share=network
"""
RpmRequires = """
    krb5-libs
    libicu
    openssl-libs
    zlib
"""
DebianRecommends = """
    libc6
    libgcc1
    libssl3
    zlib1g
"""
SetupCommandPrompt = Command Prompt
"#;

/// Output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriterStyle {
    /// Each key preceded by its help comment
    #[default]
    Verbose,
    /// Section headers only
    Minimal,
}

enum ConfValue {
    Text(String),
    List(Vec<String>),
}

struct Entry {
    key: &'static str,
    help: &'static str,
    value: ConfValue,
}

struct Section {
    title: &'static str,
    entries: Vec<Entry>,
}

fn entry(key: &'static str, help: &'static str, value: ConfValue) -> Entry {
    Entry { key, help, value }
}

fn text(value: &str) -> ConfValue {
    ConfValue::Text(value.to_string())
}

fn opt(value: &Option<String>) -> ConfValue {
    ConfValue::Text(value.clone().unwrap_or_default())
}

fn flag(value: bool) -> ConfValue {
    ConfValue::Text(value.to_string())
}

/// Writes configuration text
pub struct ConfWriter<'a> {
    config: &'a DeployConfig,
    style: WriterStyle,
}

impl<'a> ConfWriter<'a> {
    pub fn new(config: &'a DeployConfig, style: WriterStyle) -> Self {
        Self { config, style }
    }

    /// Configuration for a new project, rendered in the given style
    pub fn template(style: WriterStyle) -> DeployResult<String> {
        let config = DeployConfig::parse(TEMPLATE_SOURCE, "", ValidateOptions::no_assert())?;
        Ok(ConfWriter::new(&config, style).write())
    }

    /// Render the configuration
    pub fn write(&self) -> String {
        let mut out = String::new();
        for section in self.sections() {
            out.push_str(&format!("{}\n# {}\n{}\n\n", RULE, section.title, RULE));
            for e in section.entries {
                if self.style == WriterStyle::Verbose {
                    for line in e.help.lines() {
                        out.push_str(&format!("# {}\n", line));
                    }
                }
                write_value(&mut out, e.key, &e.value);
                if self.style == WriterStyle::Verbose {
                    out.push('\n');
                }
            }
            if self.style == WriterStyle::Minimal {
                out.push('\n');
            }
        }
        out.trim_end().to_string() + "\n"
    }

    fn path(&self, value: &PathValue) -> ConfValue {
        ConfValue::Text(match value {
            PathValue::Unset => String::new(),
            PathValue::Disabled => DISABLE_SENTINEL.to_string(),
            PathValue::Resolved(p) => self.relative(p),
        })
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(self.config.base_dir())
            .unwrap_or(path)
            .display()
            .to_string()
    }

    fn sections(&self) -> Vec<Section> {
        let c = self.config;
        let app = c.app();
        let publisher = c.publisher();
        let desktop = c.desktop();
        let dotnet = c.dotnet();
        let output = c.output();
        let flatpak = c.flatpak();
        let setup = c.setup();
        let icons = desktop
            .icon_files
            .iter()
            .map(|p| self.relative(p))
            .collect();

        vec![
            Section {
                title: "APP PREAMBLE",
                entries: vec![
                    entry(
                        keys::APP_BASE_NAME,
                        "Mandatory application base name. Must not contain spaces.",
                        text(&app.base_name),
                    ),
                    entry(
                        keys::APP_FRIENDLY_NAME,
                        "Mandatory friendly name, may contain spaces.",
                        text(&app.friendly_name),
                    ),
                    entry(
                        keys::APP_ID,
                        "Mandatory reverse DNS application identifier.",
                        text(&app.id),
                    ),
                    entry(
                        keys::APP_VERSION_RELEASE,
                        concat!(
                            "Mandatory version and package release in the form ",
                            "VERSION[RELEASE].\nRelease defaults to 1 when omitted.",
                        ),
                        text(&app.version_release),
                    ),
                    entry(
                        keys::APP_SHORT_SUMMARY,
                        "Mandatory single line summary.",
                        text(&app.short_summary),
                    ),
                    entry(
                        keys::APP_DESCRIPTION,
                        concat!(
                            "Optional multi-line description. Blank lines separate ",
                            "paragraphs;\nlines starting with '* ', '- ' or '+ ' form a list.",
                        ),
                        ConfValue::List(app.description.clone()),
                    ),
                    entry(
                        keys::APP_LICENSE_ID,
                        "Mandatory license identifier, e.g. MIT or GPL-3.0-or-later.",
                        text(&app.license_id),
                    ),
                    entry(
                        keys::APP_LICENSE_FILE,
                        "Optional path to a license file. NONE to omit.",
                        self.path(&app.license_file),
                    ),
                    entry(
                        keys::APP_CHANGE_FILE,
                        "Optional path to a changelog file. NONE to omit.",
                        self.path(&app.change_file),
                    ),
                ],
            },
            Section {
                title: "PUBLISHER",
                entries: vec![
                    entry(
                        keys::PUBLISHER_NAME,
                        "Mandatory publisher or author name.",
                        text(&publisher.name),
                    ),
                    entry(
                        keys::PUBLISHER_ID,
                        "Optional reverse DNS publisher identifier.",
                        opt(&publisher.id),
                    ),
                    entry(
                        keys::PUBLISHER_COPYRIGHT,
                        "Optional copyright statement.",
                        opt(&publisher.copyright),
                    ),
                    entry(
                        keys::PUBLISHER_LINK_NAME,
                        "Optional name for the publisher link.",
                        opt(&publisher.link_name),
                    ),
                    entry(
                        keys::PUBLISHER_LINK_URL,
                        "Optional publisher URL.",
                        opt(&publisher.link_url),
                    ),
                    entry(
                        keys::PUBLISHER_EMAIL,
                        "Optional publisher email.",
                        opt(&publisher.email),
                    ),
                ],
            },
            Section {
                title: "DESKTOP INTEGRATION",
                entries: vec![
                    entry(
                        keys::DESKTOP_NO_DISPLAY,
                        "Hide the application from desktop menus. true or false.",
                        flag(desktop.no_display),
                    ),
                    entry(
                        keys::DESKTOP_TERMINAL,
                        "Run the application in a terminal. true or false.",
                        flag(desktop.terminal),
                    ),
                    entry(
                        keys::DESKTOP_FILE,
                        concat!(
                            "Optional custom desktop entry file. Blank for ",
                            "the default; NONE for no entry.",
                        ),
                        self.path(&desktop.desktop_file),
                    ),
                    entry(
                        keys::START_COMMAND,
                        "Optional command name used to launch the application.",
                        opt(&desktop.start_command),
                    ),
                    entry(
                        keys::PRIME_CATEGORY,
                        "Optional main desktop menu category.",
                        opt(&desktop.prime_category),
                    ),
                    entry(
                        keys::META_FILE,
                        concat!(
                            "Optional AppStream metadata file. Blank for ",
                            "the default; NONE for none.",
                        ),
                        self.path(&desktop.meta_file),
                    ),
                    entry(
                        keys::ICON_FILES,
                        "Optional icon files, one per line.",
                        ConfValue::List(icons),
                    ),
                ],
            },
            Section {
                title: "DOTNET PUBLISH",
                entries: vec![
                    entry(
                        keys::DOTNET_PROJECT_PATH,
                        "Optional project or solution to publish.",
                        self.path(&dotnet.project_path),
                    ),
                    entry(
                        keys::DOTNET_PUBLISH_ARGS,
                        "Optional publish arguments. Macros may be used.",
                        opt(&dotnet.publish_args),
                    ),
                    entry(
                        keys::DOTNET_POST_PUBLISH,
                        "Optional script run after publish.",
                        self.path(&dotnet.post_publish),
                    ),
                    entry(
                        keys::DOTNET_POST_PUBLISH_ON_WINDOWS,
                        "Optional script run after publish on Windows.",
                        self.path(&dotnet.post_publish_on_windows),
                    ),
                ],
            },
            Section {
                title: "PACKAGE OUTPUT",
                entries: vec![
                    entry(
                        keys::PACKAGE_NAME,
                        "Optional package name. Letters, digits, '-', '+' and '.' only.",
                        opt(&output.package_name),
                    ),
                    entry(
                        keys::OUTPUT_DIRECTORY,
                        "Output directory for packages.",
                        text(&self.relative(&output.output_directory)),
                    ),
                ],
            },
            Section {
                title: "APPIMAGE OPTIONS",
                entries: vec![
                    entry(
                        keys::APPIMAGE_ARGS,
                        "Optional additional appimagetool arguments.",
                        opt(&c.appimage().args),
                    ),
                    entry(
                        keys::APPIMAGE_VERSION_OUTPUT,
                        "Include the version in the output file name.",
                        flag(c.appimage().version_output),
                    ),
                ],
            },
            Section {
                title: "FLATPAK OPTIONS",
                entries: vec![
                    entry(
                        keys::FLATPAK_PLATFORM_RUNTIME,
                        "Flatpak platform runtime.",
                        text(&flatpak.platform_runtime),
                    ),
                    entry(
                        keys::FLATPAK_PLATFORM_SDK,
                        "Flatpak platform SDK.",
                        text(&flatpak.platform_sdk),
                    ),
                    entry(
                        keys::FLATPAK_PLATFORM_VERSION,
                        "Flatpak platform version.",
                        text(&flatpak.platform_version),
                    ),
                    entry(
                        keys::FLATPAK_FINISH_ARGS,
                        "Finish arguments in the form --name=value, one per line.",
                        ConfValue::List(flatpak.finish_args.clone()),
                    ),
                    entry(
                        keys::FLATPAK_BUILDER_ARGS,
                        "Additional flatpak-builder arguments, one per line.",
                        ConfValue::List(flatpak.builder_args.clone()),
                    ),
                ],
            },
            Section {
                title: "RPM OPTIONS",
                entries: vec![
                    entry(
                        keys::RPM_AUTO_REQ,
                        "Let rpmbuild detect requirements automatically.",
                        flag(c.rpm().auto_req),
                    ),
                    entry(
                        keys::RPM_AUTO_PROV,
                        "Let rpmbuild detect provisions automatically.",
                        flag(c.rpm().auto_prov),
                    ),
                    entry(
                        keys::RPM_REQUIRES,
                        "Package requirements, one per line.",
                        ConfValue::List(c.rpm().requires.clone()),
                    ),
                ],
            },
            Section {
                title: "DEBIAN OPTIONS",
                entries: vec![
                    entry(
                        keys::DEBIAN_RECOMMENDS,
                        "Recommended packages, one per line.",
                        ConfValue::List(c.debian().recommends.clone()),
                    ),
                ],
            },
            Section {
                title: "WINDOWS SETUP OPTIONS",
                entries: vec![
                    entry(
                        keys::SETUP_GROUP_NAME,
                        "Optional start menu group name.",
                        opt(&setup.group_name),
                    ),
                    entry(
                        keys::SETUP_ADMIN_INSTALL,
                        "Install for all users (requires admin).",
                        flag(setup.admin_install),
                    ),
                    entry(
                        keys::SETUP_COMMAND_PROMPT,
                        "Optional title of a start menu command prompt entry.",
                        opt(&setup.command_prompt),
                    ),
                    entry(
                        keys::SETUP_MIN_WINDOWS_VERSION,
                        "Minimum Windows version.",
                        text(&setup.min_windows_version),
                    ),
                    entry(
                        keys::SETUP_SIGN_TOOL,
                        "Optional signing tool command.",
                        opt(&setup.sign_tool),
                    ),
                    entry(
                        keys::SETUP_SUFFIX_OUTPUT,
                        "Optional suffix for the installer file name.",
                        opt(&setup.suffix_output),
                    ),
                    entry(
                        keys::SETUP_VERSION_OUTPUT,
                        "Include the version in the installer file name.",
                        flag(setup.version_output),
                    ),
                ],
            },
        ]
    }
}

fn write_value(out: &mut String, key: &str, value: &ConfValue) {
    match value {
        ConfValue::Text(v) => out.push_str(&format!("{} = {}\n", key, quote(v))),
        ConfValue::List(items) if items.is_empty() => out.push_str(&format!("{} = \n", key)),
        ConfValue::List(items) if items.len() == 1 && !items[0].contains(';') => {
            out.push_str(&format!("{} = {}\n", key, quote(&items[0])))
        }
        ConfValue::List(items) => {
            out.push_str(&format!("{} = {}\n", key, MULTI_QUOTE));
            for item in items {
                if item.is_empty() {
                    out.push('\n');
                } else {
                    out.push_str(&format!("{}{}\n", INDENT, item));
                }
            }
            out.push_str(&format!("{}\n", MULTI_QUOTE));
        }
    }
}

/// Protect a value the reader would otherwise unquote
fn quote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() > 1 && bytes[0] == bytes[bytes.len() - 1] {
        match bytes[0] {
            b'"' => return format!("'{}'", value),
            b'\'' => return format!("\"{}\"", value),
            _ => {}
        }
    }
    value.to_string()
}
