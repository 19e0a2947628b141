//! Tests for appdeploy-core macros module

use appdeploy_core::{
    macros, BuildContext, Changelog, DeployConfig, MacroId, MacroTable, MacroWarnings,
    ValidateOptions,
};
use chrono::NaiveDate;

const CONFIG: &str = r#"
AppBaseName = HelloWorld
AppFriendlyName = Hello World
AppId = com.example.helloworld
AppVersionRelease = 1.2.3[4]
AppShortSummary = Fast & <simple>
AppDescription = """
    Say hello.

    * Greets & waves
"""
AppLicenseId = MIT
PublisherName = Example Team
PublisherCopyright = Copyright ${NOT_A_MACRO}
"#;

fn config() -> DeployConfig {
    DeployConfig::parse(CONFIG, "/project", ValidateOptions::no_assert()).unwrap()
}

fn context(config: &DeployConfig) -> BuildContext {
    BuildContext::new(config)
        .with_deploy_kind("appimage")
        .with_runtime("linux-x64", "x86_64")
        .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        .with_install("/opt/helloworld", "/opt/helloworld/HelloWorld")
}

fn table() -> MacroTable {
    let config = config();
    MacroTable::new(&config, &context(&config))
}

// ============================================================================
// Table Tests
// ============================================================================

#[test]
fn test_every_macro_present() {
    let table = table();
    assert_eq!(table.len(), MacroId::ALL.len());
    let ids: Vec<MacroId> = table.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, MacroId::ALL.to_vec());
}

#[test]
fn test_table_values() {
    let table = table();
    assert_eq!(table.get(MacroId::AppBaseName), "HelloWorld");
    assert_eq!(table.get(MacroId::AppVersion), "1.2.3");
    assert_eq!(table.get(MacroId::PackageRelease), "4");
    assert_eq!(table.get(MacroId::PackageName), "HelloWorld");
    assert_eq!(table.get(MacroId::DeployKind), "appimage");
    assert_eq!(table.get(MacroId::DotnetRuntime), "linux-x64");
    assert_eq!(table.get(MacroId::BuildArch), "x86_64");
    assert_eq!(table.get(MacroId::BuildTarget), "Release");
    assert_eq!(table.get(MacroId::BuildDate), "2024-05-01");
    assert_eq!(table.get(MacroId::BuildYear), "2024");
    assert_eq!(table.get(MacroId::DesktopNoDisplay), "false");
    assert_eq!(table.get(MacroId::DesktopIntegrate), "true");
    assert_eq!(table.get(MacroId::LocalDirectory), "/project");
    assert_eq!(table.get(MacroId::InstallExec), "/opt/helloworld/HelloWorld");
}

#[test]
fn test_absent_optional_values_are_empty() {
    let table = table();
    assert_eq!(table.get(MacroId::PublisherEmail), "");
    assert_eq!(table.get(MacroId::PublisherLinkUrl), "");
    assert_eq!(table.get(MacroId::PrimeCategory), "");
    assert_eq!(table.get(MacroId::AppstreamChangelogXml), "");
}

#[test]
fn test_version_override() {
    let config = config();
    let ctx = context(&config).with_version("9.9", "2");
    let table = MacroTable::new(&config, &ctx);
    assert_eq!(table.get(MacroId::AppVersion), "9.9");
    assert_eq!(table.get(MacroId::PackageRelease), "2");
}

#[test]
fn test_description_markup() {
    let table = table();
    assert_eq!(
        table.get(MacroId::AppstreamDescriptionXml),
        "<p>Say hello.</p>\n<ul>\n    <li>Greets &amp; waves</li>\n</ul>"
    );
}

#[test]
fn test_env_vars_and_json() {
    let table = table();
    let vars = table.to_env_vars();
    assert_eq!(vars.len(), MacroId::ALL.len());
    assert!(vars.contains(&("APP_ID".to_string(), "com.example.helloworld".to_string())));

    let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
    assert_eq!(json["APP_VERSION"], "1.2.3");
}

// ============================================================================
// Expansion Tests
// ============================================================================

#[test]
fn test_expand_plain() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let out = table.expand(
        "Name=${APP_FRIENDLY_NAME}\nExec=${INSTALL_EXEC}",
        false,
        &mut warnings,
        None,
    );
    assert_eq!(out, "Name=Hello World\nExec=/opt/helloworld/HelloWorld");
    assert!(warnings.is_empty());
}

#[test]
fn test_expand_without_tokens_unchanged() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let text = "cost is $5 and {braces}";
    assert_eq!(table.expand(text, true, &mut warnings, None), text);
    assert!(warnings.is_empty());
}

#[test]
fn test_escaping_discipline() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let out = table.expand(
        "<summary>${APP_SHORT_SUMMARY}</summary>${APPSTREAM_DESCRIPTION_XML}",
        true,
        &mut warnings,
        None,
    );
    assert!(out.starts_with("<summary>Fast &amp; &lt;simple&gt;</summary>"));
    assert!(out.ends_with(table.get(MacroId::AppstreamDescriptionXml)));
    assert!(out.contains("<p>Say hello.</p>"));

    let raw = table.expand("${APP_SHORT_SUMMARY}", false, &mut warnings, None);
    assert_eq!(raw, "Fast & <simple>");
}

#[test]
fn test_unknown_macro_warning() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let out = table.expand("a ${NOPE} b ${NOPE}", false, &mut warnings, Some("desktop file"));
    assert_eq!(out, "a ${NOPE} b ${NOPE}");
    let messages: Vec<&str> = warnings.iter().collect();
    assert_eq!(messages, vec!["Invalid macro ${NOPE} in desktop file"]);

    table.expand("${NOPE}", false, &mut warnings, Some("desktop file"));
    assert_eq!(warnings.len(), 1);
    table.expand("${NOPE}", false, &mut warnings, None);
    assert_eq!(warnings.len(), 2);
}

#[test]
fn test_names_are_case_sensitive() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let out = table.expand("${app_id}", false, &mut warnings, None);
    assert_eq!(out, "${app_id}");
    assert_eq!(warnings.len(), 1);
}

#[test]
fn test_unterminated_token_truncated() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let text = "x ${APP_ID and a long unterminated tail";
    assert_eq!(table.expand(text, false, &mut warnings, None), text);
    assert_eq!(
        warnings.into_vec(),
        vec!["Invalid macro ${APP_ID and a lon".to_string()]
    );
}

#[test]
fn test_unterminated_before_valid_token() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let out = table.expand("${OOPS ${APP_ID}", false, &mut warnings, None);
    assert_eq!(out, "${OOPS com.example.helloworld");
    assert_eq!(warnings.into_vec(), vec!["Invalid macro ${OOPS ".to_string()]);
}

#[test]
fn test_value_not_rescanned() {
    // PublisherCopyright holds a literal "${NOT_A_MACRO}"
    let config = DeployConfig::parse(
        &CONFIG.replace("${NOT_A_MACRO}", "${APP_ID}"),
        "/project",
        ValidateOptions::no_assert(),
    )
    .unwrap();
    let table = MacroTable::new(&config, &context(&config));
    let mut warnings = MacroWarnings::new();
    let out = table.expand("(${PUBLISHER_COPYRIGHT})", false, &mut warnings, None);
    assert_eq!(out, "(Copyright ${APP_ID})");
    assert!(warnings.is_empty());
}

#[test]
fn test_no_double_expansion() {
    let table = table();
    let mut warnings = MacroWarnings::new();
    let text = "${PUBLISHER_COPYRIGHT} ${APP_BASE_NAME} ${APP_VERSION}";
    let once = table.expand(text, false, &mut warnings, None);
    assert_eq!(once, "Copyright ${NOT_A_MACRO} HelloWorld 1.2.3");
    let twice = table.expand(&once, false, &mut warnings, None);
    assert_eq!(twice, once);
}

// ============================================================================
// Changelog Context Tests
// ============================================================================

#[test]
fn test_changelog_markup_inserted_verbatim() {
    let config = config();
    let changelog = Changelog::parse("+ 1.2.3;2024-05-01\n- Fixed <bug>");
    let ctx = context(&config).with_changelog(&changelog);
    let table = MacroTable::new(&config, &ctx);
    let mut warnings = MacroWarnings::new();

    let out = table.expand("${APPSTREAM_CHANGELOG_XML}", true, &mut warnings, None);
    assert_eq!(out, changelog.to_markup());
    assert!(out.contains("<li>Fixed &lt;bug&gt;</li>"));
}

#[test]
fn test_empty_changelog_placeholder() {
    let config = config();
    let ctx = context(&config).with_changelog(&Changelog::default());
    let table = MacroTable::new(&config, &ctx);
    assert_eq!(
        table.get(MacroId::AppstreamChangelogXml),
        "<release version=\"1.2.3\" date=\"2024-05-01\"/>"
    );
}

#[test]
fn test_empty_changelog_placeholder_ignores_builder_order() {
    let config = config();
    let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let expected = "<release version=\"9.9\" date=\"2025-01-31\"/>";

    let changelog_last = BuildContext::new(&config)
        .with_version("9.9", "2")
        .with_date(date)
        .with_changelog(&Changelog::default());
    let changelog_first = BuildContext::new(&config)
        .with_changelog(&Changelog::default())
        .with_version("9.9", "2")
        .with_date(date);

    for ctx in [changelog_last, changelog_first] {
        let table = MacroTable::new(&config, &ctx);
        assert_eq!(table.get(MacroId::AppstreamChangelogXml), expected);
    }
}

#[test]
fn test_changelog_markup_ignores_builder_order() {
    let config = config();
    let changelog = Changelog::parse("+ 1.2.3;2024-05-01\n- Fixed");
    let ctx = BuildContext::new(&config)
        .with_changelog(&changelog)
        .with_version("9.9", "2");
    let table = MacroTable::new(&config, &ctx);
    assert_eq!(table.get(MacroId::AppstreamChangelogXml), changelog.to_markup());
    assert_eq!(table.get(MacroId::AppVersion), "9.9");
}

// ============================================================================
// Reference Tests
// ============================================================================

#[test]
fn test_reference_lists_all() {
    let text = macros::reference();
    for id in MacroId::ALL {
        assert!(text.contains(&id.token()), "missing {}", id);
    }
    assert!(text.contains("(markup)"));
}
