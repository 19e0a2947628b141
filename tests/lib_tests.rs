//! Tests for appdeploy-core lib module

use appdeploy_core::{
    BuildContext, Changelog, DeployConfig, MacroTable, MacroWarnings, ValidateOptions, VERSION,
};
use std::fs;

#[test]
fn test_version() {
    assert!(VERSION.contains('.'), "VERSION should contain a dot");
}

#[test]
fn test_pipeline() {
    let temp = tempfile::TempDir::new().unwrap();
    fs::write(
        temp.path().join("CHANGES"),
        "+ 1.0.0;2024-05-01\n- First & best release\n",
    )
    .unwrap();
    let conf = temp.path().join("HelloWorld.conf");
    fs::write(
        &conf,
        r#"
AppBaseName = HelloWorld
AppFriendlyName = Hello World
AppId = com.example.helloworld
AppVersionRelease = 1.0.0
AppShortSummary = Hello
AppLicenseId = MIT
AppChangeFile = CHANGES
PublisherName = Example Team
"#,
    )
    .unwrap();

    let config = DeployConfig::from_file(&conf, ValidateOptions::default()).unwrap();
    let changelog = Changelog::from_file(config.app().change_file.path().unwrap()).unwrap();
    let ctx = BuildContext::new(&config)
        .with_deploy_kind("deb")
        .with_changelog(&changelog);
    let macros = MacroTable::new(&config, &ctx);

    let mut warnings = MacroWarnings::new();
    let meta = macros.expand(
        "<name>${APP_FRIENDLY_NAME}</name>\n<releases>\n${APPSTREAM_CHANGELOG_XML}\n</releases>",
        true,
        &mut warnings,
        Some("metainfo"),
    );
    assert!(meta.contains("<name>Hello World</name>"));
    assert!(meta.contains("<release version=\"1.0.0\" date=\"2024-05-01\">"));
    assert!(meta.contains("<li>First &amp; best release</li>"));
    assert!(warnings.is_empty());
}
