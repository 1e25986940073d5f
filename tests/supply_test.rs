//! Supply phase scenarios against mock collaborators.

use dotnet_supply::config::SupplyConfig;
use dotnet_supply::installer::{InstallerCall, MockInstaller};
use dotnet_supply::manifest::{Dependency, MockManifest};
use dotnet_supply::shell::MockExecutor;
use dotnet_supply::stager::Stager;
use dotnet_supply::supply::{InstallOutcome, SkipReason, Supplier};
use dotnet_supply::SupplyError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BOWER_CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
    <Target Name="PrepublishScript" BeforeTargets="PrepareForPublish">
        <Exec Command="bower install" />
    </Target>
</Project>"#;

const NPM_AND_BOWER_CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
    <Target Name="PrepublishScript" BeforeTargets="PrepareForPublish">
        <Exec Command="npm install" />
        <Exec Command="bower install" />
    </Target>
</Project>"#;

struct Staging {
    _temp: TempDir,
    stager: Stager,
}

impl Staging {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build");
        fs::create_dir_all(&build).unwrap();
        let stager = Stager::new(
            build,
            temp.path().join("deps"),
            "9",
        );
        fs::create_dir_all(stager.dep_dir()).unwrap();
        Self {
            _temp: temp,
            stager,
        }
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.stager.build_dir().join(name), content).unwrap();
    }

    fn publish(&self) {
        self.write("test_app.runtimeconfig.json", "any text");
    }

    fn sdk_dir(&self) -> PathBuf {
        self.stager.dep_dir().join("dotnet-sdk")
    }
}

fn sdk_catalog(versions: &[&str]) -> MockManifest {
    MockManifest::new().with_versions("dotnet-sdk", versions)
}

fn install_sdk(staging: &Staging, manifest: &MockManifest) -> (MockInstaller, Result<(), SupplyError>) {
    let installer = MockInstaller::new();
    let executor = MockExecutor::new();
    let config = SupplyConfig::default();
    let result = Supplier::new(&staging.stager, manifest, &installer, &executor, &config)
        .install_dotnet_sdk()
        .map(|_| ());
    (installer, result)
}

fn assert_installed_sdk(staging: &Staging, installer: &MockInstaller, version: &str) {
    assert_eq!(
        installer.calls(),
        vec![InstallerCall::Install(
            Dependency::new("dotnet-sdk", version),
            staging.sdk_dir()
        )]
    );
}

mod dotnet_sdk {
    use super::*;

    #[test]
    fn buildpack_yml_exact_version_in_catalog() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 6.7.8");
        let manifest = sdk_catalog(&["6.7.8"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "6.7.8");
    }

    #[test]
    fn buildpack_yml_exact_version_not_in_catalog() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 1.2.3");
        let manifest = sdk_catalog(&["1.1.1", "1.2.2", "1.3.7"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        assert_eq!(
            result.unwrap_err().to_string(),
            "no match found for 1.2.3 in [1.1.1 1.2.2 1.3.7]"
        );
        assert!(installer.calls().is_empty());
    }

    #[test]
    fn buildpack_yml_floating_patch() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 6.7.x");
        let manifest = sdk_catalog(&["6.7.7", "6.7.8", "6.9.0"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "6.7.8");
    }

    #[test]
    fn buildpack_yml_floating_minor_and_patch() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 6.x.x");
        let manifest = sdk_catalog(&["6.7.7", "6.7.8", "7.0.0"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "6.7.8");
    }

    #[test]
    fn buildpack_yml_single_wildcard() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 6.x");
        let manifest = sdk_catalog(&["6.7.7", "6.7.8", "7.0.0"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "6.7.8");
    }

    #[test]
    fn buildpack_yml_floating_line_not_in_catalog() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 1.2.x");
        let manifest = sdk_catalog(&["1.1.1", "1.3.7"]);

        let (_, result) = install_sdk(&staging, &manifest);
        assert_eq!(
            result.unwrap_err().to_string(),
            "no match found for 1.2.x in [1.1.1 1.3.7]"
        );
    }

    #[test]
    fn global_json_with_byte_order_mark() {
        let staging = Staging::new();
        staging.write("global.json", "\u{FEFF}{\"sdk\": {\"version\": \"6.7.8\"}}");
        let manifest = sdk_catalog(&["6.7.8"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "6.7.8");
    }

    #[test]
    fn global_json_version_in_catalog() {
        let staging = Staging::new();
        staging.write("global.json", r#"{"sdk": {"version": "6.7.8"}}"#);
        let manifest = sdk_catalog(&["6.7.8"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "6.7.8");
        assert!(manifest.default_requests().is_empty());
    }

    #[test]
    fn global_json_missing_version_rolls_forward_on_line() {
        let staging = Staging::new();
        staging.write("global.json", r#"{"sdk": {"version": "1.2.3"}}"#);
        let manifest = sdk_catalog(&["1.1.1", "1.2.5", "1.2.6", "1.3.7"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "1.2.6");
    }

    #[test]
    fn global_json_missing_line_uses_default() {
        let staging = Staging::new();
        staging.write("global.json", r#"{"sdk": {"version": "1.2.3"}}"#);
        let manifest = sdk_catalog(&["1.1.1", "1.3.7"])
            .with_default(Dependency::new("dotnet-sdk", "3.4.5"));

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "3.4.5");
        assert_eq!(manifest.default_requests(), vec!["dotnet-sdk"]);
    }

    #[test]
    fn global_json_without_sdk_uses_default() {
        let staging = Staging::new();
        staging.write("global.json", "{}");
        let manifest = sdk_catalog(&[]).with_default(Dependency::new("dotnet-sdk", "3.4.5"));

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "3.4.5");
    }

    #[test]
    fn malformed_global_json_is_fatal() {
        let staging = Staging::new();
        staging.write("global.json", "hi mom");
        let manifest = sdk_catalog(&[]).with_default(Dependency::new("dotnet-sdk", "3.4.5"));

        let (installer, result) = install_sdk(&staging, &manifest);
        assert!(matches!(
            result.unwrap_err(),
            SupplyError::MalformedVersionFile { .. }
        ));
        assert!(installer.calls().is_empty());
    }

    #[test]
    fn buildpack_yml_wins_over_global_json() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 5.4.3");
        staging.write("global.json", r#"{"sdk": {"version": "6.7.8"}}"#);
        let manifest = sdk_catalog(&["5.4.3", "6.7.8"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "5.4.3");
    }

    #[test]
    fn buildpack_yml_hides_malformed_global_json() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 5.4.3");
        staging.write("global.json", "hi mom");
        let manifest = sdk_catalog(&["5.4.3"]);

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "5.4.3");
    }

    #[test]
    fn no_version_files_and_empty_catalog_uses_default_verbatim() {
        let staging = Staging::new();
        let manifest = sdk_catalog(&[]).with_default(Dependency::new("dotnet-sdk", "9.9.9"));

        let (installer, result) = install_sdk(&staging, &manifest);
        result.unwrap();
        assert_installed_sdk(&staging, &installer, "9.9.9");
    }

    #[test]
    fn missing_default_is_fatal() {
        let staging = Staging::new();
        let manifest = sdk_catalog(&["6.7.8"]);

        let (_, result) = install_sdk(&staging, &manifest);
        assert!(matches!(
            result.unwrap_err(),
            SupplyError::DefaultVersionUnavailable { .. }
        ));
    }
}

mod node {
    use super::*;

    fn unpack_node(_: &str, dir: &std::path::Path) -> std::io::Result<()> {
        let bin = dir.join("node-v6.12.0-linux-x64").join("bin");
        fs::create_dir_all(&bin)?;
        fs::write(bin.join("node"), "")
    }

    fn node_catalog() -> MockManifest {
        MockManifest::new().with_versions("node", &["6.12.0"])
    }

    #[test]
    fn install_node_config_forces_install() {
        let staging = Staging::new();
        let manifest = node_catalog();
        let installer = MockInstaller::new().on_install_only_version(unpack_node);
        let executor = MockExecutor::new();
        executor.fail("node -v");
        let config = SupplyConfig::default().with_install_node(true);

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        assert_eq!(
            decision.outcome,
            InstallOutcome::Installed(Dependency::new("node", "6.12.0"))
        );
        let node_dir = staging.stager.dep_dir().join("node");
        assert!(node_dir.join("bin").join("node").is_file());
        assert!(!staging.stager.dep_dir().join("node-dist").exists());
    }

    #[test]
    fn failed_node_unpack_removes_scratch_dir() {
        let staging = Staging::new();
        let manifest = node_catalog();
        let installer = MockInstaller::new().on_install_only_version(|_, dir| {
            fs::write(dir.join("partial"), "")?;
            Err(std::io::Error::other("tar exited with 2"))
        });
        let executor = MockExecutor::new();
        let config = SupplyConfig::default().with_install_node(true);

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap_err();

        assert!(matches!(err, SupplyError::InstallFailed { .. }));
        assert!(!staging.stager.dep_dir().join("node-dist").exists());
        assert!(!staging.stager.dep_dir().join("node").exists());
    }

    #[test]
    fn install_node_config_ignores_existing_node() {
        let staging = Staging::new();
        let manifest = node_catalog();
        let installer = MockInstaller::new().on_install_only_version(unpack_node);
        let executor = MockExecutor::new();
        let config = SupplyConfig::default().with_install_node(true);

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        assert!(decision.dependency().is_some());
        assert!(!executor.was_called("node -v"));
    }

    #[test]
    fn source_build_with_scripts_installs_node() {
        let staging = Staging::new();
        staging.write("test_app.csproj", NPM_AND_BOWER_CSPROJ);
        let manifest = node_catalog();
        let installer = MockInstaller::new().on_install_only_version(unpack_node);
        let executor = MockExecutor::new();
        executor.fail("node -v");
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        assert_eq!(decision.dependency(), Some(&Dependency::new("node", "6.12.0")));
        assert_eq!(
            installer.calls(),
            vec![InstallerCall::InstallOnlyVersion(
                "node".to_string(),
                staging.stager.dep_dir().join("node-dist")
            )]
        );
    }

    #[cfg(unix)]
    #[test]
    fn installed_node_is_linked_into_bin() {
        let staging = Staging::new();
        staging.write("test_app.csproj", NPM_AND_BOWER_CSPROJ);
        let manifest = node_catalog();
        let installer = MockInstaller::new().on_install_only_version(unpack_node);
        let executor = MockExecutor::new();
        executor.fail("node -v");
        let config = SupplyConfig::default();

        Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        let dep_dir = staging.stager.dep_dir();
        assert_eq!(
            fs::read_link(dep_dir.join("bin").join("node")).unwrap(),
            dep_dir.join("node").join("bin").join("node")
        );
    }

    #[test]
    fn published_project_skips_node() {
        let staging = Staging::new();
        staging.write("test_app.csproj", NPM_AND_BOWER_CSPROJ);
        staging.publish();
        let manifest = node_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("node -v");
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        assert_eq!(decision.skip_reason(), Some(SkipReason::Published));
        assert!(installer.calls().is_empty());
    }

    #[test]
    fn project_without_scripts_skips_node() {
        let staging = Staging::new();
        let manifest = node_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("node -v");
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        assert_eq!(decision.skip_reason(), Some(SkipReason::NotRequired));
    }

    #[test]
    fn existing_node_is_not_reinstalled() {
        let staging = Staging::new();
        staging.write("test_app.csproj", NPM_AND_BOWER_CSPROJ);
        let manifest = node_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap();

        assert_eq!(decision.skip_reason(), Some(SkipReason::AlreadyInstalled));
        assert!(installer.calls().is_empty());
        assert!(executor.was_called("node -v"));
    }

    #[test]
    fn install_failure_is_fatal() {
        let staging = Staging::new();
        let manifest = node_catalog();
        let installer = MockInstaller::failing("disk full");
        let executor = MockExecutor::new();
        let config = SupplyConfig::default().with_install_node(true);

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_node()
            .unwrap_err();

        assert!(matches!(err, SupplyError::InstallFailed { .. }));
        assert!(err.to_string().contains("node 6.12.0"));
    }
}

mod bower {
    use super::*;

    fn bower_staging() -> Staging {
        let staging = Staging::new();
        fs::create_dir_all(staging.stager.dep_dir().join("node").join("bin")).unwrap();
        staging.write("test_app.csproj", BOWER_CSPROJ);
        staging
    }

    fn bower_catalog() -> MockManifest {
        MockManifest::new().with_versions("bower", &["1.8.2"])
    }

    #[test]
    fn source_build_installs_bower() {
        let staging = bower_staging();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("bower -v");
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap();

        assert_eq!(decision.dependency(), Some(&Dependency::new("bower", "1.8.2")));
        assert_eq!(installer.fetched(), vec![Dependency::new("bower", "1.8.2")]);
        assert!(executor.was_called_with_prefix("npm install -g "));

        let npm = executor
            .calls()
            .into_iter()
            .find(|c| c.command.starts_with("npm install -g"))
            .unwrap();
        assert_eq!(npm.dir, staging.stager.build_dir());
        assert!(npm.command.ends_with("bower-1.8.2.tgz"));
        assert!(!staging.stager.dep_dir().join("bower-dist").exists());
    }

    #[test]
    fn failed_npm_install_removes_scratch_dir() {
        let staging = bower_staging();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("bower -v");
        let tarball = staging
            .stager
            .dep_dir()
            .join("bower-dist")
            .join("bower-1.8.2.tgz");
        executor.fail(&format!("npm install -g {}", tarball.display()));
        let config = SupplyConfig::default();

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap_err();

        assert!(matches!(err, SupplyError::InstallFailed { .. }));
        assert_eq!(installer.fetched(), vec![Dependency::new("bower", "1.8.2")]);
        assert!(!staging.stager.dep_dir().join("bower-dist").exists());
    }

    #[test]
    fn published_project_skips_bower() {
        let staging = bower_staging();
        staging.publish();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap();

        assert_eq!(decision.skip_reason(), Some(SkipReason::Published));
        assert!(installer.calls().is_empty());
    }

    #[test]
    fn missing_npm_is_fatal() {
        let staging = bower_staging();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("npm -v");
        executor.fail("bower -v");
        let config = SupplyConfig::default();

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap_err();

        assert!(matches!(err, SupplyError::MissingHostTool { .. }));
        assert_eq!(
            err.to_string(),
            "Trying to install bower but npm is not installed"
        );
        assert!(installer.calls().is_empty());
    }

    #[test]
    fn existing_bower_is_not_reinstalled() {
        let staging = bower_staging();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap();

        assert_eq!(decision.skip_reason(), Some(SkipReason::AlreadyInstalled));
        assert!(!executor.was_called_with_prefix("npm install"));
    }

    #[test]
    fn project_without_bower_skips() {
        let staging = Staging::new();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("npm -v");
        let config = SupplyConfig::default();

        let decision = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap();

        assert_eq!(decision.skip_reason(), Some(SkipReason::NotRequired));
        assert!(executor.calls().is_empty());
    }

    #[test]
    fn npm_install_failure_is_fatal() {
        let staging = bower_staging();
        let manifest = bower_catalog();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("bower -v");
        let config = SupplyConfig::default();

        // Only the install command fails; `npm -v` still succeeds.
        let tarball = staging.stager.dep_dir().join("bower-dist").join("bower-1.8.2.tgz");
        executor.fail(&format!("npm install -g {}", tarball.display()));

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap_err();

        assert!(matches!(err, SupplyError::InstallFailed { .. }));
    }

    #[test]
    fn empty_catalog_is_fatal() {
        let staging = bower_staging();
        let manifest = MockManifest::new();
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("bower -v");
        let config = SupplyConfig::default();

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .install_bower()
            .unwrap_err();

        assert!(matches!(err, SupplyError::DefaultVersionUnavailable { .. }));
    }
}

mod run {
    use super::*;

    #[test]
    fn published_project_installs_only_the_sdk() {
        let staging = Staging::new();
        staging.write("test_app.csproj", NPM_AND_BOWER_CSPROJ);
        staging.publish();
        let manifest = sdk_catalog(&["2.1.302"])
            .with_default(Dependency::new("dotnet-sdk", "2.1.302"));
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        executor.fail("node -v");
        let config = SupplyConfig::default().with_buildpack_version("2.2.0");

        let report = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .run()
            .unwrap();

        let names: Vec<&str> = report.decisions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["dotnet-sdk", "node", "bower"]);
        assert_eq!(
            report.installed(),
            vec![&Dependency::new("dotnet-sdk", "2.1.302")]
        );
        assert_eq!(
            report.decision("node").and_then(|d| d.skip_reason()),
            Some(SkipReason::Published)
        );
        assert_eq!(
            report.decision("bower").and_then(|d| d.skip_reason()),
            Some(SkipReason::Published)
        );
    }

    #[test]
    fn run_wires_the_sdk_and_writes_config() {
        let staging = Staging::new();
        let manifest = sdk_catalog(&["2.1.302"])
            .with_default(Dependency::new("dotnet-sdk", "2.1.302"));
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        let config = SupplyConfig::default().with_buildpack_version("2.2.0");

        Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .run()
            .unwrap();

        let dep_dir = staging.stager.dep_dir();
        assert_eq!(
            fs::read_to_string(dep_dir.join("env").join("DOTNET_ROOT")).unwrap(),
            staging.sdk_dir().to_string_lossy()
        );
        assert!(dep_dir.join("profile.d").join("dotnet.sh").is_file());
        let config_yml = fs::read_to_string(dep_dir.join("config.yml")).unwrap();
        assert!(config_yml.contains("dotnet-core"));
        assert!(config_yml.contains("2.2.0"));
    }

    #[test]
    fn sdk_failure_stops_the_run() {
        let staging = Staging::new();
        staging.write("buildpack.yml", "dotnet-core:\n  sdk: 1.2.3");
        let manifest = sdk_catalog(&["1.1.1"]);
        let installer = MockInstaller::new();
        let executor = MockExecutor::new();
        let config = SupplyConfig::default();

        let err = Supplier::new(&staging.stager, &manifest, &installer, &executor, &config)
            .run()
            .unwrap_err();

        assert!(matches!(err, SupplyError::NoMatchingVersion { .. }));
        assert!(executor.calls().is_empty());
        assert!(!staging.stager.dep_dir().join("config.yml").exists());
    }
}
