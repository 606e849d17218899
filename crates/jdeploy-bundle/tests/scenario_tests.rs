//! End-to-end tests for platform bundle generation.
//!
//! Each test builds a project directory and a universal bundle on disk and
//! runs the public API over them.

#![allow(non_snake_case)]

use flate2::read::GzDecoder;
use jdeploy_bundle::archive::{entry_names, process_archive_for_platform};
use jdeploy_bundle::{
    BundleSigner, DigestSigner, PACKAGE_JSON, Platform, PlatformBundleGenerator, Project,
    SIGNED_BUNDLE_DIR, TarballPacker, Verification,
};
use serde_json::{Value, json};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

struct Workspace {
    _root: TempDir,
    project: PathBuf,
    universal: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new(package_json: Value) -> Self {
        let root = TempDir::new().unwrap();
        let project = root.path().join("project");
        let universal = root.path().join("jdeploy").join("publish");
        let output = root.path().join("jdeploy").join("platform-bundles");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(universal.join(SIGNED_BUNDLE_DIR)).unwrap();

        let text = serde_json::to_string_pretty(&package_json).unwrap();
        fs::write(project.join(PACKAGE_JSON), &text).unwrap();
        fs::write(universal.join(PACKAGE_JSON), &text).unwrap();

        Self {
            _root: root,
            project,
            universal,
            output,
        }
    }

    fn load(&self) -> Project {
        Project::load(&self.project).unwrap()
    }

    fn jar(&self, name: &str, entries: &[&str]) -> PathBuf {
        let path = self.universal.join(SIGNED_BUNDLE_DIR).join(name);
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        for entry in entries {
            zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
            zip.write_all(entry.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }
}

fn tarball_entries(path: &Path) -> Vec<String> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn generate_platform_bundles___per_platform_namespaces___each_bundle_keeps_its_own() {
    let workspace = Workspace::new(json!({
        "name": "myapp",
        "version": "1.0.0",
        "jdeploy": {
            "platformBundlesEnabled": true,
            "nativeNamespaces": {
                "ignore": ["com.myapp.native"],
                "mac-x64": ["com.myapp.native.mac.x64"],
                "win-x64": ["com.myapp.native.win.x64"]
            }
        }
    }));
    workspace.jar(
        "app.jar",
        &[
            "com/myapp/native/mac/x64/MacLib.class",
            "com/myapp/native/win/x64/WinLib.class",
            "com/myapp/core/Core.class",
        ],
    );

    let bundles = PlatformBundleGenerator::new()
        .generate_platform_bundles(&workspace.load(), &workspace.universal, &workspace.output)
        .unwrap();

    assert_eq!(bundles.len(), 2);
    let mac = entry_names(&workspace.output.join("myapp-mac-x64/jdeploy-bundle/app.jar")).unwrap();
    let win = entry_names(&workspace.output.join("myapp-win-x64/jdeploy-bundle/app.jar")).unwrap();
    assert_eq!(
        mac,
        vec!["com/myapp/native/mac/x64/MacLib.class", "com/myapp/core/Core.class"]
    );
    assert_eq!(
        win,
        vec!["com/myapp/native/win/x64/WinLib.class", "com/myapp/core/Core.class"]
    );

    // The universal bundle is never modified.
    assert_eq!(
        entry_names(&workspace.universal.join("jdeploy-bundle/app.jar"))
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn generate_platform_tarballs___override_and_default_names() {
    let workspace = Workspace::new(json!({
        "name": "myapp",
        "version": "1.0.0",
        "jdeploy": {
            "platformBundlesEnabled": true,
            "packageMacX64": "myapp-macos-intel",
            "nativeNamespaces": {
                "mac-x64": ["com.myapp.native.mac.x64"],
                "linux-x64": ["com.myapp.native.linux.x64"]
            }
        }
    }));
    workspace.jar("app.jar", &["com/myapp/Main.class"]);

    let tarballs = PlatformBundleGenerator::new()
        .generate_platform_tarballs(
            &workspace.load(),
            &workspace.universal,
            &workspace.output,
            &TarballPacker,
            true,
        )
        .unwrap();

    let names: Vec<String> = tarballs
        .iter()
        .map(|t| t.tarball.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["myapp-macos-intel-1.0.0.tgz", "myapp-1.0.0-linux-x64.tgz"]);

    let entries = tarball_entries(&tarballs[1].tarball);
    assert!(entries.contains(&"package/package.json".to_string()));
    assert!(entries.contains(&"package/jdeploy-bundle/app.jar".to_string()));
}

#[test]
fn generate_platform_bundle___patched_manifest_describes_variant() {
    let workspace = Workspace::new(json!({
        "name": "myapp",
        "version": "1.0.0",
        "jdeploy": {
            "platformBundlesEnabled": true,
            "nativeNamespaces": { "mac-x64": ["com.myapp.native.mac.x64"] }
        }
    }));

    let bundle = PlatformBundleGenerator::new()
        .generate_platform_bundle(
            &workspace.load(),
            &workspace.universal,
            &workspace.output,
            Some(Platform::MacX64),
        )
        .unwrap();

    let patched = Project::load(&bundle.directory).unwrap();
    assert_eq!(bundle.directory, workspace.output.join("myapp-mac-x64"));
    assert_eq!(patched.package_name().unwrap(), "myapp-temp-mac-x64");
    assert_eq!(patched.package_json()["jdeploy"]["platformVariant"], "mac-x64");
    assert_eq!(patched.package_json()["jdeploy"]["universalPackage"], "myapp");
    assert_eq!(patched.version(), "1.0.0");
}

#[test]
fn signed_bundle___rewritten_without_resigning___fails_verification() {
    let workspace = Workspace::new(json!({ "name": "myapp", "version": "1.0.0" }));
    let jar = workspace.jar("app.jar", &["native/win/lib.dll", "com/myapp/Main.class"]);
    let signed_dir = workspace.universal.join(SIGNED_BUNDLE_DIR);
    DigestSigner.sign("1.0.0", &signed_dir).unwrap();

    process_archive_for_platform(&jar, &["/native/win/"], &[]).unwrap();

    assert_eq!(
        DigestSigner.verify("1.0.0", &signed_dir).unwrap(),
        Verification::SignatureMismatch {
            path: "app.jar".to_string()
        }
    );

    DigestSigner.sign("1.0.0", &signed_dir).unwrap();
    assert!(DigestSigner.verify("1.0.0", &signed_dir).unwrap().is_verified());
}

#[test]
fn generate_platform_bundle___signed_universal___needs_signer_to_stay_verified() {
    let workspace = Workspace::new(json!({
        "name": "myapp",
        "version": "1.0.0",
        "jdeploy": {
            "platformBundlesEnabled": true,
            "nativeNamespaces": {
                "mac-arm64": ["com.myapp.native.mac.arm64"],
                "win-x64": ["com.myapp.native.win.x64"]
            }
        }
    }));
    workspace.jar(
        "app.jar",
        &[
            "com/myapp/native/mac/arm64/Mac.class",
            "com/myapp/native/win/x64/Win.class",
        ],
    );
    DigestSigner
        .sign("1.0.0", &workspace.universal.join(SIGNED_BUNDLE_DIR))
        .unwrap();
    let project = workspace.load();

    let unsigned = PlatformBundleGenerator::new()
        .generate_platform_bundle(
            &project,
            &workspace.universal,
            &workspace.output,
            Some(Platform::MacArm64),
        )
        .unwrap();
    let stale = DigestSigner
        .verify("1.0.0", &unsigned.directory.join(SIGNED_BUNDLE_DIR))
        .unwrap();
    assert!(matches!(stale, Verification::SignatureMismatch { .. }));

    let resigned = PlatformBundleGenerator::new()
        .with_signer(Box::new(DigestSigner))
        .generate_platform_bundle(
            &project,
            &workspace.universal,
            &workspace.output,
            Some(Platform::MacArm64),
        )
        .unwrap();
    let fresh = DigestSigner
        .verify("1.0.0", &resigned.directory.join(SIGNED_BUNDLE_DIR))
        .unwrap();
    assert_eq!(fresh, Verification::SignedCorrectly);
}

#[test]
fn generate_platform_bundles___ignore_files_drive_publish_platforms() {
    let workspace = Workspace::new(json!({
        "name": "myapp",
        "version": "1.0.0",
        "jdeploy": {
            "platformBundlesEnabled": true,
            "downloadPage": { "platforms": ["mac-arm64"] }
        }
    }));
    fs::write(workspace.project.join(".jdpignore"), "/native/\n").unwrap();
    fs::write(
        workspace.project.join(".jdpignore.mac-arm64"),
        "!/native/mac/arm64/\n",
    )
    .unwrap();
    workspace.jar(
        "app.jar",
        &["native/mac/arm64/libapp.dylib", "native/win/x64/app.dll", "Main.class"],
    );

    let bundles = PlatformBundleGenerator::new()
        .generate_platform_bundles(&workspace.load(), &workspace.universal, &workspace.output)
        .unwrap();

    assert_eq!(bundles.len(), 1);
    assert_eq!(bundles[0].platform, Platform::MacArm64);
    assert_eq!(
        entry_names(&bundles[0].directory.join("jdeploy-bundle/app.jar")).unwrap(),
        vec!["native/mac/arm64/libapp.dylib", "Main.class"]
    );
}
