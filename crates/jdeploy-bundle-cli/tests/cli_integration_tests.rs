//! Integration tests for the jdeploy-bundle binary.
//!
//! Exercises argument parsing, exit status, and the files each command
//! leaves behind.

#![allow(non_snake_case)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn jdeploy_bundle(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jdeploy-bundle"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_jar(path: &Path, entries: &[&str]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for entry in entries {
        zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(entry.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn jar_entries(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

fn write_project(dir: &Path, package_json: &str) {
    fs::write(dir.join("package.json"), package_json).unwrap();
}

// =============================================================================
// Argument handling
// =============================================================================

mod arguments {
    use super::*;

    #[test]
    fn recommend___unknown_platform___fails() {
        let output = jdeploy_bundle(&["recommend", "solaris-sparc"]);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Unknown platform: solaris-sparc"));
    }

    #[test]
    fn recommend___platform___prints_header_and_rules() {
        let output = jdeploy_bundle(&["recommend", "mac-arm64"]);

        assert!(output.status.success());
        let text = stdout(&output);
        assert!(text.starts_with("# Keep "));
        assert!(text.lines().any(|line| line.starts_with('!')));
    }

    #[test]
    fn recommend___default___prints_global_rules() {
        let output = jdeploy_bundle(&["recommend", "default"]);

        assert!(output.status.success());
        assert!(stdout(&output).lines().any(|line| line == "javafx"));
    }

    #[test]
    fn filter___missing_jar___fails() {
        let temp_dir = TempDir::new().unwrap();
        let jar = temp_dir.path().join("missing.jar");

        let output = jdeploy_bundle(&["filter", jar.to_str().unwrap(), "--strip", "com.example"]);

        assert!(!output.status.success());
    }
}

// =============================================================================
// Jar commands
// =============================================================================

mod jars {
    use super::*;

    #[test]
    fn filter___strip_and_keep___rewrites_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let jar = temp_dir.path().join("app.jar");
        write_jar(
            &jar,
            &["native/mac/lib.dylib", "native/win/lib.dll", "com/example/Main.class"],
        );

        let output = jdeploy_bundle(&[
            "filter",
            jar.to_str().unwrap(),
            "--strip",
            "/native/",
            "--keep",
            "/native/mac/",
        ]);

        assert!(output.status.success());
        assert_eq!(
            jar_entries(&jar),
            vec!["native/mac/lib.dylib", "com/example/Main.class"]
        );
    }

    #[test]
    fn filter___with_platform___writes_suffixed_copy() {
        let temp_dir = TempDir::new().unwrap();
        let jar = temp_dir.path().join("app.jar");
        write_jar(&jar, &["native/win/lib.dll", "com/example/Main.class"]);

        let output = jdeploy_bundle(&[
            "filter",
            jar.to_str().unwrap(),
            "--strip",
            "/native/win/",
            "--platform",
            "mac-x64",
        ]);

        assert!(output.status.success());
        assert_eq!(jar_entries(&jar).len(), 2);
        assert_eq!(
            jar_entries(&temp_dir.path().join("app-mac-x64.jar")),
            vec!["com/example/Main.class"]
        );
    }

    #[test]
    fn scan___root_native_library___is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let jar = temp_dir.path().join("app.jar");
        write_jar(&jar, &["libfoo.so", "com/example/Main.class"]);

        let output = jdeploy_bundle(&["scan", jar.to_str().unwrap()]);

        assert!(output.status.success());
        assert!(stdout(&output).lines().any(|line| line == "/libfoo.so"));
    }
}

// =============================================================================
// Project commands
// =============================================================================

mod projects {
    use super::*;

    const PROJECT: &str = r#"{
        "name": "myapp",
        "version": "2.0.0",
        "jdeploy": {
            "platformBundlesEnabled": true,
            "nativeNamespaces": {
                "ignore": ["com.myapp.debug"],
                "mac-arm64": ["com.myapp.native.mac.arm64"],
                "win-x64": ["com.myapp.native.win.x64"]
            }
        }
    }"#;

    #[test]
    fn check___reports_resolved_lists() {
        let temp_dir = TempDir::new().unwrap();
        write_project(temp_dir.path(), PROJECT);

        let output = jdeploy_bundle(&[
            "check",
            "--project",
            temp_dir.path().to_str().unwrap(),
            "--platform",
            "mac-arm64",
        ]);

        assert!(output.status.success());
        let text = stdout(&output);
        assert!(text.contains("Project: myapp v2.0.0"));
        assert!(text.contains("Strip: com.myapp.debug, com.myapp.native.win.x64"));
        assert!(text.contains("Keep:  com.myapp.native.mac.arm64"));
    }

    #[test]
    fn generate___writes_bundle_per_declared_platform() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("project");
        let universal = temp_dir.path().join("universal");
        let out = temp_dir.path().join("out");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(universal.join("jdeploy-bundle")).unwrap();
        write_project(&project, PROJECT);
        write_project(&universal, PROJECT);
        write_jar(
            &universal.join("jdeploy-bundle").join("app.jar"),
            &[
                "com/myapp/native/mac/arm64/Mac.class",
                "com/myapp/native/win/x64/Win.class",
                "com/myapp/debug/Debug.class",
                "com/myapp/Main.class",
            ],
        );

        let output = jdeploy_bundle(&[
            "generate",
            "--project",
            project.to_str().unwrap(),
            "--universal",
            universal.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);

        assert!(output.status.success());
        assert_eq!(
            jar_entries(&out.join("myapp-mac-arm64/jdeploy-bundle/app.jar")),
            vec!["com/myapp/native/mac/arm64/Mac.class", "com/myapp/Main.class"]
        );
        assert_eq!(
            jar_entries(&out.join("myapp-win-x64/jdeploy-bundle/app.jar")),
            vec!["com/myapp/native/win/x64/Win.class", "com/myapp/Main.class"]
        );
    }

    #[test]
    fn filter_default___without_ignore_file___leaves_bundle_alone() {
        let temp_dir = TempDir::new().unwrap();
        write_project(temp_dir.path(), PROJECT);
        let jar = temp_dir.path().join("app.jar");
        write_jar(&jar, &["com/myapp/debug/Debug.class"]);

        let output = jdeploy_bundle(&[
            "filter-default",
            "--project",
            temp_dir.path().to_str().unwrap(),
            temp_dir.path().to_str().unwrap(),
        ]);

        assert!(output.status.success());
        assert!(stdout(&output).contains("default bundle left unchanged"));
        assert_eq!(jar_entries(&jar), vec!["com/myapp/debug/Debug.class"]);
    }
}

// =============================================================================
// Signing commands
// =============================================================================

mod signing {
    use super::*;

    #[test]
    fn verify___after_sign___succeeds() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("app.jar"), b"jar bytes").unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        assert!(jdeploy_bundle(&["sign", dir, "--version", "1.0.0"]).status.success());
        assert!(jdeploy_bundle(&["verify", dir, "--version", "1.0.0"]).status.success());
    }

    #[test]
    fn verify___modified_file___fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("app.jar"), b"jar bytes").unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        assert!(jdeploy_bundle(&["sign", dir, "--version", "1.0.0"]).status.success());
        fs::write(temp_dir.path().join("app.jar"), b"changed").unwrap();

        let output = jdeploy_bundle(&["verify", dir, "--version", "1.0.0"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("app.jar"));
    }

    #[test]
    fn verify___unsigned_directory___fails() {
        let temp_dir = TempDir::new().unwrap();

        let dir = temp_dir.path().to_str().unwrap();

        let output = jdeploy_bundle(&["verify", dir, "--version", "1.0.0"]);

        assert!(!output.status.success());
    }
}
