//! Recommended `.jdpignore` rules for common native libraries.

use crate::Platform;

/// Global rules: JavaFX, which the launcher runtime already provides.
#[must_use]
pub fn global_rules() -> Vec<String> {
    [
        "# JavaFX libraries - provided by the runtime",
        "javafx",
        "com/sun/javafx",
        "com/sun/glass",
        "com/sun/prism",
        "/glass.dll",
        "/libglass.dylib",
        "/libglass.so",
        "/prism_*.dll",
        "/libprism_*.dylib",
        "/libprism_*.so",
        "/javafx_*.dll",
        "/libjavafx_*.dylib",
        "/libjavafx_*.so",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Rules for `.jdpignore.<platform>`. [`Platform::Default`] gets the global
/// rules.
#[must_use]
pub fn platform_rules(platform: Platform) -> Vec<String> {
    if platform.is_default() {
        return global_rules();
    }

    let mut rules = vec![
        format!("# Keep {} native libraries", platform.display_name()),
        String::new(),
    ];
    rules.extend(skiko_rules(platform));
    rules.extend(sqlite_rules(platform));
    rules.extend(libgdx_rules(platform));
    rules
}

/// [`platform_rules`] formatted as ignore-file text.
#[must_use]
pub fn recommended_rules(platform: Platform) -> String {
    let mut text = platform_rules(platform).join("\n");
    text.push('\n');
    text
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn skiko_rules(platform: Platform) -> Vec<String> {
    let keep = match platform {
        Platform::WinX64 => "!/skiko-windows-x64.dll",
        Platform::WinArm64 => "!/skiko-windows-arm64.dll",
        Platform::MacX64 => "!/libskiko-macos-x64.dylib",
        Platform::MacArm64 => "!/libskiko-macos-arm64.dylib",
        Platform::LinuxX64 => "!/libskiko-linux-x64.so",
        Platform::LinuxArm64 => "!/libskiko-linux-arm64.so",
        Platform::Default => return Vec::new(),
    };

    lines(&[
        "# Skiko (Compose Multiplatform) native libraries",
        keep,
        "skiko-windows-*.dll",
        "libskiko-macos-*.dylib",
        "libskiko-linux-*.so",
        "skiko-*.dll",
        "libskiko-*.dylib",
        "libskiko-*.so",
        "",
    ])
}

fn sqlite_rules(platform: Platform) -> Vec<String> {
    let keep = match platform {
        Platform::WinX64 => "!/org/sqlite/native/Windows/x86_64",
        Platform::WinArm64 => "!/org/sqlite/native/Windows/aarch64",
        Platform::MacX64 => "!/org/sqlite/native/Mac/x86_64",
        Platform::MacArm64 => "!/org/sqlite/native/Mac/aarch64",
        Platform::LinuxX64 => "!/org/sqlite/native/Linux/x86_64",
        Platform::LinuxArm64 => "!/org/sqlite/native/Linux/aarch64",
        Platform::Default => return Vec::new(),
    };

    lines(&["# SQLite native libraries", keep, "org/sqlite/native", ""])
}

fn libgdx_rules(platform: Platform) -> Vec<String> {
    // LWJGL ships no Windows ARM64 natives.
    let specific: &[&str] = match platform {
        Platform::WinX64 => &[
            "/linux",
            "/macos",
            "/windows/arm64",
            "/windows/x86",
            "/gdx.dll",
            "**libgdx*.so",
            "**libgdx*.dylib",
        ],
        Platform::MacX64 => &[
            "/linux",
            "/windows",
            "/macos/arm64",
            "**gdx*.dll",
            "**libgdx*.so",
            "/libgdxarm64.dylib",
        ],
        Platform::MacArm64 => &[
            "/linux",
            "/windows",
            "/macos/x64",
            "**gdx*.dll",
            "**libgdx*.so",
            "/libgdx64.dylib",
        ],
        Platform::LinuxX64 => &[
            "/macos",
            "/windows",
            "/linux",
            "!/linux/x64",
            "**gdx*.dll",
            "**libgdx*.so",
            "/libgdx*.dylib",
            "!/libgdx64.so",
        ],
        Platform::LinuxArm64 => &[
            "/macos",
            "/windows",
            "/linux",
            "!/linux/arm64",
            "**gdx*.dll",
            "**libgdx*.so",
            "/libgdx*.dylib",
            "!/libgdxarm64.so",
        ],
        Platform::WinArm64 | Platform::Default => return Vec::new(),
    };

    let mut rules = vec!["# LWJGL native libraries".to_string()];
    rules.extend(lines(specific));
    rules.push(String::new());
    rules
}
