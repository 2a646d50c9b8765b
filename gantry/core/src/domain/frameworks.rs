// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Test framework catalog.
//!
//! Pure lookup, no I/O: maps a source file to the framework its generated
//! tests should target and the exact filename those tests are written to.
//! Downstream file creation depends on the exact names, so each rule is an
//! explicit table entry rather than something inferred.

use serde::{Deserialize, Serialize};

/// Frameworks the catalog can emit tests for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestFramework {
    Jest,
    Pytest,
    Junit,
    #[serde(rename = "testing")]
    GoTesting,
    Rspec,
    Phpunit,
    Generic,
}

impl TestFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestFramework::Jest => "jest",
            TestFramework::Pytest => "pytest",
            TestFramework::Junit => "junit",
            TestFramework::GoTesting => "testing",
            TestFramework::Rspec => "rspec",
            TestFramework::Phpunit => "phpunit",
            TestFramework::Generic => "generic",
        }
    }

    /// Parse a caller-supplied override. Unrecognized names fall back to
    /// generic rather than failing the request.
    pub fn from_name(name: &str) -> TestFramework {
        match name.to_lowercase().as_str() {
            "jest" => TestFramework::Jest,
            "pytest" => TestFramework::Pytest,
            "junit" => TestFramework::Junit,
            "testing" | "go" => TestFramework::GoTesting,
            "rspec" => TestFramework::Rspec,
            "phpunit" => TestFramework::Phpunit,
            _ => TestFramework::Generic,
        }
    }
}

impl std::fmt::Display for TestFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framework plus derived output filename for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkBinding {
    pub framework: TestFramework,
    pub test_path: String,
}

/// Extensions the test writer generates tests for.
pub const SOURCE_EXTENSIONS: [&str; 5] = ["js", "ts", "py", "java", "go"];

/// Framework table by extension. Unmapped extensions resolve to generic.
pub fn framework_for_extension(extension: &str) -> TestFramework {
    match extension.to_lowercase().as_str() {
        "js" | "ts" => TestFramework::Jest,
        "py" => TestFramework::Pytest,
        "java" => TestFramework::Junit,
        "go" => TestFramework::GoTesting,
        "rb" => TestFramework::Rspec,
        "php" => TestFramework::Phpunit,
        _ => TestFramework::Generic,
    }
}

/// Resolve a source path to its framework and output filename.
pub fn resolve(path: &str) -> FrameworkBinding {
    let framework = framework_for_extension(extension_of(path));
    FrameworkBinding {
        framework,
        test_path: test_filename(path, framework),
    }
}

/// Derive the output filename for tests of `path` under `framework`.
/// Directory components are preserved; the rule applies to the basename.
///
/// | framework | rule                                        |
/// |-----------|---------------------------------------------|
/// | jest      | insert `.test` before the extension         |
/// | pytest    | prefix basename with `test_`, force `.py`   |
/// | junit     | append `Test` to the stem, force `.java`    |
/// | testing   | append `_test` to the stem, force `.go`     |
/// | rspec     | append `_spec` to the stem, force `.rb`     |
/// | phpunit   | append `Test` to the stem, force `.php`     |
/// | generic   | insert `.test` before the extension         |
pub fn test_filename(path: &str, framework: TestFramework) -> String {
    let (dir, name) = split_dir(path);
    let (stem, ext) = split_extension(name);

    let test_name = match framework {
        TestFramework::Jest | TestFramework::Generic => {
            if ext.is_empty() {
                format!("{stem}.test")
            } else {
                format!("{stem}.test.{ext}")
            }
        }
        TestFramework::Pytest => format!("test_{stem}.py"),
        TestFramework::Junit => format!("{stem}Test.java"),
        TestFramework::GoTesting => format!("{stem}_test.go"),
        TestFramework::Rspec => format!("{stem}_spec.rb"),
        TestFramework::Phpunit => format!("{stem}Test.php"),
    };

    if dir.is_empty() {
        test_name
    } else {
        format!("{dir}/{test_name}")
    }
}

/// Whether a path already follows one of the catalog's test naming rules.
pub fn is_test_file(path: &str) -> bool {
    let (_, name) = split_dir(path);
    let (stem, _) = split_extension(name);
    name.contains(".test.")
        || name.starts_with("test_")
        || stem.ends_with("_test")
        || stem.ends_with("_spec")
        || stem.ends_with("Test")
}

/// Extension of the basename, empty when there is none.
pub fn extension_of(path: &str) -> &str {
    let (_, name) = split_dir(path);
    let (_, ext) = split_extension(name);
    ext
}

fn split_dir(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", path),
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (name, ""),
    }
}
