//! Project archetype detection.
//!
//! Detection walks an ordered rule table and returns the first archetype whose
//! markers are all present in the snapshot. Rules keyed on ecosystem manifests
//! come before extension-only rules, and the table always ends with the
//! unconditional generic archetype.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{NO_EXTENSION, ROOT_DIR};

/// Known project archetypes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    /// JavaScript workspace with several packages.
    NodeMonorepo,
    /// Go module.
    Go,
    /// Rust crate or workspace.
    Rust,
    /// React, Vue or Svelte frontend.
    Frontend,
    /// Node.js package.
    Node,
    /// Python package or project.
    Python,
    /// Maven or Gradle project.
    Jvm,
    /// Anything else.
    Generic,
}

/// A named layout convention used to label the analyzed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectType {
    /// Archetype identifier.
    pub kind: ProjectKind,
    /// Display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Extensions that are normal at the repository root.
    pub root_extensions: Vec<String>,
    /// Expected extensions per conventional top-level directory.
    /// An empty list accepts any extension.
    pub directory_expectations: BTreeMap<String, Vec<String>>,
}

impl ProjectType {
    /// Returns the expected extensions for a conventional directory, if any.
    pub fn expectations_for(&self, directory: &str) -> Option<&[String]> {
        self.directory_expectations
            .get(&directory.to_lowercase())
            .map(Vec::as_slice)
    }
}

impl ProjectKind {
    /// Build the archetype for this kind.
    pub fn project_type(self) -> ProjectType {
        match self {
            Self::NodeMonorepo => archetype(
                self,
                "Node.js monorepo",
                "JavaScript/TypeScript workspace split into packages",
                &["json", "yaml", "yml", "js", "ts", "md", "lock", NO_EXTENSION],
                &[
                    ("packages", &[]),
                    ("apps", &[]),
                    ("tools", &[]),
                    ("scripts", &["js", "ts", "mjs", "sh"]),
                    ("docs", &["md", "mdx"]),
                ],
            ),
            Self::Go => archetype(
                self,
                "Go",
                "Go module following the standard project layout",
                &["go", "mod", "sum", "md", "yml", "yaml", NO_EXTENSION],
                &[
                    ("cmd", &["go"]),
                    ("internal", &["go"]),
                    ("pkg", &["go"]),
                    ("api", &["go", "proto", "yaml", "yml", "json"]),
                    ("configs", &["yaml", "yml", "json", "toml"]),
                    ("scripts", &["sh", "bash", "py"]),
                    ("docs", &["md"]),
                    ("test", &[]),
                    ("web", &[]),
                    ("build", &[]),
                    ("deployments", &[]),
                ],
            ),
            Self::Rust => archetype(
                self,
                "Rust",
                "Cargo crate or workspace",
                &["toml", "lock", "md", "yml", "yaml", NO_EXTENSION],
                &[
                    ("src", &["rs"]),
                    ("tests", &["rs"]),
                    ("benches", &["rs"]),
                    ("examples", &["rs"]),
                    ("crates", &[]),
                    ("scripts", &["sh", "py"]),
                    ("docs", &["md"]),
                ],
            ),
            Self::Frontend => archetype(
                self,
                "Frontend (React/Vue/Svelte)",
                "Component-based web frontend built from package.json",
                &[
                    "json", "js", "mjs", "cjs", "ts", "html", "md", "yml", "yaml", "lock",
                    NO_EXTENSION,
                ],
                &[
                    (
                        "src",
                        &[
                            "ts", "tsx", "js", "jsx", "vue", "svelte", "css", "scss", "json",
                            "svg",
                        ],
                    ),
                    (
                        "components",
                        &["ts", "tsx", "js", "jsx", "vue", "svelte", "css", "scss"],
                    ),
                    ("styles", &["css", "scss", "sass", "less"]),
                    ("public", &[]),
                    ("assets", &[]),
                    ("tests", &["ts", "tsx", "js", "jsx"]),
                    ("docs", &["md", "mdx"]),
                ],
            ),
            Self::Node => archetype(
                self,
                "Node.js",
                "Node.js package described by package.json",
                &["json", "js", "mjs", "cjs", "ts", "md", "yml", "yaml", "lock", NO_EXTENSION],
                &[
                    ("src", &["js", "ts", "mjs", "cjs", "json"]),
                    ("lib", &["js", "ts", "mjs", "cjs"]),
                    ("bin", &["js", "ts", NO_EXTENSION]),
                    ("test", &["js", "ts"]),
                    ("tests", &["js", "ts"]),
                    ("scripts", &["js", "ts", "sh"]),
                    ("docs", &["md"]),
                ],
            ),
            Self::Python => archetype(
                self,
                "Python",
                "Python package or application",
                &[
                    "py", "toml", "cfg", "ini", "txt", "md", "rst", "lock", "yml", "yaml",
                    NO_EXTENSION,
                ],
                &[
                    ("src", &["py"]),
                    ("tests", &["py"]),
                    ("test", &["py"]),
                    ("scripts", &["py", "sh"]),
                    ("notebooks", &["ipynb"]),
                    ("docs", &["md", "rst", "txt", "py"]),
                    ("data", &[]),
                ],
            ),
            Self::Jvm => archetype(
                self,
                "JVM (Java/Kotlin)",
                "Maven or Gradle build of Java or Kotlin sources",
                &[
                    "xml", "gradle", "kts", "properties", "md", "yml", "yaml", NO_EXTENSION,
                ],
                &[
                    (
                        "src",
                        &["java", "kt", "xml", "properties", "yml", "yaml", "sql"],
                    ),
                    ("gradle", &["jar", "properties"]),
                    ("docs", &["md"]),
                ],
            ),
            Self::Generic => archetype(
                self,
                "Generic",
                "No recognised ecosystem markers",
                &["md", "txt", "json", "toml", "yml", "yaml", NO_EXTENSION],
                &[
                    ("src", &[]),
                    ("test", &[]),
                    ("tests", &[]),
                    ("docs", &["md", "txt", "rst"]),
                    ("scripts", &["sh", "bash", "py", "ps1"]),
                ],
            ),
        }
    }
}

fn archetype(
    kind: ProjectKind,
    name: &str,
    description: &str,
    root_extensions: &[&str],
    directories: &[(&str, &[&str])],
) -> ProjectType {
    ProjectType {
        kind,
        name: name.to_string(),
        description: description.to_string(),
        root_extensions: root_extensions.iter().map(|ext| ext.to_string()).collect(),
        directory_expectations: directories
            .iter()
            .map(|(dir, exts)| {
                (
                    dir.to_string(),
                    exts.iter().map(|ext| ext.to_string()).collect(),
                )
            })
            .collect(),
    }
}

/// Extensions, file names and directory names observed in a snapshot.
///
/// All entries are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMarkers {
    extensions: BTreeSet<String>,
    file_names: BTreeSet<String>,
    directories: BTreeSet<String>,
}

impl ProjectMarkers {
    /// Create an empty marker set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an extension token.
    pub fn add_extension(&mut self, extension: &str) {
        self.extensions.insert(extension.to_lowercase());
    }

    /// Record a file base-name.
    pub fn add_file_name(&mut self, name: &str) {
        self.file_names.insert(name.to_lowercase());
    }

    /// Record a directory name.
    pub fn add_directory(&mut self, name: &str) {
        self.directories.insert(name.to_lowercase());
    }

    /// Returns true if any file carries the extension.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.contains(&extension.to_lowercase())
    }

    /// Returns true if any file has exactly this base-name.
    pub fn has_file(&self, name: &str) -> bool {
        self.file_names.contains(&name.to_lowercase())
    }

    /// Returns true if any directory has this name.
    pub fn has_directory(&self, name: &str) -> bool {
        self.directories.contains(&name.to_lowercase())
    }
}

struct DetectionRule {
    extensions: &'static [&'static str],
    manifests: &'static [&'static str],
    directories: &'static [&'static str],
    kind: ProjectKind,
}

impl DetectionRule {
    fn matches(&self, markers: &ProjectMarkers) -> bool {
        any_or_unconstrained(self.extensions, |ext| markers.has_extension(ext))
            && any_or_unconstrained(self.manifests, |name| markers.has_file(name))
            && any_or_unconstrained(self.directories, |dir| markers.has_directory(dir))
    }
}

fn any_or_unconstrained(options: &[&str], present: impl Fn(&str) -> bool) -> bool {
    options.is_empty() || options.iter().any(|option| present(option))
}

const GO_EXTENSIONS: &[&str] = &["go"];
const RUST_EXTENSIONS: &[&str] = &["rs"];
const FRONTEND_EXTENSIONS: &[&str] = &["tsx", "jsx", "vue", "svelte"];
const NODE_EXTENSIONS: &[&str] = &["js", "ts", "mjs", "cjs"];
const PYTHON_EXTENSIONS: &[&str] = &["py"];
const JVM_EXTENSIONS: &[&str] = &["java", "kt"];

const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule {
        extensions: &[],
        manifests: &["pnpm-workspace.yaml", "lerna.json", "turbo.json", "nx.json"],
        directories: &["packages", "apps"],
        kind: ProjectKind::NodeMonorepo,
    },
    DetectionRule {
        extensions: GO_EXTENSIONS,
        manifests: &["go.mod"],
        directories: &[],
        kind: ProjectKind::Go,
    },
    DetectionRule {
        extensions: RUST_EXTENSIONS,
        manifests: &["cargo.toml"],
        directories: &[],
        kind: ProjectKind::Rust,
    },
    DetectionRule {
        extensions: FRONTEND_EXTENSIONS,
        manifests: &["package.json"],
        directories: &[],
        kind: ProjectKind::Frontend,
    },
    DetectionRule {
        extensions: NODE_EXTENSIONS,
        manifests: &["package.json"],
        directories: &[],
        kind: ProjectKind::Node,
    },
    DetectionRule {
        extensions: PYTHON_EXTENSIONS,
        manifests: &[
            "pyproject.toml",
            "setup.py",
            "setup.cfg",
            "requirements.txt",
            "pipfile",
        ],
        directories: &[],
        kind: ProjectKind::Python,
    },
    DetectionRule {
        extensions: JVM_EXTENSIONS,
        manifests: &[
            "pom.xml",
            "build.gradle",
            "build.gradle.kts",
            "settings.gradle",
        ],
        directories: &[],
        kind: ProjectKind::Jvm,
    },
    DetectionRule {
        extensions: GO_EXTENSIONS,
        manifests: &[],
        directories: &[],
        kind: ProjectKind::Go,
    },
    DetectionRule {
        extensions: RUST_EXTENSIONS,
        manifests: &[],
        directories: &[],
        kind: ProjectKind::Rust,
    },
    DetectionRule {
        extensions: PYTHON_EXTENSIONS,
        manifests: &[],
        directories: &[],
        kind: ProjectKind::Python,
    },
    DetectionRule {
        extensions: &["js", "ts"],
        manifests: &[],
        directories: &[],
        kind: ProjectKind::Node,
    },
    DetectionRule {
        extensions: JVM_EXTENSIONS,
        manifests: &[],
        directories: &[],
        kind: ProjectKind::Jvm,
    },
    DetectionRule {
        extensions: &[],
        manifests: &[],
        directories: &[],
        kind: ProjectKind::Generic,
    },
];

/// Detect the project archetype from the markers present in a snapshot.
///
/// Always returns an archetype; repositories without recognisable markers
/// are labelled [`ProjectKind::Generic`].
pub fn detect_project_type(markers: &ProjectMarkers) -> ProjectType {
    let kind = DETECTION_RULES
        .iter()
        .find(|rule| rule.matches(markers))
        .map(|rule| rule.kind)
        .unwrap_or(ProjectKind::Generic);
    kind.project_type()
}

/// Returns true if `extension` is expected for a file in `directory` under `project`.
///
/// The root is checked against the archetype's root extensions. Other
/// directories are checked against the expectations of their top-level
/// segment; directories without a convention accept anything.
pub fn is_expected_file_type(directory: &str, extension: &str, project: &ProjectType) -> bool {
    let extension = extension.to_lowercase();
    if directory == ROOT_DIR {
        return project.root_extensions.iter().any(|ext| *ext == extension);
    }

    let top_level = directory.split('/').next().unwrap_or(directory);
    match project.expectations_for(top_level) {
        Some(expected) if expected.is_empty() => true,
        Some(expected) => expected.iter().any(|ext| *ext == extension),
        None => true,
    }
}
