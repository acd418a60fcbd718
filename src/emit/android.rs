//! Android artifacts: the Java package list and the Gradle settings include.

use std::fmt::Write;
use std::path::Path;

use crate::core::descriptor::{AndroidModule, ModuleDescriptor};
use crate::resolver::ResolvedGraph;

pub const PACKAGE_LIST_FILE: &str = "ExpoModulesPackageList.java";
pub const SETTINGS_FILE: &str = "settings.autolinking.gradle";

const GENERATED_NOTICE: &str = "Generated by autolinking. Do not edit.";

fn android_modules(graph: &ResolvedGraph) -> impl Iterator<Item = &AndroidModule> {
    graph.modules.iter().filter_map(ModuleDescriptor::as_android)
}

/// Java list literal of `items`, one per line at `indent`.
fn java_list(out: &mut String, element_type: &str, items: &[String], indent: &str) {
    let _ = write!(out, "Arrays.<{}>asList(", element_type);
    if items.is_empty() {
        out.push_str(");\n");
        return;
    }
    out.push('\n');
    for (i, item) in items.iter().enumerate() {
        let sep = if i + 1 < items.len() { "," } else { "" };
        let _ = writeln!(out, "{}  {}{}", indent, item, sep);
    }
    let _ = writeln!(out, "{});", indent);
}

/// Render `ExpoModulesPackageList.java` in the `namespace` Java package.
pub fn render_package_list(graph: &ResolvedGraph, namespace: &str) -> String {
    let mut packages = Vec::new();
    let mut modules = Vec::new();
    for module in android_modules(graph) {
        for project in &module.projects {
            packages.extend(project.packages.iter().map(|p| format!("new {}()", p)));
            modules.extend(project.modules.iter().map(|m| format!("{}.class", m)));
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "// {}", GENERATED_NOTICE);
    let _ = writeln!(out, "package {};", namespace);
    out.push('\n');
    out.push_str("import java.util.Arrays;\n");
    out.push_str("import java.util.List;\n");
    out.push_str("import expo.modules.core.interfaces.Package;\n");
    out.push_str("import expo.modules.kotlin.modules.Module;\n");
    out.push_str("import expo.modules.kotlin.ModulesProvider;\n");
    out.push('\n');
    out.push_str("public class ExpoModulesPackageList implements ModulesProvider {\n");
    out.push_str("  private static class LazyHolder {\n");
    out.push_str("    static final List<Package> packagesList = ");
    java_list(&mut out, "Package", &packages, "    ");
    out.push('\n');
    out.push_str("    static final List<Class<? extends Module>> modulesList = ");
    java_list(&mut out, "Class<? extends Module>", &modules, "    ");
    out.push_str("  }\n");
    out.push('\n');
    out.push_str("  public static List<Package> getPackageList() {\n");
    out.push_str("    return LazyHolder.packagesList;\n");
    out.push_str("  }\n");
    out.push('\n');
    out.push_str("  @Override\n");
    out.push_str("  public List<Class<? extends Module>> getModulesList() {\n");
    out.push_str("    return LazyHolder.modulesList;\n");
    out.push_str("  }\n");
    out.push_str("}\n");
    out
}

/// Quote `value` as a single-quoted Groovy string, which never interpolates `$`.
fn groovy_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn groovy_path(path: &Path) -> String {
    groovy_string(&path.to_string_lossy())
}

fn include_project(out: &mut String, name: &str, dir: &Path) {
    let path = groovy_string(&format!(":{}", name));
    let _ = writeln!(out, "include({})", path);
    let _ = writeln!(out, "project({}).projectDir = new File({})", path, groovy_path(dir));
}

/// Render `settings.autolinking.gradle`, applied from the app's settings.
pub fn render_settings(graph: &ResolvedGraph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// {}", GENERATED_NOTICE);

    for module in android_modules(graph) {
        let _ = writeln!(out, "\n// {}@{}", module.package_name, module.package_version);
        for plugin in &module.plugins {
            let _ = writeln!(out, "includeBuild({})", groovy_path(&plugin.source_dir));
        }
        for project in &module.projects {
            include_project(&mut out, &project.name, &project.source_dir);
            for aar in &project.aar_projects {
                include_project(&mut out, &aar.name, &aar.project_dir);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::{AarProject, GradlePlugin, ProjectDescriptor};
    use crate::core::platform::Platform;
    use std::path::PathBuf;

    fn graph() -> ResolvedGraph {
        let project = ProjectDescriptor {
            name: "expo-foo".to_string(),
            source_dir: PathBuf::from("/app/node_modules/expo-foo/android"),
            modules: vec!["expo.modules.foo.FooModule".to_string()],
            services: vec![],
            packages: vec!["expo.modules.foo.FooPackage".to_string()],
            publication: None,
            aar_projects: vec![AarProject {
                name: "expo-foo$native".to_string(),
                aar_file_path: PathBuf::from("/app/node_modules/expo-foo/libs/native.aar"),
                project_dir: PathBuf::from("/app/node_modules/expo-foo/android/build/native"),
            }],
            should_use_publication_script_path: None,
        };
        ResolvedGraph {
            platform: Platform::Android,
            extra_dependencies: None,
            core_features: vec![],
            modules: vec![ModuleDescriptor::Android(AndroidModule {
                package_name: "expo-foo".to_string(),
                package_version: "1.0.0".to_string(),
                projects: vec![project],
                plugins: vec![GradlePlugin {
                    id: "expo-foo-plugin".to_string(),
                    group: "expo.modules".to_string(),
                    source_dir: PathBuf::from("/app/node_modules/expo-foo/plugin"),
                    apply_to_root_project: true,
                }],
                core_features: vec![],
                extra_maven_repos: vec![],
            })],
        }
    }

    #[test]
    fn test_package_list() {
        let java = render_package_list(&graph(), "com.example.app");
        assert!(java.starts_with("// Generated by autolinking. Do not edit.\npackage com.example.app;\n"));
        assert!(java.contains("Arrays.<Package>asList(\n      new expo.modules.foo.FooPackage()\n    );"));
        assert!(java.contains("      expo.modules.foo.FooModule.class\n    );"));
        assert!(java.ends_with("}\n"));
    }

    #[test]
    fn test_empty_package_list() {
        let empty = ResolvedGraph {
            modules: vec![],
            ..graph()
        };
        let java = render_package_list(&empty, "expo.modules");
        assert!(java.contains("packagesList = Arrays.<Package>asList();"));
        assert!(java.contains("modulesList = Arrays.<Class<? extends Module>>asList();"));
    }

    #[test]
    fn test_settings() {
        let settings = render_settings(&graph());
        let expected = "\
// Generated by autolinking. Do not edit.

// expo-foo@1.0.0
includeBuild('/app/node_modules/expo-foo/plugin')
include(':expo-foo')
project(':expo-foo').projectDir = new File('/app/node_modules/expo-foo/android')
include(':expo-foo$native')
project(':expo-foo$native').projectDir = new File('/app/node_modules/expo-foo/android/build/native')
";
        assert_eq!(settings, expected);
    }

    #[test]
    fn test_groovy_string_escaping() {
        assert_eq!(groovy_string(r"C:\a'b$c"), r"'C:\\a\'b$c'");
    }
}
