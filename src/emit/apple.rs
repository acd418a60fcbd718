//! Apple artifacts: the Swift modules provider.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::core::descriptor::{AppleModule, ModuleDescriptor};
use crate::resolver::ResolvedGraph;

pub const PROVIDER_FILE: &str = "ExpoModulesProvider.swift";

/// Compilation condition guarding debug-only modules.
const DEBUG_CONDITION: &str = "EXPO_CONFIGURATION_DEBUG";

/// Swift sources for the release and debug-only halves of one list.
#[derive(Default)]
struct Split {
    release: Vec<String>,
    debug: Vec<String>,
}

impl Split {
    fn collect<'a>(modules: &[&'a AppleModule], f: impl Fn(&'a AppleModule) -> Vec<String>) -> Self {
        let mut split = Split::default();
        for module in modules {
            let items = f(module);
            if module.debug_only {
                split.debug.extend(items);
            } else {
                split.release.extend(items);
            }
        }
        split
    }

    fn render(&self, out: &mut String) {
        if self.debug.is_empty() {
            swift_return(out, &self.release, "    ");
            return;
        }
        let mut all = self.release.clone();
        all.extend(self.debug.iter().cloned());
        let _ = writeln!(out, "    #if {}", DEBUG_CONDITION);
        swift_return(out, &all, "    ");
        out.push_str("    #else\n");
        swift_return(out, &self.release, "    ");
        out.push_str("    #endif\n");
    }
}

fn swift_return(out: &mut String, items: &[String], indent: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "{}return []", indent);
        return;
    }
    let _ = writeln!(out, "{}return [", indent);
    for (i, item) in items.iter().enumerate() {
        let sep = if i + 1 < items.len() { "," } else { "" };
        let _ = writeln!(out, "{}  {}{}", indent, item, sep);
    }
    let _ = writeln!(out, "{}]", indent);
}

fn has_classes(module: &AppleModule) -> bool {
    !module.modules.is_empty()
        || !module.app_delegate_subscribers.is_empty()
        || !module.react_delegate_handlers.is_empty()
}

/// Render `ExpoModulesProvider.swift`.
pub fn render_provider(graph: &ResolvedGraph) -> String {
    let modules: Vec<&AppleModule> = graph
        .modules
        .iter()
        .filter_map(ModuleDescriptor::as_apple)
        .filter(|m| has_classes(m))
        .collect();

    let mut release_imports = BTreeSet::new();
    let mut debug_imports = BTreeSet::new();
    for module in &modules {
        let target = if module.debug_only { &mut debug_imports } else { &mut release_imports };
        target.extend(module.swift_module_names.iter().cloned());
    }
    release_imports.remove("ExpoModulesCore");
    debug_imports.retain(|name| !release_imports.contains(name) && name != "ExpoModulesCore");

    let mut out = String::new();
    out.push_str("/**\n * Generated by autolinking. Do not edit.\n */\n\n");
    out.push_str("import ExpoModulesCore\n");
    for name in &release_imports {
        let _ = writeln!(out, "import {}", name);
    }
    if !debug_imports.is_empty() {
        let _ = writeln!(out, "#if {}", DEBUG_CONDITION);
        for name in &debug_imports {
            let _ = writeln!(out, "import {}", name);
        }
        out.push_str("#endif\n");
    }

    out.push_str("\n@objc(ExpoModulesProvider)\n");
    out.push_str("public class ExpoModulesProvider: ModulesProvider {\n");

    out.push_str("  public override func getModuleClasses() -> [AnyModule.Type] {\n");
    Split::collect(&modules, |m| m.modules.iter().map(|c| format!("{}.self", c)).collect()).render(&mut out);
    out.push_str("  }\n\n");

    out.push_str("  public override func getAppDelegateSubscribers() -> [ExpoAppDelegateSubscriber.Type] {\n");
    Split::collect(&modules, |m| {
        m.app_delegate_subscribers.iter().map(|c| format!("{}.self", c)).collect()
    })
    .render(&mut out);
    out.push_str("  }\n\n");

    out.push_str("  public override func getReactDelegateHandlers() -> [ExpoReactDelegateHandlerTupleType] {\n");
    Split::collect(&modules, |m| {
        m.react_delegate_handlers
            .iter()
            .map(|c| format!("(packageName: \"{}\", handler: {}.self)", m.package_name, c))
            .collect()
    })
    .render(&mut out);
    out.push_str("  }\n");
    out.push_str("}\n");
    out
}
