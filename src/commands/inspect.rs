use anyhow::Result;
use colored::Colorize;

use crate::commands::{build_class_path, read_java_file, resolve_config};
use crate::injector::classpath::resolve_supertype;
use crate::injector::{classify, ClassPath};
use crate::source::SourceTree;

/// Print each class of a Java file with the role it would be injected as
pub fn execute(file: &str, config: Option<&str>) -> Result<()> {
    let loaded = resolve_config(config)?;
    let tree = read_java_file(file)?;
    let classpath = build_class_path(&loaded, &tree, false);

    for line in class_lines(&tree, &classpath) {
        println!("{}", line);
    }

    match loaded.config.library_selection().locate(&classpath) {
        Some(library) => println!("{} {}", "library:".bold(), library.name),
        None => println!("{} {}", "library:".bold(), "none".dimmed()),
    }
    Ok(())
}

/// `<qualified name> <role> [extends <resolved supertype>]` per class
fn class_lines(tree: &SourceTree, classpath: &ClassPath) -> Vec<String> {
    tree.all_classes()
        .into_iter()
        .filter_map(|class| {
            let name = tree.qualified_name(class)?;
            let role = classify(tree, class, classpath);
            let mut line = format!("{} {}", name, role.label());
            if let Some(supertype) = resolve_supertype(tree, class, classpath) {
                line.push_str(&format!(" extends {}", supertype));
            }
            Some(line)
        })
        .collect()
}
