use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::commands::{build_class_path, describe_change, read_java_file, resolve_config};
use crate::injector::element::load_elements;
use crate::injector::{InjectRequest, Injector, JavaPostProcessor};
use crate::source::{self, NodeId, SourceTree};

pub struct GenerateOptions<'a> {
    pub file: &'a str,
    pub elements: &'a str,
    /// Target class by simple name; defaults to the first top-level class
    pub class: Option<&'a str>,
    pub holder: bool,
    pub layout: Option<&'a str>,
    pub config: Option<&'a str>,
    /// Write the result back to `file` instead of printing it
    pub write: bool,
    pub quiet: bool,
}

/// Inject view bindings into a Java class
pub fn execute(options: &GenerateOptions) -> Result<()> {
    let start = Instant::now();
    let loaded = resolve_config(options.config)?;
    let binding = &loaded.config.binding;

    let mut tree = read_java_file(options.file)?;
    let (file_layout, elements) = load_elements(Path::new(options.elements), &binding.field_prefix)?;
    let layout = options.layout.unwrap_or(&file_layout);

    let class = find_target_class(&tree, options.class)?;
    let classpath = build_class_path(&loaded, &tree, options.quiet);
    let library = loaded.config.library_selection();
    let post = JavaPostProcessor;

    let injector = Injector {
        library: &library,
        resolver: &classpath,
        post: &post,
        holder_class_name: &binding.holder_class_name,
    };
    let request = InjectRequest {
        class,
        elements: &elements,
        holder: options.holder,
        layout,
    };
    let report = injector
        .inject(&mut tree, &request)
        .with_context(|| format!("failed to inject bindings into `{}`", options.file))?;

    if !options.quiet {
        for change in &report.changes {
            eprintln!("   {}", describe_change(change));
        }
    }

    let Some(library) = &report.library else {
        eprintln!(
            "{} no view binding library found on the class path, `{}` left unchanged",
            "warning:".yellow().bold(),
            options.file
        );
        if !options.write {
            print!("{}", source::print(&tree));
        }
        return Ok(());
    };

    let output = source::print(&tree);
    if options.write {
        if !report.is_noop() {
            fs::write(options.file, &output)
                .context(format!("Failed to write {}", options.file))?;
        }
    } else {
        print!("{}", output);
    }

    if !options.quiet {
        let role = report
            .role
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| "holder".to_string());
        eprintln!(
            "   {} `{}` ({}, {}) in {:.2}s",
            "Injected".green().bold(),
            options.file,
            role,
            library,
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn find_target_class(tree: &SourceTree, name: Option<&str>) -> Result<NodeId> {
    match name {
        Some(name) => tree
            .find_class(name)
            .with_context(|| format!("class `{}` not found", name)),
        None => tree
            .top_level_classes()
            .first()
            .copied()
            .context("file declares no class"),
    }
}
