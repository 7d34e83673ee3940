use clap::{Parser, Subcommand};
use colored::Colorize;
use viewbind::commands;
use viewbind::commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "viewbind")]
#[command(about = "Inject view-binding fields and lifecycle calls into Android Java classes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add bound fields (or a view holder) and bind/unbind calls to a class
    Generate {
        /// Path to the .java file
        file: String,
        /// Element list (TOML) describing the views to bind
        #[arg(long)]
        elements: String,
        /// Class to modify (defaults to the first top-level class)
        #[arg(long)]
        class: Option<String>,
        /// Generate a nested view holder class for list adapters
        #[arg(long)]
        holder: bool,
        /// Layout name used in the holder comment (defaults to the element list's)
        #[arg(long)]
        layout: Option<String>,
        /// Path to viewbind.toml (defaults to ./viewbind.toml when present)
        #[arg(long)]
        config: Option<String>,
        /// Write the result back to the file instead of printing it
        #[arg(long)]
        write: bool,
        /// Only print errors and warnings
        #[arg(long, short)]
        quiet: bool,
    },
    /// Show the role of each class in a file and the detected binding library
    Inspect {
        /// Path to the .java file
        file: String,
        /// Path to viewbind.toml
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            file,
            elements,
            class,
            holder,
            layout,
            config,
            write,
            quiet,
        } => commands::generate::execute(&GenerateOptions {
            file: &file,
            elements: &elements,
            class: class.as_deref(),
            holder,
            layout: layout.as_deref(),
            config: config.as_deref(),
            write,
            quiet,
        }),
        Commands::Inspect { file, config } => commands::inspect::execute(&file, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
