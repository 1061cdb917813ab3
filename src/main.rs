//! # flexref
//!
//! A CLI tool that lets the projects of a .NET workspace depend on each other
//! through references that switch between `ProjectReference` and
//! `PackageReference` depending on which solution is being built.
//!
//! ## Usage
//!
//! ```bash
//! # Create FlexRef.config.xml and build/FlexRef.props
//! flexref init
//!
//! # Regenerate Directory.Build.props, project files and NCrunch settings
//! flexref sync path/to/workspace
//! ```

mod cli;

use std::process::exit;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use flexref::{
    error::FlexRefError,
    output::{Reporter, print_error},
    workspace::Workspace,
};

/// Entry point for the flexref application.
///
/// Usage errors and failures of [`inner_main`] are printed to stderr and end
/// the process with exit code 1. `--help` and `--version` exit with 0.
fn main() {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            exit(i32::from(err.use_stderr()));
        }
    };

    if let Err(err) = inner_main(&args) {
        report_error(&err);

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// # Errors
///
/// Returns errors from thread-pool configuration and from the workspace
/// operation selected on the command line.
fn inner_main(args: &Cli) -> Result<()> {
    let scan_options = args.scan_options();

    if scan_options.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(scan_options.threads)
            .build_global()?;
    }

    let reporter = Reporter::new().with_quiet(args.quiet());
    let workspace = Workspace::open(&args.directory(), scan_options, &reporter)?;

    match args.command {
        Commands::Init { .. } => {
            reporter.heading(format!(
                "Initializing FlexRef in: {}",
                workspace.root().display()
            ));
            workspace.init()?;

            reporter.info("");
            reporter.info("Initialization complete.");
            reporter.info(
                "Review FlexRef.config.xml, then run 'flexref sync' to generate the boilerplate.",
            );
        }
        Commands::Sync { .. } => {
            reporter.heading(format!("Syncing FlexRef in: {}", workspace.root().display()));
            workspace.sync()?;

            reporter.info("");
            reporter.info("Sync complete.");
        }
    }

    Ok(())
}

/// Print an error, with dedicated guidance for the expected failures.
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<FlexRefError>() {
        Some(FlexRefError::ConfigurationAlreadyExists(_)) => {
            print_error("FlexRef.config.xml already exists.");
            eprintln!("Delete it first if you want to re-initialize.");
        }
        Some(FlexRefError::ConfigurationNotFound(_)) => {
            print_error("FlexRef.config.xml not found.");
            eprintln!("Run 'flexref init' first to create the configuration.");
        }
        Some(FlexRefError::RootDirectoryNotFound(path)) => {
            print_error(format!("Directory not found: {}", path.display()));
        }
        _ => print_error(format!("{err:#}")),
    }
}
