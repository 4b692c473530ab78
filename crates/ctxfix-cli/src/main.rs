//! ctxfix CLI - Thread a context token from entry points down to misuses

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ctxfix_fixer::{
    analyze, key_chains, run, strip_import_comments, FixerConfig, ScanFailure, SourceFallback,
};
use ctxfix_parser::{parse, ParseError};

#[derive(Parser)]
#[command(name = "ctxfix")]
#[command(about = "Repair context.WithCancel(nil) by threading ctx through every caller chain", long_about = None)]
struct Cli {
    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every chain leading to a key function
    Fix {
        /// Root directory of the source tree
        root: PathBuf,
        #[command(flatten)]
        options: Options,
        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,
        /// Skip the external formatters
        #[arg(long)]
        no_format: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List key functions and the chains leading to them
    Locate {
        root: PathBuf,
        #[command(flatten)]
        options: Options,
    },
    /// Print the filtered caller relations as JSON
    Graph {
        root: PathBuf,
        #[command(flatten)]
        options: Options,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Parse a file and output the AST as JSON
    Parse {
        file: PathBuf,
        #[arg(short, long)]
        pretty: bool,
    },
    /// Remove `// import "..."` comments from package clauses
    StripImportComments {
        dir: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
}

/// Settings shared by the analysis commands; flags override the config file
#[derive(Args)]
struct Options {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// JSON call graph dump to use instead of the source-level graph
    #[arg(long)]
    call_graph: Option<PathBuf>,
    /// Package path of the root directory
    #[arg(long)]
    module: Option<String>,
    /// Keep only edges into, out of, or through this package
    #[arg(long)]
    focus: Option<String>,
    /// Always keep edges touching these package prefixes
    #[arg(long)]
    include: Vec<String>,
    /// Keep only edges with both ends under these package prefixes
    #[arg(long)]
    limit: Vec<String>,
    /// Drop edges touching these package prefixes
    #[arg(long)]
    ignore: Vec<String>,
    #[arg(long)]
    exclude_std: bool,
    /// Keep edges through compiler-generated functions
    #[arg(long)]
    keep_synthetic: bool,
    #[arg(long)]
    exclude_unexported: bool,
    /// Entry point patterns such as `main.main` or `*.init`
    #[arg(long = "entry")]
    entry_points: Vec<String>,
    /// How a non-entry outermost caller gets the token
    #[arg(long, value_enum)]
    fallback: Option<Fallback>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Fallback {
    Parameter,
    Local,
}

impl Options {
    fn load(&self) -> Result<FixerConfig, String> {
        let mut config = match &self.config {
            Some(path) => FixerConfig::load(path).map_err(|e| e.to_string())?,
            None => FixerConfig::default(),
        };

        if self.call_graph.is_some() {
            config.call_graph = self.call_graph.clone();
        }
        if self.module.is_some() {
            config.module = self.module.clone();
        }
        if self.focus.is_some() {
            config.policy.focus = self.focus.clone();
        }
        if !self.include.is_empty() {
            config.policy.include = self.include.clone();
        }
        if !self.limit.is_empty() {
            config.policy.limit = self.limit.clone();
        }
        if !self.ignore.is_empty() {
            config.policy.ignore = self.ignore.clone();
        }
        config.policy.exclude_std |= self.exclude_std;
        config.policy.exclude_unexported |= self.exclude_unexported;
        if self.keep_synthetic {
            config.policy.exclude_synthetic = false;
        }
        if !self.entry_points.is_empty() {
            config.entry_points = ctxfix_graph::EntryPoints::new(self.entry_points.clone());
        }
        if let Some(fallback) = self.fallback {
            config.source_fallback = match fallback {
                Fallback::Parameter => SourceFallback::Parameter,
                Fallback::Local => SourceFallback::Local,
            };
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Fix {
            root,
            options,
            dry_run,
            no_format,
            json,
        } => cmd_fix(&root, &options, dry_run, no_format, json),
        Commands::Locate { root, options } => cmd_locate(&root, &options),
        Commands::Graph {
            root,
            options,
            pretty,
        } => cmd_graph(&root, &options, pretty),
        Commands::Parse { file, pretty } => cmd_parse(&file, pretty),
        Commands::StripImportComments { dir, dry_run } => cmd_strip(&dir, dry_run),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "ctxfix=info",
        1 => "ctxfix=debug",
        _ => "ctxfix=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_fix(
    root: &Path,
    options: &Options,
    dry_run: bool,
    no_format: bool,
    json: bool,
) -> Result<(), String> {
    let mut config = options.load()?;
    config.dry_run |= dry_run;
    if no_format {
        config.formatters.clear();
    }

    let report = run(root, &config).map_err(|e| e.to_string())?;
    report_scan_failures(&report.scan_failures);

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn cmd_locate(root: &Path, options: &Options) -> Result<(), String> {
    let config = options.load()?;
    let analysis = analyze(root, &config).map_err(|e| e.to_string())?;
    report_scan_failures(&analysis.scan.failures);

    for plan in key_chains(&analysis, &config) {
        println!(
            "{} ({} sites, {} chains{})",
            plan.key.function,
            plan.key.sites,
            plan.chains.len(),
            if plan.truncated { ", truncated" } else { "" }
        );
        println!("  {}", plan.key.function.file().display());
        for chain in &plan.chains {
            println!("  {}", chain);
        }
    }
    Ok(())
}

fn cmd_graph(root: &Path, options: &Options, pretty: bool) -> Result<(), String> {
    let config = options.load()?;
    let analysis = analyze(root, &config).map_err(|e| e.to_string())?;
    report_scan_failures(&analysis.scan.failures);

    let relations: Vec<_> = analysis.graph.relations().collect();
    let json = if pretty {
        serde_json::to_string_pretty(&relations)
    } else {
        serde_json::to_string(&relations)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn cmd_parse(file: &Path, pretty: bool) -> Result<(), String> {
    let source = fs::read_to_string(file)
        .map_err(|e| format!("Error reading {}: {}", file.display(), e))?;

    match parse(&source) {
        Ok(tree) => {
            let json = if pretty {
                serde_json::to_string_pretty(&tree)
            } else {
                serde_json::to_string(&tree)
            }
            .map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            report_parse_error(&source, file, &e);
            Err(format!("{} did not parse", file.display()))
        }
    }
}

fn cmd_strip(dir: &Path, dry_run: bool) -> Result<(), String> {
    let changed = strip_import_comments(dir, ".go", dry_run).map_err(|e| e.to_string())?;
    for path in &changed {
        println!("{}", path.display());
    }
    Ok(())
}

/// Re-parse each file the scan skipped so the error can be shown in context
fn report_scan_failures(failures: &[ScanFailure]) {
    for failure in failures {
        let Ok(source) = fs::read_to_string(&failure.path) else {
            eprintln!("{}: {}", failure.path.display(), failure.error);
            continue;
        };
        match parse(&source) {
            Err(e) => report_parse_error(&source, &failure.path, &e),
            Ok(_) => eprintln!("{}: {}", failure.path.display(), failure.error),
        }
    }
}

fn report_parse_error(source: &str, file: &Path, error: &ParseError) {
    let name = file.to_string_lossy().to_string();
    let span = error.span();
    let end = span.end.max(span.start).min(source.len());
    let start = span.start.min(end);
    let _ = Report::build(ReportKind::Error, name.clone(), start)
        .with_message(error.to_string())
        .with_label(
            Label::new((name.clone(), start..end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)));
}
