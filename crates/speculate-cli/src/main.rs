#![forbid(unsafe_code)]

mod cmd;
mod mermaid;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use speculate_core::ErrorCode;
use speculate_core::config;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "spec",
    author,
    version,
    about = "speculate: task-graph dependency ledger",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Project root (defaults to the current directory).
    #[arg(long, global = true, value_name = "PATH")]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Output mode to use before config has been resolved.
    fn fallback_output(&self) -> OutputMode {
        match self.format {
            Some(mode) => mode,
            None if self.json => OutputMode::Json,
            None => OutputMode::Text,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph",
        about = "Add tasks and relationships",
        long_about = "Add a batch of tasks and relationships. The batch is applied all-or-nothing; \
                      a blocks relationship that would close a cycle rejects the whole batch.",
        after_help = "EXAMPLES:\n    # Add two tasks and a dependency\n    spec add '{\"tasks\":[{\"id\":\"design-api\",\"estimate_hours\":2},{\"id\":\"build-api\"}],\"relationships\":[{\"from\":\"design-api\",\"to\":\"build-api\",\"type\":\"blocks\"}]}'\n\n    # Read the batch from a file\n    spec add @plan.json\n\n    # Read the batch from stdin\n    cat plan.json | spec add -"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Update task fields",
        long_about = "Patch fields of existing tasks. Task IDs cannot be changed.",
        after_help = "EXAMPLES:\n    # Change an estimate\n    spec update '{\"tasks\":[{\"id\":\"design-api\",\"estimate_hours\":3}]}'\n\n    # Emit machine-readable output\n    spec update @patch.json --json"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Delete tasks and relationships",
        long_about = "Delete tasks and relationships. A task that is still related to a task \
                      outside the batch is refused.",
        after_help = "EXAMPLES:\n    # Delete a relationship\n    spec delete '{\"relationships\":[{\"from\":\"design-api\",\"to\":\"build-api\",\"type\":\"blocks\"}]}'\n\n    # Delete a connected tail together\n    spec delete '{\"tasks\":[\"build-api\",\"ship-api\"],\"relationships\":[{\"from\":\"design-api\",\"to\":\"build-api\"}]}'"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Start a ready task",
        long_about = "Move a task whose blockers are all done to in-progress.",
        after_help = "EXAMPLES:\n    # Start work\n    spec start design-api\n\n    # Emit machine-readable output\n    spec start design-api --json"
    )]
    Start(cmd::start::StartArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Complete a task",
        long_about = "Mark a task done and list the tasks that became ready.",
        after_help = "EXAMPLES:\n    # Finish a task\n    spec complete design-api"
    )]
    Complete(cmd::complete::CompleteArgs),

    #[command(
        next_help_heading = "Read",
        about = "Check graph health",
        long_about = "Report cycles, broken relationships, invalid IDs and estimates, and isolated tasks.",
        after_help = "EXAMPLES:\n    # Print a health report\n    spec validate\n\n    # Fail in CI when anything is wrong\n    spec validate --strict"
    )]
    Validate(cmd::validate::ValidateArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show remaining work as a diagram",
        long_about = "Render every task that is not done as a Mermaid flowchart, colored by derived status.",
        after_help = "EXAMPLES:\n    # Mermaid diagram of open work\n    spec available\n\n    # Include done tasks\n    spec available --all"
    )]
    Available(cmd::available::AvailableArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show what completing a task unblocks",
        long_about = "Simulate completing a task without changing anything and report which \
                      downstream tasks become ready and which stay blocked.",
        after_help = "EXAMPLES:\n    # Impact of finishing design-api\n    spec after design-api\n\n    # Emit machine-readable output\n    spec after design-api --json"
    )]
    After(cmd::after::AfterArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one task",
        long_about = "Show a task with its derived status, blockers and the tasks it blocks.",
        after_help = "EXAMPLES:\n    # Show a task\n    spec show design-api"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Install bash completions\n    spec completions bash > ~/.local/share/bash-completion/completions/spec"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SPECULATE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "speculate=debug,info"
        } else {
            "speculate=info,warn"
        })
    });

    let format = env::var("SPECULATE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = match cli.dir {
        Some(ref dir) => dir.clone(),
        None => env::current_dir()?,
    };

    let effective = match config::resolve_config(
        &project_root,
        cli.format.map(OutputMode::as_str),
        cli.json,
    ) {
        Ok(effective) => effective,
        Err(err) => {
            let code = ErrorCode::ConfigParseError;
            render_error(
                cli.fallback_output(),
                &CliError::with_details(
                    format!("{err:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(err);
        }
    };
    let output = OutputMode::from_resolved(&effective.resolved_output);
    debug!(root = %project_root.display(), output = output.as_str(), "resolved config");

    let project = cmd::Project::new(project_root, effective.project);

    match cli.command {
        Commands::Add(ref args) => cmd::add::run_add(args, output, &project),
        Commands::Update(ref args) => cmd::update::run_update(args, output, &project),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, output, &project),
        Commands::Start(ref args) => cmd::start::run_start(args, output, &project),
        Commands::Complete(ref args) => cmd::complete::run_complete(args, output, &project),
        Commands::Validate(ref args) => cmd::validate::run_validate(args, output, &project),
        Commands::Available(ref args) => cmd::available::run_available(args, output, &project),
        Commands::After(ref args) => cmd::after::run_after(args, output, &project),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project),
        Commands::Completions(_) => Ok(()),
    }
}
