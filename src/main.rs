// Entrypoint for the CLI application.
// - Loads `.env`, parses arguments and sets up logging.
// - Builds the API client only for commands that talk to the server.
// - Maps every outcome to exit code 0 or 1.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use radarr_sweep::api::ApiClient;
use radarr_sweep::commands::{self, Context, DeleteOptions, FAILURE};
use radarr_sweep::config::{self, Settings};
use radarr_sweep::ui::{ConsoleOutput, Output, Prompter, TerminalPrompter, Tone, UnavailablePrompter};
use radarr_sweep::Error;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "radarr-sweep")]
#[command(about = "Find, keep and delete movies of one genre in a Radarr library")]
#[command(version)]
struct Cli {
    /// Radarr URL
    #[arg(long, env = config::URL_ENV, global = true)]
    url: Option<String>,

    /// Radarr API key
    #[arg(long, env = config::API_KEY_ENV, global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Keep list file [default: .keep-list.json]
    #[arg(long, env = config::KEEP_LIST_ENV, global = true)]
    keep_list: Option<PathBuf>,

    /// Show detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan and list movies by genre
    Scan {
        /// Genre to filter
        #[arg(long, default_value = "Horror")]
        genre: String,

        /// Interactively select movies to add to keep list
        #[arg(short, long)]
        interactive: bool,
    },

    /// Delete movies by genre (dry run unless --execute)
    Delete {
        /// Genre to filter
        #[arg(long, default_value = "Horror")]
        genre: String,

        /// Actually perform deletions
        #[arg(long)]
        execute: bool,

        /// Keep files on disk (default: delete files)
        #[arg(long)]
        keep_files: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Ignore keep list and include all matching movies
        #[arg(long)]
        ignore_keep_list: bool,
    },

    /// Manage keep list
    Keep {
        #[command(subcommand)]
        action: KeepCommands,
    },
}

#[derive(Subcommand)]
enum KeepCommands {
    /// Add movie to keep list
    Add {
        /// Movie ID to add
        id: Option<i64>,

        /// Movie title to add (exact match)
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Remove movie from keep list
    Remove {
        /// Movie ID to remove
        id: Option<i64>,

        /// Movie title to remove
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List all kept movies
    List,

    /// Clear entire keep list
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "radarr_sweep=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn connect(cli: &Cli) -> anyhow::Result<ApiClient> {
    let settings = Settings::resolve(cli.url.as_deref(), cli.api_key.as_deref())?;
    log::debug!("Using Radarr at {}", settings.url);
    ApiClient::new(&settings.url, &settings.api_key).context("Failed to create API client")
}

fn run(cli: &Cli, ctx: &Context) -> anyhow::Result<u8> {
    let code = match &cli.command {
        Commands::Scan { genre, interactive } => {
            let api = connect(cli)?;
            commands::scan(ctx, &api, genre, *interactive)?
        }
        Commands::Delete {
            genre,
            execute,
            keep_files,
            yes,
            ignore_keep_list,
        } => {
            let api = connect(cli)?;
            let opts = DeleteOptions {
                genre: genre.clone(),
                execute: *execute,
                keep_files: *keep_files,
                yes: *yes,
                ignore_keep_list: *ignore_keep_list,
            };
            commands::delete(ctx, &api, &opts)?
        }
        Commands::Keep { action } => match action {
            KeepCommands::Add { id, title } => {
                let api = connect(cli)?;
                commands::keep_add(ctx, &api, *id, title.as_deref())?
            }
            KeepCommands::Remove { id, title } => {
                commands::keep_remove(ctx, *id, title.as_deref())?
            }
            KeepCommands::List => commands::list_kept(ctx)?,
            KeepCommands::Clear { yes } => commands::keep_clear(ctx, *yes)?,
        },
    };
    Ok(code)
}

fn main() -> ExitCode {
    // A missing .env file is fine; flags and the environment still apply.
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let out = ConsoleOutput::new();
    let prompter: Box<dyn Prompter> =
        if std::io::stdin().is_terminal() && std::io::stdout().is_terminal() {
            Box::new(TerminalPrompter)
        } else {
            Box::new(UnavailablePrompter)
        };
    let ctx = Context {
        out: &out,
        prompter: prompter.as_ref(),
        keep_list_path: config::keep_list_path(cli.keep_list.clone()),
        verbose: cli.verbose,
    };

    let code = match run(&cli, &ctx) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(err) => commands::report_error(&out, err, cli.verbose),
                None => {
                    out.print(Tone::Error, &format!("Error: {:#}", e));
                    if cli.verbose {
                        out.print(Tone::Dim, &format!("{:?}", e));
                    }
                }
            }
            FAILURE
        }
    };
    ExitCode::from(code)
}
