use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use critique_core::{
    ActionConfig, CritiqueConfig, CritiqueError, DiffResult, PullRequestRef, ReviewText,
};
use critique_gitdiff::checkout::{acquire_checkout, fetch};
use critique_gitdiff::diff::{DiffQuery, DiffSource, GitDiff};
use critique_gitdiff::ignore::load_exclusions_in;
use critique_review::event::read_pull_request;
use critique_review::github::GitHubClient;
use critique_review::llm::{LlmClient, ReviewModel};
use critique_review::pipeline::{ReviewJob, ReviewOutcome, ReviewPipeline};

const DEFAULT_CONFIG: &str = r#"# critique configuration

[llm]
# model = "gpt-3.5-turbo"
# endpoint = "https://api.openai.com/v1/chat/completions"
# Where the review lives in the response: "choices" or "message"
# response_schema = "choices"

[diff]
# Remote whose branches are compared; "" compares local branches
# remote = "origin"
# "base-to-head" or "head-to-base"
# direction = "base-to-head"

[comment]
# heading = "Review"
"#;

#[derive(Parser)]
#[command(
    name = "critique",
    version,
    about = "LLM review comments for pull requests",
    long_about = "Diffs the base and head branches of a pull request, asks a chat-completion\n\
                  model to review the change, and posts the answer as a PR comment.\n\n\
                  Without a subcommand, runs the full review using the GitHub Actions\n\
                  environment (GITHUB_REPOSITORY, GITHUB_BASE_REF, ...).\n\n\
                  Examples:\n  \
                    critique                          Review the current pull request\n  \
                    critique run --dry-run            Print the comment instead of posting\n  \
                    critique diff main feature        Show the filtered diff locally\n  \
                    critique check                    Validate the environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .critique.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review the pull request described by the workflow environment
    Run(RunArgs),
    /// Print the filtered diff between two branches of a local checkout
    #[command(long_about = "Print the filtered diff between two branches of a local checkout.\n\n\
        Applies the ignore file exactly as a review would, without any network access.\n\n\
        Examples:\n  critique diff main feature\n  critique diff --remote '' main HEAD")]
    Diff {
        /// Branch the pull request merges into
        base: String,
        /// Branch carrying the changes
        head: String,
        /// Checkout to diff in (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Ignore file, relative to the checkout
        #[arg(long, default_value = critique_core::DEFAULT_IGNORE_PATH)]
        ignore_file: PathBuf,
        /// Remote prefix for both branches (default: from config; '' for local branches)
        #[arg(long)]
        remote: Option<String>,
    },
    /// Validate the environment and configuration without side effects
    Check,
    /// Create a default .critique.toml configuration file
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Use an existing checkout instead of cloning
    #[arg(long)]
    checkout: Option<PathBuf>,
    /// Directory the repository is cloned into (default: current directory)
    #[arg(long)]
    workspace: Option<PathBuf>,
    /// Skip `git fetch` before diffing
    #[arg(long)]
    no_fetch: bool,
    /// Print the comment instead of posting it
    #[arg(long)]
    dry_run: bool,
    /// GitHub API root (default: $GITHUB_API_URL, then api.github.com)
    #[arg(long)]
    github_api_url: Option<String>,
}

/// Shows a spinner on an interactive terminal while the model is working.
struct Spinning<M>(M);

impl<M: ReviewModel + Sync> ReviewModel for Spinning<M> {
    async fn review(&self, diff: &DiffResult, language: &str) -> Result<ReviewText, CritiqueError> {
        let spinner = std::io::stderr().is_terminal().then(|| {
            let pb = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
                pb.set_style(style);
            }
            pb.set_message("Waiting for review...");
            pb.enable_steady_tick(std::time::Duration::from_millis(120));
            pb
        });

        let result = self.0.review(diff, language).await;
        if let Some(pb) = spinner {
            pb.finish_with_message(if result.is_ok() { "Done" } else { "Failed" });
        }
        result
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CritiqueConfig> {
    let mut config = match path {
        Some(path) => CritiqueConfig::from_file(path)
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(".critique.toml");
            if default_path.exists() {
                CritiqueConfig::from_file(default_path)?
            } else {
                CritiqueConfig::default()
            }
        }
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

/// Validate the environment and locate the pull request, before any external call.
fn prepare() -> Result<(ActionConfig, PullRequestRef)> {
    let action = ActionConfig::from_env()?;
    let pull_request = read_pull_request(&action.event_path)?;
    Ok((action, pull_request))
}

async fn run_review(config: &CritiqueConfig, args: RunArgs) -> Result<()> {
    let (action, pull_request) = prepare()?;
    info!(
        repository = %action.repository,
        pull_request = %pull_request,
        base = %action.base_ref,
        head = %action.head_ref,
        "starting review"
    );

    let fetch_remote = if args.no_fetch { None } else { config.diff.remote() };
    let workdir = match args.checkout {
        Some(dir) => {
            if let Some(remote) = fetch_remote {
                fetch(&dir, remote)?;
            }
            dir
        }
        None => acquire_checkout(
            args.workspace.as_deref().unwrap_or(Path::new(".")),
            &action.repository,
            &action.github_token,
            fetch_remote,
        )?,
    };

    let api_url = args
        .github_api_url
        .filter(|url| !url.is_empty())
        .or(action.api_url);

    let query = DiffQuery::from_config(&action.base_ref, &action.head_ref, &config.diff);
    let pipeline = ReviewPipeline::new(
        &workdir,
        GitDiff::new(&workdir, query),
        Spinning(LlmClient::new(&config.llm, action.api_key.clone())?),
        GitHubClient::new(&action.github_token, api_url.as_deref())?,
    );

    let job = ReviewJob {
        repository: action.repository,
        pull_request,
        ignore_path: action.ignore_path,
        language: action.language,
        heading: config.comment.heading.clone(),
        dry_run: args.dry_run,
    };

    match pipeline.run(&job).await? {
        ReviewOutcome::Posted(url) => println!("Posted review: {url}"),
        ReviewOutcome::Rendered(body) => println!("{body}"),
        ReviewOutcome::NoChanges => println!("No changes to review."),
    }
    Ok(())
}

fn run_check(config: &CritiqueConfig) -> Result<()> {
    let (action, pull_request) = prepare()?;
    println!("repository:   {}", action.repository);
    println!("pull request: {pull_request}");
    println!(
        "diff:         {} {} ({})",
        action.base_ref, action.head_ref, config.diff.direction
    );
    println!("remote:       {}", config.diff.remote().unwrap_or("(local)"));
    println!("ignore file:  {}", action.ignore_path.display());
    println!("language:     {}", action.language);
    println!("model:        {}", config.llm.model);
    println!("endpoint:     {}", config.llm.endpoint);
    println!("schema:       {}", config.llm.response_schema);
    println!("heading:      {}", config.comment.heading);
    println!(
        "GitHub API:   {}",
        action.api_url.as_deref().unwrap_or("https://api.github.com")
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            run_review(&config, RunArgs::default()).await?;
        }
        Some(Command::Run(args)) => {
            let config = load_config(cli.config.as_deref())?;
            run_review(&config, args).await?;
        }
        Some(Command::Diff {
            base,
            head,
            repo,
            ignore_file,
            remote,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let remote = match &remote {
                Some(r) if r.trim().is_empty() => None,
                Some(r) => Some(r.as_str()),
                None => config.diff.remote(),
            };
            let query = DiffQuery::new(base, head)
                .with_remote(remote)
                .with_direction(config.diff.direction);
            let exclusions = load_exclusions_in(&repo, &ignore_file)?;
            let diff = GitDiff::new(&repo, query).diff(&exclusions)?;
            print!("{}", diff.as_str());
        }
        Some(Command::Check) => {
            let config = load_config(cli.config.as_deref())?;
            run_check(&config)?;
        }
        Some(Command::Init) => {
            let path = Path::new(".critique.toml");
            if path.exists() {
                miette::bail!(".critique.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .critique.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "critique", &mut std::io::stdout());
        }
    }

    Ok(())
}
