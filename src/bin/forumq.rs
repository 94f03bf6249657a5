use clap::{Parser, Subcommand};
use forum_query::cli::{self as prog_cli, OutputMode};
use forum_query::{ForumConfig, logger};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "forumq", version, about = "Forum listing query CLI", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(long, help = "Path to a config file (TOML). If omitted, FORUMQ_CONFIG, ~/.config/forumq.toml and ./forumq.toml are tried.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Override the default page size")]
    default_limit: Option<usize>,
    #[arg(long, help = "Override the maximum page size")]
    max_limit: Option<usize>,
    #[arg(long, help = "Directory for log files; logging is off unless set here, in config or env")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, help = "Pretty-print a single JSON document instead of one value per line")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print the query specification for key=value parameters")]
    Translate {
        #[arg(help = "Query parameters, e.g. filter_title=rust sort_createdAt=-1 limit=10")]
        params: Vec<String>,
    },
    #[command(about = "List questions from NDJSON with answersCount attached")]
    List {
        #[arg(long, help = "NDJSON file of questions")]
        questions: PathBuf,
        #[arg(long, help = "NDJSON file of answers")]
        answers: Option<PathBuf>,
        #[arg(help = "Query parameters, e.g. filter_tags_in=rust_async skip=20")]
        params: Vec<String>,
    },
    #[command(about = "List the answers of one question, oldest first")]
    Answers {
        #[arg(long, help = "NDJSON file of answers")]
        answers: PathBuf,
        #[arg(help = "Question id (UUID)")]
        question_id: String,
    },
}

fn load_config(cli: &Cli) -> Result<ForumConfig, forum_query::ForumError> {
    // Precedence: CLI > env > config file > defaults
    let mut cfg = ForumConfig::load(cli.config.as_deref())?;
    if let Some(n) = cli.default_limit {
        cfg.default_limit = n;
    }
    if let Some(n) = cli.max_limit {
        cfg.max_limit = n;
    }
    if let Some(d) = &cli.log_dir {
        cfg.log_dir = Some(d.clone());
    }
    if let Some(l) = &cli.log_level {
        cfg.log_level = Some(l.clone());
    }
    cfg.validate()?;
    Ok(cfg)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    if cfg.log_dir.is_some()
        && let Err(e) = logger::configure_from_config(&cfg)
    {
        eprintln!("warning: logging disabled: {e}");
    }
    let mode = if cli.json { OutputMode::Json } else { OutputMode::Plain };
    let cmd = match cli.command {
        Commands::Translate { params } => prog_cli::Command::Translate { params },
        Commands::List { questions, answers, params } => {
            prog_cli::Command::List { questions, answers, params }
        }
        Commands::Answers { answers, question_id } => {
            prog_cli::Command::Answers { answers, question_id }
        }
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = prog_cli::run(cmd, &cfg, mode, &mut stdout).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
