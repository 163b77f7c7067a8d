use anyhow::Result;
use artifact_fetch::{Config, FetchArgs, Fetcher, GithubClient, Outcome};
use clap::Parser;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(flatten)]
    args: FetchArgs,
}

fn main() -> Result<()> {
    use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
    tracing_log::LogTracer::init().ok();
    let env = std::env::var("ARTIFACT_FETCH_LOG").unwrap_or_else(|_| "error".into());
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_span_events(FmtSpan::ACTIVE | FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::new(env))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
    log_panics::init();
    let Args { args } = Args::parse();
    if let Some(build) = &args.build {
        println!("{}", build);
    }
    let config = Config::from_args(&args)?;
    let client = GithubClient::new(&config)?;
    let fetcher = Fetcher::new(&config, client);
    let outcome = match fetcher.select_artifact(&args.selector())? {
        Some(artifact) => {
            println!("download: {}", artifact.name);
            fetcher.fetch_artifact(artifact)?
        }
        None => Outcome::NoMatch,
    };
    match &outcome {
        Outcome::Downloaded { archive, files, .. } => {
            tracing::info!(archive = %archive.display(), files = files.len(), "done");
        }
        Outcome::NoMatch => eprintln!("no artifact matching {}", config.prefix()),
    }
    let code = outcome.exit_code(args.require_match);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
