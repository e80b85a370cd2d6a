//! Terminal client for the news feed GraphQL API.

use clap::Parser as _;
use std::env;

use crate::{
    args::{Args, Command},
    config::Config,
    prelude::*,
};

mod api;
mod app;
mod args;
mod client;
mod cmd;
mod config;
mod logger;
mod model;
mod prelude;
mod router;
mod store;
mod views;


#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Log error in case stderr is not connected and it is logged into a file.
        error!("{:?}", e);

        // Show a somewhat nice representation of the error
        eprintln!();
        eprintln!();
        bunt::eprintln!("{$red}▶▶▶ {$bold}Error:{/$}{/$} {[yellow+intense]}", e);
        eprintln!();
        if e.chain().len() > 1 {
            bunt::eprintln!("{$red+italic}Caused by:{/$}");
        }

        for (i, cause) in e.chain().skip(1).enumerate() {
            eprint!(" {: >1$}", "", i * 2);
            eprintln!("‣ {cause}");
        }

        std::process::exit(1);
    }
}

/// Main entry point.
async fn run() -> Result<()> {
    // If `RUST_BACKTRACE` wasn't already set, we default to `1`. Backtraces are
    // almost always useful for debugging.
    if env::var("RUST_BACKTRACE") == Err(env::VarError::NotPresent) {
        env::set_var("RUST_BACKTRACE", "1");
    }

    let args = Args::parse();

    // Configure output via `bunt`
    bunt::set_stdout_color_choice(args.stdout_color());
    bunt::set_stderr_color_choice(args.stderr_color());


    // Dispatch subcommand.
    match &args.cmd {
        Command::Open { path, shared } => {
            let config = load_config_and_init_logger(shared, &args)?;
            cmd::open::run(path, &config).await?;
        }
        Command::Routes => cmd::routes::run(),
        Command::CreateArticle { args: create_args, shared } => {
            let config = load_config_and_init_logger(shared, &args)?;
            cmd::create_article::run(create_args, &config).await?;
        }
        Command::Check { shared } => cmd::check::run(shared, &args).await?,
        Command::WriteConfig { target } => config::write_template(target.as_ref())?,
    }

    Ok(())
}


fn load_config_and_init_logger(shared: &args::Shared, args: &Args) -> Result<Config> {
    // Load configuration.
    let (config, source) = match &shared.config {
        Some(path) => {
            let config = Config::load_from(path)
                .context(format!("failed to load config from '{}'", path.display()))?;
            (config, config::ConfigSource::File(path.clone()))
        }
        None => Config::from_env_or_default_locations()?,
    };

    // Initialize logger. Unfortunately, we can only do this here
    // after reading the config.
    logger::init(&config.log, args.stderr_color(), args.cmd.name())?;
    info!("Loaded config from {source}");
    trace!("Configuration: {:#?}", config);

    Ok(config)
}
