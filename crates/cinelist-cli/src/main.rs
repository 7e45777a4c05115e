// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, anyhow, bail};
use cinelist_app::{CatalogSource, TitlesState};
use cinelist_client::Client;
use cinelist_tui::Session;
use config::{AUTHORIZATION_ENV, Config};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

const CHECK_GRACE: Duration = Duration::from_secs(5);

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `cinelist --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path()?;
    logging::init(&log_path, config.log_level())
        .with_context(|| format!("initialize logging at {}", log_path.display()))?;
    info!(
        config = %options.config_path.display(),
        demo = options.demo,
        "starting cinelist"
    );

    let (source, check_timeout): (Box<dyn CatalogSource>, Duration) = if options.demo {
        (Box::new(cinelist_testkit::demo_catalog()), CHECK_GRACE)
    } else {
        let authorization = authorization_from(env::var(AUTHORIZATION_ENV).ok())?;
        let timeout = config.api_timeout()?;
        let client = Client::new(config.api_base_url(), &authorization, timeout).with_context(
            || {
                format!(
                    "invalid [api] config in {}; fix base_url/timeout values",
                    options.config_path.display()
                )
            },
        )?;
        info!(
            base_url = client.base_url(),
            timeout = ?client.timeout(),
            "catalog client ready"
        );
        (Box::new(client), timeout.saturating_add(CHECK_GRACE))
    };

    let mut session = Session::new(source);
    if options.check_only {
        let count = check_catalog(&mut session, check_timeout)?;
        println!("ok: {count} titles available");
        return Ok(());
    }

    cinelist_tui::run_app(&mut session)
}

fn authorization_from(value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!(
            "{AUTHORIZATION_ENV} is not set; export the API credential (sent verbatim as the Authorization header) or run with --demo"
        ),
    }
}

fn check_catalog<S: CatalogSource + 'static>(
    session: &mut Session<S>,
    timeout: Duration,
) -> Result<usize> {
    session.initialize();
    session.wait(timeout);

    match session.state().titles() {
        TitlesState::Loaded => Ok(session.state().full().len()),
        TitlesState::Failed(error) => {
            Err(anyhow::Error::new(error.clone()).context("fetch movie titles"))
        }
        TitlesState::Loading => Err(anyhow!(
            "movie titles did not arrive within {}s",
            timeout.as_secs()
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("cinelist: browse a remote movie catalog");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Browse a built-in catalog (no network)");
    println!("  --check                  Validate config and fetch the title list once");
    println!("  --help                   Show this help");
    println!();
    println!("environment:");
    println!("  {AUTHORIZATION_ENV}   API credential, sent as the Authorization header");
    println!("  CINELIST_CONFIG_PATH     Config file override");
    println!("  RUST_LOG                 Log filter override");
}
