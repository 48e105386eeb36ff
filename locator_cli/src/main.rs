extern crate env_logger;
extern crate locator_agent;
extern crate serde_json;

pub mod options;

use clap::Parser;
use locator_agent::ledger::UsageLedger;
use locator_agent::{LocatorCacheStore, LocatorConfig, LocatorResult, SnapshotReducer, SummaryScope};
use options::{CacheCommand, Cli, Commands};
use serde_json::json;
use std::process::exit;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        use env_logger::Env;
        let env = Env::default()
            .filter_or("RUST_LOG", "info")
            .write_style_or("RUST_LOG_STYLE", "always");

        env_logger::init_from_env(env);
    }

    let mut config = LocatorConfig::from_env();

    if let Some(dir) = cli.cache_dir {
        config = config.with_cache_dir(dir);
    }

    if let Some(path) = cli.usage_log {
        config = config.with_usage_log(Some(path));
    }

    let result = match cli.command {
        Commands::USAGE { scope } => usage(&config, &scope),
        Commands::CACHE { store, action } => {
            if let Some(store) = store {
                config = config.with_store_name(store);
            }
            cache(&config, action)
        }
        Commands::REDUCE {
            file,
            no_prepass,
            dump_dir,
        } => {
            let mut options = config.reducer.clone().with_text_prepass(!no_prepass);
            if let Some(dir) = dump_dir {
                options = options.with_dump_dir(dir);
            }
            match tokio::fs::read_to_string(&file).await {
                Ok(html) => {
                    println!("{}", SnapshotReducer::new(options).reduce(&html));
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        Commands::RUN {
            url,
            steps,
            store,
            tier,
            webdriver_url,
            headful,
        } => {
            if let Some(store) = store {
                config = config.with_store_name(store);
            }
            match tier.map(|t| t.parse()) {
                Some(Ok(tier)) => config = config.with_tier(tier),
                Some(Err(e)) => {
                    eprintln!("{}", e);
                    exit(2);
                }
                None => (),
            }
            run(&config, &url, &steps, &webdriver_url, !headful).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        exit(1);
    }
}

fn usage(config: &LocatorConfig, scope: &str) -> LocatorResult<()> {
    let scope: SummaryScope = match scope.parse() {
        Ok(scope) => scope,
        Err(e) => {
            eprintln!("{}", e);
            exit(2);
        }
    };

    match &config.usage_log {
        Some(path) => print!("{}", UsageLedger::open(path).summarize(scope)),
        None => println!("Usage tracking is disabled."),
    }

    Ok(())
}

fn cache(config: &LocatorConfig, action: CacheCommand) -> LocatorResult<()> {
    let mut store = LocatorCacheStore::open_named(&config.cache_dir, &config.store_name);

    match action {
        CacheCommand::LIST => {
            let entries: serde_json::Map<String, serde_json::Value> = store
                .entries()
                .map(|(key, descriptor)| {
                    (
                        key.to_string(),
                        json!({
                            "action": descriptor.action.as_str(),
                            "selector": descriptor.selector,
                        }),
                    )
                })
                .collect();

            match serde_json::to_string_pretty(&entries) {
                Ok(out) => println!("{}", out),
                Err(e) => return Err(e.into()),
            }
        }
        CacheCommand::DELETE { key } => {
            let fingerprint = locator_agent::Fingerprint::from_key(key);
            if store.delete(&fingerprint)? {
                println!("Deleted {}", fingerprint.as_str());
            } else {
                println!("No entry for {}", fingerprint.as_str());
            }
        }
        CacheCommand::CLEAR => {
            let count = store.len();
            store.clear()?;
            println!("Cleared {} entries from {}", count, store.path().display());
        }
    }

    Ok(())
}

/// Split a step argument into its instruction and optional data.
fn parse_step(step: &str) -> (&str, Option<&str>) {
    match step.split_once('=') {
        Some((instruction, data)) => (instruction.trim(), Some(data)),
        None => (step.trim(), None),
    }
}

#[cfg(feature = "webdriver")]
async fn run(
    config: &LocatorConfig,
    url: &str,
    steps: &[String],
    webdriver_url: &str,
    headless: bool,
) -> LocatorResult<()> {
    use locator_agent::{LocatorSession, WebDriverPage};

    let resolver = config.resolver()?;
    let page = WebDriverPage::connect_chrome(webdriver_url, headless).await?;
    let mut session = LocatorSession::new(page, resolver, config.executor());

    let outcome = run_steps(&mut session, url, steps).await;

    log::info!("inference calls: {}", session.inference_calls());

    if let Some(summary) = session.summarize(SummaryScope::Today) {
        print!("{}", summary);
    }

    session.into_driver().quit().await?;

    let skipped = outcome?;
    if skipped > 0 {
        eprintln!("{} step(s) skipped", skipped);
    }

    Ok(())
}

#[cfg(feature = "webdriver")]
async fn run_steps<D: locator_agent::PageDriver>(
    session: &mut locator_agent::LocatorSession<D>,
    url: &str,
    steps: &[String],
) -> LocatorResult<usize> {
    session.navigate(url).await?;
    let mut skipped = 0;

    for step in steps {
        let (instruction, data) = parse_step(step);
        match session.prompt(instruction, data).await? {
            locator_agent::StepOutcome::Performed { descriptor, source } => {
                println!("{:?} {} -> {}", source, instruction, descriptor);
            }
            locator_agent::StepOutcome::Skipped { kind, reason } => {
                skipped += 1;
                eprintln!("skipped {}: {} ({})", instruction, kind, reason);
            }
        }
    }

    Ok(skipped)
}

#[cfg(not(feature = "webdriver"))]
async fn run(
    _config: &LocatorConfig,
    _url: &str,
    steps: &[String],
    _webdriver_url: &str,
    _headless: bool,
) -> LocatorResult<()> {
    for step in steps {
        log::debug!("step {:?}", parse_step(step));
    }
    Err(locator_agent::LocatorError::NotConfigured(
        "the `run` command requires the `webdriver` feature",
    ))
}
