use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// print inference usage and estimated cost.
    USAGE {
        /// today or all-time
        #[clap(short, long, default_value = "today")]
        scope: String,
    },
    /// inspect or maintain a cache store.
    CACHE {
        /// The store name. Defaults to LOCATOR_STORE or locatorCache.
        #[clap(short, long)]
        store: Option<String>,
        #[clap(subcommand)]
        action: CacheCommand,
    },
    /// reduce a saved page snapshot and print the result.
    REDUCE {
        /// The snapshot file to reduce.
        file: PathBuf,
        /// Skip the text pre-pass.
        #[clap(long)]
        no_prepass: bool,
        /// Also write the reduced snapshot into this directory.
        #[clap(long)]
        dump_dir: Option<PathBuf>,
    },
    /// run instruction steps against a live page. Requires the `webdriver` flag enabled.
    RUN {
        /// The page URL to open.
        #[clap(short, long)]
        url: String,
        /// A step as "instruction" or "instruction=data". Repeat for more steps.
        #[clap(short = 'S', long = "step", required = true)]
        steps: Vec<String>,
        /// The store name. Defaults to LOCATOR_STORE or locatorCache.
        #[clap(short, long)]
        store: Option<String>,
        /// Inference tier: standard or advanced.
        #[clap(short, long)]
        tier: Option<String>,
        /// WebDriver server URL.
        #[clap(long, default_value = "http://localhost:9515")]
        webdriver_url: String,
        /// Show the browser window.
        #[clap(long)]
        headful: bool,
    },
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// list every entry.
    LIST,
    /// delete one entry by its key.
    DELETE {
        /// The exact cache key.
        key: String,
    },
    /// delete every entry.
    CLEAR,
}
