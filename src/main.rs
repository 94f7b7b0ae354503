mod connection;
mod openai;
mod table;

use clap::Parser;
use futures_util::StreamExt;

#[derive(clap::Parser)]
struct Opts {
    /// Connection config (TOML).
    #[clap(long, default_value = "config.toml")]
    config: std::path::PathBuf,

    #[clap(long, default_value = table::openai_completion::NAME)]
    table: String,

    /// Value of the `prompt` qualifier.
    #[clap(long)]
    prompt: Option<String>,

    /// Value of the `settings` qualifier, as JSON.
    #[clap(long)]
    settings: Option<String>,

    /// Print the table definition and exit.
    #[clap(long)]
    describe: bool,
}

impl Opts {
    fn quals(&self) -> table::Quals {
        let mut quals = table::Quals::new();
        if let Some(prompt) = self.prompt.as_ref() {
            quals = quals.with("prompt", prompt.clone());
        }
        if let Some(settings) = self.settings.as_ref() {
            quals = quals.with("settings", settings.clone());
        }
        quals
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::builder()
        .filter_module("openai_table", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();

    if opts.describe {
        println!("{}", serde_json::to_string_pretty(&table::definition(&opts.table)?)?);
        return Ok(());
    }

    let config = connection::Config::load(&opts.config)?;
    let client = connection::connect(&config)?;
    let table = table::new_table(&opts.table, client)?;

    let mut rows = table.list(&opts.quals()).await?;
    let mut n = 0;
    while let Some(row) = rows.next().await {
        println!("{}", serde_json::to_string(&row?)?);
        n += 1;
    }
    log::info!("{}: {} rows", opts.table, n);

    Ok(())
}
