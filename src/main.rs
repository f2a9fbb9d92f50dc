use anyhow::{anyhow, bail, Context, Result};
use cafe_admin::api::Resource;
use cafe_admin::config::Config;
use cafe_admin::models::{
    Category, Customer, DiningTable, Discount, Menu, Order, Product, Role, Transaction, User,
};
use cafe_admin::service_container::ServiceContainer;
use cafe_admin::services::FetchOutcome;
use cafe_admin::state::TableFilters;
use cafe_admin::table_display::{display_results, export_to_csv, to_values};
use cafe_admin::utils::app_paths::AppPaths;
use cafe_admin::utils::logging::{init_tracing, LogRingBuffer};
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "cafe-admin", version, about = "Admin console for the cafe POS backend")]
struct Cli {
    /// Backend base URL, overrides the config file
    #[arg(long, global = true, env = "CAFE_ADMIN_API_URL")]
    api_url: Option<String>,

    /// Print the recent log tail after the command
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List one page of a resource
    List(ListArgs),
    /// Show a single record
    Get {
        resource: ResourceKind,
        id: u64,
        #[arg(long)]
        json: bool,
    },
    /// Delete a single record
    Delete { resource: ResourceKind, id: u64 },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct ListArgs {
    resource: ResourceKind,
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Rows per page, one of tables.page_sizes; defaults to tables.default_limit
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    search: Option<String>,
    /// Extra filter as name=value, repeatable
    #[arg(long = "filter", value_name = "NAME=VALUE")]
    filters: Vec<String>,
    /// Print rows as JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Also write the page to a CSV file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a commented default config file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    Users,
    Roles,
    Menus,
    Products,
    Categories,
    Tables,
    Customers,
    Orders,
    Transactions,
    Discounts,
}

/// Call a generic `fn name<R: Resource>(..)` for the model behind a `ResourceKind`
macro_rules! dispatch {
    ($kind:expr, $func:ident ( $($arg:expr),* )) => {
        match $kind {
            ResourceKind::Users => $func::<User>($($arg),*).await,
            ResourceKind::Roles => $func::<Role>($($arg),*).await,
            ResourceKind::Menus => $func::<Menu>($($arg),*).await,
            ResourceKind::Products => $func::<Product>($($arg),*).await,
            ResourceKind::Categories => $func::<Category>($($arg),*).await,
            ResourceKind::Tables => $func::<DiningTable>($($arg),*).await,
            ResourceKind::Customers => $func::<Customer>($($arg),*).await,
            ResourceKind::Orders => $func::<Order>($($arg),*).await,
            ResourceKind::Transactions => $func::<Transaction>($($arg),*).await,
            ResourceKind::Discounts => $func::<Discount>($($arg),*).await,
        }
    };
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let debug = cli.debug;

    // With --debug the config loading itself belongs in the tail
    let early_logs = debug.then(|| init_tracing("debug"));

    let (result, logs) = match load_config(&cli) {
        Ok(config) => {
            let logs = early_logs.unwrap_or_else(|| init_tracing(&config.logging.level));
            debug!(
                target: "config",
                base_url = %config.api.base_url,
                token = config.api.token.is_some(),
                "Using config"
            );
            (run(cli, config).await, Some(logs))
        }
        Err(e) => (Err(e), early_logs),
    };

    if debug {
        if let Some(logs) = logs {
            print_log_tail(&logs);
        }
    }

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    // `config` commands must work even when the file is broken
    let mut config = match &cli.command {
        Command::Config { .. } => Config::default().with_env_overrides(),
        _ => Config::load().context("Failed to load config")?,
    };
    if let Some(url) = &cli.api_url {
        debug!(target: "config", url = %url, "API URL overridden from command line");
        config.api.base_url = url.clone();
    }
    Ok(config)
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    if let Command::List(args) = &cli.command {
        if let Some(limit) = args.limit {
            config.tables.check_limit(limit)?;
        }
    }

    match cli.command {
        Command::Config { action } => run_config(action, &config),
        command => {
            let container = ServiceContainer::from_config(&config)?;
            match command {
                Command::List(args) => dispatch!(args.resource, list(&container, &args)),
                Command::Get { resource, id, json } => {
                    dispatch!(resource, get(&container, id, json))
                }
                Command::Delete { resource, id } => dispatch!(resource, delete(&container, id)),
                Command::Config { .. } => Ok(()),
            }
        }
    }
}

async fn list<R: Resource>(container: &ServiceContainer, args: &ListArgs) -> Result<()> {
    let mut filters = R::Filters::from_pairs(&args.filters)?;
    if let Some(search) = &args.search {
        filters.set_field("search", search)?;
    }

    let table = container.controller::<R>(R::PATH);
    table.replace_filters(filters);
    if let Some(limit) = args.limit {
        table.set_limit(limit);
    }
    table.set_page(args.page);

    match table.refresh().await {
        FetchOutcome::Applied { .. } => {}
        FetchOutcome::Failed(reason) => bail!("Failed to load {}: {}", R::LABEL, reason),
        other => bail!("Fetch did not complete: {:?}", other),
    }

    let state = table.state();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state.data)?);
    } else {
        display_results::<R>(&state)?;
    }

    if let Some(path) = &args.export {
        let path = if path.is_relative() && path.parent() == Some(std::path::Path::new("")) {
            AppPaths::export_dir()?.join(path)
        } else {
            path.clone()
        };
        export_to_csv(&state.data, &path)?;
    }
    Ok(())
}

async fn get<R: Resource>(container: &ServiceContainer, id: u64, json: bool) -> Result<()> {
    let record = container.service::<R>().get(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let value = to_values(std::slice::from_ref(&record))?
        .pop()
        .ok_or_else(|| anyhow!("Empty record"))?;
    if let Some(obj) = value.as_object() {
        for (field, value) in obj {
            println!("{:>16}  {}", field.as_str().bold(), value);
        }
    }
    Ok(())
}

async fn delete<R: Resource>(container: &ServiceContainer, id: u64) -> Result<()> {
    container.service::<R>().delete(id).await?;
    println!("{}", format!("Deleted {} #{}", R::LABEL.to_lowercase(), id).green());
    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Init { force } => {
            let path = Config::get_config_path()?;
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, Config::create_default_with_comments())?;
            println!("Configuration written to {}", path.display());
        }
        ConfigAction::Show => {
            let path = Config::get_config_path()?;
            let config = if path.exists() {
                Config::load_from(&path)?.with_env_overrides()
            } else {
                config.clone()
            };
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => println!("{}", Config::get_config_path()?.display()),
    }
    Ok(())
}

fn print_log_tail(logs: &LogRingBuffer) {
    eprintln!("\n{}", "--- recent log ---".dark_grey());
    for entry in logs.get_recent(50) {
        eprintln!("{}", entry.format_for_display());
    }
}
