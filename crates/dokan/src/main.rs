//! dokan - offline shop ledger
//!
//! Command-line front end over the dokan core. Wires together:
//! - Configuration loading
//! - Store initialization
//! - The application context and its record stores
//! - A `watch` loop that fires trial deadlines as they come due

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dokan_api::{
    ChangeEvent, Language, NewProduct, NewSale, QuantityUnit, ShopProfile, StockColor, ThemeColor,
    ThemeMode,
};
use dokan_config::load_config_or_default;
use dokan_core::{summarize_by_date, summary_for, AppContext, HoldState};
use dokan_store::SqliteKvStore;
use dokan_util::{
    default_config_path, format_datetime_full, format_duration, now, MonotonicInstant, RecordId,
    STORE_FILENAME,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// dokan - offline ledger for a single shop
#[derive(Parser, Debug)]
#[command(name = "dokan")]
#[command(about = "Offline sales ledger, catalog and shopping list", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/dokan/config.toml)
    #[arg(short, long, env = "DOKAN_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set DOKAN_DATA_DIR env var)
    #[arg(short, long, env = "DOKAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show premium status, trial state and free-tier room
    Status,

    /// Redeem a promo or purchase code
    Redeem { code: String },

    /// Start the one-time premium trial
    Trial,

    /// Record and review sales
    #[command(subcommand)]
    Sale(SaleCommand),

    /// Daily totals, or one day's totals with --date
    Report {
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Totals for today only
        #[arg(long, conflicts_with = "date")]
        today: bool,
    },

    /// Manage the product catalog
    #[command(subcommand)]
    Product(ProductCommand),

    /// Manage the shopping list
    #[command(subcommand)]
    List(ListCommand),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Show or register the shop profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Show or change preferences
    Prefs {
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        theme_mode: Option<ThemeMode>,
        #[arg(long)]
        theme_color: Option<ThemeColor>,
        #[arg(long)]
        sound: Option<bool>,
    },

    /// Stay running and fire time-based changes (trial expiry) as they come due
    Watch {
        /// Seconds between checks
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },
}

#[derive(Subcommand, Debug)]
enum SaleCommand {
    Add {
        item: String,
        #[arg(long)]
        wholesale: f64,
        #[arg(long)]
        selling: f64,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// red, yellow or green
        #[arg(long, value_parser = parse_stock_color)]
        stock: Option<StockColor>,
        /// Sale date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
    Add {
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        quantity: String,
        #[arg(long, default_value = "piece")]
        unit: QuantityUnit,
        #[arg(long, default_value = "")]
        features: String,
    },
    List {
        /// Filter by name or features
        #[arg(long)]
        search: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        quantity: String,
    },
    Show,
    Toggle { id: String },
    Delete { id: String },
    ClearBought,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Add { text: String },
    List,
    Toggle { id: String },
    /// Complete a task by holding for the configured time
    Hold { id: String },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Show,
    Set {
        #[arg(long)]
        shop_name: String,
        #[arg(long, default_value = "")]
        owner_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    Clear,
}

fn parse_stock_color(s: &str) -> Result<StockColor, String> {
    match s.trim().to_lowercase().as_str() {
        "red" => Ok(StockColor::Red),
        "yellow" => Ok(StockColor::Yellow),
        "green" => Ok(StockColor::Green),
        other => Err(format!("Unknown stock color: {}", other)),
    }
}

/// Status report for `dokan status`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    installation_id: String,
    premium: dokan_api::EntitlementStatus,
    trial_used: bool,
    trial_remaining_secs: Option<u64>,
    shopping_list_free_slots: Option<usize>,
    registered: bool,
    store_healthy: bool,
}

fn open_context(args: &Args) -> Result<AppContext> {
    let settings = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| settings.storage.data_dir.clone());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(STORE_FILENAME);
    let kv = SqliteKvStore::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;
    debug!(db_path = %db_path.display(), "Store opened");

    Ok(AppContext::new(settings, Arc::new(kv)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_status(ctx: &AppContext, json: bool) -> Result<()> {
    let now = now();
    let codes = ctx.codes();
    let report = StatusReport {
        installation_id: ctx.installation_id().to_string(),
        premium: ctx.entitlement().evaluate(now),
        trial_used: codes.trial_used(),
        trial_remaining_secs: codes.trial_remaining(now).map(|d| d.as_secs()),
        shopping_list_free_slots: ctx.shopping_list().remaining_free_slots(now),
        registered: !ctx.profile().needs_registration(),
        store_healthy: ctx.is_healthy(),
    };

    if json {
        return print_json(&report);
    }

    match (report.premium.is_active, report.premium.expiry_date) {
        (true, Some(expiry)) => println!(
            "Premium: active until {} ({} left)",
            format_datetime_full(&expiry),
            format_duration(report.premium.remaining(now))
        ),
        _ => println!("Premium: inactive"),
    }
    if let Some(secs) = report.trial_remaining_secs {
        println!("Trial ends in {}", format_duration(Duration::from_secs(secs)));
    } else if !report.trial_used {
        println!("Trial: available");
    }
    if let Some(slots) = report.shopping_list_free_slots {
        println!("Shopping list: {} free slots left", slots);
    }
    if !report.registered {
        println!("Shop not registered yet, run `dokan profile set`");
    }
    Ok(())
}

fn run_sale(ctx: &AppContext, command: SaleCommand, json: bool) -> Result<()> {
    let sales = ctx.sales();
    match command {
        SaleCommand::Add {
            item,
            wholesale,
            selling,
            quantity,
            stock,
            date,
        } => {
            let sale = sales.add(
                NewSale {
                    item_name: item,
                    wholesale_price: wholesale,
                    selling_price: selling,
                    quantity,
                    stock_color: stock,
                    photo: None,
                    date,
                },
                now(),
            )?;
            if json {
                return print_json(&sale);
            }
            println!(
                "Recorded sale {}: {} x{} (profit {:.2})",
                sale.id,
                sale.item_name,
                sale.quantity,
                sale.profit()
            );
        }
        SaleCommand::List { date } => {
            let list = match date {
                Some(date) => sales.on_date(date),
                None => sales.list(),
            };
            if json {
                return print_json(&list);
            }
            for sale in &list {
                println!(
                    "{}  {}  {} x{} @ {:.2}  profit {:.2}",
                    sale.id,
                    sale.date,
                    sale.item_name,
                    sale.quantity,
                    sale.selling_price,
                    sale.profit()
                );
            }
        }
        SaleCommand::Delete { id } => delete_result(sales.delete(&RecordId::new(id)))?,
    }
    Ok(())
}

fn run_report(ctx: &AppContext, date: Option<NaiveDate>, today: bool, json: bool) -> Result<()> {
    let sales = ctx.sales().list();
    let date = if today { Some(now().date_naive()) } else { date };

    let summaries = match date {
        Some(date) => vec![summary_for(&sales, date)],
        None => summarize_by_date(&sales),
    };
    if json {
        return print_json(&summaries);
    }
    for day in &summaries {
        println!(
            "{}  sales {:>3}  items {:>4}  income {:>10.2}  cost {:>10.2}  profit {:>10.2}",
            day.date,
            day.sale_count,
            day.items_sold,
            day.total_income,
            day.total_cost,
            day.net_profit
        );
    }
    Ok(())
}

fn run_product(ctx: &AppContext, command: ProductCommand, json: bool) -> Result<()> {
    let products = ctx.products();
    match command {
        ProductCommand::Add {
            name,
            price,
            quantity,
            unit,
            features,
        } => {
            let product = products.add(
                NewProduct {
                    name,
                    price,
                    quantity,
                    quantity_unit: unit,
                    features,
                },
                now(),
            )?;
            if json {
                return print_json(&product);
            }
            println!("Added product {}: {}", product.id, product.name);
        }
        ProductCommand::List { search } => {
            let list = match search {
                Some(query) => products.search(&query),
                None => products.list(),
            };
            if json {
                return print_json(&list);
            }
            for p in &list {
                println!(
                    "{}  {}  {}  {} {}",
                    p.id,
                    p.name,
                    p.price,
                    p.quantity,
                    p.quantity_unit.as_str()
                );
            }
        }
        ProductCommand::Delete { id } => delete_result(products.delete(&RecordId::new(id)))?,
    }
    Ok(())
}

fn run_list(ctx: &AppContext, command: ListCommand, json: bool) -> Result<()> {
    let list = ctx.shopping_list();
    match command {
        ListCommand::Add { name, quantity } => {
            let item = list.add(&name, &quantity, now())?;
            if json {
                return print_json(&item);
            }
            println!("Added {} ({})", item.name, item.id);
        }
        ListCommand::Show => {
            let items = list.list();
            if json {
                return print_json(&items);
            }
            for item in &items {
                let mark = if item.bought { "x" } else { " " };
                println!("[{}] {}  {}  {}", mark, item.id, item.name, item.quantity);
            }
        }
        ListCommand::Toggle { id } => {
            let bought = list.toggle_bought(&RecordId::new(id))?;
            println!("{}", if bought { "Bought" } else { "Not bought" });
        }
        ListCommand::Delete { id } => delete_result(list.delete(&RecordId::new(id)))?,
        ListCommand::ClearBought => println!("Removed {} bought items", list.clear_bought()),
    }
    Ok(())
}

async fn run_task(ctx: &AppContext, command: TaskCommand, json: bool) -> Result<()> {
    let tasks = ctx.tasks();
    match command {
        TaskCommand::Add { text } => {
            let task = tasks.add(&text, now())?;
            if json {
                return print_json(&task);
            }
            println!("Added task {}", task.id);
        }
        TaskCommand::List => {
            let list = tasks.list();
            if json {
                return print_json(&list);
            }
            for task in &list {
                let mark = if task.completed { "x" } else { " " };
                println!("[{}] {}  {}", mark, task.id, task.text);
            }
        }
        TaskCommand::Toggle { id } => {
            let completed = tasks.toggle(&RecordId::new(id))?;
            println!("{}", if completed { "Done" } else { "Not done" });
        }
        TaskCommand::Hold { id } => {
            let id = RecordId::new(id);
            let mut gesture = ctx.hold_gesture();
            gesture.press(MonotonicInstant::now());

            let mut ticker = tokio::time::interval(Duration::from_millis(100));
            let mut sigint =
                signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
            loop {
                tokio::select! {
                    _ = sigint.recv() => {
                        gesture.release(MonotonicInstant::now());
                        bail!("Hold released early, task not completed");
                    }
                    _ = ticker.tick() => {
                        match gesture.poll(MonotonicInstant::now()) {
                            HoldState::Completed => break,
                            HoldState::Holding { progress } => {
                                debug!(progress, "Holding");
                            }
                            HoldState::Idle => {}
                        }
                    }
                }
            }
            gesture.release(MonotonicInstant::now());
            let task = tasks.complete(&id)?;
            println!("Completed: {}", task.text);
        }
        TaskCommand::Delete { id } => delete_result(tasks.delete(&RecordId::new(id)))?,
    }
    Ok(())
}

fn run_profile(ctx: &AppContext, command: ProfileCommand, json: bool) -> Result<()> {
    let profiles = ctx.profile();
    match command {
        ProfileCommand::Show => match profiles.load() {
            Some(profile) if json => print_json(&profile)?,
            Some(profile) => {
                println!("{}", profile.shop_name);
                for (label, value) in [
                    ("Owner", &profile.owner_name),
                    ("Phone", &profile.phone),
                    ("Address", &profile.address),
                    ("Category", &profile.category),
                ] {
                    if !value.is_empty() {
                        println!("{}: {}", label, value);
                    }
                }
            }
            None => println!("No shop registered"),
        },
        ProfileCommand::Set {
            shop_name,
            owner_name,
            phone,
            address,
            category,
        } => {
            let profile = profiles.save(ShopProfile {
                shop_name,
                owner_name,
                phone,
                address,
                category,
                photo: None,
            })?;
            println!("Registered {}", profile.shop_name);
        }
        ProfileCommand::Clear => profiles.clear(),
    }
    Ok(())
}

fn run_prefs(
    ctx: &AppContext,
    language: Option<Language>,
    theme_mode: Option<ThemeMode>,
    theme_color: Option<ThemeColor>,
    sound: Option<bool>,
    json: bool,
) -> Result<()> {
    let prefs = ctx.preferences();
    if let Some(language) = language {
        prefs.set_language(language);
    }
    if let Some(mode) = theme_mode {
        prefs.set_theme_mode(mode);
    }
    if let Some(color) = theme_color {
        prefs.set_theme_color(color);
    }
    if let Some(enabled) = sound {
        prefs.set_sound_enabled(enabled);
    }

    let current = prefs.load();
    if json {
        return print_json(&current);
    }
    println!("Language: {}", current.language);
    println!("Theme: {} / {}", current.theme_mode, current.theme_color);
    println!("Sound: {}", if current.sound_enabled { "on" } else { "off" });
    Ok(())
}

/// Tick until SIGINT or SIGTERM, printing every change event
async fn run_watch(ctx: &AppContext, interval: u64) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;

    let mut tick_timer = tokio::time::interval(Duration::from_secs(interval.max(1)));

    info!(installation_id = %ctx.installation_id(), "Watching for due changes");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, stopping");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, stopping");
                break;
            }
            _ = tick_timer.tick() => {
                for event in ctx.tick(now()) {
                    print_event(&event)?;
                }
            }
        }
    }
    Ok(())
}

fn print_event(event: &ChangeEvent) -> Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn delete_result(deleted: bool) -> Result<()> {
    if !deleted {
        bail!("No record with that id");
    }
    println!("Deleted");
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let ctx = open_context(&args)?;
    let json = args.json;

    match args.command {
        Command::Status => run_status(&ctx, json),
        Command::Redeem { code } => {
            let status = ctx.codes().redeem(&code, now())?;
            if json {
                return print_json(&status);
            }
            if let Some(expiry) = status.expiry_date {
                println!("Premium active until {}", format_datetime_full(&expiry));
            }
            Ok(())
        }
        Command::Trial => {
            let codes = ctx.codes();
            codes.start_trial(now())?;
            println!(
                "Trial started for {}",
                format_duration(codes.trial_length())
            );
            Ok(())
        }
        Command::Sale(command) => run_sale(&ctx, command, json),
        Command::Report { date, today } => run_report(&ctx, date, today, json),
        Command::Product(command) => run_product(&ctx, command, json),
        Command::List(command) => run_list(&ctx, command, json),
        Command::Task(command) => run_task(&ctx, command, json).await,
        Command::Profile(command) => run_profile(&ctx, command, json),
        Command::Prefs {
            language,
            theme_mode,
            theme_color,
            sound,
        } => run_prefs(&ctx, language, theme_mode, theme_color, sound, json),
        Command::Watch { interval } => run_watch(&ctx, interval).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if dokan_util::is_mock_time_active() {
        info!(now = %format_datetime_full(&now()), "Mock time active");
    }

    run(args).await
}
