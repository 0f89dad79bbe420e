#![deny(warnings)]

//! Headless Idle Garden client: loads a session, applies commands, runs the
//! tick driver for a while, then saves and prints a summary.

mod config;

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use garden_runtime::{GameEngine, SessionStart};
use persistence::SaveStore;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Buy(String),
    LevelUp(String),
    Sell(String),
    Upgrade(String),
    Expand(String),
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seconds: u64,
    reset: bool,
    list: bool,
    commands: Vec<Command>,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut it = raw.into_iter();
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} expects a value"));
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--seconds" => {
                args.seconds = value()?
                    .parse()
                    .context("--seconds expects a whole number")?
            }
            "--buy" => args.commands.push(Command::Buy(value()?)),
            "--level-up" => args.commands.push(Command::LevelUp(value()?)),
            "--sell" => args.commands.push(Command::Sell(value()?)),
            "--upgrade" => args.commands.push(Command::Upgrade(value()?)),
            "--expand" => args.commands.push(Command::Expand(value()?)),
            "--reset" => args.reset = true,
            "--list" => args.list = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    Ok(args)
}

fn apply<S: SaveStore>(engine: &mut GameEngine<S>, command: &Command) {
    match command {
        Command::Buy(id) => {
            if let Err(block) = engine.can_purchase_entity(id) {
                println!("cannot buy {id}: {block}");
                return;
            }
            engine.purchase_entity(id);
        }
        Command::LevelUp(id) => engine.level_up_entity(id),
        Command::Sell(id) => engine.sell_entity(id),
        Command::Upgrade(id) => engine.purchase_global_upgrade(id),
        Command::Expand(id) => engine.purchase_capacity_upgrade(id),
    }
    info!(?command, currency = engine.currency(), "command applied");
}

fn print_catalog<S: SaveStore>(engine: &GameEngine<S>) {
    println!("producers:");
    for p in &engine.catalog().producers {
        let lock = if engine.is_producer_unlocked(p.id.as_str()) {
            String::new()
        } else {
            format!(" (unlocks at level {})", p.unlock_level)
        };
        let cost = engine.entity_purchase_cost(p.id.as_str()).unwrap_or(p.base_cost);
        println!("  {:<4} {:<16} {:>12.0}{lock}", p.id, p.name, cost);
    }
    println!("upgrades:");
    for u in &engine.catalog().upgrades {
        let status = engine.upgrade_status(u.id.as_str());
        println!("  {:<4} {:<16} {:>12.0} x{} {status:?}", u.id, u.name, u.cost, u.multiplier);
    }
    println!("capacity:");
    for g in &engine.catalog().capacity_upgrades {
        let status = engine.capacity_upgrade_status(g.id.as_str());
        println!(
            "  {:<4} {:<16} {:>12.0} +{} {status:?}",
            g.id, g.name, g.cost, g.capacity_increase
        );
    }
}

fn print_summary<S: SaveStore>(engine: &GameEngine<S>) {
    let snap = engine.snapshot();
    println!(
        "currency {:.1}  level {}  biome {:?}  yield {:.2}/s  x{:.2}  garden {}/{}",
        snap.currency,
        snap.level,
        snap.biome,
        snap.yield_rate,
        snap.multiplier,
        snap.entities.len(),
        snap.capacity
    );
    for e in &snap.entities {
        let cost = engine.entity_upgrade_cost(e.id().as_str()).unwrap_or(0.0);
        let refund = engine.sell_value(e.id().as_str()).unwrap_or(0.0);
        println!(
            "  {} {:<16} lvl {:<3} {:>10.2}/s  level-up {:.0}  sell {:.0}",
            e.id(),
            e.display_name(),
            e.level(),
            e.yield_rate(snap.multiplier),
            cost,
            refund
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args(std::env::args().skip(1))?;
    let cfg = CliConfig::load(args.config.as_deref())?;
    let catalog = cfg.catalog()?;
    info!(save = %cfg.save_path.display(), seconds = args.seconds, "starting idle garden");

    let store = persistence::default_store(&cfg.save_path);
    let mut engine = GameEngine::new(store, catalog, cfg.game.clone())?;

    let dirty = Rc::new(Cell::new(false));
    let reload = Rc::new(Cell::new(false));
    {
        let dirty = Rc::clone(&dirty);
        engine.set_listener(move || dirty.set(true));
    }
    {
        let reload = Rc::clone(&reload);
        engine.set_reload_hook(move || reload.set(true));
    }
    engine.set_achievement_listener(|a| {
        info!(id = %a.id, "achievement unlocked");
        println!("achievement unlocked: {}", a.name);
    });

    if engine.initialize() == SessionStart::LoadFailed {
        println!("saved game could not be loaded; starting fresh");
    }

    if args.reset {
        engine.reset_game().context("failed to clear saved game")?;
        if reload.replace(false) {
            engine.initialize();
        }
    }
    dirty.set(false);

    for command in &args.commands {
        apply(&mut engine, command);
    }
    if args.list {
        print_catalog(&engine);
    }

    if args.seconds > 0 {
        let period = Duration::from_millis(cfg.tick_interval_ms);
        let deadline = Instant::now() + Duration::from_secs(args.seconds);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = ticker.tick().await;
        loop {
            tokio::select! {
                now = ticker.tick() => {
                    engine.tick(now.duration_since(last).as_secs_f64());
                    last = now;
                    if now >= deadline {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break;
                }
            }
        }
    }

    if dirty.get() && !engine.save_game() {
        warn!(delay_ms = cfg.retry_delay_ms, "save failed, retrying once");
        sleep(Duration::from_millis(cfg.retry_delay_ms)).await;
        if !engine.save_game() {
            println!("progress could not be saved");
        }
    }

    print_summary(&engine);
    Ok(())
}
