//! upgrade_sim - Replays a scripted session against upgrade_core
//!
//! This binary shows:
//! - Wiring the coordinator to a host through the port traits
//! - Choosing a kill store (in memory or SQLite)
//! - Login, equip, boss kill, reload and logout flowing through one dispatch

mod scenario;
mod sim_host;

use anyhow::{Context, Result};
use clap::Parser;
use scenario::{Scenario, Step};
use sim_host::{PlayerReport, SimHost};
use std::path::{Path, PathBuf};
use tracing::info;
use upgrade_core::{
    Coordinator, CreatureInfo, HostEvent, InMemoryKillStore, KillRecordStore, SqliteKillStore,
    StatKind, UpgradeSettings,
};

#[derive(Debug, Parser)]
#[command(name = "upgrade_sim", about = "Replay a scenario through the self-craft upgrade engine")]
struct Cli {
    /// Settings file; the bundled defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scenario to replay
    #[arg(long)]
    scenario: PathBuf,
    /// Persist kills in this SQLite database instead of memory
    #[arg(long)]
    db: Option<PathBuf>,
    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
    /// Reject settings files with invalid values instead of repairing them
    #[arg(long)]
    strict: bool,
}

/// Everything one replay needs
struct SimState {
    host: SimHost,
    coordinator: Coordinator<Box<dyn KillRecordStore>>,
    config_path: Option<PathBuf>,
    strict: bool,
}

impl SimState {
    fn new(cli: &Cli) -> Result<Self> {
        let store: Box<dyn KillRecordStore> = match &cli.db {
            Some(path) => Box::new(
                SqliteKillStore::open(path)
                    .with_context(|| format!("failed to open kill database {}", path.display()))?,
            ),
            None => Box::new(InMemoryKillStore::new()),
        };

        let settings = load_settings(cli.config.as_deref(), cli.strict)?;
        Ok(SimState {
            host: SimHost::new(),
            coordinator: Coordinator::new(settings, store),
            config_path: cli.config.clone(),
            strict: cli.strict,
        })
    }

    fn run(&mut self, scenario: &Scenario) -> Result<()> {
        for (index, step) in scenario.steps.iter().enumerate() {
            info!(step = index + 1, ?step, "replaying");
            self.apply(scenario, step)
                .with_context(|| format!("step {} failed", index + 1))?;
        }
        Ok(())
    }

    fn report(&self) -> Vec<PlayerReport> {
        self.host.report(self.coordinator.ledger())
    }

    fn apply(&mut self, scenario: &Scenario, step: &Step) -> Result<()> {
        match step {
            Step::Login { player } => {
                self.host.login(*player);
                self.coordinator
                    .handle(&mut self.host, HostEvent::Login { player: *player });
            }
            Step::Logout { player } => {
                self.coordinator
                    .handle(&mut self.host, HostEvent::Logout { player: *player });
                self.host.logout(*player);
            }
            Step::Equip { player, slot, item } => {
                // Checked when the scenario was parsed
                let Some(item) = scenario.items.get(item) else {
                    anyhow::bail!("unknown item `{}`", item);
                };
                self.host.equip(*player, *slot, item.clone());
                self.coordinator.handle(
                    &mut self.host,
                    HostEvent::Equip {
                        player: *player,
                        slot: *slot,
                        item: item.clone(),
                    },
                );
            }
            Step::Unequip { player, slot } => {
                self.host.unequip(*player, *slot);
                self.coordinator.handle(
                    &mut self.host,
                    HostEvent::Unequip {
                        player: *player,
                        slot: *slot,
                    },
                );
            }
            Step::Kill { boss, name, killer } => {
                self.coordinator.handle(
                    &mut self.host,
                    HostEvent::CreatureDied {
                        creature: CreatureInfo::new(*boss, name.clone()),
                        killer: *killer,
                    },
                );
            }
            Step::Reload { config } => {
                let path = config.as_deref().or(self.config_path.as_deref());
                let settings = load_settings(path, self.strict)?;
                self.coordinator
                    .handle(&mut self.host, HostEvent::ConfigReloaded(settings));
            }
        }
        Ok(())
    }
}

fn load_settings(path: Option<&Path>, strict: bool) -> Result<UpgradeSettings> {
    match path {
        Some(path) if strict => UpgradeSettings::load_strict(path)
            .with_context(|| format!("invalid settings {}", path.display())),
        Some(path) => Ok(UpgradeSettings::load_or_default(path)),
        None => Ok(UpgradeSettings::bundled()),
    }
}

fn print_report(reports: &[PlayerReport]) {
    for report in reports {
        println!("\n{}", "=".repeat(60));
        println!(
            "  Player {} ({})",
            report.player,
            if report.online { "online" } else { "offline" }
        );
        println!("{}", "=".repeat(60));

        if !report.equipment.is_empty() {
            println!("  Equipment:");
            for (slot, name) in &report.equipment {
                println!("    - {:?}: {}", slot, name);
            }
        }

        println!("  {:<10} {:>6} {:>6} {:>6}", "Stat", "Items", "Bonus", "Total");
        for &stat in StatKind::all() {
            let items = report.item_stats.get(&stat).copied().unwrap_or(0);
            let bonus = report.bonus.get(&stat).copied().unwrap_or(0);
            let total = report.totals.get(&stat).copied().unwrap_or(0);
            println!("  {:<10} {:>6} {:>6} {:>6}", stat.to_string(), items, bonus, total);
        }

        if !report.slot_bonuses.is_empty() {
            println!("  Upgrades:");
            for (slot, bonus) in &report.slot_bonuses {
                let parts: Vec<String> = bonus
                    .iter()
                    .map(|(stat, delta)| format!("+{} {}", delta, stat))
                    .collect();
                println!("    - {:?}: {}", slot, parts.join(", "));
            }
        }

        if !report.notices.is_empty() {
            println!("  Notices:");
            for notice in &report.notices {
                println!("    > {}", notice);
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = Scenario::load(&cli.scenario)?;

    let mut state = SimState::new(&cli)?;
    state.run(&scenario)?;

    let reports = state.report();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_report(&reports);
    }

    Ok(())
}
