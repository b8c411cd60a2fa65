// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};

mod config;
mod scenario;

use config::SandboxConfig;
use scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "sandbox", version, about = "Runs a scripted asset container scenario")]
struct Args {
    /// Scenario file (RON).
    #[arg(short, long, default_value = "sandbox/scenario.ron")]
    config: PathBuf,
    /// Overrides the number of ticks in the scenario.
    #[arg(long)]
    ticks: Option<u32>,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config: SandboxConfig = cairn_data::config::load_ron(&args.config)
        .with_context(|| format!("Failed to load scenario '{}'", args.config.display()))?;

    let mut scenario = Scenario::new(config)?;
    if let Some(ticks) = args.ticks {
        scenario = scenario.with_ticks(ticks);
    }

    let status = scenario.run()?;
    log::info!(
        "Finished after {} ticks: {} finished, {} failed, {} still loading.",
        status.frame,
        status.finished,
        status.failed,
        status.loading
    );
    match scenario.settled_at() {
        Some(tick) => log::info!("Scenario settled at tick {tick}."),
        None => log::warn!("Scenario did not settle; consider more ticks."),
    }
    scenario.shutdown();
    Ok(())
}
