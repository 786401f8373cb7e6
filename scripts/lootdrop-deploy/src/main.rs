// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Deploys the LootDrop contract through Hardhat Ignition, with the VRF
//! parameters taken from the environment (or a `.env` file).

use std::{env, path::PathBuf, process::Command};

use anyhow::{bail, Context};

const IGNITION_MODULE: &str = "ignition/modules/LootDropModule.js";

#[derive(Debug, Clone, PartialEq, Eq)]
struct DeployParams {
    subscription_id: String,
    vrf_coordinator: String,
    key_hash: String,
    network: String,
    project_dir: Option<PathBuf>,
}

impl DeployParams {
    /// Reads the parameters through `lookup`. Empty values count as missing.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let value = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let subscription_id = value("SUBSCRIPTION_ID");
        let vrf_coordinator = value("VRF_COORDINATOR");
        let key_hash = value("KEY_HASH");
        let network = value("NETWORK");

        let missing: Vec<&str> = [
            ("SUBSCRIPTION_ID", subscription_id.is_none()),
            ("VRF_COORDINATOR", vrf_coordinator.is_none()),
            ("KEY_HASH", key_hash.is_none()),
            ("NETWORK", network.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        match (subscription_id, vrf_coordinator, key_hash, network) {
            (Some(subscription_id), Some(vrf_coordinator), Some(key_hash), Some(network)) => {
                Ok(DeployParams {
                    subscription_id,
                    vrf_coordinator,
                    key_hash,
                    network,
                    project_dir: value("HARDHAT_PROJECT_DIR").map(PathBuf::from),
                })
            }
            _ => bail!("Missing .env values: check {}", missing.join(", ")),
        }
    }

    /// Ignition `--parameters` value.
    fn parameter_string(&self) -> String {
        format!(
            "subscriptionId={},vrfCoordinator={},keyHash={}",
            self.subscription_id, self.vrf_coordinator, self.key_hash
        )
    }

    fn command(&self) -> Command {
        let mut command = Command::new("npx");
        command.args(["hardhat", "ignition", "deploy", IGNITION_MODULE]);
        command.args(["--network", &self.network]);
        command.args(["--parameters", &self.parameter_string()]);
        if let Some(dir) = &self.project_dir {
            command.current_dir(dir);
        }
        command
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = DeployParams::from_lookup(|name| env::var(name).ok())?;
    log::info!("Deploying with: {}", params.parameter_string());

    let mut command = params.command();
    log::info!("Running: {command:?}");
    let status = command
        .status()
        .context("Deployment failed: cannot run npx")?;
    if !status.success() {
        bail!("Deployment failed: {status}");
    }
    log::info!("Deployment complete on {}", params.network);
    Ok(())
}
