use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use metrics::counter;
use tracing::{error, info, warn};

use crate::api::TokenMetadata;
use crate::cli::args::{Cli, Command, LaunchArgs, StatusArgs};
use crate::cli::context::{
    LiveOrchestrator, build_http_client, build_orchestrator, build_relay, key_file_path,
    resolve_token,
};
use crate::config::{AppConfig, load_key_file};
use crate::launch::DeploymentResult;
use crate::relay::{BundleId, InflightStatus};

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Launch(args) => launch(&config, args).await,
        Command::Status(args) => status(&config, args).await,
    }
}

async fn launch(config: &AppConfig, args: LaunchArgs) -> Result<()> {
    let result = match prepare_launch(config, &args) {
        Ok((orchestrator, token)) => orchestrator.launch(&token).await,
        Err(err) => {
            counter!("kepler_launch_total", "outcome" => "config").increment(1);
            error!(
                target: "launch",
                stage = "config",
                error = %format!("{err:#}"),
                "发射中止"
            );
            DeploymentResult::not_deployed()
        }
    };

    if let Some(rendered) = render_result(&result, args.json)? {
        println!("{rendered}");
    }

    if !result.is_deployed() {
        bail!("代币未部署");
    }
    if let (Some(address), Some(links)) = (result.contract_address(), result.links()) {
        info!(
            target: "launch",
            contract_address = address,
            bundle_id = result.bundle_id().unwrap_or_default(),
            slot = ?result.slot(),
            pump_fun = %links.pump_fun,
            photon = %links.photon,
            "代币已部署"
        );
    }
    Ok(())
}

/// 读取密钥文件并组装线上客户端，此处不访问网络。
fn prepare_launch(
    config: &AppConfig,
    args: &LaunchArgs,
) -> Result<(LiveOrchestrator, TokenMetadata)> {
    let path = key_file_path(config, args);
    let keys = load_key_file(path)?;
    let token = resolve_token(config, &keys, args);
    info!(
        target: "launch",
        keys = %path.display(),
        image = %token.image.display(),
        "密钥文件已加载"
    );
    let orchestrator = build_orchestrator(config, keys)?;
    Ok((orchestrator, token))
}

fn render_result(result: &DeploymentResult, json: bool) -> Result<Option<String>> {
    if !json {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string_pretty(result)?))
}

async fn status(config: &AppConfig, args: StatusArgs) -> Result<()> {
    let bundle_id = args.bundle_id.trim();
    if bundle_id.is_empty() {
        return Err(anyhow!("bundle id 为空"));
    }
    let bundle_id = BundleId::new(bundle_id);
    let relay = build_relay(config, build_http_client(config)?)?;

    if args.wait_ms > 0 {
        match relay
            .await_inflight(&bundle_id, Duration::from_millis(args.wait_ms))
            .await
        {
            InflightStatus::Confirmed { slot } => {
                info!(target: "relay::jito", bundle_id = %bundle_id, slot = ?slot, "bundle 已落地")
            }
            InflightStatus::Failed { reason } => {
                warn!(target: "relay::jito", bundle_id = %bundle_id, reason = %reason, "bundle 失败")
            }
            InflightStatus::TimedOut { waited } => warn!(
                target: "relay::jito",
                bundle_id = %bundle_id,
                waited_ms = waited.as_millis() as u64,
                "bundle 仍未落地"
            ),
        }
    }

    match relay.fetch_final(&bundle_id).await? {
        Some(status) => println!("{}", serde_json::to_string_pretty(&status)?),
        None => {
            info!(target: "relay::jito", bundle_id = %bundle_id, "中继没有最终状态");
        }
    }
    info!(target: "relay::jito", explorer = %bundle_id.explorer_url(), "bundle 浏览器");
    Ok(())
}
