mod cli;
mod ui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use cli::{Cli, Command};
use fleetwatch::config::FleetConfig;
use fleetwatch::functions::{FunctionClient, FunctionInvoker, FunctionResponse, NotificationRequest};
use fleetwatch::service::FleetService;
use fleetwatch::{OperationOutcome, RetryableExecutor, logging};
use ui::{OperationProgress, OutcomeReport};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.log_level(), cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => FleetConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => FleetConfig::load()?,
    };
    cli.apply_to(&mut config);
    config.validate()?;

    if let Command::Config = cli.command {
        let mut shown = config.clone();
        if !shown.functions.api_key.is_empty() {
            shown.functions.api_key = "********".to_string();
        }
        println!("{}", toml::to_string_pretty(&shown)?);
        return Ok(ExitCode::SUCCESS);
    }

    let client = FunctionClient::from_config(&config.functions)?;
    let service = FleetService::new(client, RetryableExecutor::new(config.executor.clone()));

    let label = operation_label(&cli.command);
    let progress = OperationProgress::start(&label);
    let outcome = run(&service, cli.command).await?;

    let report = OutcomeReport::from_outcome(&label, &outcome, |resp| resp.message.clone());
    progress.complete(&report);
    progress.print_report(&report);

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn operation_label(command: &Command) -> String {
    match command {
        Command::DeleteDevice { device_id } => format!("delete-device {device_id}"),
        Command::AssignGroup { device_id, group } => match group {
            Some(group) => format!("assign-group {device_id} -> {group}"),
            None => format!("unassign-group {device_id}"),
        },
        Command::Notify { channel, .. } => format!("notify via {channel:?}").to_lowercase(),
        Command::Invoke { function, .. } => format!("invoke {function}"),
        Command::Config => "config".to_string(),
    }
}

async fn run<I: FunctionInvoker>(
    service: &FleetService<I>,
    command: Command,
) -> Result<OperationOutcome<FunctionResponse>> {
    let outcome = match command {
        Command::DeleteDevice { device_id } => service.delete_device(&device_id).await,
        Command::AssignGroup { device_id, group } => {
            service.assign_group(&device_id, group.as_deref()).await
        }
        Command::Notify {
            channel,
            to,
            subject,
            message,
        } => {
            let request = NotificationRequest {
                channel: channel.into(),
                recipient: to,
                subject,
                message,
            };
            service.send_notification(&request).await
        }
        Command::Invoke { function, body } => {
            let body: Value = match body {
                Some(raw) => serde_json::from_str(&raw).context("--body must be valid JSON")?,
                None => Value::Object(Default::default()),
            };
            service.invoke(&function, body).await
        }
        Command::Config => anyhow::bail!("config does not run an operation"),
    };
    Ok(outcome)
}
