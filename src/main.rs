use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use http::StatusCode;
use kidgrowth_advice::adapters::server;
use kidgrowth_advice::config::cli::{AdviseCommand, CalendarCommand, Cli, Command};
use kidgrowth_advice::core::prompt;
use kidgrowth_advice::domain::growth;
use kidgrowth_advice::domain::model::{GrowthData, MilestoneData, QuestionData};
use kidgrowth_advice::utils::{logger, validation::Validate};
use kidgrowth_advice::{
    AdviceHandler, AdviceRequest, AdviceResponse, AppConfig, CalendarSync, GatewayClient,
    ImmunizationEvent, SyncOutcome,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
    tracing::debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Advise(command) => {
            let request = advise_request(command)?;
            let handler = AdviceHandler::new(GatewayClient::new(&config.gateway))
                .with_error_detail(config.expose_error_detail);

            let (status, response) = handler.advise(&request).await;
            match response {
                AdviceResponse::Advice { advice } => println!("{advice}"),
                AdviceResponse::Error { error, detail } => {
                    eprintln!("❌ {} ({})", error, status);
                    if let Some(detail) = detail {
                        eprintln!("   {detail}");
                    }
                    std::process::exit(exit_code(status));
                }
            }
        }
        Command::Prompt { kind, data } => {
            let payload: serde_json::Value =
                serde_json::from_str(&data).context("request data must be valid JSON")?;
            let prompts = prompt::build(&kind, &payload)?;
            println!("[system]\n{}\n\n[user]\n{}", prompts.system_prompt, prompts.user_prompt);
        }
        Command::Serve { bind, port } => {
            let bind = bind.unwrap_or(config.server.bind_address.clone());
            let port = port.unwrap_or(config.server.port);
            let handler = AdviceHandler::new(GatewayClient::new(&config.gateway))
                .with_error_detail(config.expose_error_detail);
            if config.gateway.api_key.is_none() {
                tracing::warn!("No gateway API key configured; advice requests will fail");
            }
            server::serve(&bind, port, Arc::new(handler)).await?;
        }
        Command::Calendar(command) => {
            let sync = CalendarSync::new(&config.calendar)?;
            run_calendar(&sync, command).await?;
        }
    }

    Ok(())
}

fn advise_request(command: AdviseCommand) -> anyhow::Result<AdviceRequest> {
    let request = match command {
        AdviseCommand::Growth(args) => {
            let bmi = match args.bmi {
                Some(bmi) => bmi,
                None => growth::bmi(args.weight, args.height)
                    .context("height and weight must be positive to compute BMI")?,
            };
            AdviceRequest::GrowthAnalysis(GrowthData {
                name: args.name,
                age_months: args.age_months,
                gender: args.gender,
                height: args.height,
                weight: args.weight,
                bmi,
            })
        }
        AdviseCommand::Milestones {
            age_months,
            milestones,
        } => AdviceRequest::MilestoneEvaluation(MilestoneData {
            age_months,
            milestones,
        }),
        AdviseCommand::Ask { question } => AdviceRequest::GeneralAdvice(QuestionData { question }),
    };

    // Same validation path as requests arriving over HTTP.
    let kind = request.kind();
    let payload = match &request {
        AdviceRequest::GrowthAnalysis(data) => serde_json::to_value(data)?,
        AdviceRequest::MilestoneEvaluation(data) => serde_json::to_value(data)?,
        AdviceRequest::GeneralAdvice(data) => serde_json::to_value(data)?,
    };
    Ok(AdviceRequest::from_parts(kind.as_str(), &payload)?)
}

async fn run_calendar(sync: &CalendarSync, command: CalendarCommand) -> anyhow::Result<()> {
    let outcome = match command {
        CalendarCommand::Status => {
            if sync.is_connected().await {
                println!("📅 Calendar connected");
            } else {
                println!("Calendar not connected");
            }
            return Ok(());
        }
        CalendarCommand::Sync {
            summary,
            description,
            date,
            subject,
        } => {
            let date = parse_date(&date)?;
            sync.sync_event(&summary, &description, date, subject.as_deref())
                .await
        }
        CalendarCommand::Immunization {
            vaccine,
            child,
            date,
            notes,
        } => {
            let mut event = ImmunizationEvent::quick_add(&vaccine, &child, Local::now().date_naive());
            if let Some(date) = date {
                event.scheduled_date = parse_date(&date)?;
            }
            event.notes = notes;
            sync.sync_immunization(&event).await
        }
    };

    match outcome {
        SyncOutcome::Succeeded { event_id } => println!("📅 Added to calendar ({event_id})"),
        SyncOutcome::NotConnected => {
            eprintln!("Calendar not connected; nothing was synced");
            std::process::exit(2);
        }
        SyncOutcome::Failed(reason) => {
            eprintln!("❌ Calendar sync failed: {reason}");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

fn exit_code(status: StatusCode) -> i32 {
    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::PAYMENT_REQUIRED => 2,
        s if s.is_client_error() => 1,
        _ => 3,
    }
}
