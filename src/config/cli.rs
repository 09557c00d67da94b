use crate::domain::model::Milestone;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "kidgrowth-advice")]
#[command(about = "Growth-tracking advice assistant and calendar sync tools")]
pub struct Cli {
    /// TOML configuration file; environment variables take precedence
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request advice from the AI gateway
    #[command(subcommand)]
    Advise(AdviseCommand),

    /// Print the prompts that would be sent for a request, without calling the gateway
    Prompt {
        /// growth_analysis, milestone_evaluation or general_advice
        #[arg(value_name = "TYPE")]
        kind: String,
        /// Request data as JSON
        data: String,
    },

    /// Serve the advice function locally
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Calendar sync for the signed-in user
    #[command(subcommand)]
    Calendar(CalendarCommand),
}

#[derive(Debug, Subcommand)]
pub enum AdviseCommand {
    /// Growth analysis from the latest measurement
    Growth(GrowthArgs),
    /// Milestone evaluation, e.g. --milestone "Sits up=yes" --milestone "Crawls=no"
    Milestones {
        #[arg(long)]
        age_months: f64,
        #[arg(long = "milestone", value_parser = parse_milestone)]
        milestones: Vec<Milestone>,
    },
    /// Free-form parenting question
    Ask { question: String },
}

#[derive(Debug, Args)]
pub struct GrowthArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub age_months: f64,
    #[arg(long)]
    pub gender: String,
    /// Height in cm
    #[arg(long)]
    pub height: f64,
    /// Weight in kg
    #[arg(long)]
    pub weight: f64,
    /// Computed from height and weight when omitted
    #[arg(long)]
    pub bmi: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum CalendarCommand {
    /// Show whether a calendar is connected
    Status,
    /// Create one calendar event
    Sync {
        #[arg(long)]
        summary: String,
        #[arg(long, default_value = "")]
        description: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Child name used as a summary prefix
        #[arg(long)]
        subject: Option<String>,
    },
    /// Schedule an immunization reminder (one week from today when --date is omitted)
    Immunization {
        #[arg(long)]
        vaccine: String,
        #[arg(long)]
        child: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn parse_milestone(value: &str) -> Result<Milestone, String> {
    let (title, status) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TITLE=yes|no, got '{value}'"))?;
    let title = title.trim();
    if title.is_empty() {
        return Err("milestone title cannot be empty".to_string());
    }
    let is_achieved = match status.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "achieved" => true,
        "no" | "n" | "false" | "not-yet" => false,
        other => return Err(format!("unknown milestone status '{other}'")),
    };
    Ok(Milestone {
        title: title.to_string(),
        is_achieved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_milestone() {
        let m = parse_milestone("Sits up=yes").unwrap();
        assert_eq!(m.title, "Sits up");
        assert!(m.is_achieved);

        let m = parse_milestone("Says \"mama\" = no").unwrap();
        assert_eq!(m.title, "Says \"mama\"");
        assert!(!m.is_achieved);

        assert!(parse_milestone("Crawls").is_err());
        assert!(parse_milestone("=yes").is_err());
        assert!(parse_milestone("Crawls=maybe").is_err());
    }

    #[test]
    fn test_cli_parses_milestones_in_order() {
        let cli = Cli::try_parse_from([
            "kidgrowth-advice",
            "advise",
            "milestones",
            "--age-months",
            "9",
            "--milestone",
            "Sits up=yes",
            "--milestone",
            "Crawls=no",
        ])
        .unwrap();

        match cli.command {
            Command::Advise(AdviseCommand::Milestones { age_months, milestones }) => {
                assert_eq!(age_months, 9.0);
                assert_eq!(milestones[0].title, "Sits up");
                assert_eq!(milestones[1].title, "Crawls");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kidgrowth-advice", "calendar", "status", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Calendar(CalendarCommand::Status)));
    }
}
