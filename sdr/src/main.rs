//! `sdr`: generate, pick and send one personalized cold sales email.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use sdr::agents::topology::Topology;
use sdr::core::campaign::{CampaignContext, CampaignInput};
use sdr::core::types::DraftStyle;
use sdr::io::config::{DEFAULT_CONFIG_PATH, SdrConfig, load_config, write_config};
use sdr::io::credentials::{Credentials, Settings};
use sdr::io::intake::{prompt_missing, write_summary};
use sdr::pipeline::{Selection, Session, run_campaign};
use sdr::report::{render_error, render_report, render_start};

#[derive(Parser)]
#[command(
    name = "sdr",
    version,
    about = "Multi-draft cold sales email generator and sender"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Dotenv file merged over the process environment.
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect campaign details, write three drafts, pick one and send it.
    Run {
        #[command(flatten)]
        campaign: CampaignArgs,

        /// Use defaults for every field not given instead of prompting.
        #[arg(long)]
        no_prompt: bool,

        /// Always send the draft in this style instead of asking the sales manager.
        #[arg(long, value_name = "STYLE")]
        prefer_style: Option<DraftStyle>,
    },
    /// Print the agent tree (names, instructions, tools, handoffs) as JSON.
    Topology {
        #[command(flatten)]
        campaign: CampaignArgs,
    },
    /// Write the default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
struct CampaignArgs {
    #[arg(long)]
    company_name: Option<String>,
    #[arg(long)]
    company_description: Option<String>,
    #[arg(long)]
    signer_name: Option<String>,
    #[arg(long)]
    signer_title: Option<String>,
    #[arg(long)]
    recipient_name: Option<String>,
    #[arg(long)]
    recipient_email: Option<String>,
    /// Outreach context the email is based on.
    #[arg(long = "context")]
    context_message: Option<String>,
}

impl From<CampaignArgs> for CampaignInput {
    fn from(args: CampaignArgs) -> Self {
        CampaignInput {
            company_name: args.company_name,
            company_description: args.company_description,
            signer_name: args.signer_name,
            signer_title: args.signer_title,
            recipient_name: args.recipient_name,
            recipient_email: args.recipient_email,
            context_message: args.context_message,
        }
    }
}

#[tokio::main]
async fn main() {
    sdr::logging::init();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli).await {
        println!("{}", render_error(&err));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            campaign,
            no_prompt,
            prefer_style,
        } => {
            let selection = prefer_style.map_or(Selection::ModelJudge, Selection::PreferStyle);
            cmd_run(&cli.config, &cli.env_file, campaign.into(), no_prompt, selection).await
        }
        Command::Topology { campaign } => cmd_topology(&cli.config, campaign.into()),
        Command::InitConfig { force } => cmd_init_config(&cli.config, force),
    }
}

async fn cmd_run(
    config_path: &Path,
    env_file: &Path,
    input: CampaignInput,
    no_prompt: bool,
    selection: Selection,
) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = Settings::load(env_file)?;
    // Fail before prompting; the session re-derives the same credentials.
    Credentials::from_settings(&settings)?;

    let input = if no_prompt {
        input
    } else {
        let stdin = io::stdin();
        prompt_missing(input, &mut stdin.lock(), &mut io::stdout())?
    };

    let session = Session::prepare(&input, &settings, config)?;
    let mut stdout = io::stdout();
    write_summary(&session.ctx, &mut stdout)?;
    writeln!(stdout, "{}", render_start(&session.ctx))?;
    stdout.flush().context("flush stdout")?;

    let (model, sender) = session.live_clients()?;
    let outcome = run_campaign(&session, &model, &sender, selection).await?;
    print!(
        "{}",
        render_report(&session.credentials().from_email, &outcome)
    );
    Ok(())
}

fn cmd_topology(config_path: &Path, input: CampaignInput) -> Result<()> {
    let config = load_config(config_path)?;
    let ctx = CampaignContext::from_input(&input);
    let topology = Topology::build(&ctx, &config.model)?;
    let json = serde_json::to_string_pretty(topology.sales_manager()).context("serialize topology")?;
    println!("{json}");
    Ok(())
}

fn cmd_init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        println!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
        return Ok(());
    }
    write_config(config_path, &SdrConfig::default())?;
    println!("wrote {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_campaign_flags() {
        let cli = Cli::parse_from([
            "sdr",
            "run",
            "--company-name",
            "Acme",
            "--recipient-email",
            "x@y.com",
            "--context",
            "Series A",
            "--no-prompt",
        ]);
        let Command::Run {
            campaign,
            no_prompt,
            prefer_style,
        } = cli.command
        else {
            panic!("expected run");
        };
        assert!(no_prompt);
        assert!(prefer_style.is_none());
        let input = CampaignInput::from(campaign);
        assert_eq!(input.company_name.as_deref(), Some("Acme"));
        assert_eq!(input.context_message.as_deref(), Some("Series A"));
        assert!(input.signer_name.is_none());
    }

    #[test]
    fn parse_prefer_style() {
        let cli = Cli::parse_from(["sdr", "run", "--prefer-style", "concise"]);
        assert!(matches!(
            cli.command,
            Command::Run {
                prefer_style: Some(DraftStyle::Concise),
                ..
            }
        ));
    }

    #[test]
    fn global_paths_default() {
        let cli = Cli::parse_from(["sdr", "topology"]);
        assert_eq!(cli.config, PathBuf::from("sdr.toml"));
        assert_eq!(cli.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn parse_init_config_force() {
        let cli = Cli::parse_from(["sdr", "--config", "x.toml", "init-config", "--force"]);
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }
}
