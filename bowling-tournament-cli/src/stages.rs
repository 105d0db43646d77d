use bowling_tournament_api::id::{SquadId, StageId};
use bowling_tournament_api::v1::stages::{Stage, StageKind};
use bowling_tournament_api::Client;
use chrono::Utc;
use clap::Subcommand;

use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the stage of a squad.
    Show {
        #[clap(value_parser)]
        squad: SquadId,
    },
    /// Start tracking the stage of a squad. Squads start in DEFINE.
    Init {
        #[clap(value_parser)]
        squad: SquadId,
    },
    /// Move a squad to another stage (DEFINE, ENTRIES or SCORES).
    Advance {
        #[clap(value_parser)]
        squad: SquadId,
        #[clap(value_parser)]
        stage: StageKind,
    },
    /// Allow a squad to move freely between stages.
    Override {
        #[clap(value_parser)]
        squad: SquadId,
        reason: String,
    },
    ClearOverride {
        #[clap(value_parser)]
        squad: SquadId,
    },
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        let stages = client.v1().stages();

        let stage = match self {
            Self::Show { squad } => stages.get(squad).await?,
            Self::Init { squad } => {
                let stage = Stage::new(StageId::generate(), squad.clone(), Utc::now());
                stages.create(&stage).await?
            }
            Self::Advance { squad, stage } => stages.advance(squad, *stage).await?,
            Self::Override { squad, reason } => stages.set_override(squad, reason).await?,
            Self::ClearOverride { squad } => stages.clear_override(squad).await?,
        };

        print_stage(&stage);
        Ok(())
    }
}

fn print_stage(stage: &Stage) {
    println!("Squad: {}", stage.squad_id);
    println!("Stage: {} (since {})", stage.stage, stage.stage_set_at);

    if let Some(at) = stage.scores_started_at {
        println!("Scores started: {}", at);
    }

    if stage.stage_override_enabled {
        println!(
            "Override: {} ({})",
            stage.stage_override_reason.as_deref().unwrap_or_default(),
            stage
                .stage_override_at
                .map(|at| at.to_string())
                .unwrap_or_default()
        );
    }
}
