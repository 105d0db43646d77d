use bowling_tournament_api::id::TmntId;
use bowling_tournament_api::v1::tmnts::{Tmnt, TmntFull};
use bowling_tournament_api::Client;
use clap::Subcommand;

use crate::utils::Prompt;
use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all tournaments.
    List,
    /// Show a tournament with everything defined for it.
    Show {
        #[clap(value_parser)]
        id: TmntId,
    },
    /// Create a new tournament.
    Create,
    /// Delete a tournament and everything belonging to it.
    Delete {
        #[clap(value_parser)]
        id: TmntId,
    },
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        match self {
            Self::List => {
                let tmnts = client.v1().tmnts().list().await?;

                println!("ID | Name | Start | End");
                for tmnt in tmnts {
                    println!(
                        "{} | {} | {} | {}",
                        tmnt.id, tmnt.tmnt_name, tmnt.start_date, tmnt.end_date
                    );
                }
            }
            Self::Show { id } => {
                let full = client.v1().tmnts().full(id).await?;
                print_full(&full);
            }
            Self::Create => {
                let tmnt_name = Prompt::new("Name").read_valid()?;
                let start_date = Prompt::new("Start date (YYYY-MM-DD)").read_valid()?;
                let end_date = Prompt::new("End date (YYYY-MM-DD)").read_valid()?;
                let user_id = Prompt::new("User id").read_valid()?;
                let bowl_id = Prompt::new("Bowling center id").read_valid()?;

                let tmnt = client
                    .v1()
                    .tmnts()
                    .create(&Tmnt {
                        id: TmntId::generate(),
                        user_id,
                        bowl_id,
                        tmnt_name,
                        start_date,
                        end_date,
                    })
                    .await?;

                println!("Created tournament {}", tmnt.id);
            }
            Self::Delete { id } => {
                let count = client.v1().tmnts().delete(id).await?;
                println!("Deleted {} tournament(s)", count);
            }
        }

        Ok(())
    }
}

fn print_full(full: &TmntFull) {
    let tmnt = &full.tmnt;
    println!("{} ({})", tmnt.tmnt_name, tmnt.id);
    println!("{} - {}", tmnt.start_date, tmnt.end_date);

    println!();
    println!("Events:");
    for event in &full.events {
        println!(
            "  {} | {} games | team size {} | entry fee {}",
            event.event_name, event.games, event.team_size, event.entry_fee
        );
    }

    println!("Divisions:");
    for div in &full.divs {
        println!(
            "  {} | {}% of {} | per {}",
            div.div_name,
            div.hdcp_per * 100.0,
            div.hdcp_from,
            div.hdcp_for
        );
    }

    println!("Squads:");
    for squad in &full.squads {
        let stage = full
            .stages
            .iter()
            .find(|stage| stage.squad_id == squad.id)
            .map(|stage| stage.stage.to_string())
            .unwrap_or_else(|| String::from("-"));

        let lanes = full
            .lanes
            .iter()
            .filter(|lane| lane.squad_id == squad.id)
            .count();

        println!(
            "  {} | {} | lanes {}-{} ({} defined) | stage {}",
            squad.squad_name,
            squad.squad_date,
            squad.starting_lane,
            squad.last_lane(),
            lanes,
            stage
        );

        for pot in full.pots.iter().filter(|pot| pot.squad_id == squad.id) {
            println!("    pot {} | fee {}", pot.pot_type, pot.fee);
        }

        for brkt in full.brkts.iter().filter(|brkt| brkt.squad_id == squad.id) {
            println!(
                "    bracket games {}-{} | fee {} | first {} | second {}",
                brkt.start,
                brkt.end(),
                brkt.fee,
                brkt.first,
                brkt.second
            );
        }

        for elim in full.elims.iter().filter(|elim| elim.squad_id == squad.id) {
            println!(
                "    eliminator games {}-{} | fee {}",
                elim.start,
                elim.end(),
                elim.fee
            );
        }
    }
}
