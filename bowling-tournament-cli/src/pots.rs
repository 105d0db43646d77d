use bowling_tournament_api::id::SquadId;
use bowling_tournament_api::Client;
use clap::Subcommand;

use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the pots of a squad.
    List {
        #[clap(value_parser)]
        squad: SquadId,
    },
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        match self {
            Self::List { squad } => {
                let pots = client.v1().pots().list_for(squad).await?;

                println!("ID | Division | Type | Fee");
                for pot in pots {
                    println!("{} | {} | {} | {}", pot.id, pot.div_id, pot.pot_type, pot.fee);
                }
            }
        }

        Ok(())
    }
}
