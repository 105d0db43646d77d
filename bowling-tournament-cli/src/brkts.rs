use bowling_tournament_api::id::SquadId;
use bowling_tournament_api::Client;
use clap::Subcommand;

use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the brackets of a squad.
    List {
        #[clap(value_parser)]
        squad: SquadId,
    },
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        match self {
            Self::List { squad } => {
                let brkts = client.v1().brkts().list_for(squad).await?;

                println!("ID | Division | Games | Fee | First | Second | Admin | FSA");
                for brkt in brkts {
                    println!(
                        "{} | {} | {}-{} | {} | {} | {} | {} | {}",
                        brkt.id,
                        brkt.div_id,
                        brkt.start,
                        brkt.end(),
                        brkt.fee,
                        brkt.first,
                        brkt.second,
                        brkt.admin,
                        brkt.fsa()
                    );
                }
            }
        }

        Ok(())
    }
}
