use bowling_tournament_api::id::TmntId;
use bowling_tournament_api::Client;
use clap::Subcommand;

use crate::Result;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the divisions of a tournament.
    List {
        #[clap(value_parser)]
        tmnt: TmntId,
    },
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<()> {
        match self {
            Self::List { tmnt } => {
                let divs = client.v1().divs().list_for(tmnt).await?;

                println!("ID | Name | Hdcp % | From | Integer | For");
                for div in divs {
                    println!(
                        "{} | {} | {} | {} | {} | {}",
                        div.id,
                        div.div_name,
                        div.hdcp_per * 100.0,
                        div.hdcp_from,
                        div.int_hdcp,
                        div.hdcp_for
                    );
                }
            }
        }

        Ok(())
    }
}
