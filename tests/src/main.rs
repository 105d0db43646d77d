//! Runs a full tournament setup against a live server:
//!
//! `cargo run -p tests -- http://localhost:3000`
//!
//! The server must use an empty database. Everything created is deleted again at the end.

use bowling_tournament_api::id::{
    BowlId, BrktEntryId, BrktId, DivEntryId, DivId, ElimEntryId, ElimId, EventId, OneBrktId,
    PlayerId, PotEntryId, PotId, SquadId, StageId, TmntId, UserId,
};
use bowling_tournament_api::v1::brkts::{Brkt, BrktSeed, OneBrkt, BRKT_GAMES, BRKT_PLAYERS};
use bowling_tournament_api::v1::divs::{Div, HdcpFor};
use bowling_tournament_api::v1::elims::Elim;
use bowling_tournament_api::v1::entries::{BrktEntry, DivEntry, ElimEntry, PotEntry};
use bowling_tournament_api::v1::events::Event;
use bowling_tournament_api::v1::players::Player;
use bowling_tournament_api::v1::pots::{Pot, PotType};
use bowling_tournament_api::v1::squads::Squad;
use bowling_tournament_api::v1::stages::{Stage, StageKind};
use bowling_tournament_api::v1::tmnts::Tmnt;
use bowling_tournament_api::{Client, Error, Money};
use chrono::{NaiveDate, Utc};

#[tokio::main]
async fn main() {
    let uri = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("http://localhost:3000"));

    let client = Client::new(uri);

    let tmnt = test_tmnt(&client).await;
    let (squad, div) = test_define(&client, &tmnt).await;
    let players = test_players(&client, &squad).await;
    test_entries(&client, &squad, &div, &players).await;
    test_stages(&client, &squad).await;
    test_cascade(&client, &tmnt, &squad).await;

    println!("All tests passed");
}

async fn test_tmnt(client: &Client) -> Tmnt {
    let tmnt = Tmnt {
        id: TmntId::generate(),
        user_id: UserId::generate(),
        bowl_id: BowlId::generate(),
        tmnt_name: "  Fall   Classic ".into(),
        start_date: date(2026, 10, 17),
        end_date: date(2026, 10, 18),
    };

    let resp = client.v1().tmnts().create(&tmnt).await.unwrap();
    assert_eq!(resp.tmnt_name, "Fall Classic");
    assert_eq!(resp.start_date, tmnt.start_date);

    let tmnts = client.v1().tmnts().list().await.unwrap();
    assert!(tmnts.iter().any(|t| t.id == tmnt.id));

    let mut updated = resp.clone();
    updated.tmnt_name = "Fall Classic 2026".into();
    client.v1().tmnts().update(&updated).await.unwrap();

    let resp = client.v1().tmnts().get(&tmnt.id).await.unwrap();
    assert_eq!(resp.tmnt_name, "Fall Classic 2026");

    // Ends before it starts.
    let mut invalid = resp.clone();
    invalid.end_date = date(2026, 10, 16);
    match client.v1().tmnts().update(&invalid).await {
        Err(Error::Validation(err)) => assert_eq!(err.field, "end_date"),
        res => panic!("invalid tournament was accepted: {:?}", res),
    }

    resp
}

async fn test_define(client: &Client, tmnt: &Tmnt) -> (Squad, Div) {
    let event = Event {
        id: EventId::generate(),
        tmnt_id: tmnt.id.clone(),
        event_name: "Singles".into(),
        team_size: 1,
        games: 6,
        entry_fee: cents(8000),
        lineage: cents(1800),
        prize_fund: cents(5500),
        other: cents(200),
        expenses: cents(500),
        added_money: Money::ZERO,
        sort_order: 1,
    };
    client.v1().events().create(&event).await.unwrap();

    let divs = vec![
        Div {
            id: DivId::generate(),
            tmnt_id: tmnt.id.clone(),
            div_name: "Scratch".into(),
            hdcp_per: 0.0,
            hdcp_from: 230,
            int_hdcp: true,
            hdcp_for: HdcpFor::Game,
            sort_order: 1,
        },
        Div {
            id: DivId::generate(),
            tmnt_id: tmnt.id.clone(),
            div_name: "Handicap".into(),
            hdcp_per: 0.9,
            hdcp_from: 230,
            int_hdcp: true,
            hdcp_for: HdcpFor::Game,
            sort_order: 2,
        },
    ];
    let count = client.v1().divs().replace_for(&tmnt.id, &divs).await.unwrap();
    assert_eq!(count, 2);

    // Division names are unique per tournament.
    let mut duplicate = divs.clone();
    duplicate[1].div_name = "scratch".into();
    assert!(matches!(
        client.v1().divs().replace_for(&tmnt.id, &duplicate).await,
        Err(Error::Validation(_))
    ));

    let squad = Squad {
        id: SquadId::generate(),
        event_id: event.id.clone(),
        squad_name: "Squad 1".into(),
        games: 6,
        lane_count: 12,
        starting_lane: 29,
        squad_date: tmnt.start_date,
        squad_time: None,
        sort_order: 1,
    };
    client.v1().squads().create(&squad).await.unwrap();

    let lanes = squad.lanes();
    let count = client
        .v1()
        .lanes()
        .replace_for(&squad.id, &lanes)
        .await
        .unwrap();
    assert_eq!(count, 12);

    // Replacing again keeps only the new rows.
    let count = client
        .v1()
        .lanes()
        .replace_for(&squad.id, &lanes[..4])
        .await
        .unwrap();
    assert_eq!(count, 4);
    let stored = client.v1().lanes().list_for(&squad.id).await.unwrap();
    assert_eq!(
        stored.iter().map(|lane| lane.lane_number).collect::<Vec<_>>(),
        vec![29, 30, 31, 32]
    );

    let hdcp = &divs[1];
    let pots = [PotType::Game, PotType::LastGame, PotType::Series]
        .into_iter()
        .enumerate()
        .map(|(index, pot_type)| Pot {
            id: PotId::generate(),
            squad_id: squad.id.clone(),
            div_id: hdcp.id.clone(),
            pot_type,
            fee: cents(2000),
            sort_order: index as i32 + 1,
        })
        .collect::<Vec<_>>();
    assert_eq!(
        client.v1().pots().create_many(&pots).await.unwrap(),
        3
    );

    let brkt = Brkt {
        id: BrktId::generate(),
        squad_id: squad.id.clone(),
        div_id: hdcp.id.clone(),
        start: 1,
        games: BRKT_GAMES,
        players: BRKT_PLAYERS,
        fee: cents(500),
        first: cents(2500),
        second: cents(1000),
        admin: cents(500),
        sort_order: 1,
    };
    client.v1().brkts().create(&brkt).await.unwrap();

    let elim = Elim {
        id: ElimId::generate(),
        squad_id: squad.id.clone(),
        div_id: hdcp.id.clone(),
        start: 4,
        games: 3,
        fee: cents(500),
        sort_order: 1,
    };
    client.v1().elims().create(&elim).await.unwrap();

    let full = client.v1().tmnts().full(&tmnt.id).await.unwrap();
    assert_eq!(full.tmnt.id, tmnt.id);
    assert_eq!(full.events.len(), 1);
    assert_eq!(full.divs.len(), 2);
    assert_eq!(full.squads.len(), 1);
    assert_eq!(full.lanes.len(), 4);
    assert_eq!(full.pots.len(), 3);
    assert_eq!(full.brkts, vec![brkt]);
    assert_eq!(full.elims, vec![elim]);

    (squad, hdcp.clone())
}

async fn test_players(client: &Client, squad: &Squad) -> Vec<Player> {
    let players = (0..BRKT_PLAYERS)
        .map(|index| Player {
            id: PlayerId::generate(),
            squad_id: squad.id.clone(),
            first_name: format!("Player{}", index),
            last_name: "Test".into(),
            average: 150 + index * 10,
            lane: squad.starting_lane + index / 4,
            position: char::from(b'a' + (index % 4) as u8).to_string(),
        })
        .collect::<Vec<_>>();

    let count = client
        .v1()
        .players()
        .replace_for(&squad.id, &players)
        .await
        .unwrap();
    assert_eq!(count, players.len() as u64);

    let stored = client.v1().players().list_for(&squad.id).await.unwrap();
    assert_eq!(stored.len(), players.len());
    // Positions are stored uppercase.
    assert_eq!(stored[0].position, "A");

    stored
}

async fn test_entries(client: &Client, squad: &Squad, div: &Div, players: &[Player]) {
    let div_entries = players
        .iter()
        .map(|player| DivEntry {
            id: DivEntryId::generate(),
            squad_id: squad.id.clone(),
            div_id: div.id.clone(),
            player_id: player.id.clone(),
            fee: cents(8000),
        })
        .collect::<Vec<_>>();
    assert_eq!(
        client
            .v1()
            .div_entries()
            .replace_for(&squad.id, &div_entries)
            .await
            .unwrap(),
        players.len() as u64
    );

    let pots = client.v1().pots().list_for(&squad.id).await.unwrap();
    let pot_entries = players
        .iter()
        .map(|player| PotEntry {
            id: PotEntryId::generate(),
            pot_id: pots[0].id.clone(),
            player_id: player.id.clone(),
            fee: pots[0].fee,
        })
        .collect::<Vec<_>>();
    client
        .v1()
        .pot_entries()
        .replace_for(&pots[0].id, &pot_entries)
        .await
        .unwrap();

    let brkts = client.v1().brkts().list_for(&squad.id).await.unwrap();
    let brkt = &brkts[0];

    let brkt_entries = players
        .iter()
        .map(|player| BrktEntry {
            id: BrktEntryId::generate(),
            brkt_id: brkt.id.clone(),
            player_id: player.id.clone(),
            num_brackets: 2,
            num_refunds: 0,
            fee: brkt.fee * 2,
            time_stamp: Utc::now(),
        })
        .collect::<Vec<_>>();
    client
        .v1()
        .brkt_entries()
        .replace_for(&brkt.id, &brkt_entries)
        .await
        .unwrap();

    let one_brkts = (0..2)
        .map(|bindex| OneBrkt {
            id: OneBrktId::generate(),
            brkt_id: brkt.id.clone(),
            bindex,
        })
        .collect::<Vec<_>>();
    client
        .v1()
        .one_brkts()
        .replace_for(&brkt.id, &one_brkts)
        .await
        .unwrap();

    for one_brkt in &one_brkts {
        let seeds = players
            .iter()
            .enumerate()
            .map(|(seed, player)| BrktSeed {
                one_brkt_id: one_brkt.id.clone(),
                seed: seed as i32,
                player_id: player.id.clone(),
            })
            .collect::<Vec<_>>();

        let count = client
            .v1()
            .brkt_seeds()
            .replace_for(&one_brkt.id, &seeds)
            .await
            .unwrap();
        assert_eq!(count, u64::from(BRKT_PLAYERS as u32));
    }

    // A seed for another sheet must not be written under this one.
    let foreign = BrktSeed {
        one_brkt_id: one_brkts[1].id.clone(),
        seed: 0,
        player_id: players[0].id.clone(),
    };
    assert!(matches!(
        client
            .v1()
            .brkt_seeds()
            .replace_for(&one_brkts[0].id, &[foreign])
            .await,
        Err(Error::Validation(_))
    ));

    let elims = client.v1().elims().list_for(&squad.id).await.unwrap();
    let elim_entries = players[..4]
        .iter()
        .map(|player| ElimEntry {
            id: ElimEntryId::generate(),
            elim_id: elims[0].id.clone(),
            player_id: player.id.clone(),
            fee: elims[0].fee,
        })
        .collect::<Vec<_>>();
    client
        .v1()
        .elim_entries()
        .create_many(&elim_entries)
        .await
        .unwrap();

    assert_eq!(
        client
            .v1()
            .elim_entries()
            .delete_for(&elims[0].id)
            .await
            .unwrap(),
        4
    );
}

async fn test_stages(client: &Client, squad: &Squad) {
    let stages = client.v1().stages();

    let stage = Stage::new(StageId::generate(), squad.id.clone(), Utc::now());
    stages.create(&stage).await.unwrap();

    let stage = stages.get(&squad.id).await.unwrap();
    assert_eq!(stage.stage, StageKind::Define);

    // Skipping a stage requires the override.
    match stages.advance(&squad.id, StageKind::Scores).await {
        Err(Error::Status { status, message }) => {
            assert_eq!(status.as_u16(), 409);
            assert!(message.contains("without override"), "{}", message);
        }
        res => panic!("skipped ENTRIES: {:?}", res),
    }

    let stage = stages.advance(&squad.id, StageKind::Entries).await.unwrap();
    assert_eq!(stage.stage, StageKind::Entries);

    let stage = stages.advance(&squad.id, StageKind::Scores).await.unwrap();
    assert_eq!(stage.stage, StageKind::Scores);
    assert!(stage.scores_started_at.is_some());

    let stage = stages
        .set_override(&squad.id, "Score correction")
        .await
        .unwrap();
    assert!(stage.stage_override_enabled);
    assert_eq!(
        stage.stage_override_reason.as_deref(),
        Some("Score correction")
    );

    let stage = stages.advance(&squad.id, StageKind::Define).await.unwrap();
    assert_eq!(stage.stage, StageKind::Define);
    assert_eq!(stage.scores_started_at, None);

    let stage = stages.clear_override(&squad.id).await.unwrap();
    assert!(!stage.stage_override_enabled);
    assert_eq!(stage.stage_override_reason, None);

    match stages.advance(&squad.id, StageKind::Scores).await {
        Err(Error::Status { status, .. }) => assert_eq!(status.as_u16(), 409),
        res => panic!("skipped ENTRIES after clearing the override: {:?}", res),
    }
}

async fn test_cascade(client: &Client, tmnt: &Tmnt, squad: &Squad) {
    assert_eq!(client.v1().tmnts().delete(&tmnt.id).await.unwrap(), 1);

    assert!(matches!(
        client.v1().tmnts().full(&tmnt.id).await,
        Err(Error::NotFound)
    ));
    assert!(matches!(
        client.v1().squads().get(&squad.id).await,
        Err(Error::NotFound)
    ));
    assert!(client
        .v1()
        .players()
        .list_for(&squad.id)
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        client.v1().stages().get(&squad.id).await,
        Err(Error::NotFound)
    ));
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn cents(cents: i64) -> Money {
    Money::from_cents(cents)
}
