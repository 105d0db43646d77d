//! Table definitions.
//!
//! Rows referencing a parent are deleted together with it (`ON DELETE CASCADE`), so deleting
//! a tournament removes everything below it.

const TABLES: &[(&str, &str)] = &[
    (
        "tmnts",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        user_id VARCHAR(36) NOT NULL,
        bowl_id VARCHAR(36) NOT NULL,
        tmnt_name VARCHAR(100) NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        INDEX (user_id)",
    ),
    (
        "events",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        tmnt_id VARCHAR(36) NOT NULL,
        event_name VARCHAR(20) NOT NULL,
        team_size INT NOT NULL,
        games INT NOT NULL,
        entry_fee BIGINT NOT NULL,
        lineage BIGINT NOT NULL,
        prize_fund BIGINT NOT NULL,
        other BIGINT NOT NULL,
        expenses BIGINT NOT NULL,
        added_money BIGINT NOT NULL,
        sort_order INT NOT NULL,
        FOREIGN KEY (tmnt_id) REFERENCES {prefix}tmnts (id) ON DELETE CASCADE",
    ),
    (
        "divs",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        tmnt_id VARCHAR(36) NOT NULL,
        div_name VARCHAR(20) NOT NULL,
        hdcp_per DOUBLE NOT NULL,
        hdcp_from INT NOT NULL,
        int_hdcp BOOLEAN NOT NULL,
        hdcp_for TINYINT UNSIGNED NOT NULL,
        sort_order INT NOT NULL,
        UNIQUE (tmnt_id, div_name),
        FOREIGN KEY (tmnt_id) REFERENCES {prefix}tmnts (id) ON DELETE CASCADE",
    ),
    (
        "squads",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        event_id VARCHAR(36) NOT NULL,
        squad_name VARCHAR(20) NOT NULL,
        games INT NOT NULL,
        lane_count INT NOT NULL,
        starting_lane INT NOT NULL,
        squad_date DATE NOT NULL,
        squad_time TIME NULL,
        sort_order INT NOT NULL,
        FOREIGN KEY (event_id) REFERENCES {prefix}events (id) ON DELETE CASCADE",
    ),
    (
        "lanes",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        lane_number INT NOT NULL,
        in_use BOOLEAN NOT NULL,
        UNIQUE (squad_id, lane_number),
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE",
    ),
    (
        "players",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        first_name VARCHAR(20) NOT NULL,
        last_name VARCHAR(20) NOT NULL,
        average INT NOT NULL,
        lane INT NOT NULL,
        position CHAR(1) NOT NULL,
        UNIQUE (squad_id, lane, position),
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE",
    ),
    (
        "pots",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        div_id VARCHAR(36) NOT NULL,
        pot_type TINYINT UNSIGNED NOT NULL,
        fee BIGINT NOT NULL,
        sort_order INT NOT NULL,
        UNIQUE (squad_id, div_id, pot_type),
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE,
        FOREIGN KEY (div_id) REFERENCES {prefix}divs (id) ON DELETE CASCADE",
    ),
    (
        "brkts",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        div_id VARCHAR(36) NOT NULL,
        start INT NOT NULL,
        games INT NOT NULL,
        players INT NOT NULL,
        fee BIGINT NOT NULL,
        first BIGINT NOT NULL,
        second BIGINT NOT NULL,
        admin BIGINT NOT NULL,
        sort_order INT NOT NULL,
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE,
        FOREIGN KEY (div_id) REFERENCES {prefix}divs (id) ON DELETE CASCADE",
    ),
    (
        "one_brkts",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        brkt_id VARCHAR(36) NOT NULL,
        bindex INT NOT NULL,
        UNIQUE (brkt_id, bindex),
        FOREIGN KEY (brkt_id) REFERENCES {prefix}brkts (id) ON DELETE CASCADE",
    ),
    (
        "brkt_seeds",
        "one_brkt_id VARCHAR(36) NOT NULL,
        seed INT NOT NULL,
        player_id VARCHAR(36) NOT NULL,
        PRIMARY KEY (one_brkt_id, seed),
        UNIQUE (one_brkt_id, player_id),
        FOREIGN KEY (one_brkt_id) REFERENCES {prefix}one_brkts (id) ON DELETE CASCADE,
        FOREIGN KEY (player_id) REFERENCES {prefix}players (id) ON DELETE CASCADE",
    ),
    (
        "elims",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        div_id VARCHAR(36) NOT NULL,
        start INT NOT NULL,
        games INT NOT NULL,
        fee BIGINT NOT NULL,
        sort_order INT NOT NULL,
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE,
        FOREIGN KEY (div_id) REFERENCES {prefix}divs (id) ON DELETE CASCADE",
    ),
    (
        "div_entries",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        div_id VARCHAR(36) NOT NULL,
        player_id VARCHAR(36) NOT NULL,
        fee BIGINT NOT NULL,
        UNIQUE (div_id, player_id),
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE,
        FOREIGN KEY (div_id) REFERENCES {prefix}divs (id) ON DELETE CASCADE,
        FOREIGN KEY (player_id) REFERENCES {prefix}players (id) ON DELETE CASCADE",
    ),
    (
        "pot_entries",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        pot_id VARCHAR(36) NOT NULL,
        player_id VARCHAR(36) NOT NULL,
        fee BIGINT NOT NULL,
        UNIQUE (pot_id, player_id),
        FOREIGN KEY (pot_id) REFERENCES {prefix}pots (id) ON DELETE CASCADE,
        FOREIGN KEY (player_id) REFERENCES {prefix}players (id) ON DELETE CASCADE",
    ),
    (
        "brkt_entries",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        brkt_id VARCHAR(36) NOT NULL,
        player_id VARCHAR(36) NOT NULL,
        num_brackets INT NOT NULL,
        num_refunds INT NOT NULL,
        fee BIGINT NOT NULL,
        time_stamp DATETIME(3) NOT NULL,
        UNIQUE (brkt_id, player_id),
        FOREIGN KEY (brkt_id) REFERENCES {prefix}brkts (id) ON DELETE CASCADE,
        FOREIGN KEY (player_id) REFERENCES {prefix}players (id) ON DELETE CASCADE",
    ),
    (
        "elim_entries",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        elim_id VARCHAR(36) NOT NULL,
        player_id VARCHAR(36) NOT NULL,
        fee BIGINT NOT NULL,
        UNIQUE (elim_id, player_id),
        FOREIGN KEY (elim_id) REFERENCES {prefix}elims (id) ON DELETE CASCADE,
        FOREIGN KEY (player_id) REFERENCES {prefix}players (id) ON DELETE CASCADE",
    ),
    (
        "stages",
        "id VARCHAR(36) NOT NULL PRIMARY KEY,
        squad_id VARCHAR(36) NOT NULL,
        stage TINYINT UNSIGNED NOT NULL,
        stage_set_at DATETIME(3) NOT NULL,
        scores_started_at DATETIME(3) NULL,
        stage_override_enabled BOOLEAN NOT NULL,
        stage_override_at DATETIME(3) NULL,
        stage_override_reason VARCHAR(200) NULL,
        UNIQUE (squad_id),
        FOREIGN KEY (squad_id) REFERENCES {prefix}squads (id) ON DELETE CASCADE",
    ),
];

/// Returns the `CREATE TABLE` statements for all tables, parents first.
pub fn statements(prefix: &str) -> Vec<String> {
    TABLES
        .iter()
        .map(|(name, columns)| {
            format!(
                "CREATE TABLE IF NOT EXISTS {}{} ({})",
                prefix,
                name,
                columns.replace("{prefix}", prefix)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{statements, TABLES};

    #[test]
    fn test_statements() {
        let stmts = statements("bt_");
        assert_eq!(stmts.len(), TABLES.len());
        assert!(stmts[0].starts_with("CREATE TABLE IF NOT EXISTS bt_tmnts ("));
        assert!(stmts
            .iter()
            .all(|stmt| !stmt.contains("{prefix}") && stmt.ends_with(')')));
        assert!(stmts[1].contains("REFERENCES bt_tmnts (id) ON DELETE CASCADE"));
    }

    #[test]
    fn test_parents_first() {
        // Every referenced table must be created before the table referencing it.
        for (index, (_, columns)) in TABLES.iter().enumerate() {
            for reference in columns.split("REFERENCES {prefix}").skip(1) {
                let parent = reference.split_whitespace().next().unwrap();
                let position = TABLES.iter().position(|(name, _)| *name == parent).unwrap();
                assert!(position < index, "{} referenced before creation", parent);
            }
        }
    }
}
