//! Integration tests for player registration and CSV roster import.

use league_engine::logic::validate_player_name;
use league_engine::{import_players_csv, Player, TournamentError};

#[test]
fn names_are_trimmed_and_unique() {
    let existing = vec![Player::new("Ann Smith")];
    assert_eq!(validate_player_name("  Bob  ", &existing), Ok("Bob"));
    assert_eq!(
        validate_player_name("ann smith", &existing),
        Err(TournamentError::DuplicatePlayerName)
    );
    assert_eq!(
        validate_player_name("   ", &existing),
        Err(TournamentError::BlankPlayerName)
    );
}

#[test]
fn import_reads_names_and_classes() {
    let csv = "name,class\nAnn, A\n Bob ,\nCara,B\n";
    let players = import_players_csv(csv.as_bytes(), &[]).unwrap();
    let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bob", "Cara"]);
    assert_eq!(players[0].class.as_deref(), Some("A"));
    assert_eq!(players[1].class, None);
    assert!(players.iter().all(|p| p.custom_season_points.is_none()));
}

#[test]
fn class_column_is_optional() {
    let players = import_players_csv("name\nDee\nEd\n".as_bytes(), &[]).unwrap();
    assert_eq!(players.len(), 2);
    assert!(players.iter().all(|p| p.class.is_none()));
}

#[test]
fn duplicates_reject_the_whole_file() {
    let existing = vec![Player::new("Ann")];
    assert_eq!(
        import_players_csv("name\nBob\nANN\n".as_bytes(), &existing),
        Err(TournamentError::DuplicatePlayerName)
    );
    assert_eq!(
        import_players_csv("name\nBob\nbob\n".as_bytes(), &[]),
        Err(TournamentError::DuplicatePlayerName)
    );
}

#[test]
fn blank_name_rejected() {
    assert_eq!(
        import_players_csv("name,class\n ,A\n".as_bytes(), &[]),
        Err(TournamentError::BlankPlayerName)
    );
}

#[test]
fn missing_name_column_is_an_import_error() {
    assert!(matches!(
        import_players_csv("player,class\nAnn,A\n".as_bytes(), &[]),
        Err(TournamentError::RosterImport(_))
    ));
}
