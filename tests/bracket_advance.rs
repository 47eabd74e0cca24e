//! Integration tests for scoring bracket matches and routing teams onward.

use league_engine::{
    advance_winner, generate_bracket, start_bracket_match, Bracket, BracketMatch, BracketSection,
    BracketTeam, MatchStatus, TournamentError,
};
use proptest::prelude::*;
use uuid::Uuid;

fn entrants(n: u32) -> Vec<BracketTeam> {
    (1..=n)
        .map(|seed| BracketTeam::new(Uuid::new_v4(), format!("Team {seed}"), seed))
        .collect()
}

/// Score a ready match 21-10 for the chosen side.
fn play(bracket: &Bracket, m: &BracketMatch, team1_wins: bool) -> Bracket {
    let t1 = m.team1.team_id().unwrap();
    let t2 = m.team2.team_id().unwrap();
    let (winner, loser, s1, s2) = if team1_wins {
        (t1, t2, 21, 10)
    } else {
        (t2, t1, 10, 21)
    };
    advance_winner(bracket, m.id, winner, loser, s1, s2).unwrap()
}

/// Play ready matches in bracket order until none are left.
fn play_out(mut bracket: Bracket, team1_wins: impl Fn(&BracketMatch) -> bool) -> Bracket {
    for _ in 0..bracket.match_count() {
        let Some(next) = bracket.ready_matches().first().map(|m| (*m).clone()) else {
            break;
        };
        bracket = play(&bracket, &next, team1_wins(&next));
    }
    bracket
}

fn is_grand_final(m: &BracketMatch) -> bool {
    m.section == BracketSection::Finals && m.round == 1
}

#[test]
fn winner_moves_up_and_loser_drops() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let opener = bracket.match_at(BracketSection::Winners, 1, 0).unwrap().clone();
    let next = play(&bracket, &opener, true);

    let played = next.find_match(opener.id).unwrap();
    assert_eq!(played.status, MatchStatus::Completed);
    assert_eq!((played.team1_score, played.team2_score), (21, 10));

    let up = next.match_at(BracketSection::Winners, 2, 0).unwrap();
    assert_eq!(up.team1.team_id(), opener.team1.team_id());
    let down = next.match_at(BracketSection::Losers, 1, 0).unwrap();
    assert_eq!(down.team1.team_id(), opener.team2.team_id());
    assert_eq!(next.loss_count(opener.team2.team_id().unwrap()), 1);
}

#[test]
fn odd_positions_feed_team2() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let m = bracket.match_at(BracketSection::Winners, 1, 1).unwrap().clone();
    let next = play(&bracket, &m, false);
    let up = next.match_at(BracketSection::Winners, 2, 0).unwrap();
    assert_eq!(up.team2.team_id(), m.team2.team_id());
    let down = next.match_at(BracketSection::Losers, 1, 0).unwrap();
    assert_eq!(down.team2.team_id(), m.team1.team_id());
}

#[test]
fn tie_is_rejected_and_bracket_untouched() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let before = bracket.clone();
    let m = bracket.match_at(BracketSection::Winners, 1, 0).unwrap();
    let (t1, t2) = (m.team1.team_id().unwrap(), m.team2.team_id().unwrap());
    assert_eq!(
        advance_winner(&bracket, m.id, t1, t2, 15, 15),
        Err(TournamentError::TiedScore(15))
    );
    assert_eq!(bracket, before);
}

#[test]
fn unknown_match_rejected() {
    let bracket = generate_bracket(&entrants(10)).unwrap();
    let missing = Uuid::new_v4();
    assert_eq!(
        advance_winner(&bracket, missing, Uuid::new_v4(), Uuid::new_v4(), 21, 5),
        Err(TournamentError::MatchNotFound(missing))
    );
}

#[test]
fn completed_match_rejected() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let m = bracket.match_at(BracketSection::Winners, 1, 0).unwrap().clone();
    let next = play(&bracket, &m, true);
    let (t1, t2) = (m.team1.team_id().unwrap(), m.team2.team_id().unwrap());
    assert_eq!(
        advance_winner(&next, m.id, t1, t2, 21, 3),
        Err(TournamentError::MatchAlreadyCompleted(m.id))
    );
}

#[test]
fn bye_match_counts_as_completed() {
    let bracket = generate_bracket(&entrants(10)).unwrap();
    let bye = bracket.match_at(BracketSection::Winners, 1, 0).unwrap();
    assert!(bye.is_bye());
    let winner = bye.winner_id.unwrap();
    assert_eq!(
        advance_winner(&bracket, bye.id, winner, Uuid::new_v4(), 21, 0),
        Err(TournamentError::MatchAlreadyCompleted(bye.id))
    );
}

#[test]
fn match_waiting_on_a_team_rejected() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let gf = bracket.grand_final().unwrap();
    assert_eq!(
        advance_winner(&bracket, gf.id, Uuid::new_v4(), Uuid::new_v4(), 21, 5),
        Err(TournamentError::MatchNotReady(gf.id))
    );
}

#[test]
fn outsider_cannot_win() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let m = bracket.match_at(BracketSection::Winners, 1, 0).unwrap();
    let outsider = Uuid::new_v4();
    let t2 = m.team2.team_id().unwrap();
    assert_eq!(
        advance_winner(&bracket, m.id, outsider, t2, 21, 5),
        Err(TournamentError::TeamNotInMatch(outsider))
    );
}

#[test]
fn winner_needs_the_higher_score() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let m = bracket.match_at(BracketSection::Winners, 1, 0).unwrap();
    let (t1, t2) = (m.team1.team_id().unwrap(), m.team2.team_id().unwrap());
    assert_eq!(
        advance_winner(&bracket, m.id, t1, t2, 12, 21),
        Err(TournamentError::ScoreMismatch {
            winner_score: 12,
            loser_score: 21
        })
    );
}

#[test]
fn losers_bracket_loss_eliminates() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let bracket = (0..4).fold(bracket, |b, p| {
        let m = b.match_at(BracketSection::Winners, 1, p).unwrap().clone();
        play(&b, &m, true)
    });
    let first_losers = bracket.match_at(BracketSection::Losers, 1, 0).unwrap().clone();
    assert!(first_losers.is_ready());
    let next = play(&bracket, &first_losers, true);
    let out = first_losers.team2.team_id().unwrap();
    assert_eq!(next.loss_count(out), 2);
    assert!(next.is_eliminated(out));
    let survivor = first_losers.team1.team_id().unwrap();
    assert!(!next.is_eliminated(survivor));
    let onward = next.match_at(BracketSection::Losers, 2, 0).unwrap();
    assert_eq!(onward.team1.team_id(), Some(survivor));
}

#[test]
fn winners_champion_takes_it_without_reset() {
    for n in [10, 13, 16, 17, 24, 32] {
        let teams = entrants(n);
        let bracket = play_out(generate_bracket(&teams).unwrap(), |_| true);

        let champion = bracket.champion().expect("bracket decided");
        assert_eq!(champion, teams[0].id, "{n} teams");
        assert!(bracket.is_complete());
        let reset = bracket.reset_match().unwrap();
        assert_eq!(reset.status, MatchStatus::Pending);
        assert!(reset.team1.is_empty() && reset.team2.is_empty());

        assert_eq!(bracket.loss_count(champion), 0);
        for team in teams.iter().filter(|t| t.id != champion) {
            assert_eq!(bracket.loss_count(team.id), 2, "{n} teams, {}", team.name);
        }
        let unplayed = bracket.all_matches().filter(|m| !m.is_completed()).count();
        assert_eq!(unplayed, 1);
    }
}

#[test]
fn losers_champion_forces_reset() {
    let bracket = play_out(generate_bracket(&entrants(12)).unwrap(), |m| !is_grand_final(m));
    let gf = bracket.grand_final().unwrap();
    let reset = bracket.reset_match().unwrap();
    assert_eq!(reset.status, MatchStatus::Completed);
    assert_eq!(reset.team1.team_id(), gf.team1.team_id());
    assert_eq!(reset.team2.team_id(), gf.team2.team_id());
    // Winners champion took the reset.
    assert_eq!(bracket.champion(), gf.team1.team_id());
    assert_eq!(bracket.loss_count(gf.team1.team_id().unwrap()), 1);
    assert_eq!(bracket.loss_count(gf.team2.team_id().unwrap()), 2);
}

#[test]
fn losers_champion_can_win_the_reset() {
    let teams = entrants(16);
    let bracket = play_out(generate_bracket(&teams).unwrap(), |m| {
        m.section != BracketSection::Finals
    });
    let gf = bracket.grand_final().unwrap();
    let losers_champ = gf.team2.team_id().unwrap();
    assert_eq!(bracket.champion(), Some(losers_champ));
    assert_eq!(bracket.loss_count(teams[0].id), 2);
    assert!(bracket.all_matches().all(|m| m.is_completed()));
}

#[test]
fn grand_final_not_decided_while_reset_pending() {
    // Losers champion takes game one; stop before the reset is played.
    let mut partial = generate_bracket(&entrants(10)).unwrap();
    while let Some(next) = partial.ready_matches().first().map(|m| (*m).clone()) {
        if next.section == BracketSection::Finals && next.round == 2 {
            break;
        }
        partial = play(&partial, &next, !is_grand_final(&next));
    }
    assert!(partial.reset_match().unwrap().is_ready());
    assert_eq!(partial.champion(), None);
    assert!(!partial.is_complete());
}

#[test]
fn start_marks_in_progress() {
    let bracket = generate_bracket(&entrants(16)).unwrap();
    let m = bracket.match_at(BracketSection::Winners, 1, 0).unwrap();
    let started = start_bracket_match(&bracket, m.id).unwrap();
    assert_eq!(started.find_match(m.id).unwrap().status, MatchStatus::InProgress);

    let gf = bracket.grand_final().unwrap();
    assert_eq!(
        start_bracket_match(&bracket, gf.id),
        Err(TournamentError::MatchNotReady(gf.id))
    );
}

proptest! {
    #[test]
    fn any_sequence_of_results_finishes_with_one_champion(
        n in 10u32..=32,
        picks in prop::collection::vec(any::<bool>(), 64),
    ) {
        let teams = entrants(n);
        let mut bracket = generate_bracket(&teams).unwrap();
        let mut played = 0;
        while let Some(next) = bracket.ready_matches().first().map(|m| (*m).clone()) {
            bracket = play(&bracket, &next, picks[played % picks.len()]);
            played += 1;
            prop_assert!(played <= bracket.match_count());
        }

        let champion = bracket.champion();
        prop_assert!(champion.is_some());
        prop_assert!(bracket.validate().is_ok());
        let alive: Vec<_> = teams.iter().filter(|t| !bracket.is_eliminated(t.id)).collect();
        prop_assert_eq!(alive.len(), 1);
        prop_assert_eq!(Some(alive[0].id), champion);
    }
}
