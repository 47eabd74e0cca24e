//! Bracket advancement: scoring a match and routing both teams onward.

use crate::logic::drop_table::DropTable;
use crate::models::{
    Bracket, BracketMatch, BracketSection, MatchId, MatchStatus, Slot, SlotSide, TeamId,
    TournamentError,
};

/// A slot coordinate in the bracket topology.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotRef {
    pub section: BracketSection,
    pub round: u32,
    pub position: u32,
    pub side: SlotSide,
}

/// Where the winner of `m` goes next. None for finals matches.
pub fn winner_destination(table: &DropTable, m: &BracketMatch) -> Option<SlotRef> {
    let grand_final = |side| SlotRef {
        section: BracketSection::Finals,
        round: 1,
        position: 0,
        side,
    };
    match m.section {
        BracketSection::Winners if m.round < table.winners_round_count() => Some(SlotRef {
            section: BracketSection::Winners,
            round: m.round + 1,
            position: m.position / 2,
            side: SlotSide::from_position(m.position),
        }),
        BracketSection::Winners => Some(grand_final(SlotSide::Team1)),
        BracketSection::Losers if m.round < table.losers_round_count() => {
            // Odd rounds feed the drop round of the same size as team1.
            let (position, side) = if m.round % 2 == 1 {
                (m.position, SlotSide::Team1)
            } else {
                (m.position / 2, SlotSide::from_position(m.position))
            };
            Some(SlotRef {
                section: BracketSection::Losers,
                round: m.round + 1,
                position,
                side,
            })
        }
        BracketSection::Losers => Some(grand_final(SlotSide::Team2)),
        BracketSection::Finals => None,
    }
}

/// Where the loser of `m` goes next. Only winners-bracket losers survive.
pub fn loser_destination(table: &DropTable, m: &BracketMatch) -> Option<SlotRef> {
    if m.section != BracketSection::Winners {
        return None;
    }
    table.destination(m.round, m.position).map(|d| SlotRef {
        section: BracketSection::Losers,
        round: d.losers_round,
        position: d.position,
        side: d.side,
    })
}

/// Record a result and return the advanced bracket.
///
/// The input bracket is never modified: all work happens on a copy that is
/// only returned on success.
pub fn advance_winner(
    bracket: &Bracket,
    match_id: MatchId,
    winner_id: TeamId,
    loser_id: TeamId,
    team1_score: u32,
    team2_score: u32,
) -> Result<Bracket, TournamentError> {
    if team1_score == team2_score {
        return Err(TournamentError::TiedScore(team1_score));
    }
    let table = drop_table(bracket)?;

    let current = bracket
        .find_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if current.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(match_id));
    }
    let (team1_id, team2_id) = match (current.team1.team_id(), current.team2.team_id()) {
        (Some(t1), Some(t2)) => (t1, t2),
        _ => return Err(TournamentError::MatchNotReady(match_id)),
    };
    for id in [winner_id, loser_id] {
        if id != team1_id && id != team2_id {
            return Err(TournamentError::TeamNotInMatch(id));
        }
    }
    if winner_id == loser_id {
        return Err(TournamentError::TeamNotInMatch(loser_id));
    }
    let (winner_score, loser_score) = if winner_id == team1_id {
        (team1_score, team2_score)
    } else {
        (team2_score, team1_score)
    };
    if winner_score < loser_score {
        return Err(TournamentError::ScoreMismatch {
            winner_score,
            loser_score,
        });
    }

    let mut next = bracket.clone();
    let m = find_match_mut(&mut next, match_id)?;
    m.team1_score = team1_score;
    m.team2_score = team2_score;
    m.status = MatchStatus::Completed;
    m.winner_id = Some(winner_id);
    m.loser_id = Some(loser_id);
    let completed = m.clone();

    route_result(&mut next, table, &completed)?;
    resolve_byes(&mut next, table)?;

    log::info!(
        "Match {} completed {}-{}; winner {}",
        completed.match_number,
        team1_score,
        team2_score,
        winner_id
    );
    Ok(next)
}

/// Mark a ready match as in progress.
pub fn start_bracket_match(bracket: &Bracket, match_id: MatchId) -> Result<Bracket, TournamentError> {
    let mut next = bracket.clone();
    let m = find_match_mut(&mut next, match_id)?;
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(match_id));
    }
    if !m.is_ready() {
        return Err(TournamentError::MatchNotReady(match_id));
    }
    m.status = MatchStatus::InProgress;
    Ok(next)
}

fn drop_table(bracket: &Bracket) -> Result<&'static DropTable, TournamentError> {
    DropTable::for_field_size(bracket.field_size).ok_or_else(|| {
        log::error!("No drop table for field size {}", bracket.field_size);
        TournamentError::InconsistentBracket(format!(
            "no drop table for field size {}",
            bracket.field_size
        ))
    })
}

fn find_match_mut(bracket: &mut Bracket, match_id: MatchId) -> Result<&mut BracketMatch, TournamentError> {
    bracket
        .all_matches_mut()
        .find(|m| m.id == match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))
}

/// Move the winner (and a winners-bracket loser) of a scored match onward.
fn route_result(
    bracket: &mut Bracket,
    table: &DropTable,
    completed: &BracketMatch,
) -> Result<(), TournamentError> {
    let winner = team_slot(completed, completed.winner_id)?;
    let loser = team_slot(completed, completed.loser_id)?;

    match completed.section {
        BracketSection::Finals if completed.round == 1 => {
            // The undefeated winners champion always sits in team1.
            if completed.loser_id == completed.team1.team_id() {
                let reset = SlotRef {
                    section: BracketSection::Finals,
                    round: 2,
                    position: 0,
                    side: SlotSide::Team1,
                };
                place(bracket, reset, completed.team1.clone())?;
                place(
                    bracket,
                    SlotRef {
                        side: SlotSide::Team2,
                        ..reset
                    },
                    completed.team2.clone(),
                )?;
                log::info!("Grand final reset activated");
            } else {
                log::info!("Tournament decided in the grand final");
            }
        }
        BracketSection::Finals => log::info!("Tournament decided in the reset match"),
        BracketSection::Winners => {
            place(bracket, required(winner_destination(table, completed), completed)?, winner)?;
            place(bracket, required(loser_destination(table, completed), completed)?, loser)?;
        }
        BracketSection::Losers => {
            place(bracket, required(winner_destination(table, completed), completed)?, winner)?;
            log::debug!(
                "Team {:?} eliminated in match {}",
                completed.loser_id,
                completed.match_number
            );
        }
    }
    Ok(())
}

/// Complete every pending match that has a bye on one or both sides, until
/// none is left. A lone team advances; two byes pass a bye onward.
pub(crate) fn resolve_byes(bracket: &mut Bracket, table: &DropTable) -> Result<(), TournamentError> {
    loop {
        let next_bye = bracket
            .all_matches()
            .filter(|m| m.section != BracketSection::Finals && !m.is_completed())
            .find_map(|m| bye_winner(m).map(|w| (m.id, w)));
        let Some((match_id, advancing)) = next_bye else {
            return Ok(());
        };

        let m = find_match_mut(bracket, match_id)?;
        m.status = MatchStatus::Completed;
        m.winner_id = advancing.team_id();
        m.loser_id = None;
        let resolved = m.clone();

        place(bracket, required(winner_destination(table, &resolved), &resolved)?, advancing)?;
        if resolved.section == BracketSection::Winners {
            place(
                bracket,
                required(loser_destination(table, &resolved), &resolved)?,
                Slot::Bye,
            )?;
        }
        log::debug!("Match {} resolved by bye", resolved.match_number);
    }
}

fn bye_winner(m: &BracketMatch) -> Option<Slot> {
    match (&m.team1, &m.team2) {
        (Slot::Scheduled(t), Slot::Bye) | (Slot::Bye, Slot::Scheduled(t)) => {
            Some(Slot::Scheduled(t.clone()))
        }
        (Slot::Bye, Slot::Bye) => Some(Slot::Bye),
        _ => None,
    }
}

fn team_slot(m: &BracketMatch, team_id: Option<TeamId>) -> Result<Slot, TournamentError> {
    [&m.team1, &m.team2]
        .into_iter()
        .find(|s| s.team_id().is_some() && s.team_id() == team_id)
        .cloned()
        .ok_or_else(|| {
            TournamentError::InconsistentBracket(format!(
                "match {} result names a team not in the match",
                m.match_number
            ))
        })
}

fn required(dest: Option<SlotRef>, from: &BracketMatch) -> Result<SlotRef, TournamentError> {
    dest.ok_or_else(|| {
        log::error!("No destination for match {}", from.match_number);
        TournamentError::InconsistentBracket(format!(
            "no destination for match {}",
            from.match_number
        ))
    })
}

fn place(bracket: &mut Bracket, dest: SlotRef, value: Slot) -> Result<(), TournamentError> {
    let target = bracket
        .match_at_mut(dest.section, dest.round, dest.position)
        .ok_or_else(|| {
            log::error!("Destination {:?} is outside the bracket", dest);
            TournamentError::InconsistentBracket(format!("destination {dest:?} is outside the bracket"))
        })?;
    let match_number = target.match_number;
    let slot = target.slot_mut(dest.side);
    if !slot.is_empty() {
        log::error!("Destination slot of match {match_number} is already filled");
        return Err(TournamentError::InconsistentBracket(format!(
            "slot {:?} of match {match_number} is already filled",
            dest.side
        )));
    }
    *slot = value;
    Ok(())
}
