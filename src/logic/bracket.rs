//! Double-elimination bracket generation.

use crate::logic::advance::resolve_byes;
use crate::logic::drop_table::{field_size_for, DropTable, MIN_BRACKET_TEAMS};
use crate::models::{
    Bracket, BracketMatch, BracketSection, BracketTeam, Round, Slot, TournamentError,
};
use std::collections::HashSet;

/// Build a fully wired bracket for at least 10 seeded teams.
///
/// 1. Rank teams by `seed` (stable) and round the count up to a supported field size.
/// 2. Pair round 1 in standard seed order (seed `s` meets `field_size + 1 - s`);
///    missing seeds are byes and resolve immediately.
/// 3. Lay out the losers rounds and the two finals rounds with empty slots.
/// 4. Number every match 1..=N: winners, then losers, then finals.
pub fn generate_bracket(teams: &[BracketTeam]) -> Result<Bracket, TournamentError> {
    if teams.len() < MIN_BRACKET_TEAMS {
        return Err(TournamentError::NotEnoughTeams {
            required: MIN_BRACKET_TEAMS,
            actual: teams.len(),
        });
    }
    let field_size =
        field_size_for(teams.len()).ok_or(TournamentError::UnsupportedTeamCount(teams.len()))?;
    let table = DropTable::for_field_size(field_size).ok_or_else(|| {
        TournamentError::InconsistentBracket(format!("no drop table for field size {field_size}"))
    })?;

    let mut seen = HashSet::with_capacity(teams.len());
    if let Some(dup) = teams.iter().find(|t| !seen.insert(t.id)) {
        return Err(TournamentError::DuplicateTeam(dup.id));
    }

    let mut ranked = teams.to_vec();
    ranked.sort_by_key(|t| t.seed);

    let order = seed_order(field_size);
    let slot_for_seed = |seed: u32| match ranked.get(seed as usize - 1) {
        Some(team) => Slot::Scheduled(team.clone()),
        None => Slot::Bye,
    };

    let mut match_number = 0u32;
    let mut next_match = |section: BracketSection, round: u32, position: u32| {
        match_number += 1;
        BracketMatch::new(match_number, section, round, position)
    };

    let winners_rounds_total = table.winners_round_count();
    let mut winners_rounds = Vec::with_capacity(winners_rounds_total as usize);
    for round in 1..=winners_rounds_total {
        let matches = (0..table.winners_matches_in_round(round))
            .map(|position| {
                let mut m = next_match(BracketSection::Winners, round, position);
                if round == 1 {
                    let p = position as usize * 2;
                    m.team1 = slot_for_seed(order[p]);
                    m.team2 = slot_for_seed(order[p + 1]);
                }
                m
            })
            .collect();
        let name = if round == winners_rounds_total {
            "Winners Final".to_string()
        } else {
            format!("Winners Round {round}")
        };
        winners_rounds.push(Round {
            number: round,
            name,
            matches,
        });
    }

    let losers_rounds_total = table.losers_round_count();
    let mut losers_rounds = Vec::with_capacity(losers_rounds_total as usize);
    for round in 1..=losers_rounds_total {
        let matches = (0..table.losers_matches_in_round(round))
            .map(|position| next_match(BracketSection::Losers, round, position))
            .collect();
        let name = if round == losers_rounds_total {
            "Losers Final".to_string()
        } else {
            format!("Losers Round {round}")
        };
        losers_rounds.push(Round {
            number: round,
            name,
            matches,
        });
    }

    let finals_rounds = vec![
        Round {
            number: 1,
            name: "Grand Final".to_string(),
            matches: vec![next_match(BracketSection::Finals, 1, 0)],
        },
        Round {
            number: 2,
            name: "Grand Final Reset".to_string(),
            matches: vec![next_match(BracketSection::Finals, 2, 0)],
        },
    ];

    let mut bracket = Bracket {
        field_size,
        winners_rounds,
        losers_rounds,
        finals_rounds,
    };
    resolve_byes(&mut bracket, table)?;
    bracket.validate()?;

    log::debug!(
        "Generated bracket: {} teams, field of {}, {} matches",
        teams.len(),
        field_size,
        bracket.match_count()
    );
    Ok(bracket)
}

/// Rebuild a bracket from scratch with the same teams (reset / reseed).
pub fn regenerate_bracket(bracket: &Bracket) -> Result<Bracket, TournamentError> {
    generate_bracket(&bracket.teams())
}

/// Standard bracket order of seeds for a power-of-two field: consecutive
/// entries meet in round 1, and seeds 1 and 2 can only meet in the final.
pub fn seed_order(field_size: u32) -> Vec<u32> {
    let mut order = vec![1u32];
    while (order.len() as u32) < field_size {
        let n = order.len() as u32 * 2;
        order = order.iter().flat_map(|&s| [s, n + 1 - s]).collect();
    }
    order
}
