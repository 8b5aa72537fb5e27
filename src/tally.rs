//! Derived election results.
//!
//! Totals are computed fresh from the full candidate and ballot collections
//! on every call; no vote counter is ever stored on a candidate record, so
//! the output can always be audited against the ballots. The computation is
//! a pure, bounded pass over its inputs: it never touches the database and
//! may run concurrently with submissions or with itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::Position,
    db::{ballot::Ballot, candidate::Candidate},
};

/// A candidate's derived vote count within their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStanding {
    pub name: String,
    pub party_list: String,
    pub votes: u64,
}

/// The ranked candidates for one position.
///
/// Ties are not broken: the sort is stable, so equal counts keep the
/// candidates' registration order. The winner is simply the first entry,
/// even when every entrant has zero votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionStandings {
    pub position: Position,
    pub label: String,
    pub standings: Vec<CandidateStanding>,
    pub winner: CandidateStanding,
}

/// Votes gathered by one party list across all its candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTotals {
    pub name: String,
    pub votes: u64,
    pub candidates: u64,
}

/// Votes gathered across one position's candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTotals {
    pub position: Position,
    pub label: String,
    pub votes: u64,
    pub candidates: u64,
}

/// The full election report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Ranked standings per position, in ballot-paper order. Positions with
    /// no registered candidates are absent.
    pub positions: Vec<PositionStandings>,
    /// Per-party aggregates, sorted descending by total votes.
    pub parties: Vec<PartyTotals>,
    /// Per-position aggregates, sorted descending by total votes.
    pub position_totals: Vec<PositionTotals>,
    /// Sum of every candidate's count, i.e. of every selection that matched
    /// a registered candidate.
    pub total_votes: u64,
    pub ballots_cast: u64,
    pub registered_students: u64,
    /// Ballots cast over registered students, rounded half-up to the
    /// nearest whole percent. Zero when no students are registered.
    pub turnout_percent: u32,
}

/// Compute the current results from scratch.
///
/// Every `(name, position)` pair in `candidates` starts at zero; each ballot
/// selection naming a registered candidate for that position scores exactly
/// one. Selections that match nothing (a candidate renamed or deleted after
/// the ballot was cast) are skipped silently.
pub fn compute_tally(
    candidates: &[Candidate],
    ballots: &[Ballot],
    registered_students: u64,
) -> Tally {
    // Counters, aligned with the candidates' order.
    let mut votes = vec![0_u64; candidates.len()];
    let index: HashMap<(Position, &str), usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| ((candidate.position, candidate.name.as_str()), i))
        .collect();

    for ballot in ballots {
        for (&position, name) in &ballot.selections {
            if let Some(&i) = index.get(&(position, name.as_str())) {
                votes[i] += 1;
            }
        }
    }

    let standing = |i: usize| CandidateStanding {
        name: candidates[i].name.clone(),
        party_list: candidates[i].party_list.clone(),
        votes: votes[i],
    };

    // Ranked standings per position. `sort_by` is stable, so ties keep
    // registration order.
    let mut positions = Vec::new();
    for position in Position::ALL {
        let mut standings: Vec<CandidateStanding> = (0..candidates.len())
            .filter(|&i| candidates[i].position == position)
            .map(standing)
            .collect();
        if standings.is_empty() {
            continue;
        }
        standings.sort_by(|a, b| b.votes.cmp(&a.votes));
        let winner = standings[0].clone();
        positions.push(PositionStandings {
            position,
            label: position.label().to_string(),
            standings,
            winner,
        });
    }

    // Party aggregates, keyed by first appearance.
    let mut parties: Vec<PartyTotals> = Vec::new();
    let mut party_index: HashMap<&str, usize> = HashMap::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let entry = *party_index
            .entry(candidate.party_list.as_str())
            .or_insert_with(|| {
                parties.push(PartyTotals {
                    name: candidate.party_list.clone(),
                    votes: 0,
                    candidates: 0,
                });
                parties.len() - 1
            });
        parties[entry].votes += votes[i];
        parties[entry].candidates += 1;
    }
    parties.sort_by(|a, b| b.votes.cmp(&a.votes));

    // Position aggregates, derived from the already-grouped standings.
    let mut position_totals: Vec<PositionTotals> = positions
        .iter()
        .map(|group| PositionTotals {
            position: group.position,
            label: group.label.clone(),
            votes: group.standings.iter().map(|s| s.votes).sum(),
            candidates: group.standings.len() as u64,
        })
        .collect();
    position_totals.sort_by(|a, b| b.votes.cmp(&a.votes));

    let total_votes = votes.iter().sum();
    let ballots_cast = ballots.len() as u64;
    let turnout_percent = if registered_students == 0 {
        0
    } else {
        // Round half-up; both operands are non-negative so `round` agrees.
        (ballots_cast as f64 / registered_students as f64 * 100.0).round() as u32
    };

    Tally {
        positions,
        parties,
        position_totals,
        total_votes,
        ballots_cast,
        registered_students,
        turnout_percent,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;
    use crate::model::{
        db::{ballot::BallotCore, candidate::CandidateCore},
        mongodb::Id,
    };

    fn candidate(name: &str, position: Position, party: &str) -> Candidate {
        Candidate {
            id: Id::new(),
            candidate: CandidateCore {
                school_id: format!("sid-{name}"),
                name: name.to_string(),
                position,
                party_list: party.to_string(),
            },
        }
    }

    fn ballot(school_id: &str, selections: &[(Position, &str)]) -> Ballot {
        Ballot {
            id: Id::new(),
            ballot: BallotCore {
                student_school_id: school_id.to_string(),
                student_name: format!("Student {school_id}"),
                selections: selections
                    .iter()
                    .map(|&(position, name)| (position, name.to_string()))
                    .collect(),
                submitted_at: Utc::now(),
            },
        }
    }

    fn president_group(tally: &Tally) -> &PositionStandings {
        tally
            .positions
            .iter()
            .find(|group| group.position == Position::President)
            .expect("president standings present")
    }

    /// Three registered students, two presidential candidates, two ballots
    /// for A, one abstainer.
    #[test]
    fn two_votes_one_abstainer() {
        let candidates = vec![
            candidate("A", Position::President, "Unity Party"),
            candidate("B", Position::President, "Progress Party"),
        ];
        let ballots = vec![
            ballot("s1", &[(Position::President, "A")]),
            ballot("s2", &[(Position::President, "A")]),
        ];

        let tally = compute_tally(&candidates, &ballots, 3);

        let president = president_group(&tally);
        assert_eq!(president.standings.len(), 2);
        assert_eq!(president.standings[0].name, "A");
        assert_eq!(president.standings[0].votes, 2);
        assert_eq!(president.standings[1].name, "B");
        assert_eq!(president.standings[1].votes, 0);
        assert_eq!(president.winner.name, "A");
        assert_eq!(tally.total_votes, 2);
        assert_eq!(tally.ballots_cast, 2);
        assert_eq!(tally.turnout_percent, 67);
    }

    #[test]
    fn zero_vote_position_still_has_winner() {
        let candidates = vec![
            candidate("A", Position::Treasurer, "Unity Party"),
            candidate("B", Position::Treasurer, "Progress Party"),
        ];

        let tally = compute_tally(&candidates, &[], 10);

        let treasurer = &tally.positions[0];
        assert_eq!(treasurer.position, Position::Treasurer);
        // Registration order preserved at zero votes; first in wins.
        assert_eq!(treasurer.winner.name, "A");
        assert_eq!(treasurer.winner.votes, 0);
    }

    #[test]
    fn ties_keep_registration_order() {
        let candidates = vec![
            candidate("Zed", Position::Secretary, "Unity Party"),
            candidate("Amy", Position::Secretary, "Progress Party"),
            candidate("Mia", Position::Secretary, "Unity Party"),
        ];
        let ballots = vec![
            ballot("s1", &[(Position::Secretary, "Zed")]),
            ballot("s2", &[(Position::Secretary, "Mia")]),
            ballot("s3", &[(Position::Secretary, "Amy")]),
        ];

        let tally = compute_tally(&candidates, &ballots, 3);

        let names: Vec<&str> = tally.positions[0]
            .standings
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zed", "Amy", "Mia"]);
    }

    #[test]
    fn stale_selection_is_skipped() {
        let candidates = vec![candidate("A", Position::President, "Unity Party")];
        let ballots = vec![
            ballot("s1", &[(Position::President, "Renamed Candidate")]),
            // Right name, wrong position.
            ballot("s2", &[(Position::Treasurer, "A")]),
            ballot("s3", &[(Position::President, "A")]),
        ];

        let tally = compute_tally(&candidates, &ballots, 3);

        assert_eq!(tally.total_votes, 1);
        assert_eq!(president_group(&tally).standings[0].votes, 1);
        // Every ballot still counts towards turnout.
        assert_eq!(tally.ballots_cast, 3);
        assert_eq!(tally.turnout_percent, 100);
    }

    #[test]
    fn turnout_is_zero_without_registered_students() {
        let candidates = vec![candidate("A", Position::President, "Unity Party")];
        let ballots = vec![ballot("s1", &[(Position::President, "A")])];

        let tally = compute_tally(&candidates, &ballots, 0);

        assert_eq!(tally.turnout_percent, 0);
        assert_eq!(tally.ballots_cast, 1);
    }

    #[test]
    fn turnout_rounds_half_up() {
        let candidates = vec![];
        let ballots = vec![
            ballot("s1", &[]),
            ballot("s2", &[]),
            ballot("s3", &[]),
        ];
        // 3/8 = 37.5% rounds up to 38%.
        let tally = compute_tally(&candidates, &ballots, 8);
        assert_eq!(tally.turnout_percent, 38);
    }

    #[test]
    fn per_position_sums_match_matching_ballots() {
        let candidates = vec![
            candidate("A", Position::President, "Unity Party"),
            candidate("B", Position::President, "Progress Party"),
            candidate("C", Position::Auditor, "Unity Party"),
        ];
        let ballots = vec![
            ballot("s1", &[(Position::President, "A"), (Position::Auditor, "C")]),
            ballot("s2", &[(Position::President, "B")]),
            ballot("s3", &[(Position::Auditor, "C")]),
            ballot("s4", &[]),
        ];

        let tally = compute_tally(&candidates, &ballots, 4);

        for group in &tally.positions {
            let matching = ballots
                .iter()
                .filter(|b| {
                    b.selections.get(&group.position).map_or(false, |name| {
                        group.standings.iter().any(|s| &s.name == name)
                    })
                })
                .count() as u64;
            let sum: u64 = group.standings.iter().map(|s| s.votes).sum();
            assert_eq!(sum, matching);
        }
    }

    #[test]
    fn party_and_position_aggregates() {
        let candidates = vec![
            candidate("A", Position::President, "Unity Party"),
            candidate("B", Position::President, "Progress Party"),
            candidate("C", Position::Treasurer, "Unity Party"),
        ];
        let ballots = vec![
            ballot("s1", &[(Position::President, "B"), (Position::Treasurer, "C")]),
            ballot("s2", &[(Position::President, "B")]),
        ];

        let tally = compute_tally(&candidates, &ballots, 2);

        assert_eq!(
            tally.parties,
            vec![
                PartyTotals {
                    name: "Progress Party".to_string(),
                    votes: 2,
                    candidates: 1,
                },
                PartyTotals {
                    name: "Unity Party".to_string(),
                    votes: 1,
                    candidates: 2,
                },
            ]
        );
        assert_eq!(
            tally.position_totals,
            vec![
                PositionTotals {
                    position: Position::President,
                    label: "President".to_string(),
                    votes: 2,
                    candidates: 2,
                },
                PositionTotals {
                    position: Position::Treasurer,
                    label: "Treasurer".to_string(),
                    votes: 1,
                    candidates: 1,
                },
            ]
        );
    }

    #[test]
    fn recomputation_is_idempotent() {
        let candidates = vec![
            candidate("A", Position::President, "Unity Party"),
            candidate("B", Position::Representative, "Progress Party"),
        ];
        let ballots = vec![
            ballot("s1", &[(Position::President, "A")]),
            ballot("s2", &[(Position::Representative, "B")]),
        ];

        let first = compute_tally(&candidates, &ballots, 5);
        let second = compute_tally(&candidates, &ballots, 5);
        assert_eq!(first, second);
    }
}
