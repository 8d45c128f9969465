//! Leaderboard snapshots
//!
//! A leaderboard lists every team with its score in the order the teams were
//! created. No ranking is applied: the presentation layer shows the teams in
//! the same order throughout the session, including the final board.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Score of one team at the moment the leaderboard was taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Team name
    pub team: String,
    /// Team score
    pub score: i64,
}

/// Point-in-time view of all team scores
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    standings: Vec<Standing>,
}

impl Leaderboard {
    /// Standings in team creation order
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    /// Score of a team on this board
    pub fn score(&self, team: &str) -> Option<i64> {
        self.standings
            .iter()
            .find(|standing| standing.team == team)
            .map(|standing| standing.score)
    }
}

impl FromIterator<(String, i64)> for Leaderboard {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            standings: iter
                .into_iter()
                .map(|(team, score)| Standing { team, score })
                .collect(),
        }
    }
}

impl Display for Leaderboard {
    /// Renders the board as a heading followed by one `team: score` line per team
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Leaderboard:")?;
        for Standing { team, score } in &self.standings {
            writeln!(f, "{team}: {score}")?;
        }
        Ok(())
    }
}
