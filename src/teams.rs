//! Team roster and score bookkeeping
//!
//! This module owns the fixed, ordered list of teams of a session. Teams are
//! named `Team 1..Team n` in creation order, each with a score and the set of
//! students assigned to it during setup.

use std::collections::BTreeSet;

use itertools::Itertools;
use serde::Serialize;

use crate::{constants, data::StudentId, leaderboard::Leaderboard};

/// A single team with its score and members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    /// Display name, `Team <n>`
    name: String,
    /// Current score; only changed by scoring operations
    score: i64,
    /// Students assigned to this team
    members: BTreeSet<StudentId>,
}

impl Team {
    fn new(name: String) -> Self {
        Self {
            name,
            score: 0,
            members: BTreeSet::new(),
        }
    }

    /// The team's display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The team's current score
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Students assigned to the team
    pub fn members(&self) -> &BTreeSet<StudentId> {
        &self.members
    }
}

/// Ordered collection of the teams taking part in a session
///
/// The order is the creation order and is used both for turn rotation and
/// for the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    teams: Vec<Team>,
}

impl Roster {
    /// Creates `count` teams named `Team 1..Team count` with a score of zero
    ///
    /// At least one team is always created, so a count of zero yields a
    /// single team.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use team_quiz::teams::Roster;
    ///
    /// let roster = Roster::new(3);
    /// assert_eq!(roster.names(), vec!["Team 1", "Team 2", "Team 3"]);
    /// ```
    pub fn new(count: usize) -> Self {
        let mut roster = Self { teams: Vec::new() };
        roster.set_team_count(count);
        roster
    }

    /// Replaces all teams with `count` fresh, empty teams
    pub fn set_team_count(&mut self, count: usize) {
        self.teams = (1..=count.max(constants::teams::MIN_COUNT))
            .map(|n| Team::new(team_name(n)))
            .collect_vec();
    }

    /// Number of teams
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Always `false`; a roster holds at least one team
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Team at a rotation index
    pub fn get(&self, index: usize) -> Option<&Team> {
        self.teams.get(index)
    }

    /// Team with the given name
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|team| team.name == name)
    }

    fn team_mut(&mut self, name: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|team| team.name == name)
    }

    /// Rotation index of the team with the given name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.teams.iter().position(|team| team.name == name)
    }

    /// Iterates over the teams in creation order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Team> {
        self.teams.iter()
    }

    /// Names of all teams in creation order
    pub fn names(&self) -> Vec<&str> {
        self.teams.iter().map(Team::name).collect_vec()
    }

    /// Puts a student on a team
    ///
    /// A student belongs to at most one team, so any earlier assignment is
    /// dropped. Assigning to [`constants::teams::UNASSIGNED`] leaves the
    /// student on no team at all.
    ///
    /// # Returns
    ///
    /// `false` if `team` is neither a team of this roster nor the
    /// unassigned sentinel; the roster is left untouched in that case
    pub fn assign_student(&mut self, student: StudentId, team: &str) -> bool {
        if team != constants::teams::UNASSIGNED && self.position(team).is_none() {
            return false;
        }

        for existing in &mut self.teams {
            existing.members.remove(&student);
        }

        if let Some(target) = self.team_mut(team) {
            target.members.insert(student);
        }

        true
    }

    /// The team a student is assigned to, if any
    pub fn team_of(&self, student: &StudentId) -> Option<&str> {
        self.teams
            .iter()
            .find(|team| team.members.contains(student))
            .map(Team::name)
    }

    /// Students assigned to a team
    ///
    /// # Returns
    ///
    /// `None` if there is no team with that name
    pub fn members_of(&self, team: &str) -> Option<&BTreeSet<StudentId>> {
        self.team(team).map(Team::members)
    }

    /// Overwrites a team's score from manually entered text
    ///
    /// Surrounding whitespace is ignored and negative values are accepted.
    /// Text that is not an integer leaves the score unchanged.
    ///
    /// # Returns
    ///
    /// The new score, or `None` if the input was rejected or the team is
    /// unknown
    pub fn set_score(&mut self, team: &str, input: &str) -> Option<i64> {
        let value = input.trim().parse::<i64>().ok()?;
        let team = self.team_mut(team)?;
        team.score = value;
        Some(value)
    }

    /// Adds `delta` to a team's score
    ///
    /// # Returns
    ///
    /// The new score, or `None` if the team is unknown
    pub fn increment_score(&mut self, team: &str, delta: i64) -> Option<i64> {
        let team = self.team_mut(team)?;
        team.score = team.score.saturating_add(delta);
        Some(team.score)
    }

    /// Current scores in creation order
    pub fn leaderboard(&self) -> Leaderboard {
        self.teams
            .iter()
            .map(|team| (team.name.clone(), team.score))
            .collect()
    }
}

/// Name of the `n`th team, counting from one
pub fn team_name(n: usize) -> String {
    format!("{} {n}", constants::teams::NAME_PREFIX)
}
