//! Session setup flow
//!
//! Before a quiz can be played the host chooses how many teams there are and
//! which team each student is on. [`Setup`] walks through those steps as an
//! explicit state machine that the presentation layer drives one call at a
//! time:
//!
//! `CollectingTeamCount → CollectingAssignments → Ready`
//!
//! Once ready, [`Setup::start`] hands over to the session controller.

use std::{collections::BTreeMap, sync::Arc};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants,
    data::{DataStore, Student, StudentId},
    game::Game,
    pool::QuestionPool,
    teams::{self, Roster},
};

/// Step of the setup flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Stage {
    /// Waiting for the number of teams
    CollectingTeamCount,
    /// Waiting for students to be placed on teams
    CollectingAssignments,
    /// Everything collected; the quiz can start
    Ready,
}

/// Number of teams requested by the host
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate)]
pub struct TeamCount {
    /// Requested number of teams
    #[garde(range(min = crate::constants::teams::MIN_COUNT))]
    pub count: usize,
}

/// Errors that can occur while driving the setup flow
#[derive(Error, Debug)]
pub enum Error {
    /// The call does not belong to the current step
    #[error("setup is at {actual}, expected {expected}")]
    WrongStage {
        /// Step the call belongs to
        expected: Stage,
        /// Step the flow is at
        actual: Stage,
    },
    /// The team count entry is not a whole number
    #[error("team count must be a whole number, got {0:?}")]
    NotANumber(String),
    /// The team count is out of range
    #[error("invalid team count: {0}")]
    InvalidTeamCount(#[from] garde::Report),
    /// The student is not in the class list
    #[error("unknown student {0}")]
    UnknownStudent(StudentId),
    /// The choice is neither a team nor the unassigned sentinel
    #[error("unknown team {0:?}")]
    UnknownTeam(String),
}

/// The setup state machine
#[derive(Debug)]
pub struct Setup {
    /// Students and questions loaded at startup
    store: Arc<DataStore>,
    /// Questions not served yet; carried over from a previous round after a reset
    pool: QuestionPool,
    /// Current step
    stage: Stage,
    /// Team count proposed when the flow starts
    default_team_count: usize,
    /// Team count chosen so far
    team_count: usize,
    /// Team choice of every student, the unassigned sentinel by default
    assignments: BTreeMap<StudentId, String>,
}

impl Setup {
    /// Starts the setup flow for a new process with a full question pool
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use team_quiz::{data::DataStore, setup::Setup};
    ///
    /// let store = DataStore::from_json(
    ///     r#"{"s1": "Ada"}"#,
    ///     r#"{"q1": {"question": "2 + 2?", "answer": "4"}}"#,
    /// )
    /// .unwrap();
    ///
    /// let mut setup = Setup::new(Arc::new(store));
    /// setup.submit_team_count_input("2").unwrap();
    /// setup.assign(&"s1".into(), "Team 2").unwrap();
    /// setup.confirm_assignments().unwrap();
    ///
    /// let game = setup.start().unwrap();
    /// assert_eq!(game.roster().team_of(&"s1".into()), Some("Team 2"));
    /// ```
    pub fn new(store: Arc<DataStore>) -> Self {
        let pool = QuestionPool::new(&store);
        Self::resume(store, pool, constants::teams::DEFAULT_COUNT)
    }

    /// Changes the team count proposed to the host
    pub fn with_default_team_count(mut self, count: usize) -> Self {
        self.default_team_count = count;
        self.team_count = count;
        self
    }

    pub(crate) fn resume(
        store: Arc<DataStore>,
        pool: QuestionPool,
        default_team_count: usize,
    ) -> Self {
        Self {
            store,
            pool,
            stage: Stage::CollectingTeamCount,
            default_team_count,
            team_count: default_team_count,
            assignments: BTreeMap::new(),
        }
    }

    /// Current step
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Team count chosen so far, or the proposed default before that
    pub fn team_count(&self) -> usize {
        self.team_count
    }

    /// Students and questions loaded at startup
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    fn expect(&self, expected: Stage) -> Result<(), Error> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(Error::WrongStage {
                expected,
                actual: self.stage,
            })
        }
    }

    /// Sets the number of teams and moves on to assignments
    ///
    /// Every student starts out unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongStage`] outside of the team count step and
    /// [`Error::InvalidTeamCount`] for a count of zero.
    pub fn submit_team_count(&mut self, count: usize) -> Result<(), Error> {
        self.expect(Stage::CollectingTeamCount)?;
        TeamCount { count }.validate()?;

        self.team_count = count;
        self.assignments = self
            .store
            .students()
            .map(|student| {
                (
                    student.id.clone(),
                    constants::teams::UNASSIGNED.to_owned(),
                )
            })
            .collect();
        self.stage = Stage::CollectingAssignments;

        tracing::debug!(teams = count, "team count set");
        Ok(())
    }

    /// Parses a typed team count and submits it
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotANumber`] if the text is not a whole number,
    /// otherwise the errors of [`Setup::submit_team_count`].
    pub fn submit_team_count_input(&mut self, input: &str) -> Result<(), Error> {
        self.expect(Stage::CollectingTeamCount)?;
        let count = input
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::NotANumber(input.to_owned()))?;
        self.submit_team_count(count)
    }

    /// Choices offered for each student: the unassigned sentinel, then every team
    pub fn team_choices(&self) -> Vec<String> {
        std::iter::once(constants::teams::UNASSIGNED.to_owned())
            .chain((1..=self.team_count).map(teams::team_name))
            .collect_vec()
    }

    /// Places a student on a team, or on none with the unassigned sentinel
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongStage`] outside of the assignment step,
    /// [`Error::UnknownTeam`] if `choice` is not one of
    /// [`Setup::team_choices`] and [`Error::UnknownStudent`] if the student
    /// is not in the class list.
    pub fn assign(&mut self, student: &StudentId, choice: &str) -> Result<(), Error> {
        self.expect(Stage::CollectingAssignments)?;

        if !self.team_choices().iter().any(|c| c == choice) {
            return Err(Error::UnknownTeam(choice.to_owned()));
        }

        let slot = self
            .assignments
            .get_mut(student)
            .ok_or_else(|| Error::UnknownStudent(student.clone()))?;
        choice.clone_into(slot);

        Ok(())
    }

    /// Current choice for a student
    pub fn assignment(&self, student: &StudentId) -> Option<&str> {
        self.assignments.get(student).map(String::as_str)
    }

    /// Every student with their current choice, in id order
    pub fn assignments(&self) -> Vec<(&Student, &str)> {
        self.store
            .students()
            .filter_map(|student| Some((student, self.assignment(&student.id)?)))
            .collect_vec()
    }

    /// Finishes the assignment step
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongStage`] outside of the assignment step.
    pub fn confirm_assignments(&mut self) -> Result<(), Error> {
        self.expect(Stage::CollectingAssignments)?;
        self.stage = Stage::Ready;

        tracing::debug!(
            assigned = self
                .assignments
                .values()
                .filter(|team| *team != constants::teams::UNASSIGNED)
                .count(),
            "assignments confirmed"
        );
        Ok(())
    }

    /// Builds the roster and hands over to the session controller
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongStage`] unless the flow is ready.
    pub fn start(self) -> Result<Game, Error> {
        self.expect(Stage::Ready)?;

        let mut roster = Roster::new(self.team_count);
        for (student, team) in self.assignments {
            roster.assign_student(student, &team);
        }

        Ok(Game::new(self.store, roster, self.pool).with_default_team_count(self.default_team_count))
    }
}
