//! Fixed values shared across the quiz controller
//!
//! This module collects the defaults, sentinels and display texts used by
//! the setup flow, the team roster and the session controller so that a
//! presentation layer sees the same vocabulary everywhere.

/// Team configuration constants
pub mod teams {
    /// Number of teams proposed by the setup flow before the host changes it
    pub const DEFAULT_COUNT: usize = 4;
    /// Minimum number of teams a session can be played with
    pub const MIN_COUNT: usize = 1;
    /// Prefix of generated team names (`Team 1`, `Team 2`, ...)
    pub const NAME_PREFIX: &str = "Team";
    /// Assignment choice meaning "not on any team"
    pub const UNASSIGNED: &str = "None";
}

/// Status texts shown in place of the question
pub mod status {
    /// Shown before any question has been drawn
    pub const PROMPT: &str = "Press Start to get a question";
    /// Shown when every team passed on the same question
    pub const SKIPPED: &str = "Question Skipped!";
    /// Shown once the question pool is exhausted
    pub const FINISHED: &str = "Quiz Finished!";
    /// Shown in place of a student name when none has been drawn
    pub const NO_STUDENT: &str = "N/A";
}

/// Data file configuration constants
pub mod data {
    /// Default location of the student list
    pub const STUDENTS_PATH: &str = "students.json";
    /// Default location of the question bank
    pub const QUESTIONS_PATH: &str = "questions.json";
}
