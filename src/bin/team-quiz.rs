//! Terminal front end for the team quiz
//!
//! Loads the data files named in the settings, walks the host through setup
//! and then reads one play command per line from standard input.

use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    sync::Arc,
};

use itertools::Itertools;
use team_quiz::{
    config::Settings,
    constants,
    data::DataStore,
    game::{Game, SyncMessage, UpdateMessage},
    session::Tunnel,
    setup::Setup,
    teams,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  start            draw a question and call on a student
  question         draw a different question
  student          call on a different student
  answer           show or hide the answer
  correct          award a point to the current team
  skip             pass the question to the next team
  next             pass the turn without skipping
  score <n> <pts>  set the score of team <n>
  board            print the leaderboard
  reset            start over with new teams
  quit             leave";

/// Prints controller output to standard output
struct Console;

impl Tunnel for Console {
    fn send_message(&self, message: &UpdateMessage) {
        match message {
            UpdateMessage::QuestionDiscarded => println!("{}", constants::status::SKIPPED),
            UpdateMessage::Score { team, score } => println!("{team}: {score}"),
            UpdateMessage::Finished(leaderboard) => print!("{leaderboard}"),
            _ => {}
        }
    }

    fn send_state(&self, state: &SyncMessage) {
        println!();
        println!("[{}] {}", state.team, state.headline);
        println!(
            "Student: {}",
            state
                .student
                .as_deref()
                .unwrap_or(constants::status::NO_STUDENT)
        );
        if let Some(answer) = &state.answer {
            println!("Answer: {answer}");
        }
        if !state.skipped.is_empty() {
            println!("Passed: {}", state.skipped.iter().join(", "));
        }
        println!("{} question(s) left", state.remaining_questions);
    }
}

enum Outcome {
    Reset,
    Quit,
}

fn prompt<I: Iterator<Item = io::Result<String>>>(text: &str, lines: &mut I) -> Option<String> {
    print!("{text}");
    io::stdout().flush().ok()?;
    lines.next()?.ok()
}

fn run_setup<I: Iterator<Item = io::Result<String>>>(
    mut setup: Setup,
    lines: &mut I,
) -> Option<Game> {
    loop {
        let input = prompt(
            &format!("Number of teams [{}]: ", setup.team_count()),
            lines,
        )?;
        let result = if input.trim().is_empty() {
            setup.submit_team_count(setup.team_count())
        } else {
            setup.submit_team_count_input(&input)
        };
        match result {
            Ok(()) => break,
            Err(e) => println!("{e}"),
        }
    }

    let students = setup
        .assignments()
        .into_iter()
        .map(|(student, _)| (student.id.clone(), student.name.clone()))
        .collect_vec();

    for (id, name) in students {
        loop {
            let input = prompt(
                &format!("{name} [{} or 1-{}]: ", constants::teams::UNASSIGNED, setup.team_count()),
                lines,
            )?;
            let input = input.trim();
            let choice = match input.parse::<usize>() {
                Ok(n) => teams::team_name(n),
                Err(_) if input.is_empty() => constants::teams::UNASSIGNED.to_owned(),
                Err(_) => input.to_owned(),
            };
            match setup.assign(&id, &choice) {
                Ok(()) => break,
                Err(e) => println!("{e}"),
            }
        }
    }

    setup.confirm_assignments().ok()?;
    setup.start().ok()
}

fn play<I: Iterator<Item = io::Result<String>>>(game: &mut Game, lines: &mut I) -> Outcome {
    println!("{HELP}");
    game.announce(&[], &Console);

    while let Some(line) = prompt("> ", lines) {
        let mut words = line.split_whitespace();
        let updates = match words.next() {
            Some("start" | "s") => game.draw_question(),
            Some("question" | "q") => game.reroll_question(),
            Some("student") => game.draw_student(),
            Some("answer" | "a") => game.toggle_answer(),
            Some("correct" | "c") => game.mark_correct(),
            Some("skip" | "p") => game.skip(),
            Some("next" | "n") => game.advance_team(),
            Some("score") => {
                let team = words.next().map_or_else(String::new, |n| match n.parse() {
                    Ok(n) => teams::team_name(n),
                    Err(_) => n.to_owned(),
                });
                game.set_score(&team, words.next().unwrap_or_default())
            }
            Some("board" | "b") => {
                print!("{}", game.leaderboard());
                continue;
            }
            Some("reset") => return Outcome::Reset,
            Some("quit" | "exit") => return Outcome::Quit,
            Some(_) => {
                println!("{HELP}");
                continue;
            }
            None => continue,
        };
        game.announce(&updates, &Console);
    }

    Outcome::Quit
}

fn main() -> ExitCode {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    tracing::debug!(?settings, "settings loaded");

    let store = match DataStore::load(&settings.students_path, &settings.questions_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "cannot load quiz data");
            return ExitCode::FAILURE;
        }
    };

    let mut lines = io::stdin().lock().lines();
    let mut setup = Setup::new(store).with_default_team_count(settings.default_team_count);

    loop {
        let Some(mut game) = run_setup(setup, &mut lines) else {
            return ExitCode::SUCCESS;
        };
        match play(&mut game, &mut lines) {
            Outcome::Reset => setup = game.reset(),
            Outcome::Quit => return ExitCode::SUCCESS,
        }
    }
}
