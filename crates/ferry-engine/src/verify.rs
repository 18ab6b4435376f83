//! First-contact arithmetic challenge.

use crate::ledger::Ledger;
use ferry_core::{Challenge, UserId, MAX_FAIL_LIMIT};
use rand::Rng;
use std::ops::RangeInclusive;
use tracing::info;

/// Range of the first operand
pub const FIRST_OPERAND: RangeInclusive<i64> = 10..=50;

/// Range of the second operand
pub const SECOND_OPERAND: RangeInclusive<i64> = 1..=9;

/// `a + b = ?`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Puzzle {
    /// First operand
    pub a: i64,
    /// Second operand
    pub b: i64,
}

impl Puzzle {
    /// Draw operands from [`FIRST_OPERAND`] and [`SECOND_OPERAND`]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            a: rng.gen_range(FIRST_OPERAND),
            b: rng.gen_range(SECOND_OPERAND),
        }
    }

    /// Expected answer
    #[must_use]
    pub const fn answer(&self) -> i64 {
        self.a + self.b
    }
}

/// Result of evaluating an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// User is now whitelisted
    Correct,
    /// Wrong, `remaining` tries left
    Incorrect {
        /// Attempts left before the ban
        remaining: u32,
    },
    /// Wrong for the last time, user is now blacklisted
    ExhaustedAndBanned,
}

/// Returns true if `raw` is the integer `expected`, ignoring surrounding whitespace
#[must_use]
pub fn is_correct(expected: i64, raw: Option<&str>) -> bool {
    raw.and_then(|text| text.trim().parse::<i64>().ok()) == Some(expected)
}

/// Issue a new challenge to `user` and store it as pending
pub fn issue<R: Rng + ?Sized>(ledger: &mut Ledger, user: UserId, rng: &mut R) -> Puzzle {
    let puzzle = Puzzle::generate(rng);
    ledger.begin_challenge(user, Challenge::new(puzzle.answer()));
    info!(%user, "challenge issued");
    puzzle
}

/// Undo [`issue`] after the puzzle could not be delivered
pub fn withdraw(ledger: &mut Ledger, user: UserId, puzzle: &Puzzle) {
    if ledger.withdraw_challenge(user, Challenge::new(puzzle.answer())) {
        info!(%user, "undelivered challenge withdrawn");
    }
}

/// Evaluate an answer from a pending user.
///
/// Anything that is not the expected integer (media, commands, words)
/// counts as a wrong attempt. Returns `None` if `user` has no challenge.
pub fn submit(ledger: &mut Ledger, user: UserId, raw: Option<&str>) -> Option<Outcome> {
    let mut challenge = ledger.challenge(user)?;

    if is_correct(challenge.answer, raw) {
        ledger.pass_challenge(user);
        info!(%user, "challenge passed");
        return Some(Outcome::Correct);
    }

    challenge.attempts += 1;
    if challenge.attempts >= MAX_FAIL_LIMIT {
        ledger.fail_challenge(user);
        info!(%user, "challenge failed, user banned");
        return Some(Outcome::ExhaustedAndBanned);
    }

    ledger.record_attempt(user, challenge);
    Some(Outcome::Incorrect {
        remaining: challenge.remaining(),
    })
}
