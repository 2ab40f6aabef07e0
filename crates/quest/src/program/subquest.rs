//! The bundled three-stage quiz.
//!
//! Stage 1 is a decoding puzzle, stage 2 an acronym built from clue answers,
//! and stage 3 an anagram of both earlier answers. Each finished stage is
//! written to the score log.

use std::sync::Arc;

use crate::scores::{ScoreLog, ScoreRecord};

use super::{Console, Program, ProgramError, QuestParams};

const STAGE_POINTS: u32 = 100;

const DECODE_ANSWER: &str = "EETOAIN";
const DECODE_PENALTY: u32 = 2;

const ACRONYM_ANSWER: &str = "LCRSPES";
const ACRONYM_PENALTY: u32 = 2;
const ACRONYM_CLUES: [&str; 7] = [
    "an abstract data type representing an ordered collection of elements",
    "Set of instructions that a computer follows to perform a task",
    "A hardware component that temporarily stores data and programs the computer is actively using, allowing the CPU to access them quickly",
    "a linear data structure which follows LIFO principle for inserting and deleting elements",
    "reference that stores the address of data, allowing indirect access to its value",
    "A 32 bit micro controller",
    "a device that detects and responds to changes in its environment by converting the physical change into an electrical signal",
];

const ANAGRAM_ANSWER: &str = "ELECTROSAPIENS";
const ANAGRAM_CHANCES: u32 = 5;
const ANAGRAM_PENALTY: u32 = 10;
const ANAGRAM_FORFEIT: u32 = 50;

fn normalize(answer: &str) -> String {
    answer.trim().to_uppercase()
}

/// Clue block as one quoted listing, `"N.": "clue"` per line.
fn clue_block() -> String {
    ACRONYM_CLUES
        .iter()
        .enumerate()
        .map(|(i, clue)| format!("        \"{}.\": \"{}\"", i + 1, clue))
        .collect::<Vec<_>>()
        .join(",\n")
}

fn wrong_length(answer: &str, expected: &str) -> bool {
    answer.chars().count() != expected.chars().count()
}

/// Three-stage quiz that records each stage in a [`ScoreLog`].
pub struct SubquestProgram {
    scores: Arc<ScoreLog>,
}

impl SubquestProgram {
    pub fn new(scores: Arc<ScoreLog>) -> Self {
        Self { scores }
    }

    fn record(&self, params: &QuestParams, stage: u8, points: u32) -> Result<(), ProgramError> {
        self.scores.append(&ScoreRecord {
            uid: params.uid.clone(),
            team: params.team.clone(),
            players: params.players.clone(),
            stage,
            points,
        })?;
        Ok(())
    }

    fn decode_stage(
        &self,
        params: &QuestParams,
        console: &mut dyn Console,
    ) -> Result<u32, ProgramError> {
        let mut points = STAGE_POINTS;
        console.print("Welcome to SUBQUEST 1! ");
        console.print("You have 100 points for this question.");
        console.print("DECODE!! FI FI HD GI FE GC GH");
        console.print(
            "You can choose to decode from these 5 methods: (Only 2 methods used one after the other can actually solve it HEHEHE)\n\
             1. Ascii <-> Alphabet/Number\n\
             2. Ceasar Cipher\n\
             3. Atbash Cipher\n\
             4. Letter-to-Number\n\
             5. PURE INTUITION!!\n",
        );

        while points > 0 {
            let answer = normalize(&console.read("Enter the word: ")?);
            if wrong_length(&answer, DECODE_ANSWER) {
                console.print(&format!(
                    "Please ensure the correct number of letters in your answer ({} letters).\n",
                    DECODE_ANSWER.len()
                ));
                console.print(&format!("Points remaining: {points}\n"));
                continue;
            }
            if answer == DECODE_ANSWER {
                console.print(&format!("Correct! You still have {points} points.\n"));
                break;
            }

            points = points.saturating_sub(DECODE_PENALTY);
            console.print(&format!("Incorrect! Points remaining: {points}\n"));
            if points <= 80 {
                console.print("Hint: Try using the 'Letter-to-Number' decoding method!\n");
            }
            if points <= 60 {
                console.print("Hint: Try using the 'Ascii <-> Alphabet/Number' decoding method");
            }
        }
        if points == 0 {
            console.print("You have no points left! DISAPPOINTMENT!!\n");
        }

        self.record(params, 1, points)?;
        Ok(points)
    }

    fn acronym_stage(
        &self,
        params: &QuestParams,
        console: &mut dyn Console,
    ) -> Result<u32, ProgramError> {
        let mut points = STAGE_POINTS;
        console.print("Welcome to the SUBQUEST 2!");
        console.print("You start with 100 points.");
        console.print(
            "For every wrong answer (correct length), you lose 2 point (points never go below 0).",
        );
        console.print(
            "Enter the 7-letter answer, combining the first letters of each clue in order.\n",
        );

        while points > 0 {
            console.print("Clues:");
            console.print(&clue_block());

            let answer = normalize(&console.read("Enter the 7-letter word: ")?);
            if wrong_length(&answer, ACRONYM_ANSWER) {
                console.print(
                    "Please ensure the correct number of letters in your answer (7 letters).\n",
                );
                continue;
            }
            if answer == ACRONYM_ANSWER {
                console.print(&format!("Correct! You still have {points} points.\n"));
                break;
            }

            points = points.saturating_sub(ACRONYM_PENALTY);
            console.print(&format!("Incorrect! Points remaining: {points}\n"));
        }
        if points == 0 {
            console.print("You have no points left!\n DISAPPOINTMENT");
        }

        self.record(params, 2, points)?;
        Ok(points)
    }

    fn anagram_stage(
        &self,
        params: &QuestParams,
        console: &mut dyn Console,
        carried: u32,
    ) -> Result<u32, ProgramError> {
        let mut points = carried;
        console.print("Welcome to SUBQUEST 3 !!\n");
        console.print(
            "word1 = ANSWER TO SUBQUEST 1\nword2 = ANSWER TO SUBQUEST 2\nSolve the anagram of both words and enter your answer\n",
        );

        let mut chances = ANAGRAM_CHANCES;
        let mut solved = false;
        while chances > 0 {
            let prompt = format!("Enter the output word (chances left: {chances}): ");
            let answer = normalize(&console.read(&prompt)?);
            if wrong_length(&answer, ANAGRAM_ANSWER) {
                console.print(&format!(
                    "Please ensure the correct number of letters in your answer ({} letters).\n",
                    ANAGRAM_ANSWER.len()
                ));
                continue;
            }
            if answer == ANAGRAM_ANSWER {
                console.print(&format!("Correct! You still have {points} points.\n"));
                solved = true;
                break;
            }

            chances -= 1;
            points = points.saturating_sub(ANAGRAM_PENALTY);
            console.print(&format!("Incorrect! -10 points. Points remaining: {points}\n"));
        }

        if !solved {
            points = points.saturating_sub(ANAGRAM_FORFEIT);
            console.print(&format!("Out of chances! The correct answer was: {ANAGRAM_ANSWER}"));
            console.print(&format!("-50 penalty. Points remaining: {points}\n"));
        }

        self.record(params, 3, points)?;
        Ok(points)
    }
}

impl Program for SubquestProgram {
    fn name(&self) -> &str {
        "subquest"
    }

    fn run(&self, params: &QuestParams, console: &mut dyn Console) -> Result<(), ProgramError> {
        let round1 = self.decode_stage(params, console)?;
        let round2 = self.acronym_stage(params, console)?;
        let round3 = self.anagram_stage(params, console, round1 + round2)?;
        console.print(&format!("Total points = {}", round1 + round2 + round3));
        Ok(())
    }
}
