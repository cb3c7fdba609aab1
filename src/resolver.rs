//! Decides which catalog entry a filename refers to, asking the operator when
//! the matcher's ranking is not conclusive.

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::catalog::{CatalogEntry, CatalogIndex};
use crate::config::{RenameConfig, DEFAULT_AUTO_ACCEPT_MARGIN, DEFAULT_MAX_PROMPT_ATTEMPTS};
use crate::error::ChoiceError;
use crate::matcher::MatchCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(CatalogEntry),
    /// The operator chose "None of above"; the file keeps its name.
    Skipped,
    NoMatch,
}

/// Where a candidate list stands before any operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    NoCandidates,
    SingleCandidate,
    /// Rank 0 is clear of rank 1 by more than the margin.
    ConfidentCandidate,
    AwaitingOperator,
}

/// One line of the disambiguation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub index: usize,
    pub title: String,
    pub score: u8,
}

/// Line-based operator I/O used by the disambiguation prompt.
pub trait Operator {
    /// Print a diagnostic line.
    fn notify(&mut self, message: &str) -> io::Result<()>;

    /// Show the numbered choices; "None of above" is `choices.len()`.
    fn present(&mut self, basename: &str, choices: &[Choice]) -> io::Result<()>;

    /// Read one answer. `None` means input is exhausted.
    fn read_choice(&mut self) -> io::Result<Option<String>>;
}

/// Prompts on any writer and reads answers from any line reader.
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn notify(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    fn present(&mut self, basename: &str, choices: &[Choice]) -> io::Result<()> {
        writeln!(self.output, "Multiple matches were found for file {}", basename)?;
        writeln!(self.output, "Please choose the correct one from the list below.")?;
        for choice in choices {
            writeln!(
                self.output,
                "{}: {} (score: {:02}/100)",
                choice.index, choice.title, choice.score
            )?;
        }
        writeln!(self.output, "{}: None of above", choices.len())
    }

    fn read_choice(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "Your choice: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Parse an operator answer against `count` candidates; `count` itself is
/// "None of above".
pub fn parse_choice(input: &str, count: usize) -> Result<usize, ChoiceError> {
    let choice: usize = input
        .trim()
        .parse()
        .map_err(|_| ChoiceError::NotANumber(input.trim().to_string()))?;
    if choice > count {
        return Err(ChoiceError::OutOfRange { choice, max: count });
    }
    Ok(choice)
}

pub struct Resolver<'a> {
    index: &'a CatalogIndex,
    auto_accept_margin: u8,
    max_prompt_attempts: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self {
            index,
            auto_accept_margin: DEFAULT_AUTO_ACCEPT_MARGIN,
            max_prompt_attempts: DEFAULT_MAX_PROMPT_ATTEMPTS,
        }
    }

    pub fn from_config(index: &'a CatalogIndex, config: &RenameConfig) -> Self {
        Self {
            index,
            auto_accept_margin: config.auto_accept_margin,
            max_prompt_attempts: config.max_prompt_attempts,
        }
    }

    pub fn classify(&self, candidates: &[MatchCandidate]) -> ResolutionState {
        match candidates {
            [] => ResolutionState::NoCandidates,
            [_] => ResolutionState::SingleCandidate,
            [first, second, ..] => {
                let lead = first.score.saturating_sub(second.score);
                if lead > self.auto_accept_margin {
                    ResolutionState::ConfidentCandidate
                } else {
                    ResolutionState::AwaitingOperator
                }
            }
        }
    }

    pub fn resolve(
        &self,
        basename: &str,
        candidates: &[MatchCandidate],
        operator: &mut dyn Operator,
    ) -> io::Result<ResolutionOutcome> {
        match self.classify(candidates) {
            ResolutionState::NoCandidates => {
                info!(basename, "No catalog entry scored above the cutoff");
                operator.notify(&format!("No match was found for file {}", basename))?;
                Ok(ResolutionOutcome::NoMatch)
            }
            ResolutionState::SingleCandidate | ResolutionState::ConfidentCandidate => {
                let best = &candidates[0];
                debug!(basename, id = best.entry_id, score = best.score, "Accepted best candidate");
                Ok(self.outcome_for(&candidates[0]))
            }
            ResolutionState::AwaitingOperator => self.ask_operator(basename, candidates, operator),
        }
    }

    fn ask_operator(
        &self,
        basename: &str,
        candidates: &[MatchCandidate],
        operator: &mut dyn Operator,
    ) -> io::Result<ResolutionOutcome> {
        let choices: Vec<Choice> = candidates
            .iter()
            .enumerate()
            .map(|(index, candidate)| Choice {
                index,
                title: self
                    .index
                    .get(candidate.entry_id)
                    .map(|entry| entry.display_title.clone())
                    .unwrap_or_else(|| candidate.search_title.clone()),
                score: candidate.score,
            })
            .collect();

        operator.present(basename, &choices)?;

        for attempt in 1..=self.max_prompt_attempts {
            let Some(answer) = operator.read_choice()? else {
                warn!(basename, "Input ended during disambiguation, leaving file unchanged");
                return Ok(ResolutionOutcome::Skipped);
            };

            match parse_choice(&answer, candidates.len()) {
                Ok(choice) if choice == candidates.len() => return Ok(ResolutionOutcome::Skipped),
                Ok(choice) => return Ok(self.outcome_for(&candidates[choice])),
                Err(e) => {
                    debug!(basename, attempt, error = %e, "Rejected operator choice");
                    operator.notify(&format!("Invalid choice for file {}: {}", basename, e))?;
                }
            }
        }

        warn!(
            basename,
            attempts = self.max_prompt_attempts,
            "No valid choice given, leaving file unchanged"
        );
        operator.notify(&format!("Too many invalid choices, skipping file {}", basename))?;
        Ok(ResolutionOutcome::Skipped)
    }

    fn outcome_for(&self, candidate: &MatchCandidate) -> ResolutionOutcome {
        match self.index.get(candidate.entry_id) {
            Some(entry) => ResolutionOutcome::Resolved(entry.clone()),
            None => ResolutionOutcome::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("0", 3), Ok(0));
        assert_eq!(parse_choice(" 3 ", 3), Ok(3));
        assert_eq!(parse_choice("4", 3), Err(ChoiceError::OutOfRange { choice: 4, max: 3 }));
        assert_eq!(parse_choice("zwei", 3), Err(ChoiceError::NotANumber("zwei".to_string())));
        assert_eq!(parse_choice("-1", 3), Err(ChoiceError::NotANumber("-1".to_string())));
    }

    #[test]
    fn test_console_operator_prompt_layout() {
        let mut operator = ConsoleOperator::new(&b"1\n"[..], Vec::new());
        let choices = vec![
            Choice { index: 0, title: "Reifezeugnis".to_string(), score: 88 },
            Choice { index: 1, title: "Reifezeugnis II".to_string(), score: 7 },
        ];

        operator.present("reifezeugnis", &choices).unwrap();
        let answer = operator.read_choice().unwrap();
        let output = String::from_utf8(operator.into_output()).unwrap();

        assert_eq!(answer.as_deref(), Some("1"));
        assert!(output.contains("Multiple matches were found for file reifezeugnis"));
        assert!(output.contains("0: Reifezeugnis (score: 88/100)"));
        assert!(output.contains("1: Reifezeugnis II (score: 07/100)"));
        assert!(output.contains("2: None of above"));
        assert!(output.ends_with("Your choice: "));
    }

    #[test]
    fn test_console_operator_end_of_input() {
        let mut operator = ConsoleOperator::new(&b""[..], Vec::new());
        assert_eq!(operator.read_choice().unwrap(), None);
    }
}
