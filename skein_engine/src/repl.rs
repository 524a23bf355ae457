//! Interactive session loop.
//!
//! One rendering collaborator for the whole engine: reads a line, either
//! feeds it to the parser or to the interaction already in flight, and
//! renders whatever cue comes back. The runner decides all pacing; this
//! loop only displays frames and relays input.

use anyhow::Result;
use log::info;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use textwrap::fill;

use crate::parser;
use crate::runner::{ChainCue, ChainRunner, Frame};
use crate::style::GameStyle;
use crate::world::SkeinWorld;

const WRAP_WIDTH: usize = 78;

/// Run the session until the player quits or input ends.
///
/// Closing options on a finished turn are displayed but not awaited; the
/// next line of input is parsed as a fresh command. Hosts that need to
/// act on a closing pick should drive the runner themselves.
///
/// # Errors
/// Returns an error if the line editor cannot be set up or fails mid-read.
pub fn run_repl(world: &mut SkeinWorld) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("{}", format!("skein engine v{}", crate::SKEIN_VERSION).banner());

    let mut pending: Option<ChainRunner> = None;
    loop {
        let prompt = match pending.as_ref().map(ChainRunner::cue) {
            Some(ChainCue::Advance(_)) => format!("[{}] ", Frame::ADVANCE_LABEL),
            Some(ChainCue::Choose(frame)) => format!("(1-{})> ", frame.options.len()),
            _ => "> ".to_string(),
        };
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }
        if !input.is_empty() {
            editor.add_history_entry(input)?;
        }

        match pending.take() {
            Some(mut runner) => {
                match runner.cue().clone() {
                    // any input moves past an advance frame
                    ChainCue::Advance(_) => {
                        runner.advance(world);
                    },
                    ChainCue::Choose(frame) => match input.parse::<usize>() {
                        Ok(n) if (1..=frame.options.len()).contains(&n) => {
                            runner.choose(n - 1, world);
                        },
                        _ => {
                            println!("{}", "Pick one of the numbered options.".alert());
                        },
                    },
                    ChainCue::Finished { .. } => {},
                }
                pending = settle(runner);
            },
            None => {
                if input.is_empty() {
                    continue;
                }
                let turn = parser::parse(world, input);
                pending = settle(turn.runner);
            },
        }
    }
    info!("session ended");
    Ok(())
}

/// Render the runner's current cue; keep the runner only if it wants more
/// input.
fn settle(runner: ChainRunner) -> Option<ChainRunner> {
    match runner.cue() {
        ChainCue::Advance(frame) => {
            render(frame, false);
            Some(runner)
        },
        ChainCue::Choose(frame) => {
            render(frame, true);
            Some(runner)
        },
        ChainCue::Finished { frame, .. } => {
            if let Some(frame) = frame {
                // closing options attached by the chain author are shown
                // too; the next line goes back through the parser
                render(frame, !frame.options.is_empty());
            }
            None
        },
    }
}

fn render(frame: &Frame, numbered: bool) {
    if !frame.text.is_empty() {
        println!("\n{}", fill(&frame.text, WRAP_WIDTH).frame_text());
    }
    if numbered {
        println!();
        for (i, label) in frame.options.iter().enumerate() {
            println!("  {} {}", format!("{})", i + 1).option_number(), label.option_label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ActionChain, ChainContext};

    #[test]
    fn finished_turn_with_closing_options_is_rendered_and_released() {
        let mut world = SkeinWorld::new_session();
        let chain = ActionChain::text("The gate swings open.")
            .with_final_options(vec!["Enter".to_string(), "Wait".to_string()]);
        let runner = ChainRunner::begin(chain, ChainContext::default(), &mut world);

        let ChainCue::Finished { frame: Some(frame), .. } = runner.cue() else {
            panic!("expected a finished cue carrying the closing frame")
        };
        assert_eq!(frame.options, vec!["Enter".to_string(), "Wait".to_string()]);
        // displayed once, then the loop goes back to free input
        assert!(settle(runner).is_none());
    }
}
