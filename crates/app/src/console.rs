use hub_core::turn::TurnEvent;
use services::{HubEvent, HubPresenter};

/// Prints hub and mini-game notifications as plain lines on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter;

impl HubPresenter for ConsolePresenter {
    fn notify(&self, event: &HubEvent) {
        if let Some(line) = describe(event) {
            println!("{line}");
        }
    }
}

fn describe(event: &HubEvent) -> Option<String> {
    let line = match event {
        HubEvent::ProgressionLoaded { keys, coins } => format!("Keys: {keys}  Coins: {coins}"),
        HubEvent::ProgressionSaved => "Progress saved.".to_owned(),
        HubEvent::KeysChanged { keys } => format!("Keys: {keys}"),
        HubEvent::CoinsChanged { coins } => format!("Coins: {coins}"),
        HubEvent::StageUnlocked(stage) => format!("Stage {} unlocked!", stage.ordinal()),
        HubEvent::StageSelected(stage) => format!("Selected Stage: {}", stage.ordinal()),
        HubEvent::HubSuspended { stage } => format!(
            "-- Stage {} --  type a bear number to guess, or pause / resume / exit",
            stage.ordinal()
        ),
        HubEvent::HubResumed => "-- back at the hub --".to_owned(),
        HubEvent::SessionFinished(report) => format!(
            "Game over! Score {} after {} rounds, +{} keys",
            report.final_score(),
            report.rounds_played(),
            report.keys_awarded()
        ),
        HubEvent::Turn(turn) => return describe_turn(turn),
    };
    Some(line)
}

fn describe_turn(event: &TurnEvent) -> Option<String> {
    let line = match event {
        TurnEvent::RoundStarted { round } => format!("Round {}: watch the bears...", round + 1),
        TurnEvent::Highlighted { option, color } => format!("  bear {} glows {color}", option + 1),
        TurnEvent::Restored { .. } | TurnEvent::WeightsHidden => return None,
        TurnEvent::AwaitingGuess => "Which bear has the most meat?".to_owned(),
        TurnEvent::GuessResolved {
            correct,
            score,
            lives_remaining,
            ..
        } => {
            let verdict = if *correct { "Correct!" } else { "Wrong." };
            format!("{verdict} Score: {score}  Hearts: {lives_remaining}")
        }
        TurnEvent::WeightsShown { weights } => {
            let shown: Vec<String> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| format!("bear {}: {w}", i + 1))
                .collect();
            format!("  meat: {}", shown.join(", "))
        }
        TurnEvent::Paused => "Paused.".to_owned(),
        TurnEvent::Resumed => "Resumed.".to_owned(),
        TurnEvent::GameOver { .. } => "No more hearts.".to_owned(),
        TurnEvent::Cancelled => "Leaving the game.".to_owned(),
    };
    Some(line)
}
