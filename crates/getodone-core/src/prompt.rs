//! Prompt composition for nudge messages.
//!
//! Pure: the same tasks and tone always yield the same bytes.

use crate::preferences::Tone;
use crate::task::{pending, Task};

pub const SOFT_INSTRUCTION: &str =
    "You're a kind and supportive motivator. Help the user overcome their resistance with empathy.";
pub const HARD_INSTRUCTION: &str =
    "You're a strict AI coach. Remind the user of discipline and consequences for not acting.";
pub const NEUTRAL_INSTRUCTION: &str =
    "You're a rational and helpful AI buddy. Offer motivating logic to help the user get things done.";

/// System instruction for a tone.
pub fn system_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Soft => SOFT_INSTRUCTION,
        Tone::Hard => HARD_INSTRUCTION,
        Tone::Neutral => NEUTRAL_INSTRUCTION,
    }
}

/// Build the generation prompt from the incomplete tasks in `tasks`.
///
/// An empty pending list still yields a prompt with an empty task section;
/// suppressing the request is the caller's decision.
pub fn compose(tasks: &[Task], tone: Tone) -> String {
    let task_lines = pending(tasks)
        .map(|t| format!("- {}", t.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\n\nUser has the following pending tasks:\n{}\n\n\
         Generate a motivational message in {} tone that nudges them to take action.",
        system_instruction(tone),
        task_lines,
        tone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn task(title: &str, done: bool) -> Task {
        Task {
            id: title.to_string(),
            title: title.to_string(),
            created_at: Utc::now(),
            is_completed: done,
        }
    }

    #[test]
    fn soft_prompt_lists_pending_task() {
        let prompt = compose(&[task("Write report", false)], Tone::Soft);
        assert!(prompt.contains("- Write report"));
        assert!(prompt.contains(SOFT_INSTRUCTION));
        assert!(prompt.ends_with("in soft tone that nudges them to take action."));
    }

    #[test]
    fn each_tone_carries_only_its_own_instruction() {
        let tasks = [task("a", false)];
        for tone in Tone::ALL {
            let prompt = compose(&tasks, tone);
            for other in Tone::ALL {
                assert_eq!(
                    prompt.contains(system_instruction(other)),
                    other == tone,
                    "tone {tone} vs instruction for {other}"
                );
            }
        }
    }

    #[test]
    fn completed_tasks_are_left_out() {
        let prompt = compose(&[task("done", true), task("open", false)], Tone::Hard);
        assert!(prompt.contains("- open"));
        assert!(!prompt.contains("- done"));
    }

    #[test]
    fn empty_task_section_still_produces_prompt() {
        let prompt = compose(&[], Tone::Neutral);
        assert_eq!(
            prompt,
            format!(
                "{NEUTRAL_INSTRUCTION}\n\nUser has the following pending tasks:\n\n\n\
                 Generate a motivational message in neutral tone that nudges them to take action."
            )
        );
    }

    fn tone_strategy() -> impl Strategy<Value = Tone> {
        prop_oneof![Just(Tone::Soft), Just(Tone::Hard), Just(Tone::Neutral)]
    }

    proptest! {
        #[test]
        fn compose_is_deterministic(
            titles in proptest::collection::vec(("[a-zA-Z ]{1,20}", any::<bool>()), 0..8),
            tone in tone_strategy(),
        ) {
            let tasks: Vec<Task> = titles.iter().map(|(t, done)| task(t, *done)).collect();
            prop_assert_eq!(compose(&tasks, tone), compose(&tasks, tone));
        }
    }
}
