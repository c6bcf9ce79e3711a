//! On-demand nudges.

use clap::Subcommand;

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum NudgeAction {
    /// Run one background cycle now; prints no-data, new-data or failed
    Trigger,
    /// Generate and send a nudge immediately, whatever the frequency
    Test,
}

pub async fn run(action: NudgeAction) -> CmdResult {
    let ctx = Context::open()?;
    let controller = ctx.controller()?;

    match action {
        NudgeAction::Trigger => {
            let result = controller.run_cycle().await;
            println!("{result}");
        }
        NudgeAction::Test => {
            let message = controller.test_nudge().await?;
            println!("{message}");
        }
    }
    Ok(())
}
