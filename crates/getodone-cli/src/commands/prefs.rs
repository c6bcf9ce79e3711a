//! Preference commands: the settings screen.

use clap::Subcommand;
use getodone_core::{
    FrequencyMode, PreferenceStore, Preferences, Tone, ValidationError, WallClockTime,
};

use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show saved preferences (API key masked)
    Show,
    /// Update preferences, save, and reschedule
    Set {
        /// hourly, 3-per-day, daily, 1-min or custom
        #[arg(long)]
        frequency: Option<FrequencyMode>,
        /// Time of day for `custom`, HH:MM (24h)
        #[arg(long)]
        time: Option<WallClockTime>,
        /// soft, hard or neutral
        #[arg(long)]
        tone: Option<Tone>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// Turn nudges on or off
        #[arg(long)]
        enabled: Option<bool>,
    },
    /// Restore first-run preferences and clear the schedule
    Reset,
}

fn masked(prefs: &Preferences) -> Result<serde_json::Value, serde_json::Error> {
    let mut value = serde_json::to_value(prefs)?;
    if !prefs.api_key.is_empty() {
        value["apiKey"] = serde_json::Value::String("********".into());
    }
    Ok(value)
}

pub async fn run(action: PrefsAction) -> CmdResult {
    let ctx = Context::open()?;

    match action {
        PrefsAction::Show => {
            ctx.sweep_on_view().await?;
            let prefs = ctx.store.get_preferences()?.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&masked(&prefs)?)?);
        }
        PrefsAction::Set {
            frequency,
            time,
            tone,
            api_key,
            model,
            enabled,
        } => {
            let mut prefs = ctx.store.get_preferences()?.unwrap_or_default();
            if let Some(frequency) = frequency {
                prefs.frequency_mode = frequency;
            }
            if time.is_some() {
                if prefs.frequency_mode != FrequencyMode::OneShotAtTime {
                    return Err(ValidationError::InvalidValue {
                        field: "time".into(),
                        message: format!(
                            "only applies to the custom frequency (current: {})",
                            prefs.frequency_mode
                        ),
                    }
                    .into());
                }
                prefs.custom_time = time;
            }
            if let Some(tone) = tone {
                prefs.tone = tone;
            }
            if let Some(key) = api_key {
                prefs.api_key = key.trim().to_string();
            }
            if let Some(model) = model {
                prefs.model_id = model.trim().to_string();
            }
            if let Some(enabled) = enabled {
                prefs.notifications_enabled = enabled;
            }

            ctx.store.set_preferences(&prefs)?;
            println!("Preferences saved.");

            let outcome = ctx.controller()?.apply_preferences(&prefs).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        PrefsAction::Reset => {
            let prefs = Preferences::default();
            ctx.store.set_preferences(&prefs)?;
            let outcome = ctx.controller()?.apply_preferences(&prefs).await?;
            println!("Preferences reset to defaults.");
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
