//! Message builders for every response the bot sends.
//!
//! Builders that need data take the application state and degrade to an
//! error message when a collaborator fails; the formatting itself lives in
//! small pure helpers.

use chrono::{Datelike, Months, NaiveDate};
use tracing::{error, warn};

use valet_slack::blockkit::{Block, Element, SelectOption, Text};

use crate::actions::{
    BUTTON_CONFIG, BUTTON_DONE, BUTTON_FORECAST, BUTTON_HOLIDAY_CALENDAR, BUTTON_MANUAL,
    BUTTON_STANDUP_LIST, BUTTON_STANDUP_SUMMARY, SELECT_STANDUP_REMINDER, SELECT_WEEKLY_DIGEST,
};
use crate::clock;
use crate::error::ServerError;
use crate::services::Holiday;
use crate::standup;
use crate::state::AppState;

/// Placeholder shown while a slow response is being prepared.
pub fn progress() -> Vec<Block> {
    vec![Block::section(Text::plain(
        "⏱️ Working on it, one moment...",
    ))]
}

/// Overview of every supported feature with run buttons.
pub fn manual() -> Vec<Block> {
    vec![
        Block::header(Text::plain("⭐️ Supported features")),
        Block::divider(),
        manual_row("*Holiday calendar*    `/valet holidays`", BUTTON_HOLIDAY_CALENDAR),
        Block::divider(),
        manual_row("*Short-term weather*    `/valet weather`", BUTTON_FORECAST),
        Block::divider(),
        manual_row("*Standup history*    `/valet standup`", BUTTON_STANDUP_LIST),
        Block::divider(),
        manual_row("*Standup summary*    `/valet summary`", BUTTON_STANDUP_SUMMARY),
        Block::divider(),
        manual_row("*Channel notifications*    `/valet config`", BUTTON_CONFIG),
        Block::divider(),
        done_button(),
    ]
}

/// Guidance shown for unrecognized command text.
pub fn guide() -> Vec<Block> {
    vec![
        Block::header(Text::plain("🚫 Unknown command.")),
        Block::divider(),
        Block::actions(vec![
            Element::button(BUTTON_MANUAL, Text::plain("📋 Show features")),
            Element::button(BUTTON_DONE, Text::plain("✅ Done")),
        ]),
    ]
}

/// Error report asking the user to pass details to the developers.
pub fn error_message(error: &ServerError) -> Vec<Block> {
    vec![
        Block::header(Text::plain(
            "⚠️ Something went wrong. Please share this with the developers.",
        )),
        Block::section(Text::markdown(format!("```{error}```"))),
    ]
}

/// Holiday calendar for the current and the next month.
pub async fn holiday_calendar(state: &AppState) -> Vec<Block> {
    let now = clock::now();
    let months = [now, now + Months::new(1)];
    let mut fields = Vec::with_capacity(months.len());
    for month in months {
        let (year, month) = (month.year(), month.month());
        let holidays = match state.services().holidays.list_holidays(year, month).await {
            Ok(holidays) => holidays,
            Err(e) => {
                error!(error = %e, year, month, "failed to list holidays");
                return error_message(&e);
            }
        };
        fields.push(holiday_field(year, month, &holidays));
    }

    vec![
        Block::header(Text::plain("🗓️ Holiday calendar")),
        Block::divider(),
        Block::section_fields(fields),
        Block::divider(),
        done_button(),
    ]
}

/// Ultra-short-term weather forecast, one line per hour.
pub async fn forecast(state: &AppState) -> Vec<Block> {
    let entries = match state.services().forecast.ultra_short_forecast().await {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = %e, "failed to get ultra-short-term forecast");
            return error_message(&e);
        }
    };

    let mut blocks = Vec::with_capacity(entries.len() + 4);
    blocks.push(Block::header(Text::plain("🌤️ Weather")));
    blocks.push(Block::divider());
    for entry in &entries {
        let Some(time) = clock::parse_forecast_time(&entry.time) else {
            warn!(time = %entry.time, "failed to parse forecast time");
            continue;
        };
        blocks.push(Block::section(Text::markdown(format!(
            "*{}* / temperature: `{}°C`, sky: `{}`, precipitation: `{}`",
            time.format("%H:%M"),
            entry.temperature,
            entry.sky,
            entry.precipitation,
        ))));
    }
    blocks.push(Block::divider());
    blocks.push(done_button());
    blocks
}

/// The user's standup notes since the most recent Monday.
pub async fn standup_list(state: &AppState, channel: &str, user: &str) -> Vec<Block> {
    let messages = standup::collect_messages(state, channel, user).await;
    standup_list_blocks(&messages)
}

/// Generated summary of the user's standup notes this week.
pub async fn standup_summary(state: &AppState, channel: &str, user: &str) -> Vec<Block> {
    let messages = standup::collect_messages(state, channel, user).await;

    let mut texts = Vec::with_capacity(messages.len() + 1);
    texts.push("Summarize this week's standup notes accurately and concisely.".to_string());
    for (ts, text) in &messages {
        let day = clock::from_timestamp(*ts);
        texts.push(format!("{} = {}", clock::weekday_label(&day), text));
    }

    match state.services().generator.generate(&texts).await {
        Ok(result) => vec![
            Block::header(Text::plain("🤖 Standup summary")),
            Block::divider(),
            Block::section(Text::markdown(format!("```{result}```"))),
            Block::divider(),
            done_button(),
        ],
        Err(e) => {
            error!(error = %e, "failed to generate summary");
            error_message(&e)
        }
    }
}

/// Per-channel notification settings with ON/OFF selects.
pub async fn channel_config(state: &AppState, channel: &str) -> Vec<Block> {
    let settings = match state.services().settings.channel_settings(channel).await {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, channel, "failed to load channel settings");
            return error_message(&e);
        }
    };

    vec![
        Block::header(Text::plain("⭐️ Valet settings")),
        Block::divider(),
        config_toggle_section(
            "Standup reminder",
            SELECT_STANDUP_REMINDER,
            settings.standup_reminder,
        ),
        config_toggle_section(
            "Weekly digest",
            SELECT_WEEKLY_DIGEST,
            settings.weekly_digest,
        ),
        done_button(),
    ]
}

fn manual_row(text: &str, action_id: &str) -> Block {
    Block::section_with_accessory(
        Text::markdown(text),
        Element::button(action_id, Text::plain("Run")),
    )
}

fn holiday_field(year: i32, month: u32, holidays: &[Holiday]) -> Text {
    let mut sorted: Vec<&Holiday> = holidays.iter().collect();
    sorted.sort_by_key(|holiday| holiday.day);

    let mut text = format!("🗓️ *Holidays in {year}-{month:02}*\n\n");
    for holiday in &sorted {
        let label = NaiveDate::from_ymd_opt(year, month, holiday.day)
            .map(|date| clock::weekday_name(date.weekday()))
            .unwrap_or("?");
        text.push_str(&format!("{:02} ({label}) {}\n", holiday.day, holiday.name));
    }
    if sorted.is_empty() {
        text.push_str("No holidays this month 😥");
    }

    Text::markdown(text)
}

fn standup_list_blocks(messages: &[(f64, String)]) -> Vec<Block> {
    let mut fields = Vec::with_capacity(messages.len());
    for (ts, text) in messages {
        let day = clock::from_timestamp(*ts);
        fields.push(Text::markdown(format!(
            "`{}`\n```{}```",
            clock::weekday_label(&day),
            text
        )));
    }

    vec![
        Block::header(Text::plain("📝 Standup history")),
        Block::divider(),
        Block::section_fields(fields),
        Block::divider(),
        done_button(),
    ]
}

fn config_toggle_section(title: &str, action_id: &str, on: bool) -> Block {
    Block::section_with_accessory(
        Text::markdown(title),
        Element::static_select(
            action_id,
            Text::plain(if on { "ON" } else { "OFF" }),
            vec![
                SelectOption::new(Text::plain("ON"), "on"),
                SelectOption::new(Text::plain("OFF"), "off"),
            ],
        ),
    )
}

fn done_button() -> Block {
    Block::actions(vec![Element::button(BUTTON_DONE, Text::plain("✅ Done"))])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_json(blocks: &[Block]) -> serde_json::Value {
        serde_json::to_value(blocks).expect("serialize blocks")
    }

    #[test]
    fn test_should_build_progress_message() {
        let value = block_json(&progress());
        assert_eq!(value[0]["type"], "section");
        assert!(value[0]["text"]["text"]
            .as_str()
            .expect("text")
            .contains("Working on it"));
    }

    #[test]
    fn test_should_list_every_feature_in_manual() {
        let value = block_json(&manual());
        let rendered = value.to_string();
        for action in [
            BUTTON_HOLIDAY_CALENDAR,
            BUTTON_FORECAST,
            BUTTON_STANDUP_LIST,
            BUTTON_STANDUP_SUMMARY,
            BUTTON_CONFIG,
        ] {
            assert!(rendered.contains(action), "manual is missing {action}");
        }
    }

    #[test]
    fn test_should_offer_manual_and_done_in_guide() {
        let value = block_json(&guide());
        assert_eq!(value[0]["type"], "header");
        assert_eq!(value[2]["elements"][0]["action_id"], BUTTON_MANUAL);
        assert_eq!(value[2]["elements"][1]["action_id"], BUTTON_DONE);
    }

    #[test]
    fn test_should_render_error_details_in_code_block() {
        let err = ServerError::Portal("service key rejected".into());
        let value = block_json(&error_message(&err));
        assert!(value[1]["text"]["text"]
            .as_str()
            .expect("text")
            .contains("service key rejected"));
    }

    #[test]
    fn test_should_sort_holidays_within_field() {
        let field = holiday_field(
            2025,
            3,
            &[
                Holiday { day: 3, name: "Substitute holiday".into() },
                Holiday { day: 1, name: "Independence Movement Day".into() },
            ],
        );
        let first = field.text.find("01 (").expect("day 1 present");
        let second = field.text.find("03 (").expect("day 3 present");
        assert!(first < second);
    }

    #[test]
    fn test_should_note_month_without_holidays() {
        let field = holiday_field(2025, 4, &[]);
        assert!(field.text.contains("No holidays"));
    }

    #[test]
    fn test_should_render_standup_entries_as_fields() {
        // 2025-01-06 00:00 UTC is a Monday.
        let blocks = standup_list_blocks(&[(1736121600.0, "fixed the reconnect loop".into())]);
        let value = block_json(&blocks);
        let field = value[2]["fields"][0]["text"].as_str().expect("field text");
        assert!(field.contains("fixed the reconnect loop"));
        assert!(field.starts_with("`Mon`"));
    }

    #[test]
    fn test_should_show_current_state_in_toggle_placeholder() {
        let on = config_toggle_section("Standup reminder", SELECT_STANDUP_REMINDER, true);
        let value = serde_json::to_value(&on).expect("serialize");
        assert_eq!(value["accessory"]["placeholder"]["text"], "ON");
        assert_eq!(value["accessory"]["options"][1]["value"], "off");

        let off = config_toggle_section("Weekly digest", SELECT_WEEKLY_DIGEST, false);
        let value = serde_json::to_value(&off).expect("serialize");
        assert_eq!(value["accessory"]["placeholder"]["text"], "OFF");
    }
}
