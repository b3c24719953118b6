//! Compiled-in default table and key descriptions.
//!
//! Every key listed here is guaranteed to be present in the cache after the
//! store initialises; absent keys are seeded into the backing store on
//! first load.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::value::SettingsValue;

static DEFAULTS: Lazy<BTreeMap<&'static str, SettingsValue>> = Lazy::new(|| {
    BTreeMap::from([
        ("sleep.delay_ticks", SettingsValue::Long(100)),
        ("sleep.check_interval", SettingsValue::Long(20)),
        ("sleep.percentage_required", SettingsValue::Double(0.5)),
        ("sleep.minimum_players_for_vote", SettingsValue::Int(2)),
        ("sleep.single_player_skip", SettingsValue::Bool(true)),
        ("sleep.show_progress_messages", SettingsValue::Bool(true)),
        (
            "sleep.skip_message",
            SettingsValue::Text("☀ The night has been skipped! Good morning!".to_string()),
        ),
        ("welcome.enabled", SettingsValue::Bool(true)),
        (
            "welcome.message",
            SettingsValue::Text("Welcome to the server, {player}!".to_string()),
        ),
        ("welcome.log_joins", SettingsValue::Bool(true)),
        ("admin.default_fly_speed", SettingsValue::Float(0.1)),
        ("admin.default_walk_speed", SettingsValue::Float(0.2)),
        ("admin.max_fly_speed", SettingsValue::Float(1.0)),
        ("admin.max_walk_speed", SettingsValue::Float(1.0)),
        ("admin.invulnerability_timeout", SettingsValue::Long(300_000)),
        ("admin.announce_god_mode", SettingsValue::Bool(true)),
        ("admin.announce_invulnerability", SettingsValue::Bool(true)),
        ("plugin.debug_mode", SettingsValue::Bool(false)),
        ("plugin.language", SettingsValue::Text("en".to_string())),
    ])
});

/// Compiled-in default for `key`, if one is registered.
#[must_use]
pub fn default_for(key: &str) -> Option<SettingsValue> {
    DEFAULTS.get(key).cloned()
}

/// Iterate the full compiled-in default table in key order.
pub fn all_defaults() -> impl Iterator<Item = (&'static str, &'static SettingsValue)> {
    DEFAULTS.iter().map(|(key, value)| (*key, value))
}

/// Operator-facing documentation for `key`.
#[must_use]
pub fn describe(key: &str) -> String {
    match key {
        "sleep.delay_ticks" => "Delay in ticks before checking sleep conditions".to_string(),
        "sleep.check_interval" => "Interval in ticks between sleep progress checks".to_string(),
        "sleep.percentage_required" => {
            "Percentage of players required to sleep (0.0-1.0)".to_string()
        }
        "sleep.minimum_players_for_vote" => {
            "Minimum players online before requiring vote".to_string()
        }
        "sleep.single_player_skip" => "Allow single player to skip night instantly".to_string(),
        "sleep.show_progress_messages" => "Show sleep progress messages to players".to_string(),
        "sleep.skip_message" => "Message shown when night is skipped".to_string(),
        "welcome.enabled" => "Enable welcome messages for joining players".to_string(),
        "welcome.message" => "Welcome message template ({player} for player name)".to_string(),
        "welcome.log_joins" => "Log player joins to console".to_string(),
        "plugin.debug_mode" => "Enable debug logging".to_string(),
        "plugin.language" => "Plugin language (en, es, fr, etc.)".to_string(),
        _ => format!("Configuration value for {key}"),
    }
}
