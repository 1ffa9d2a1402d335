// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{AnimationSpeed, FontSize, Settings, ToastPosition};
use crate::store::RecordStore;
use crate::utils::pretty_table;
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

/// Parses a lowercase/kebab-case enum value through its serde name.
fn parse_named<T: DeserializeOwned>(what: &str, s: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(s.trim().to_lowercase()))
        .map_err(|_| anyhow!("Invalid {} '{}'", what, s))
}

fn describe(settings: &Settings) -> Vec<Vec<String>> {
    let t = &settings.theme;
    let n = &settings.notifications;
    let name = |v: serde_json::Value| v.as_str().map(str::to_string).unwrap_or_default();
    vec![
        vec!["theme.fontSize".into(), name(serde_json::json!(t.font_size))],
        vec![
            "theme.animationSpeed".into(),
            name(serde_json::json!(t.animation_speed)),
        ],
        vec!["notifications.enabled".into(), n.enabled.to_string()],
        vec!["notifications.sound".into(), n.sound.to_string()],
        vec!["notifications.duration".into(), format!("{} ms", n.duration)],
        vec![
            "notifications.position".into(),
            name(serde_json::json!(n.position)),
        ],
    ]
}

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let settings = store.settings();
            if sub.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(settings)?);
            } else {
                println!("{}", pretty_table(&["Setting", "Value"], describe(settings)));
            }
        }
        Some(("set", sub)) => {
            let font_size = sub
                .get_one::<String>("font-size")
                .map(|s| parse_named::<FontSize>("font size", s))
                .transpose()?;
            let speed = sub
                .get_one::<String>("animation-speed")
                .map(|s| parse_named::<AnimationSpeed>("animation speed", s))
                .transpose()?;
            let position = sub
                .get_one::<String>("position")
                .map(|s| parse_named::<ToastPosition>("toast position", s))
                .transpose()?;
            let enabled = sub.get_one::<bool>("notifications").copied();
            let sound = sub.get_one::<bool>("sound").copied();
            let duration = sub.get_one::<u32>("duration").copied();

            store.update_settings(|s| {
                if let Some(v) = font_size {
                    s.theme.font_size = v;
                }
                if let Some(v) = speed {
                    s.theme.animation_speed = v;
                }
                if let Some(v) = position {
                    s.notifications.position = v;
                }
                if let Some(v) = enabled {
                    s.notifications.enabled = v;
                }
                if let Some(v) = sound {
                    s.notifications.sound = v;
                }
                if let Some(v) = duration {
                    s.notifications.duration = v;
                }
            })?;
            println!("Settings saved");
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serde_names() {
        assert_eq!(
            parse_named::<ToastPosition>("position", "Bottom-Left").unwrap(),
            ToastPosition::BottomLeft
        );
        assert_eq!(
            parse_named::<FontSize>("font size", "large").unwrap(),
            FontSize::Large
        );
        assert!(parse_named::<AnimationSpeed>("speed", "warp").is_err());
    }

    #[test]
    fn describes_defaults() {
        let rows = describe(&Settings::default());
        assert_eq!(rows[0], vec!["theme.fontSize".to_string(), "medium".to_string()]);
        assert_eq!(rows[5][1], "top-right");
    }
}
