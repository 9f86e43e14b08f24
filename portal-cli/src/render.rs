// 把控制器的页面状态画成终端文本

use portal_core::page::{MessageKind, PortalState, StatusMessage, View};

pub fn status_line(message: &StatusMessage) -> String {
    let icon = match message.kind {
        MessageKind::Info => "ℹ️ ",
        MessageKind::Success => "✅",
        MessageKind::Error => "❌",
    };
    format!("{} {}", icon, message.text)
}

fn toggle(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// One numbered line per listed network, the selection marked.
pub fn network_lines(state: &PortalState) -> Vec<String> {
    state
        .networks
        .iter()
        .enumerate()
        .map(|(i, network)| {
            let marker = if state.selected.as_deref() == Some(network.ssid.as_str()) {
                "▶"
            } else {
                " "
            };
            format!(" {} {:>2}. {}", marker, i + 1, network)
        })
        .collect()
}

/// Full page, as shown after a command.
pub fn page(state: &PortalState) -> String {
    let mut out = String::new();
    match state.view {
        View::AccessPoint => {
            out.push_str("📶 Access point configuration\n");
            if state.scanning {
                out.push_str("   ⏳ scanning...\n");
            } else if state.networks.is_empty() {
                out.push_str("   (no networks listed, run `scan`)\n");
            }
            for line in network_lines(state) {
                out.push_str(&line);
                out.push('\n');
            }
            out.push_str(&format!(
                "   [connect: {}] [scan: {}]\n",
                toggle(state.connect_enabled),
                toggle(state.scan_enabled)
            ));
        }
        View::Station => {
            out.push_str("🕒 Connected\n");
            out.push_str(&format!("   SSID: {}\n", state.station.ssid));
            out.push_str(&format!("   IP:   {}\n", state.station.ip));
            out.push_str(&format!("   Time: {}\n", state.station.time));
        }
    }
    if let Some(prompt) = &state.prompt {
        out.push_str(&format!("🔑 Password required for '{}'\n", prompt.ssid));
        if let Some(validation) = &prompt.validation {
            out.push_str(&format!("   {}\n", validation));
        }
    }
    if let Some(status) = &state.status {
        out.push_str(&status_line(status));
        out.push('\n');
    }
    out
}

/// Lines worth printing when the page goes from `old` to `new`.
pub fn changes(old: &PortalState, new: &PortalState) -> Vec<String> {
    let mut lines = Vec::new();
    if old.view != new.view {
        lines.push(match new.view {
            View::Station => format!("🔀 Station view: {} ({})", new.station.ssid, new.station.ip),
            View::AccessPoint => "🔀 Access point view".to_string(),
        });
    }
    if new.networks != old.networks && !new.networks.is_empty() {
        lines.push(format!("📶 {} networks found:", new.networks.len()));
        lines.extend(network_lines(new));
    }
    if new.view == View::Station && old.station.time != new.station.time && !new.station.time.is_empty() {
        lines.push(format!("🕒 {}", new.station.time));
    }
    if old.status != new.status {
        if let Some(status) = &new.status {
            lines.push(status_line(status));
        }
    }
    lines
}

/// `select 2` picks by list position, anything else is taken as an SSID.
pub fn resolve_selection(state: &PortalState, input: &str) -> String {
    match input.parse::<usize>() {
        Ok(n) if (1..=state.networks.len()).contains(&n) => state.networks[n - 1].ssid.clone(),
        _ => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::structs::{NetworkEntry, Security};

    fn listed() -> PortalState {
        let mut state = PortalState::default();
        state.replace_networks(vec![
            NetworkEntry {
                ssid: "CafeGuest".into(),
                security: Security::Open,
                signal: 60,
            },
            NetworkEntry {
                ssid: "HomeNet".into(),
                security: Security::Secured,
                signal: 80,
            },
        ]);
        state
    }

    #[test]
    fn access_point_page_lists_networks() {
        let mut state = listed();
        state.selected = Some("CafeGuest".into());

        let text = page(&state);
        assert!(text.contains("    1. HomeNet (Secured, 80%)"));
        assert!(text.contains(" ▶  2. CafeGuest (Open, 60%)"));
        assert!(text.contains("[connect: off] [scan: on]"));
    }

    #[test]
    fn selection_by_position_or_name() {
        let state = listed();
        assert_eq!(resolve_selection(&state, "1"), "HomeNet");
        assert_eq!(resolve_selection(&state, "3"), "3");
        assert_eq!(resolve_selection(&state, "CafeGuest"), "CafeGuest");
    }

    #[test]
    fn time_updates_are_reported() {
        let mut old = PortalState::default();
        old.view = View::Station;
        old.station.time = "14:02:03".into();
        let mut new = old.clone();
        new.station.time = "14:02:13".into();

        assert_eq!(changes(&old, &new), vec!["🕒 14:02:13".to_string()]);
        assert!(changes(&new, &new).is_empty());
    }

    #[test]
    fn replaced_list_is_reported_once() {
        let old = PortalState::default();
        let new = listed();

        let lines = changes(&old, &new);
        assert_eq!(
            lines,
            vec![
                "📶 2 networks found:".to_string(),
                "    1. HomeNet (Secured, 80%)".to_string(),
                "    2. CafeGuest (Open, 60%)".to_string(),
            ]
        );
        assert!(changes(&new, &new).is_empty());
    }

    #[test]
    fn new_messages_are_reported() {
        let old = PortalState::default();
        let mut new = old.clone();
        new.show_message("Network scan failed. Please try again.", MessageKind::Error);

        assert_eq!(
            changes(&old, &new),
            vec!["❌ Network scan failed. Please try again.".to_string()]
        );
    }
}
