//! # Inventory Localization
//!
//! Turns an inventory into one where every host is reached through the local
//! connection plugin, so nothing the engine does can touch a real machine.
//! Two shapes are handled:
//!
//! - **Flat** (INI-style) text, rewritten line by line. Only lines under a
//!   host-bearing section change, and on those only the connection attribute
//!   is added or replaced.
//! - **Structured** group trees (YAML or JSON, including the output of
//!   `ansible-inventory --list --yaml`), rebuilt recursively through
//!   `hosts` and `children`.
//!
//! Both functions are pure; reading the source and writing the result is the
//! job of `phases::localize`.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::defaults::{CONNECTION_VAR, LOCAL_CONNECTION};
use crate::document;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[(.*?)\]\s*$").expect("valid section regex"));

static CONNECTION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(^|\s)({}=)\S+", CONNECTION_VAR)).expect("valid connection regex")
});

/// Tracks which section of a flat inventory the current line belongs to.
#[derive(Debug)]
struct SectionState {
    name: String,
    host_bearing: bool,
}

impl SectionState {
    /// Lines before the first header belong to the ungrouped hosts.
    fn ungrouped() -> Self {
        Self {
            name: String::new(),
            host_bearing: true,
        }
    }

    /// `[web]` holds hosts; `[web:vars]` and `[web:children]` do not.
    fn enter(&mut self, header: &str) {
        self.name = header.trim().to_string();
        self.host_bearing = !self.name.contains(':');
    }
}

/// Force the local connection on every host line of a flat inventory.
///
/// Blank lines, comments (`#` or `;`), section headers and everything under a
/// `[group:qualifier]` section pass through byte-for-byte. Line endings are
/// preserved.
pub fn localize_flat(content: &str) -> String {
    let mut state = SectionState::ungrouped();
    let mut localized = String::with_capacity(content.len() + 64);

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let ending = &line[body.len()..];
        let trimmed = body.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            localized.push_str(line);
            continue;
        }

        // `[web:vars]  # note` is still a header
        let (code, _) = split_inline_comment(body);
        if let Some(caps) = SECTION_HEADER.captures(code) {
            state.enter(&caps[1]);
            localized.push_str(line);
            continue;
        }

        if !state.host_bearing {
            localized.push_str(line);
            continue;
        }

        localized.push_str(&localize_host_line(body));
        localized.push_str(ending);
    }

    localized
}

/// Rewrite a single host line, keeping any trailing comment at the end.
fn localize_host_line(body: &str) -> String {
    let (code, comment) = split_inline_comment(body);
    let code_end = code.trim_end();
    let spacing = &code[code_end.len()..];

    let new_code = if CONNECTION_ATTR.is_match(code_end) {
        CONNECTION_ATTR
            .replace_all(code_end, format!("${{1}}${{2}}{}", LOCAL_CONNECTION).as_str())
            .into_owned()
    } else {
        format!("{} {}={}", code_end, CONNECTION_VAR, LOCAL_CONNECTION)
    };

    format!("{}{}{}", new_code, spacing, comment)
}

/// Split `host a=b  # note` into `("host a=b  ", "# note")`.
fn split_inline_comment(body: &str) -> (&str, &str) {
    let mut prev_is_space = false;
    for (i, c) in body.char_indices() {
        if c == '#' && prev_is_space {
            return body.split_at(i);
        }
        prev_is_space = c.is_whitespace();
    }
    (body, "")
}

/// Force the local connection on every host of a structured inventory.
///
/// The top level maps group names to groups. A group's `hosts` mapping gets
/// the connection variable set on each host, creating the variable mapping
/// when a host has none; its `children` are processed the same way at any
/// depth. All other keys and values are copied unchanged. The input is not
/// modified.
pub fn localize_structured(inventory: &Value) -> Value {
    match inventory {
        Value::Mapping(groups) => Value::Mapping(
            groups
                .iter()
                .map(|(name, group)| (document::deep_clone(name), localize_group(group)))
                .collect(),
        ),
        other => document::deep_clone(other),
    }
}

fn localize_group(group: &Value) -> Value {
    let Value::Mapping(fields) = group else {
        return document::deep_clone(group);
    };

    let mut localized = Mapping::new();
    for (key, value) in fields {
        let new_value = match (key.as_str(), value) {
            (Some("hosts"), Value::Mapping(hosts)) => Value::Mapping(localize_hosts(hosts)),
            (Some("children"), Value::Mapping(_)) => localize_structured(value),
            _ => document::deep_clone(value),
        };
        localized.insert(document::deep_clone(key), new_value);
    }
    Value::Mapping(localized)
}

fn localize_hosts(hosts: &Mapping) -> Mapping {
    hosts
        .iter()
        .map(|(host, vars)| {
            let mut vars = match vars {
                Value::Mapping(vars) => document::clone_mapping(vars),
                _ => Mapping::new(),
            };
            vars.insert(Value::from(CONNECTION_VAR), Value::from(LOCAL_CONNECTION));
            (document::deep_clone(host), Value::Mapping(vars))
        })
        .collect()
}

/// Count the distinct host entries in a structured inventory.
pub fn structured_host_count(inventory: &Value) -> usize {
    fn visit(groups: &Value, seen: &mut std::collections::HashSet<String>) {
        let Value::Mapping(groups) = groups else {
            return;
        };
        for group in groups.values() {
            if let Some(hosts) = document::get_mapping(group, "hosts") {
                seen.extend(hosts.keys().filter_map(|h| h.as_str().map(str::to_string)));
            }
            if let Some(children) = group.get("children") {
                visit(children, seen);
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    visit(inventory, &mut seen);
    seen.len()
}
