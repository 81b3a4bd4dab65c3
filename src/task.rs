//! # Task Documents
//!
//! Helpers for reading and rewriting individual Ansible tasks. A task is a
//! YAML mapping; the only ones this crate cares about invoke the template
//! module, either as `template:` or as `ansible.builtin.template:`.
//!
//! ## Rewriting a template task
//!
//! `rewrite_template_task` never touches its input. It builds a new mapping
//! in which:
//!
//! - `dest` is prefixed with `{{ template_dest_prefix | default('') }}`,
//! - the render tag appears exactly once in `tags`,
//! - `delegate_to: localhost` and `run_once: true` are forced,
//! - `notify` is gone.
//!
//! Key order of the original task is preserved; keys the task did not have
//! are appended at the end.
//!
//! Module arguments may be a mapping (`template: {src: .., dest: ..}`) or the
//! free-form `key=value` string (`template: src=a.j2 dest=/etc/a.conf`).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::defaults::{
    dest_prefix_expr, DIRECTORY_MODE, LOCAL_HOST, RENDER_TAG, TEMPLATE_MODULE,
    TEMPLATE_MODULE_FQCN,
};
use crate::document;
use crate::error::{Error, Result};

/// Start of a `dest=` argument, capturing an opening quote if any.
static FREE_FORM_DEST_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(^|\s)dest=(["']?)"#).expect("valid dest regex"));

/// Which template alias a task uses. The short alias wins if both are present.
pub fn template_module_key(task: &Mapping) -> Option<&'static str> {
    [TEMPLATE_MODULE, TEMPLATE_MODULE_FQCN]
        .into_iter()
        .find(|key| task.contains_key(*key))
}

pub fn is_template_task(task: &Mapping) -> bool {
    template_module_key(task).is_some()
}

/// The destination path of a template task, if it declares one as a string.
pub fn template_dest(task: &Mapping) -> Option<String> {
    let key = template_module_key(task)?;
    match task.get(key)? {
        Value::Mapping(args) => args.get("dest").and_then(Value::as_str).map(str::to_string),
        Value::String(args) => split_free_form(args)
            .into_iter()
            .find_map(|arg| arg.strip_prefix("dest="))
            .map(|dest| unquote(dest).to_string()),
        _ => None,
    }
}

/// Prepend the output-location expression to `path`, unless already there.
pub fn with_dest_prefix(path: &str) -> String {
    let prefix = dest_prefix_expr();
    if path.starts_with(&prefix) {
        path.to_string()
    } else {
        format!("{}{}", prefix, path)
    }
}

/// The directory a destination path lives in.
///
/// A destination ending in `/` names the directory itself. Returns `None`
/// for a bare file name, which needs no directory.
pub fn dest_dir(dest: &str) -> Option<String> {
    if let Some(dir) = dest.strip_suffix('/').filter(|d| !d.is_empty()) {
        return Some(dir.to_string());
    }
    Path::new(dest)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|p| !p.is_empty())
}

/// Build a rewritten copy of a template task.
///
/// Fails only when the template module's arguments have a shape the
/// rewriter cannot interpret (a sequence, a number, ...); the caller then
/// keeps the original task.
pub fn rewrite_template_task(task: &Mapping) -> Result<Mapping> {
    let module_key = template_module_key(task)
        .ok_or_else(|| Error::internal("task does not invoke the template module"))?;

    let mut rewritten = Mapping::new();
    for (key, value) in task {
        let new_value = match key.as_str() {
            Some("notify") => continue,
            Some(k) if k == module_key => rewrite_module_args(value)?,
            Some("tags") => with_render_tag(value),
            Some("delegate_to") => Value::from(LOCAL_HOST),
            Some("run_once") => Value::Bool(true),
            _ => document::deep_clone(value),
        };
        rewritten.insert(document::deep_clone(key), new_value);
    }

    if !rewritten.contains_key("tags") {
        rewritten.insert(Value::from("tags"), render_tags());
    }
    rewritten
        .entry(Value::from("delegate_to"))
        .or_insert_with(|| Value::from(LOCAL_HOST));
    rewritten
        .entry(Value::from("run_once"))
        .or_insert(Value::Bool(true));

    Ok(rewritten)
}

/// Build the task that creates the directory holding `dest`.
///
/// Returns `None` when `dest` is a bare file name.
pub fn directory_task(dest: &str) -> Option<Mapping> {
    let dir = dest_dir(dest)?;

    let mut file_args = Mapping::new();
    file_args.insert(Value::from("path"), Value::from(with_dest_prefix(&dir)));
    file_args.insert(Value::from("state"), Value::from("directory"));
    file_args.insert(Value::from("mode"), Value::from(DIRECTORY_MODE));

    let mut task = Mapping::new();
    task.insert(
        Value::from("name"),
        Value::from(format!("Ensure directory exists for {}", dest)),
    );
    task.insert(Value::from("file"), Value::Mapping(file_args));
    task.insert(Value::from("delegate_to"), Value::from(LOCAL_HOST));
    task.insert(Value::from("run_once"), Value::Bool(true));
    task.insert(Value::from("tags"), render_tags());
    Some(task)
}

/// Turn a parsed task file into its ordered list of task mappings.
///
/// Accepted shapes: a sequence of tasks, a single task mapping, or a mapping
/// holding a `tasks` sequence. Non-mapping entries are skipped. An empty
/// document or empty mapping yields no tasks.
pub fn normalize_tasks(doc: Value, origin: &str) -> Result<Vec<Mapping>> {
    match doc {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => Ok(only_mappings(items)),
        Value::Mapping(map) => {
            if let Some(Value::Sequence(items)) = map.get("tasks") {
                return Ok(only_mappings(items.clone()));
            }
            if map.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![map])
            }
        }
        other => Err(Error::Parse {
            path: origin.to_string(),
            message: format!(
                "expected a task list or task mapping, found {}",
                document::type_name(&other)
            ),
        }),
    }
}

fn only_mappings(items: Vec<Value>) -> Vec<Mapping> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Mapping(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Split free-form module arguments on whitespace.
///
/// Quoted values and `{{ .. }}` / `{% .. %}` spans stay in one piece, so
/// `dest={{ conf_dir }}/a.conf` is a single argument.
fn split_free_form(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut chars = args.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' if depth == 0 => quote = Some(c),
                '{' if matches!(next, Some('{') | Some('%')) => {
                    depth += 1;
                    chars.next();
                }
                '}' | '%' if depth > 0 && next == Some('}') => {
                    depth -= 1;
                    chars.next();
                }
                c if c.is_whitespace() && depth == 0 => {
                    if let Some(s) = start.take() {
                        parts.push(&args[s..i]);
                    }
                    continue;
                }
                _ => {}
            },
        }
        start.get_or_insert(i);
    }

    if let Some(s) = start {
        parts.push(&args[s..]);
    }
    parts
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn rewrite_module_args(args: &Value) -> Result<Value> {
    match args {
        Value::Mapping(map) => {
            let mut rewritten = document::clone_mapping(map);
            if let Some(dest) = map.get("dest").and_then(Value::as_str) {
                rewritten.insert(Value::from("dest"), Value::from(with_dest_prefix(dest)));
            }
            Ok(Value::Mapping(rewritten))
        }
        Value::String(free_form) => {
            let prefix = dest_prefix_expr();
            let already_prefixed = ["", "\"", "'"]
                .iter()
                .any(|quote| free_form.contains(&format!("dest={}{}", quote, prefix)));
            if already_prefixed {
                return Ok(args.clone());
            }
            // The prefix expression contains no `$`
            let replacement = format!("${{1}}dest=${{2}}{}", prefix);
            Ok(Value::from(
                FREE_FORM_DEST_START
                    .replacen(free_form, 1, replacement.as_str())
                    .into_owned(),
            ))
        }
        Value::Null => Ok(Value::Null),
        other => Err(Error::internal(format!(
            "unsupported template arguments of type {}",
            document::type_name(other)
        ))),
    }
}

/// Add the render tag to an existing `tags` value.
///
/// A comma-separated string is split into a list first; any other non-list
/// value is replaced by the single render tag.
fn with_render_tag(tags: &Value) -> Value {
    let mut list: Vec<Value> = match tags {
        Value::Sequence(seq) => seq.iter().map(document::deep_clone).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Value::from)
            .collect(),
        _ => Vec::new(),
    };

    if !document::contains_str(&list, RENDER_TAG) {
        list.push(Value::from(RENDER_TAG));
    }
    Value::Sequence(list)
}

fn render_tags() -> Value {
    Value::Sequence(vec![Value::from(RENDER_TAG)])
}
