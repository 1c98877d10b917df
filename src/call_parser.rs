//! Extracts tool calls from free-form model output.
//!
//! Models emit calls in several conventions: a `TOOL_CALL:` marker, fenced or backticked
//! JSON, bare JSON objects, and `TEXT2SQL:` directives. Every convention has its own pass;
//! results are merged and de-duplicated by `(name, args)` in first-seen order.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::types::{SQL_TOOL_NAME, ToolCall};

static TOOL_CALL_MARKER: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"TOOL_CALL:\s*(\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\})").expect("tool call pattern")
});

static FENCED_OR_BACKTICKED: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r#"```json\s*(\{[^}]*"action"[^}]*"text2sql"[^}]*\})\s*```|```json\s*(\{[^}]*\})\s*```|→\s*`(\{[^`]*\})`|`(\{[^`]*\})`"#,
  )
  .expect("fenced pattern")
});

static BARE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(\{[^{}]*"action"[^{}]*"text2sql"[^{}]*\})"#).expect("directive pattern")
});

static BARE_CALL: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(\{[^{}]*"name"[^{}]*"args"[^{}]*(?:\{[^{}]*\}[^{}]*)*\})"#)
    .expect("bare call pattern")
});

static TEXT2SQL_MARKER: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"TEXT2SQL:\s*(\{[^{}]*"action"[^{}]*"text2sql"[^{}]*(?:\{[^{}]*\}[^{}]*)*\})"#)
    .expect("text2sql marker pattern")
});

/// Which object shapes a pass accepts.
#[derive(Debug, Clone, Copy)]
enum Accept {
  Call,
  Directive,
  Either,
}

/// Parses every tool call found in `text`. Never fails; malformed fragments are skipped.
#[instrument(level = "trace", skip(text))]
pub fn parse_tool_calls(text: &str) -> Vec<ToolCall> {
  let passes: [(&Regex, Accept); 5] = [
    (&TOOL_CALL_MARKER, Accept::Call),
    (&FENCED_OR_BACKTICKED, Accept::Either),
    (&BARE_DIRECTIVE, Accept::Directive),
    (&BARE_CALL, Accept::Call),
    (&TEXT2SQL_MARKER, Accept::Directive),
  ];

  let mut found = Vec::new();
  for (pattern, accept) in passes {
    for caps in pattern.captures_iter(text) {
      for fragment in caps.iter().skip(1).flatten() {
        if let Some(call) = decode_fragment(fragment.as_str(), accept) {
          found.push(call);
        }
      }
    }
  }

  let mut seen = HashSet::new();
  found.retain(|c| seen.insert((c.name.clone(), c.args.clone())));
  debug!(count = found.len(), "parsed tool calls");
  found
}

fn decode_fragment(fragment: &str, accept: Accept) -> Option<ToolCall> {
  let obj = match serde_json::from_str::<Value>(fragment.trim()) {
    Ok(Value::Object(obj)) => obj,
    _ => return None,
  };
  let directive = obj.get("action").and_then(Value::as_str) == Some(SQL_TOOL_NAME);
  match accept {
    Accept::Directive if directive => Some(directive_call(&obj)),
    Accept::Either if directive => Some(directive_call(&obj)),
    Accept::Call | Accept::Either => generic_call(&obj),
    Accept::Directive => None,
  }
}

fn directive_call(obj: &Map<String, Value>) -> ToolCall {
  let args = serde_json::to_string(obj).unwrap_or_default();
  ToolCall::new(SQL_TOOL_NAME, args)
}

fn generic_call(obj: &Map<String, Value>) -> Option<ToolCall> {
  let name = obj.get("name")?.as_str()?;
  let args = obj.get("args")?;
  Some(ToolCall::new(name, flatten_args(args)))
}

/// Turns any JSON `args` value into the natural-language string handlers expect.
pub(crate) fn flatten_args(args: &Value) -> String {
  match args {
    Value::String(s) => s.clone(),
    Value::Object(map) => match (map.get("종목명"), map.get("날짜")) {
      (Some(name), Some(date)) => format!("{}의 {} 시가는?", display_value(name), display_value(date)),
      _ => literal(args),
    },
    other => display_value(other),
  }
}

/// Display form: strings unquoted, everything else as its literal.
fn display_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => literal(other),
  }
}

/// Literal form, e.g. `{'date': '2025-11-06', 'limit': 10}`.
fn literal(value: &Value) -> String {
  match value {
    Value::Null => "None".to_string(),
    Value::Bool(true) => "True".to_string(),
    Value::Bool(false) => "False".to_string(),
    Value::Number(n) => n.to_string(),
    Value::String(s) => quote(s),
    Value::Array(items) => {
      let inner: Vec<String> = items.iter().map(literal).collect();
      format!("[{}]", inner.join(", "))
    }
    Value::Object(map) => {
      let inner: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{}: {}", quote(k), literal(v)))
        .collect();
      format!("{{{}}}", inner.join(", "))
    }
  }
}

fn quote(s: &str) -> String {
  let escaped = s.replace('\\', "\\\\").replace('\n', "\\n");
  if s.contains('\'') && !s.contains('"') {
    format!("\"{escaped}\"")
  } else {
    format!("'{}'", escaped.replace('\'', "\\'"))
  }
}
