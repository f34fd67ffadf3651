//! Deterministic query-string construction for the logger web API.
//!
//! The device tolerates any parameter order, but the builder always emits
//! fragments in one fixed order so that built URLs are stable and can be
//! compared bit-for-bit:
//!
//! `command, expr, file, file2, action, uri, value, mode, format, time, p1, p2`
//!
//! Building a URL never fails; query validation happens in the client before
//! a builder is ever constructed.

use url::Url;

use crate::query::{Command, FileAction, OutputFormat, QueryMode};

/// Builder for one device request URL.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    command: Command,
    expr: Option<String>,
    file: Option<String>,
    file2: Option<String>,
    action: Option<u8>,
    uri: Option<String>,
    value: Option<String>,
    mode: Option<&'static str>,
    format: Option<OutputFormat>,
    time: Option<String>,
    p1: Option<String>,
    p2: Option<String>,
}

impl UrlBuilder {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            expr: None,
            file: None,
            file2: None,
            action: None,
            uri: None,
            value: None,
            mode: None,
            format: None,
            time: None,
            p1: None,
            p2: None,
        }
    }

    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn file2(mut self, file2: impl Into<String>) -> Self {
        self.file2 = Some(file2.into());
        self
    }

    pub fn action(mut self, action: FileAction) -> Self {
        self.action = Some(action.code());
        self
    }

    /// Address a table, or a single field within it, as `uri=dl:<table>[.<field>]`.
    pub fn symbol(mut self, table: &str, field: Option<&str>) -> Self {
        self.uri = Some(match field {
            Some(field) => format!("dl:{table}.{field}"),
            None => format!("dl:{table}"),
        });
        self
    }

    /// Address the data logger root, as `uri=dl:` (symbol browse, clock).
    pub fn root_symbol(mut self) -> Self {
        self.uri = Some("dl:".to_string());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Apply a query mode: sets `mode`, `p1` and (for date ranges) `p2`.
    pub fn query_mode(mut self, mode: &QueryMode) -> Self {
        self.mode = Some(mode.wire_name());
        self.p1 = Some(mode.p1());
        self.p2 = mode.p2();
        self
    }

    /// Request an output format.
    ///
    /// Silently ignored for commands that do not take a `format` parameter;
    /// the client rejects those combinations before building, this keeps the
    /// parameter out of the URL even if that check is bypassed.
    pub fn format(mut self, format: OutputFormat) -> Self {
        if self.command.accepts_format() {
            self.format = Some(format);
        }
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    /// Render the query string in the fixed fragment order.
    pub fn query_string(&self) -> String {
        let mut parts = vec![format!("command={}", self.command.as_str())];
        if let Some(ref expr) = self.expr {
            parts.push(format!("expr={expr}"));
        }
        if let Some(ref file) = self.file {
            parts.push(format!("file={file}"));
        }
        if let Some(ref file2) = self.file2 {
            parts.push(format!("file2={file2}"));
        }
        if let Some(action) = self.action {
            parts.push(format!("action={action}"));
        }
        if let Some(ref uri) = self.uri {
            parts.push(format!("uri={uri}"));
        }
        if let Some(ref value) = self.value {
            parts.push(format!("value={value}"));
        }
        if let Some(mode) = self.mode {
            parts.push(format!("mode={mode}"));
        }
        if let Some(format) = self.format {
            parts.push(format!("format={format}"));
        }
        if let Some(ref time) = self.time {
            parts.push(format!("time={time}"));
        }
        if let Some(ref p1) = self.p1 {
            parts.push(format!("p1={p1}"));
        }
        if let Some(ref p2) = self.p2 {
            parts.push(format!("p2={p2}"));
        }
        parts.join("&")
    }

    /// Attach the query to the device base URL.
    pub fn build(&self, base: &Url) -> Url {
        let mut url = base.clone();
        url.set_path("/");
        url.set_query(Some(&self.query_string()));
        url
    }
}
