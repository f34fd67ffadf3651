//! Query vocabulary for the logger web API: commands, modes, output formats
//! and file action codes.
//!
//! Mode parameters are carried by the [`QueryMode`] variants themselves, so a
//! query that is missing its required parameter cannot be expressed at all.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

/// Timestamp layout the device expects for `since-time` and `date-range`
/// parameters: naive local time, microsecond precision, no zone suffix.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Format a timestamp the way the device expects it.
pub fn format_device_time(time: &NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a timestamp in the device's wire layout.
pub fn parse_device_time(s: &str) -> Option<NaiveDateTime> {
    // The device omits the fractional part on some responses.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Web API command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    DataQuery,
    BrowseSymbols,
    ClockCheck,
    ClockSet,
    SetValue,
    FileControl,
    ListFiles,
}

impl Command {
    /// Wire name as it appears in the `command=` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::DataQuery => "dataquery",
            Command::BrowseSymbols => "browsesymbols",
            Command::ClockCheck => "ClockCheck",
            Command::ClockSet => "ClockSet",
            Command::SetValue => "setvaluex",
            Command::FileControl => "FileControl",
            Command::ListFiles => "ListFiles",
        }
    }

    /// Only a subset of commands accept a `format` parameter. Appending it
    /// anywhere else is a defect the URL builder refuses structurally.
    pub fn accepts_format(&self) -> bool {
        matches!(
            self,
            Command::DataQuery | Command::BrowseSymbols | Command::ClockCheck | Command::ClockSet
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response format requested from the device.
///
/// `json` is the only format the client interprets; the rest are passed
/// through as opaque text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    Html,
    #[default]
    Json,
    Toa5,
    Tob1,
    Xml,
}

impl OutputFormat {
    /// Wire name as it appears in the `format=` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Toa5 => "toa5",
            OutputFormat::Tob1 => "tob1",
            OutputFormat::Xml => "xml",
        }
    }

    /// Whether the device accepts this format for the given command.
    /// `browsesymbols` only produces html, json and xml.
    pub fn supported_by(&self, command: Command) -> bool {
        match command {
            Command::BrowseSymbols => {
                matches!(self, OutputFormat::Html | OutputFormat::Json | OutputFormat::Xml)
            }
            _ => command.accepts_format(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            "toa5" => Ok(OutputFormat::Toa5),
            "tob1" => Ok(OutputFormat::Tob1),
            "xml" => Ok(OutputFormat::Xml),
            other => Err(format!("unknown format '{other}'")),
        }
    }
}

/// Record selection strategy for a `dataquery` call.
///
/// Each variant carries exactly the parameters its mode requires, so the
/// mode/parameter contract is enforced by construction rather than checked
/// at call time.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMode {
    /// The newest `records` records.
    MostRecent { records: u32 },
    /// Everything recorded at or after `time`.
    SinceTime { time: NaiveDateTime },
    /// Everything at or after the given record id.
    SinceRecord { record: u64 },
    /// Records between `start` and `end` inclusive.
    DateRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// Everything recorded within the trailing interval.
    Backfill { interval: Duration },
}

impl QueryMode {
    pub fn most_recent(records: u32) -> Self {
        QueryMode::MostRecent { records }
    }

    pub fn since_time(time: NaiveDateTime) -> Self {
        QueryMode::SinceTime { time }
    }

    pub fn since_record(record: u64) -> Self {
        QueryMode::SinceRecord { record }
    }

    pub fn date_range(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        QueryMode::DateRange { start, end }
    }

    pub fn backfill(interval: Duration) -> Self {
        QueryMode::Backfill { interval }
    }

    /// Wire name as it appears in the `mode=` query parameter.
    pub fn wire_name(&self) -> &'static str {
        match self {
            QueryMode::MostRecent { .. } => "most-recent",
            QueryMode::SinceTime { .. } => "since-time",
            QueryMode::SinceRecord { .. } => "since-record",
            QueryMode::DateRange { .. } => "date-range",
            QueryMode::Backfill { .. } => "backfill",
        }
    }

    /// Value of the `p1` parameter. Durations are sent as whole seconds,
    /// truncated, never rounded.
    pub(crate) fn p1(&self) -> String {
        match self {
            QueryMode::MostRecent { records } => records.to_string(),
            QueryMode::SinceTime { time } => format_device_time(time),
            QueryMode::SinceRecord { record } => record.to_string(),
            QueryMode::DateRange { start, .. } => format_device_time(start),
            QueryMode::Backfill { interval } => interval.as_secs().to_string(),
        }
    }

    /// Value of the `p2` parameter; only `date-range` has one.
    pub(crate) fn p2(&self) -> Option<String> {
        match self {
            QueryMode::DateRange { end, .. } => Some(format_device_time(end)),
            _ => None,
        }
    }
}

/// File control action codes defined by the logger firmware.
///
/// The numeric values are an opaque external contract; the client only
/// encodes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FileAction {
    CompileRun = 1,
    SetRunOnPowerUp = 2,
    MakeHidden = 3,
    Delete = 4,
    FormatDevice = 5,
    CompileRunLeavePowerUp = 6,
    StopProgram = 7,
    StopProgramDelete = 8,
}

impl FileAction {
    /// Numeric code as sent in the `action=` query parameter.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}
