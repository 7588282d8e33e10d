//! Findings and perf data gathered by one check pass

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::perfdata::{PerfData, PerfDatum};
use crate::threshold::Verdict;

/// Classification of a finding, and of a whole result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    /// Nagios plugin exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Accumulator for a single check invocation.
///
/// Not synchronised: create one per pass and read it back afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    oks: Vec<String>,
    warnings: Vec<String>,
    criticals: Vec<String>,
    perf_data: PerfData,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ok(&mut self, message: impl Into<String>) {
        self.oks.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_critical(&mut self, message: impl Into<String>) {
        self.criticals.push(message.into());
    }

    pub fn add_perf_data(&mut self, datum: PerfDatum) {
        self.perf_data.push(datum);
    }

    /// Files `message` under the category named by `status`
    pub fn add(&mut self, status: Status, message: impl Into<String>) {
        match status {
            Status::Ok => self.add_ok(message),
            Status::Warning => self.add_warning(message),
            Status::Critical => self.add_critical(message),
        }
    }

    /// Files an evaluator verdict: the classified `message`, or
    /// `invalid_message` as a Critical when the thresholds were rejected.
    pub fn add_verdict(
        &mut self,
        verdict: Verdict,
        message: impl Into<String>,
        invalid_message: impl Into<String>,
    ) {
        match verdict {
            Verdict::Status(status) => self.add(status, message),
            Verdict::InvalidThresholds => self.add_critical(invalid_message),
        }
    }

    pub fn oks(&self) -> &[String] {
        &self.oks
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn criticals(&self) -> &[String] {
        &self.criticals
    }

    pub fn perf_data(&self) -> &PerfData {
        &self.perf_data
    }

    pub fn messages(&self, category: Status) -> &[String] {
        match category {
            Status::Ok => &self.oks,
            Status::Warning => &self.warnings,
            Status::Critical => &self.criticals,
        }
    }

    pub fn is_empty(&self, category: Status) -> bool {
        self.messages(category).is_empty()
    }

    /// Worst category holding at least one finding
    pub fn status(&self) -> Status {
        if !self.criticals.is_empty() {
            Status::Critical
        } else if !self.warnings.is_empty() {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    /// The full perf-data line
    pub fn render(&self) -> String {
        self.perf_data.to_string()
    }
}
