use super::LogRecord;
use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Destination for records received from the host.
pub trait LogSink: Send + Sync + std::fmt::Debug {
    fn record(&self, record: LogRecord);
}

/// Prints errors to stderr and everything else to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSink {
    colors: bool,
}

impl TerminalSink {
    pub fn new(colors: bool) -> Self {
        Self { colors }
    }

    /// A sink that never writes ANSI escapes.
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// Text printed for `record`, styled when colours are on.
    pub fn format(&self, record: &LogRecord) -> String {
        match record {
            LogRecord::Error(report) if self.colors => format!(
                "{} {} on line {}\n{}\n\t{}\n{}\n\t{}",
                "Error:".red().bold(),
                report.message.red(),
                report.display_line(),
                "Context:".dimmed(),
                report.context.join("\n\t"),
                "Stack:".dimmed(),
                report.stack.join("\n\t")
            ),
            _ => record.render(),
        }
    }
}

impl LogSink for TerminalSink {
    fn record(&self, record: LogRecord) {
        let text = self.format(&record);
        match record {
            LogRecord::Error(_) => eprintln!("{}", text),
            LogRecord::Value(_) => println!("{}", text),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    /// Records received so far, oldest first.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: LogRecord) {
        self.records.lock().push(record);
    }
}
