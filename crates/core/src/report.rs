use core::fmt::{self, Write};

/// Bounded size of one report line, terminator included.
pub const LOG_BUFFER_SIZE: usize = 256;
const LINE_CAPACITY: usize = LOG_BUFFER_SIZE - 1;

/// Where human-readable progress lines go. Transport and framing are the
/// sink's business; the engine hands over one line at a time.
pub trait ReportSink {
    fn log_line(&mut self, line: &str);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn log_line(&mut self, line: &str) {
        (**self).log_line(line)
    }
}

/// Fan a line out to two sinks.
impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn log_line(&mut self, line: &str) {
        self.0.log_line(line);
        self.1.log_line(line);
    }
}

/// A formatted line clipped at [`LOG_BUFFER_SIZE`], like `snprintf`.
#[derive(Debug, Default)]
pub struct LogLine {
    text: heapless::String<LINE_CAPACITY>,
    truncated: bool,
}

impl LogLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl Write for LogLine {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.text.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

pub fn emit<S: ReportSink + ?Sized>(sink: &mut S, args: fmt::Arguments<'_>) {
    let mut line = LogLine::new();
    // LogLine::write_str never fails; overflow is recorded instead.
    let _ = line.write_fmt(args);
    sink.log_line(line.as_str());
}

/// `report!(sink, "fmt", args..)` formats one bounded line into `sink`.
#[macro_export]
macro_rules! report {
    ($sink:expr, $($arg:tt)*) => {
        $crate::report::emit(&mut *$sink, format_args!($($arg)*))
    };
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn log_line(&mut self, _line: &str) {}
}

#[cfg(feature = "std")]
pub use host::{CaptureSink, TracingSink};

#[cfg(feature = "std")]
mod host {
    use super::ReportSink;

    /// Forwards each line to `tracing` at INFO.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct TracingSink;

    impl ReportSink for TracingSink {
        fn log_line(&mut self, line: &str) {
            tracing::info!(target: "secoc", "{}", line);
        }
    }

    /// Keeps every line in memory.
    #[derive(Debug, Default, Clone)]
    pub struct CaptureSink {
        pub lines: Vec<String>,
    }

    impl CaptureSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.lines.iter().any(|l| l.contains(needle))
        }
    }

    impl ReportSink for CaptureSink {
        fn log_line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_macro() {
        let mut sink = CaptureSink::new();
        crate::report!(&mut sink, "ret={}", -0x6100);
        assert_eq!(sink.lines, vec!["ret=-24832".to_string()]);
    }

    #[test]
    fn test_line_is_bounded() {
        let mut line = LogLine::new();
        let long = "x".repeat(LOG_BUFFER_SIZE * 2);
        write!(line, "{}", long).unwrap();
        assert!(line.is_truncated());
        assert_eq!(line.as_str().len(), LOG_BUFFER_SIZE - 1);
    }

    #[test]
    fn test_tee_sink() {
        let mut pair = (CaptureSink::new(), CaptureSink::new());
        pair.log_line("hello");
        assert!(pair.0.contains("hello"));
        assert!(pair.1.contains("hello"));
    }
}
