//! Diagnostic logging on stderr.
//!
//! Verbosity comes from `RUST_LOG` (default `warn`). The TUI runs with logging
//! silenced so events never tear the alternate screen.

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;

const DEFAULT_DIRECTIVE: &str = "warn";

/// One-symbol-per-level line format: `[+] loaded model artifact path=...`.
pub struct DesistFormatter;

impl<S, N> FormatEvent<S, N> for DesistFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let symbol = match *event.metadata().level() {
            Level::TRACE => "[ ]",
            Level::DEBUG => "[?]",
            Level::INFO => "[+]",
            Level::WARN => "[*]",
            Level::ERROR => "[-]",
        };
        write!(writer, "{symbol} ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(silent: bool) {
    let filter = if silent {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(DesistFormatter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn lines_carry_level_symbols() {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(Level::TRACE)
            .with_writer(out.clone())
            .event_format(DesistFormatter)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(features = 9, "loaded model artifact");
            tracing::warn!("scoring failed");
            tracing::error!("artifact load failed");
            tracing::debug!("scored applicant");
        });

        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("[+] loaded model artifact"));
        assert!(lines[0].contains("features=9"));
        assert_eq!(lines[1], "[*] scoring failed");
        assert_eq!(lines[2], "[-] artifact load failed");
        assert_eq!(lines[3], "[?] scored applicant");
    }

    #[test]
    fn init_can_run_twice() {
        init(true);
        init(false);
    }
}
