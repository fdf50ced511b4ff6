use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

use assetronics_common::log::SUCCESS_TARGET;

use crate::terminal::print::PRINT_TARGET;

pub struct AgentFormatter;

impl<S, N> FormatEvent<S, N> for AgentFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() == PRINT_TARGET {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
            match *meta.level() {
                Level::INFO if meta.target() == SUCCESS_TARGET => ("[+]", |s| s.green().bold()),
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[*]", |s| s.cyan().bold()),
                Level::WARN => ("[!]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

        write!(writer, "{} ", color_func(symbol.into()))?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Filter used when `RUST_LOG` is not set.
fn default_directives(verbose: u8, quiet: u8) -> String {
    let level = match (verbose, quiet) {
        (_, q) if q > 0 => "warn",
        (0, _) => "info",
        (1, _) => "debug",
        _ => "trace",
    };
    format!("{level},hyper_util=warn,reqwest=warn,rustls=warn")
}

/// Printed output and success milestones pass whatever the base filter says.
fn with_always_on(filter: EnvFilter) -> anyhow::Result<EnvFilter> {
    Ok(filter
        .add_directive(format!("{PRINT_TARGET}=info").parse()?)
        .add_directive(format!("{SUCCESS_TARGET}=info").parse()?))
}

/// Installs the global subscriber. Progress bars are drawn only for spans
/// carrying `indicatif.pb_show`.
pub fn init(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let filter = with_always_on(match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(verbose, quiet))?,
    })?;

    let indicatif_layer = IndicatifLayer::new();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(AgentFormatter)
        .with_writer(indicatif_layer.get_stderr_writer());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .try_init()?;

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_level() {
        assert!(default_directives(0, 0).starts_with("info,"));
        assert!(default_directives(1, 0).starts_with("debug,"));
        assert!(default_directives(3, 0).starts_with("trace,"));
        assert!(default_directives(0, 1).starts_with("warn,"));
    }

    #[test]
    fn default_directives_parse() {
        for (v, q) in [(0, 0), (1, 0), (2, 0), (0, 2)] {
            assert!(EnvFilter::try_new(default_directives(v, q)).is_ok());
        }
    }

    #[test]
    fn quiet_keeps_milestones_and_print_output() {
        let base = EnvFilter::try_new(default_directives(0, 1)).unwrap();
        let subscriber = tracing_subscriber::registry().with(with_always_on(base).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: SUCCESS_TARGET, Level::INFO));
            assert!(tracing::enabled!(target: PRINT_TARGET, Level::INFO));
            assert!(!tracing::enabled!(target: "assetronics_core::scanner", Level::INFO));
            assert!(tracing::enabled!(target: "assetronics_core::scanner", Level::WARN));
        });
    }
}
