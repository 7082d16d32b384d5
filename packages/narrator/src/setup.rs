//! Process-level setup: tracing subscriber and progress bar styling.

use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{NarratorError, Result};

/// Install the global subscriber. `RUST_LOG` still applies on top of the
/// default `narrator=info` (or `narrator=debug` when `verbose`).
///
/// A second call is a no-op.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose { "narrator=debug" } else { "narrator=info" };
    let directive = directive
        .parse()
        .map_err(|e| NarratorError::Config(format!("tracing directive: {e}")))?;

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
    Ok(())
}

/// A step counter for one pipeline phase, or a hidden bar when disabled.
pub fn phase_bar(enabled: bool, label: &'static str) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let style = ProgressStyle::with_template("{msg:>10} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
        .map_err(|e| NarratorError::Config(format!("progress template: {e}")))?
        .progress_chars("█▉▊▋▌▍▎▏ ");
    let bar = ProgressBar::new(0).with_style(style);
    bar.set_message(label);
    Ok(bar)
}
