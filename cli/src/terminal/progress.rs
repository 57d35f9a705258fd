use indicatif::ProgressStyle;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use netroute_common::events::{LogLevel, LogLine, RunEvent};

/// Renders run events until the sending side is dropped.
///
/// Progress moves the bar, log lines are printed above it at their own level.
pub async fn render(mut events: UnboundedReceiver<RunEvent>, total: usize) {
    let span = info_span!("routes", indicatif.pb_show = true);
    span.pb_set_style(&bar_style());
    span.pb_set_length(total as u64);

    let bar = span.clone();
    async move {
        while let Some(event) = events.recv().await {
            match event {
                RunEvent::Progress { completed, total } => {
                    bar.pb_set_length(total as u64);
                    bar.pb_set_position(completed as u64);
                }
                RunEvent::Log(line) => emit(&line),
            }
        }
    }
    .instrument(span)
    .await
}

fn emit(line: &LogLine) {
    match line.level {
        LogLevel::Info => info!("{}", line.message),
        LogLevel::Warn => warn!("{}", line.message),
        LogLevel::Error => error!("{}", line.message),
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} routes [{bar:32.green/bright_black}] {pos}/{len}")
        .map(|style| style.progress_chars("━╸ "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn render_returns_once_sender_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(RunEvent::Log(LogLine::info("processing hostname a.example"))).unwrap();
        tx.send(RunEvent::Progress { completed: 1, total: 1 }).unwrap();
        drop(tx);

        render(rx, 1).await;
    }
}
