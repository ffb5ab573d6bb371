use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::task::JoinHandle;

use crate::args::PositiveUsize;
use crate::http::DispatchCounters;
use crate::shutdown::ShutdownSender;

const REFRESH_INTERVAL: Duration = Duration::from_millis(250);
const BAR_WIDTH: usize = 30;

/// Redraws a completion bar on stderr until shutdown is broadcast.
///
/// Does nothing when stderr is not a terminal.
pub(crate) fn setup_progress_indicator(
    counters: Arc<DispatchCounters>,
    goal: PositiveUsize,
    shutdown_tx: &ShutdownSender,
) -> JoinHandle<()> {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let style = ProgressStyle::new(BAR_WIDTH);
    let goal = u64::try_from(goal.get()).unwrap_or(u64::MAX);

    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }

        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    if render_progress_line(&style, counters.completed(), goal).is_err() {
                        break;
                    }
                    if finish_progress_line().is_err() {
                        break;
                    }
                    break;
                }
                _ = ticker.tick() => {
                    if render_progress_line(&style, counters.completed(), goal).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn render_progress_line(
    style: &ProgressStyle,
    current: u64,
    goal: u64,
) -> Result<(), std::io::Error> {
    let line = build_progress_line(style, current, goal);

    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// `[#####-----] 50.00% | 50/100`
pub(super) fn build_progress_line(
    style: &ProgressStyle,
    current: u64,
    goal: u64,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let goal = goal.max(1);
    let current = current.min(goal);

    let current_u128 = u128::from(current);
    let size_u128 = u128::from(u64::try_from(size).unwrap_or(u64::MAX));
    let goal_u128 = u128::from(goal);

    let scaled = current_u128
        .saturating_mul(size_u128)
        .checked_div(goal_u128)
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let percent_x100 = current_u128
        .saturating_mul(10_000)
        .checked_div(goal_u128)
        .unwrap_or(0);
    let percent_whole = percent_x100.checked_div(100).unwrap_or(0);
    let percent_frac = percent_x100.checked_rem(100).unwrap_or(0);
    let percent_text = format!(" {}.{:02}%", percent_whole, percent_frac);
    let count_text = format!(" | {}/{}", current, goal);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );

    vec![
        ProgressSegment::plain(progress_bar),
        ProgressSegment::colored(percent_text, Color::Cyan),
        ProgressSegment::colored(count_text, Color::Yellow),
    ]
}

pub(super) struct ProgressStyle {
    size: usize,
    begin: String,
    end: String,
    fill: String,
    empty: String,
}

impl ProgressStyle {
    pub(super) fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[".to_owned(),
            end: "]".to_owned(),
            fill: "#".to_owned(),
            empty: "-".to_owned(),
        }
    }
}

pub(super) struct ProgressSegment {
    pub(super) text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
