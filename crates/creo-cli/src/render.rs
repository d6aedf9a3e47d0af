use std::io::IsTerminal;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anstyle::{AnsiColor, Effects, RgbColor, Style};
use creo_installer::{ColorHint, LaunchStatus, StatusObserver};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputStyle {
    Plain,
    Rich,
}

pub fn resolve_output_style(stdout_is_tty: bool, no_color: bool) -> OutputStyle {
    if stdout_is_tty && !no_color {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub fn current_output_style() -> OutputStyle {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    resolve_output_style(std::io::stdout().is_terminal(), no_color)
}

pub fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let badge = match status {
                "ok" => "[OK]",
                "warn" => "[WARN]",
                "err" => "[ERR]",
                _ => "[INFO]",
            };
            format!("{badge} {message}")
        }
    }
}

/// Prints installer notifications to the terminal, with a spinner while a run
/// is in flight in rich mode.
pub struct TerminalPresenter {
    style: OutputStyle,
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalPresenter {
    pub fn new(style: OutputStyle) -> Self {
        Self {
            style,
            spinner: Mutex::new(None),
        }
    }

    fn println(&self, line: &str) {
        let spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        match spinner.as_ref() {
            Some(progress_bar) => progress_bar.println(line),
            None => println!("{line}"),
        }
    }

    fn spin(&self, message: String) {
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let progress_bar = spinner.get_or_insert_with(|| {
            let progress_bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
                progress_bar.set_style(style.tick_chars("<^>v "));
            }
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            progress_bar
        });
        progress_bar.set_message(message);
    }

    fn stop_spinner(&self) {
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(progress_bar) = spinner.take() {
            progress_bar.finish_and_clear();
        }
    }
}

impl StatusObserver for TerminalPresenter {
    fn on_status_changed(&self, status: LaunchStatus, label: &str, color: Option<ColorHint>) {
        match self.style {
            OutputStyle::Plain => {
                if status != LaunchStatus::DownloadFailed {
                    println!("{label}");
                }
            }
            OutputStyle::Rich if status.is_idle() => self.stop_spinner(),
            OutputStyle::Rich => self.spin(colorize(hint_style(color), label)),
        }
    }

    fn on_package_installed(&self, title: &str) {
        self.println(&render_status_line(
            self.style,
            "ok",
            &format!("installed {title}"),
        ));
    }

    fn on_notice(&self, text: &str, color: ColorHint) {
        let line = match self.style {
            OutputStyle::Plain => text.to_string(),
            OutputStyle::Rich => colorize(hint_style(Some(color)).effects(Effects::BOLD), text),
        };
        self.println(&line);
    }

    fn on_error(&self, message: &str) {
        self.stop_spinner();
        eprintln!("{}", render_status_line(self.style, "err", message));
    }
}

fn hint_style(color: Option<ColorHint>) -> Style {
    match color {
        Some(hint) => {
            Style::new().fg_color(Some(RgbColor(hint.red, hint.green, hint.blue).into()))
        }
        None => info_style(),
    }
}

fn info_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::BrightBlue.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
