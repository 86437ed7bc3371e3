// UI layer: banners, prompts and progress bars for the terminal.
// Prompts use `dialoguer`, progress uses `indicatif`, colors `crossterm`.

use crate::manifest::TransferRecord;
use crate::orchestrator::{AbortReason, RunObserver, RunReport};
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

const RULE_WIDTH: usize = 50;

/// Problems with what the user typed, reported before anything runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("breed cannot be empty")]
    EmptyBreed,

    #[error("token cannot be empty")]
    EmptyToken,
}

pub fn print_banner() {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Dog image backup");
    println!("{}", "=".repeat(RULE_WIDTH));
}

/// Trim and lowercase a breed name; reject blank input.
pub fn normalize_breed(raw: &str) -> Result<String, InputError> {
    let breed = raw.trim().to_lowercase();
    if breed.is_empty() {
        return Err(InputError::EmptyBreed);
    }
    Ok(breed)
}

pub fn normalize_token(raw: &str) -> Result<String, InputError> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(InputError::EmptyToken);
    }
    Ok(token.to_string())
}

pub fn prompt_breed() -> Result<String> {
    // `allow_empty` so blank input reaches validation instead of re-prompting.
    let raw: String = Input::new()
        .with_prompt("Dog breed")
        .allow_empty(true)
        .interact_text()?;
    Ok(normalize_breed(&raw)?)
}

/// Ask for the storage token without echoing it.
pub fn prompt_token() -> Result<String> {
    let raw = Password::new()
        .with_prompt("Yandex.Disk token")
        .allow_empty_password(true)
        .interact()?;
    Ok(normalize_token(&raw)?)
}

/// Progress bars for a run: one over all breeds when there is more than
/// one, and one per breed over its images.
#[derive(Default)]
pub struct ProgressReporter {
    breeds: Option<ProgressBar>,
    current: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:20} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }
}

impl RunObserver for ProgressReporter {
    fn breeds_selected(&mut self, count: usize) {
        if count > 1 {
            let bar = ProgressBar::new(count as u64);
            bar.set_style(Self::style());
            bar.set_message("Breeds");
            self.breeds = Some(bar);
        }
    }

    fn breed_started(&mut self, breed: &str, candidates: usize) {
        let bar = ProgressBar::new(candidates as u64);
        bar.set_style(Self::style());
        bar.set_message(format!("Uploading {}", breed));
        self.current = Some(bar);
    }

    fn transfer_recorded(&mut self, _record: &TransferRecord) {
        if let Some(bar) = &self.current {
            bar.inc(1);
        }
    }

    fn breed_finished(&mut self, _breed: &str) {
        if let Some(bar) = self.current.take() {
            bar.finish_and_clear();
        }
        if let Some(bar) = &self.breeds {
            bar.inc(1);
            if bar.position() >= bar.length().unwrap_or(0) {
                bar.finish();
            }
        }
    }
}

pub fn print_completed(report: &RunReport, remote_folder: &str, log_path: &str) {
    println!();
    println!("{}", "✅ Backup finished!".green());
    println!("Images saved to: {}/", remote_folder);
    println!("Results saved to: {}", report.manifest_path.display());
    println!("Log saved to: {}", log_path);
    println!(
        "Transfers: {} accepted, {} failed",
        report.succeeded(),
        report.failed()
    );
    if !report.skipped_breeds.is_empty() {
        println!("Skipped breeds: {}", report.skipped_breeds.join(", "));
    }
    if report.unresolved > 0 {
        println!("Images not found in catalog: {}", report.unresolved);
    }
}

pub fn print_aborted(reason: &AbortReason) {
    println!();
    println!("{} {}", "❌ Backup stopped:".red(), reason);
    println!("No results file was written.");
}

pub fn print_failure(err: &anyhow::Error) {
    eprintln!();
    eprintln!("{} {:#}", "❌ An error occurred:".red(), err);
    eprintln!("Check the token and your internet connection.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breed_is_trimmed_and_lowercased() {
        assert_eq!(normalize_breed("  Husky \n").unwrap(), "husky");
        assert_eq!(normalize_breed("   "), Err(InputError::EmptyBreed));
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_eq!(normalize_token(" abc "), Ok("abc".to_string()));
        assert_eq!(normalize_token("\t"), Err(InputError::EmptyToken));
    }
}
