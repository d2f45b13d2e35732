//! Terminal implementation of the installer host

use std::io::{BufRead, Write};

use async_trait::async_trait;
use s1_installer::install::{Choice, InstallHost, Notification, Prompt, Severity};
use tracing::{error, info, warn};

/// Asks prompts on stdin and logs notifications
pub struct ConsoleHost;

#[async_trait]
impl InstallHost for ConsoleHost {
    async fn confirm(&self, prompt: &Prompt) -> Choice {
        let prompt = prompt.clone();
        let answer = tokio::task::spawn_blocking(move || ask(&prompt)).await;
        // a crashed reader counts as no answer
        answer.unwrap_or(Choice::Decline)
    }

    fn notify(&self, notification: Notification) {
        let detail = notification.detail.unwrap_or_default();
        match notification.severity {
            Severity::Info => info!("{} {}", notification.message, detail),
            Severity::Warning => warn!("{} {}", notification.message, detail),
            Severity::Error => error!("{} {}", notification.message, detail),
        }
    }

    fn dismiss(&self, _id: &str) {}
}

fn ask(prompt: &Prompt) -> Choice {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "\n== {} ==\n{}", prompt.title, prompt.body);

    let Some(ref decline) = prompt.decline_label else {
        let _ = write!(stdout, "[{}] (press enter) ", prompt.confirm_label);
        let _ = stdout.flush();
        let _ = std::io::stdin().lock().read_line(&mut String::new());
        return Choice::Confirm;
    };

    loop {
        let _ = write!(stdout, "[{}/{}] ", prompt.confirm_label, decline);
        let _ = stdout.flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => return prompt.unattended,
            Ok(_) => {}
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case(&prompt.confirm_label) {
            return Choice::Confirm;
        }
        if answer.eq_ignore_ascii_case(decline) {
            return Choice::Decline;
        }
    }
}
