//! Spoken feedback through an external TTS command
//!
//! Sentences are queued and spoken one after another so confirmations never
//! talk over each other. Without a command the sentences are logged.

use std::path::Path;

use birokt_voice::SpeechSynthesizer;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug)]
enum SpeechJob {
    Tone,
    Say { locale: String, text: String },
}

pub struct CommandSpeech {
    tx: mpsc::UnboundedSender<SpeechJob>,
}

impl CommandSpeech {
    /// Start the playback task on the current runtime
    pub fn spawn(command: Vec<String>, tone_command: Vec<String>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SpeechJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    SpeechJob::Tone => {
                        if !tone_command.is_empty() {
                            run(&tone_command, &[]).await;
                        }
                    }
                    SpeechJob::Say { locale, text } => {
                        if command.is_empty() {
                            info!("🔊 {}", text);
                            continue;
                        }
                        let args: Vec<String> = command[1..]
                            .iter()
                            .map(|arg| arg.replace("{locale}", &locale))
                            .chain(std::iter::once(text))
                            .collect();
                        run(&command[..1], &args).await;
                    }
                }
            }
            debug!("Speech task stopped");
        });

        Self { tx }
    }

    fn enqueue(&self, job: SpeechJob) {
        if self.tx.send(job).is_err() {
            warn!("Speech task gone, dropping feedback");
        }
    }
}

/// Run `command` (program + args) followed by `extra` and wait for it
async fn run(command: &[String], extra: &[String]) {
    let Some((program, args)) = command.split_first() else {
        return;
    };

    let result = Command::new(program)
        .args(args)
        .args(extra)
        .kill_on_drop(true)
        .status()
        .await;

    match result {
        Ok(status) if status.success() => {}
        Ok(status) => warn!("{} exited with {}", display(program), status),
        Err(e) => warn!("Failed to run {}: {}", display(program), e),
    }
}

fn display(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

impl SpeechSynthesizer for CommandSpeech {
    fn play_unlock_tone(&self) {
        self.enqueue(SpeechJob::Tone);
    }

    fn speak(&self, locale: &str, text: &str) {
        self.enqueue(SpeechJob::Say {
            locale: locale.to_string(),
            text: text.to_string(),
        });
    }
}
