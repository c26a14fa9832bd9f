//! Spoken feedback
//!
//! Platforms that gate audio output behind a user gesture need a short tone
//! before the first utterance is spoken. The tone plays once per wake (each
//! time listening starts), then every confirmation is spoken as one
//! sentence in the session locale.

use std::sync::Arc;

use tracing::debug;

/// Platform speech synthesis
pub trait SpeechSynthesizer: Send + Sync {
    /// Short tone that unlocks audio output
    fn play_unlock_tone(&self);

    fn speak(&self, locale: &str, text: &str);
}

pub struct AudioFeedback {
    synth: Arc<dyn SpeechSynthesizer>,
    locale: String,
    unlocked: bool,
}

impl AudioFeedback {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>, locale: impl Into<String>) -> Self {
        Self {
            synth,
            locale: locale.into(),
            unlocked: false,
        }
    }

    /// New wake: the next announcement is preceded by the unlock tone
    pub fn wake(&mut self) {
        self.unlocked = false;
    }

    /// Speak one confirmation sentence
    pub fn announce(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        if !self.unlocked {
            self.synth.play_unlock_tone();
            self.unlocked = true;
        }

        debug!("Speaking ({}): {}", self.locale, text);
        self.synth.speak(&self.locale, text);
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for Recorder {
        fn play_unlock_tone(&self) {
            self.calls.lock().unwrap().push("<tone>".to_string());
        }

        fn speak(&self, locale: &str, text: &str) {
            self.calls.lock().unwrap().push(format!("{}:{}", locale, text));
        }
    }

    #[test]
    fn test_tone_once_per_wake() {
        let recorder = Arc::new(Recorder::default());
        let mut feedback = AudioFeedback::new(recorder.clone(), "nb-NO");

        feedback.announce("Kamera på");
        feedback.announce("Bilde 1 tatt");
        feedback.wake();
        feedback.announce("Kamera av");

        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                "<tone>",
                "nb-NO:Kamera på",
                "nb-NO:Bilde 1 tatt",
                "<tone>",
                "nb-NO:Kamera av",
            ]
        );
    }

    #[test]
    fn test_empty_sentence_is_silent() {
        let recorder = Arc::new(Recorder::default());
        let mut feedback = AudioFeedback::new(recorder.clone(), "nb-NO");
        feedback.announce("");
        assert!(recorder.calls.lock().unwrap().is_empty());
    }
}
