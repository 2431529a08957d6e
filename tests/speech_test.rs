//! Integration tests for speech synthesis
//!
//! These tests verify that the native TTS backend and the playback built
//! on it behave, tolerating hosts without any speech service.

use symspeak::speech::{create_engine, SpeechEngine, SpeechPlayback, Utterance, VoiceOptions};
use symspeak::symbol::Symbol;
use symspeak::SymspeakError;

fn utterance(token: u64, text: &str) -> Utterance {
    Utterance {
        token,
        text: text.to_string(),
        voice: VoiceOptions::default().resolve(),
        language: "pt-BR".to_string(),
    }
}

#[test]
fn test_create_native_engine() {
    match create_engine() {
        Ok(engine) => {
            println!("✓ Successfully created native TTS backend");
            drop(engine);
        }
        Err(e) => {
            // This may fail in CI or environments without speech-dispatcher
            println!("⚠ TTS creation failed (may be expected): {}", e);
            assert!(matches!(e, SymspeakError::Unsupported));
        }
    }
}

#[test]
fn test_engine_operations() {
    if let Ok(mut engine) = create_engine() {
        assert!(
            engine.enqueue(utterance(1, "Teste de integração")).is_ok(),
            "Should speak text without error"
        );
        assert!(engine.cancel().is_ok(), "Should cancel without error");
        assert!(engine.cancel().is_ok(), "Cancel when idle is harmless");

        println!("✓ Speech operation tests passed");
    } else {
        println!("⚠ Skipping operation tests (TTS not available)");
    }
}

#[test]
fn test_engine_voice_extremes() {
    if let Ok(mut engine) = create_engine() {
        for (rate, pitch, volume) in [(0.1, 0.1, 0.0), (10.0, 2.0, 1.0), (0.9, 1.0, 5.0)] {
            let options = VoiceOptions {
                rate: Some(rate),
                pitch: Some(pitch),
                volume: Some(volume),
                voice: None,
            };
            let mut u = utterance(2, "Emoji: 🎤 café");
            u.voice = options.resolve();
            assert!(engine.enqueue(u).is_ok(), "Should clamp {:?}", options);
            let _ = engine.cancel();
        }
        println!("✓ Voice range tests passed");
    } else {
        println!("⚠ Skipping voice tests (TTS not available)");
    }
}

#[test]
fn test_platform_playback() {
    let mut playback = SpeechPlayback::from_platform().with_language("pt-BR");
    let sentence = vec![Symbol::new("me", "Eu", "👤", "people").with_speech("eu")];

    let result = playback.speak(&sentence, |_| {}, &VoiceOptions::default());
    if playback.is_supported() {
        assert!(result.is_ok());
        playback.stop();
        assert!(!playback.is_active());
        println!("✓ Platform playback started and stopped");
    } else {
        assert!(matches!(result, Err(SymspeakError::Unsupported)));
        println!("⚠ Platform has no TTS, speak is unsupported");
    }
}
