//! Sample message generation for exercising the relay by hand.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use relay_core::contract::RelayMessage;

const LOREM_WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "labore", "dolore", "magna", "aliqua", "enim", "minim",
    "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip",
    "commodo", "consequat", "duis", "aute", "irure", "voluptate", "velit", "esse", "cillum",
    "fugiat", "nulla", "pariatur", "excepteur", "sint", "occaecat", "cupidatat", "proident",
];

const MIN_SENTENCE_WORDS: usize = 4;
const MAX_SENTENCE_WORDS: usize = 12;

/// Capitalized, period-terminated sentence of random filler words.
pub fn lorem_sentence(rng: &mut impl Rng) -> String {
    let word_count = rng.gen_range(MIN_SENTENCE_WORDS..=MAX_SENTENCE_WORDS);
    let words: Vec<&str> = (0..word_count)
        .filter_map(|_| LOREM_WORDS.choose(rng).copied())
        .collect();

    let mut sentence = words.join(" ");
    if let Some(first) = sentence.get(..1) {
        let capitalized = first.to_uppercase();
        sentence.replace_range(..1, &capitalized);
    }
    sentence.push('.');
    sentence
}

pub fn generate_message(
    text: Option<String>,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> RelayMessage {
    let text = text.unwrap_or_else(|| lorem_sentence(rng));
    RelayMessage::new(text, Some(now.to_rfc3339_opts(SecondsFormat::Micros, false)))
}

/// `{first-word}-{timestamp}.json`, unique per generated message.
pub fn message_object_key(message: &RelayMessage) -> String {
    let first_word = message
        .text
        .split_whitespace()
        .next()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .unwrap_or("message");
    let timestamp = message.timestamp.as_deref().unwrap_or("undated");
    format!("{first_word}-{timestamp}.json")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use relay_core::payload::extract_text;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 5, 21, 25, 7)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn lorem_sentence_is_capitalized_and_terminated() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let sentence = lorem_sentence(&mut rng);
            assert!(sentence.ends_with('.'));
            assert!(sentence.chars().next().expect("non-empty").is_uppercase());
            let words = sentence.split_whitespace().count();
            assert!((MIN_SENTENCE_WORDS..=MAX_SENTENCE_WORDS).contains(&words));
        }
    }

    #[test]
    fn generated_message_round_trips_through_consumer_codec() {
        let mut rng = StdRng::seed_from_u64(1);
        let message = generate_message(Some("veni vidi vici".to_string()), fixed_now(), &mut rng);

        assert_eq!(
            message.timestamp.as_deref(),
            Some("2025-07-05T21:25:07.000000+00:00")
        );
        let encoded = message.to_json().expect("encode");
        assert_eq!(extract_text(&encoded).expect("extract"), "veni vidi vici");
    }

    #[test]
    fn object_key_uses_first_word_and_timestamp() {
        let mut rng = StdRng::seed_from_u64(1);
        let message = generate_message(
            Some("Lorem, ipsum dolor.".to_string()),
            fixed_now(),
            &mut rng,
        );
        assert_eq!(
            message_object_key(&message),
            "Lorem-2025-07-05T21:25:07.000000+00:00.json"
        );
    }
}
