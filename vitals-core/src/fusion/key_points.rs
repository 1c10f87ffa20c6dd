//! Key-point extraction from model response text
//!
//! "Key points" here are the longest distinct sentences in a response, a
//! proxy for the most substantive ones. This is a length/uniqueness filter,
//! not semantic analysis: two rephrasings of the same fact are two
//! different points.

/// Fragments at or below this many characters are discarded
pub const MIN_POINT_CHARS: usize = 10;

/// At most this many points are kept per response
pub const MAX_POINTS_PER_RESPONSE: usize = 10;

/// Extract candidate key sentences from one response
///
/// Splits on sentence terminators (`.`, `!`, `?`), trims whitespace, drops
/// short fragments, deduplicates exact matches keeping the first
/// occurrence, then keeps the longest `MAX_POINTS_PER_RESPONSE` sentences
/// ordered by descending character length.
pub fn extract_key_points(text: &str) -> Vec<String> {
    let mut points: Vec<String> = Vec::new();

    for fragment in text.split(['.', '!', '?']) {
        let sentence = fragment.trim();
        if sentence.chars().count() <= MIN_POINT_CHARS {
            continue;
        }
        if points.iter().any(|p| p == sentence) {
            continue;
        }
        points.push(sentence.to_string());
    }

    // Stable sort: equal-length points keep their order of appearance
    points.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    points.truncate(MAX_POINTS_PER_RESPONSE);
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_all_sentence_terminators() {
        let points =
            extract_key_points("Drink plenty of water! Is rest important? Rest is important too.");
        assert_eq!(
            points,
            vec![
                "Drink plenty of water".to_string(),
                "Rest is important too".to_string(),
                "Is rest important".to_string(),
            ]
        );
    }

    #[test]
    fn discards_short_fragments() {
        let points = extract_key_points("Yes. Hydration helps with headaches. No.");
        assert_eq!(points, vec!["Hydration helps with headaches".to_string()]);
    }

    #[test]
    fn exactly_ten_chars_is_discarded() {
        // "take medsx" is 10 characters, at the boundary
        assert!(extract_key_points("take medsx.").is_empty());
        // "take medsxy" is 11 characters and passes
        assert_eq!(extract_key_points("take medsxy.").len(), 1);
    }

    #[test]
    fn deduplicates_exact_matches() {
        let points =
            extract_key_points("Stay hydrated today. Stay hydrated today. Stay hydrated today.");
        assert_eq!(points, vec!["Stay hydrated today".to_string()]);
    }

    #[test]
    fn keeps_at_most_ten_points_longest_first() {
        let text = (1..=15)
            .map(|i| format!("Sentence number {:02} with padding {}. ", i, "x".repeat(i)))
            .collect::<String>();
        let points = extract_key_points(&text);
        assert_eq!(points.len(), MAX_POINTS_PER_RESPONSE);
        // Longest sentences survive the cap
        assert!(points[0].contains("number 15"));
        for pair in points.windows(2) {
            assert!(pair[0].chars().count() >= pair[1].chars().count());
        }
    }

    #[test]
    fn empty_text_yields_no_points() {
        assert!(extract_key_points("").is_empty());
        assert!(extract_key_points("   ").is_empty());
    }
}
