/// Deterministic title caser: uppercases the first alphabetic character of
/// each whitespace-separated word, lowercases the rest. Not locale-aware —
/// just stable across runs, which is all §4.G Stage 3 asks of it.
pub fn title_case(input: &str) -> String {
    input
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(title_case("geography"), "Geography");
        assert_eq!(title_case("north american industry"), "North American Industry");
    }

    #[test]
    fn is_idempotent() {
        let once = title_case("GEOGRAPHY and ECONOMY");
        let twice = title_case(&once);
        assert_eq!(once, twice);
    }
}
