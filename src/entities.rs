// ============================================
// src/entities.rs
// HTML 文字参照のデコード (API は `&quot;` などを含んだ文字列を返す)
// ============================================

use html_escape::decode_html_entities;

/// 文字参照 (HTML5 の名前付き参照と `&#NN;` / `&#xHH;`) をデコードする。
/// 知らない参照はそのまま残す
pub fn unescape(input: &str) -> String {
    decode_html_entities(input).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_usual_suspects() {
        assert_eq!(
            unescape("Which &quot;Star Wars&quot; film isn&#039;t a prequel?"),
            "Which \"Star Wars\" film isn't a prequel?"
        );
        assert_eq!(unescape("Pok&eacute;mon &amp; Digimon"), "Pokémon & Digimon");
        assert_eq!(unescape("&#x41;&#66;"), "AB");
    }

    #[test]
    fn decodes_symbols_from_trivia_questions() {
        assert_eq!(unescape("It costs &pound;5"), "It costs £5");
        assert_eq!(unescape("&copy; &reg; &trade;"), "© ® ™");
        assert_eq!(unescape("3 &times; 4 = 12"), "3 × 4 = 12");
        assert_eq!(unescape("&euro;100"), "€100");
        assert_eq!(unescape("E = mc&sup2;"), "E = mc²");
    }

    #[test]
    fn leaves_unknown_or_broken_references_alone() {
        assert_eq!(unescape("AT&T"), "AT&T");
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("fish & chips; peas"), "fish & chips; peas");
        assert_eq!(unescape("trailing &"), "trailing &");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(unescape("What is 2 + 2?"), "What is 2 + 2?");
        assert_eq!(unescape(""), "");
    }
}
