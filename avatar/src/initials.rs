//! Badge labels from display names.

/// Derive the badge label for a display name.
///
/// One word gives its first character, several words give the first
/// character of the first and of the last word. Characters are uppercased
/// with the Unicode default mapping, so the result doesn't depend on the
/// device locale. Leading punctuation and digits are kept as they are.
pub fn derive(name: &str) -> String {
    let mut words = name.split_whitespace();

    let Some(first) = words.next() else {
        return String::new();
    };

    let mut label = String::with_capacity(2);
    label.extend(leading_upper(first));
    if let Some(last) = words.last() {
        label.extend(leading_upper(last));
    }
    label
}

/// First character of `word`, uppercased. Characters that expand when
/// uppercased (`ß` -> `SS`) contribute only the first character of the
/// expansion.
fn leading_upper(word: &str) -> Option<char> {
    word.chars().next().and_then(|c| c.to_uppercase().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_names() {
        assert_eq!(derive(""), "");
        assert_eq!(derive("  "), "");
        assert_eq!(derive("\t\n "), "");
    }

    #[test]
    fn single_word() {
        assert_eq!(derive("Ada"), "A");
        assert_eq!(derive("x"), "X");
        assert_eq!(derive("kip"), "K");
    }

    #[test]
    fn first_and_last_word() {
        assert_eq!(derive("ada lovelace"), "AL");
        assert_eq!(derive("Jane Doe"), "JD");
        assert_eq!(derive("  Grace  Brewster  Hopper "), "GH");
    }

    #[test]
    fn mixed_whitespace_separators() {
        assert_eq!(derive("grace\tbrewster\nhopper"), "GH");
        assert_eq!(derive("ada\u{00A0}lovelace"), "AL");
    }

    #[test]
    fn non_letters_are_kept() {
        assert_eq!(derive("@ada 2nd"), "@2");
        assert_eq!(derive("_"), "_");
    }

    #[test]
    fn unicode_case_mapping() {
        assert_eq!(derive("émile zola"), "ÉZ");
        assert_eq!(derive("ßeta"), "S");
        assert_eq!(derive("ılık"), "I");
    }

    #[test]
    fn deriving_twice_is_at_most_one_char() {
        for name in ["", " ", "Ada", "ada lovelace", "  Grace  Brewster  Hopper ", "ßeta ßeta"] {
            let twice = derive(&derive(name));
            assert!(twice.chars().count() <= 1, "{name:?} -> {twice:?}");
        }
    }
}
