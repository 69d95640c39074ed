//! Keyboard adjacency for misclick synthesis.
//!
//! Latin US QWERTY and Russian ЙЦУКЕН share one lookup; a character's layout is implied
//! by its script. Keys are lowercase letters only.

/// Neighboring keys for a lowercase letter, in table order.
pub fn neighbors(c: char) -> Option<&'static [char]> {
    let keys: &'static [char] = match c {
        // US QWERTY
        'q' => &['w', 'a'],
        'w' => &['q', 'e', 's'],
        'e' => &['w', 'r', 'd'],
        'r' => &['e', 't', 'f'],
        't' => &['r', 'y', 'g'],
        'y' => &['t', 'u', 'h'],
        'u' => &['y', 'i', 'j'],
        'i' => &['u', 'o', 'k'],
        'o' => &['i', 'p', 'l'],
        'p' => &['o', 'l'],
        'a' => &['q', 's', 'z'],
        's' => &['a', 'd', 'w', 'x'],
        'd' => &['s', 'f', 'e', 'c'],
        'f' => &['d', 'g', 'r', 'v'],
        'g' => &['f', 'h', 't', 'b'],
        'h' => &['g', 'j', 'y', 'n'],
        'j' => &['h', 'k', 'u', 'm'],
        'k' => &['j', 'l', 'i'],
        'l' => &['k', 'o', 'p'],
        'z' => &['a', 'x'],
        'x' => &['z', 'c', 's'],
        'c' => &['x', 'v', 'd'],
        'v' => &['c', 'b', 'f'],
        'b' => &['v', 'n', 'g'],
        'n' => &['b', 'm', 'h'],
        'm' => &['n', 'j'],

        // Russian ЙЦУКЕН
        'й' => &['ц', 'ф'],
        'ц' => &['й', 'у', 'ы'],
        'у' => &['ц', 'к', 'ы', 'г'],
        'к' => &['у', 'е', 'г', 'н'],
        'е' => &['к', 'н', 'р'],
        'н' => &['е', 'г', 'р', 'м'],
        'г' => &['у', 'к', 'н', 'ш'],
        'ш' => &['г', 'щ', 'з'],
        'щ' => &['ш', 'з', 'х'],
        'з' => &['щ', 'х', 'ъ'],
        'х' => &['щ', 'з', 'ъ'],
        'ъ' => &['х', 'з'],
        'ф' => &['й', 'ы', 'в'],
        'ы' => &['ф', 'в', 'у', 'ц'],
        'в' => &['ф', 'ы', 'а', 'п'],
        'а' => &['в', 'п', 'с', 'я'],
        'п' => &['в', 'а', 'р'],
        'р' => &['п', 'а', 'о', 'л'],
        'о' => &['р', 'л', 'д'],
        'л' => &['о', 'д', 'ж'],
        'д' => &['л', 'ж', 'э'],
        'ж' => &['д', 'э'],
        'э' => &['ж', 'д'],
        'я' => &['а', 'с'],
        'с' => &['я', 'а', 'м', 'и'],
        'м' => &['с', 'и', 'т'],
        'и' => &['м', 'т', 'ь'],
        'т' => &['и', 'ь', 'б'],
        'ь' => &['т', 'б', 'ю'],
        'б' => &['ь', 'ю'],
        'ю' => &['б', 'ь'],
        _ => return None,
    };
    Some(keys)
}

/// Lowercase `c` for table lookup. Multi-char lowercase mappings have no table entry.
pub(crate) fn lookup_key(c: char) -> Option<char> {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => Some(single),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATIN: &str = "abcdefghijklmnopqrstuvwxyz";
    // ё sits outside the main block and has no entry.
    const CYRILLIC: &str = "абвгдежзийклмнопрстуфхцчшщъыьэюя";

    #[test]
    fn every_latin_letter_has_neighbors() {
        for c in LATIN.chars() {
            assert!(neighbors(c).is_some(), "missing {c}");
        }
    }

    #[test]
    fn cyrillic_table_covers_the_main_block_except_ch() {
        let missing: Vec<char> = CYRILLIC.chars().filter(|c| neighbors(*c).is_none()).collect();
        assert_eq!(missing, vec!['ч']);
    }

    #[test]
    fn neighbors_stay_within_their_script() {
        for c in LATIN.chars() {
            assert!(neighbors(c).unwrap().iter().all(|n| n.is_ascii_lowercase()));
        }
        for c in CYRILLIC.chars().filter(|c| *c != 'ч') {
            assert!(neighbors(c)
                .unwrap()
                .iter()
                .all(|n| ('а'..='я').contains(n)));
        }
    }

    #[test]
    fn no_entries_for_digits_punctuation_or_uppercase() {
        for c in ['1', '0', '.', ' ', 'A', 'Ж', 'ß', 'é'] {
            assert_eq!(neighbors(c), None);
        }
    }

    #[test]
    fn lookup_key_lowercases_single_chars() {
        assert_eq!(lookup_key('Q'), Some('q'));
        assert_eq!(lookup_key('Ж'), Some('ж'));
        assert_eq!(lookup_key('İ'), None);
    }
}
