use rand::Rng;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::layout::{lookup_key, neighbors};

/// Decides when a typist hits the wrong key, and which key they hit instead.
pub trait ErrorModel {
    fn should_misclick<R: Rng + ?Sized>(&self, c: char, error_rate: f64, rng: &mut R) -> bool;

    /// A plausible wrong key for `c`, or `None` when no mistake is possible for it.
    fn pick_wrong_neighbor<R: Rng + ?Sized>(&self, c: char, rng: &mut R) -> Option<char>;
}

/// Misclicks on letters only, picking a physically adjacent key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacentKeyErrors;

impl ErrorModel for AdjacentKeyErrors {
    fn should_misclick<R: Rng + ?Sized>(&self, c: char, error_rate: f64, rng: &mut R) -> bool {
        should_misclick(c, error_rate, rng)
    }

    fn pick_wrong_neighbor<R: Rng + ?Sized>(&self, c: char, rng: &mut R) -> Option<char> {
        pick_wrong_neighbor(c, rng)
    }
}

/// Letters only (general category L*). Letter numbers and combining marks are excluded.
pub fn is_error_eligible(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

pub fn should_misclick<R: Rng + ?Sized>(c: char, error_rate: f64, rng: &mut R) -> bool {
    if !is_error_eligible(c) {
        return false;
    }
    rng.gen::<f64>() < error_rate
}

pub fn pick_wrong_neighbor<R: Rng + ?Sized>(c: char, rng: &mut R) -> Option<char> {
    let keys = neighbors(lookup_key(c)?)?;
    Some(keys[rng.gen_range(0..keys.len())])
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn zero_rate_never_misclicks() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1_000).all(|_| !should_misclick('a', 0.0, &mut rng)));
    }

    #[test]
    fn rate_one_always_misclicks_letters() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!((0..1_000).all(|_| should_misclick('ж', 1.0, &mut rng)));
    }

    #[test]
    fn non_letters_are_never_eligible() {
        let mut rng = StdRng::seed_from_u64(3);
        for c in ['1', '.', ' ', '\n', '-', '€', '_'] {
            assert!(!is_error_eligible(c));
            assert!(!should_misclick(c, 1.0, &mut rng));
        }
    }

    #[test]
    fn alphabetic_non_letters_are_not_eligible() {
        let mut rng = StdRng::seed_from_u64(6);
        // Letter number, circled letter, combining ypogegrammeni.
        for c in ['Ⅻ', 'Ⓐ', '\u{0345}'] {
            assert!(c.is_alphabetic());
            assert!(!is_error_eligible(c), "{c:?}");
            assert!(!should_misclick(c, 1.0, &mut rng));
        }
        for c in ['ǅ', 'ʰ', '字'] {
            assert!(is_error_eligible(c), "{c:?}");
        }
    }

    #[test]
    fn uppercase_input_picks_lowercase_neighbor() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let w = pick_wrong_neighbor('T', &mut rng).unwrap();
            assert!(['r', 'y', 'g'].contains(&w), "unexpected {w}");
        }
    }

    #[test]
    fn letters_outside_both_layouts_have_no_neighbor() {
        let mut rng = StdRng::seed_from_u64(5);
        for c in ['é', 'ß', 'ч', 'α', '字'] {
            assert!(is_error_eligible(c));
            assert_eq!(pick_wrong_neighbor(c, &mut rng), None);
        }
    }
}
