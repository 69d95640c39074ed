use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

use typist::delay::{delay, DelayContext};
use typist::layout::neighbors;
use typist::mistakes::{pick_wrong_neighbor, should_misclick};
use typist::profile::{profile_names, resolve, MAX_ERROR_RATE};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn resolved_error_rate_is_always_in_bounds(
        name in prop::sample::select(profile_names()),
        speed in any::<f64>(),
        errors in any::<f64>(),
    ) {
        let profile = resolve(name, speed, errors).unwrap();
        prop_assert!((0.0..=MAX_ERROR_RATE).contains(&profile.error_rate));
        prop_assert!(profile.speed_multiplier > 0.0);
    }

    #[test]
    fn non_letters_never_misclick(
        c in any::<char>().prop_filter("non-alphabetic", |c| !c.is_alphabetic()),
        rate in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert!(!should_misclick(c, rate, &mut rng));
    }
}

#[rstest]
#[case(0.01)]
#[case(0.05)]
#[case(0.08)]
#[case(0.3)]
fn misclick_frequency_converges_to_the_error_rate(#[case] rate: f64) {
    const SAMPLES: usize = 100_000;
    let mut rng = StdRng::seed_from_u64(42);
    let letters: Vec<char> = "etaoinshrdluжфыва".chars().collect();

    let hits = (0..SAMPLES)
        .filter(|i| should_misclick(letters[i % letters.len()], rate, &mut rng))
        .count();
    let freq = hits as f64 / SAMPLES as f64;

    assert!((freq - rate).abs() < 0.01, "rate {rate}: observed {freq}");
}

#[rstest]
#[case('t', &['r', 'y', 'g'])]
#[case('T', &['r', 'y', 'g'])]
#[case('q', &['w', 'a'])]
#[case('к', &['у', 'е', 'г', 'н'])]
#[case('Ю', &['б', 'ь'])]
fn wrong_neighbor_comes_from_the_declared_set(#[case] c: char, #[case] expected: &[char]) {
    let mut rng = StdRng::seed_from_u64(7);
    let declared = neighbors(c.to_lowercase().next().unwrap()).unwrap();
    assert_eq!(declared, expected);

    let mut seen = Vec::new();
    for _ in 0..500 {
        let w = pick_wrong_neighbor(c, &mut rng).unwrap();
        assert!(expected.contains(&w), "{w} is not a neighbor of {c}");
        if !seen.contains(&w) {
            seen.push(w);
        }
    }
    assert_eq!(seen.len(), expected.len(), "every neighbor should come up");
}

#[rstest]
#[case('7')]
#[case('.')]
#[case(' ')]
#[case('ч')]
#[case('é')]
fn chars_without_a_table_entry_have_no_wrong_neighbor(#[case] c: char) {
    let mut rng = StdRng::seed_from_u64(8);
    assert_eq!(pick_wrong_neighbor(c, &mut rng), None);
}

#[test]
fn punctuation_pauses_exceed_ordinary_pauses() {
    for name in profile_names() {
        let profile = resolve(name, 1.0, -1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let punct: Vec<_> = (0..1_000)
            .map(|_| delay(DelayContext::after('.'), &profile, &mut rng))
            .collect();
        let ordinary: Vec<_> = (0..1_000)
            .map(|_| delay(DelayContext::after('a'), &profile, &mut rng))
            .collect();

        let min_punct = punct.iter().min().unwrap();
        let max_ordinary = ordinary.iter().max().unwrap();
        assert!(min_punct > max_ordinary, "{name}: {min_punct:?} <= {max_ordinary:?}");
    }
}

#[test]
fn slower_profiles_pause_longer_on_average() {
    let mean_ms = |name: &str| {
        let profile = resolve(name, 1.0, -1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        let total: u128 = (0..2_000)
            .map(|_| delay(DelayContext::AfterCharacter, &profile, &mut rng).as_millis())
            .sum();
        total as f64 / 2_000.0
    };

    assert!(mean_ms("slow") > mean_ms("normal"));
    assert!(mean_ms("normal") > mean_ms("fast"));
}
