//! End-to-end matching over synthetic noise screens served from memory.

use image::{imageops, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screenmatch::{
    FinderError, Finder, Location, MatchMode, Pattern, Rectangle, Settings, StaticScreen,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "screenmatch-matcher-{}-{name}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| Rgb([rng.random(), rng.random(), rng.random()]))
}

/// Saves `img` as a pattern file and returns a pattern bound to it.
fn pattern_from(dir: &PathBuf, file: &str, img: &RgbImage, settings: &Settings) -> Pattern {
    let path = dir.join(file);
    img.save(&path).unwrap();
    Pattern::from_path(path, settings)
}

fn finder_over(settings: Settings, screen: StaticScreen) -> (Finder, Arc<StaticScreen>) {
    let screen = Arc::new(screen);
    (Finder::new(settings, screen.clone()), screen)
}

#[test]
fn single_match_in_noise_returns_embedding_offset() {
    let dir = fixture_dir("single");
    let settings = Settings::default();
    let screen_img = noise(200, 150, 11);
    let patch = imageops::crop_imm(&screen_img, 57, 43, 24, 18).to_image();
    let pattern = pattern_from(&dir, "patch.png", &patch, &settings);
    assert_eq!(pattern.similarity(), 0.8);

    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    let found = finder.match_template(&pattern, None, MatchMode::Single).unwrap();
    assert_eq!(found, vec![Location::new(57, 43)]);
}

#[test]
fn exact_match_in_sub_region_is_absolute() {
    let dir = fixture_dir("exact");
    let settings = Settings::default();
    let screen_img = noise(160, 120, 12);
    let patch = imageops::crop_imm(&screen_img, 90, 70, 16, 16).to_image();
    let mut pattern = pattern_from(&dir, "exact.png", &patch, &settings);
    pattern.exact();

    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    let region = Rectangle::new(40, 30, 100, 80);
    let found = finder.find(&pattern, Some(region), MatchMode::Single).unwrap();
    assert_eq!(found, vec![Location::new(90, 70)]);
}

#[test]
fn multiple_returns_each_copy_in_row_major_order() {
    let dir = fixture_dir("multiple");
    let settings = Settings::default();
    let patch = noise(12, 10, 13);
    let mut screen_img = noise(180, 140, 14);
    for (x, y) in [(120, 20), (10, 90), (30, 20)] {
        imageops::replace(&mut screen_img, &patch, x, y);
    }
    let pattern = pattern_from(&dir, "copy.png", &patch, &settings).with_similarity(0.99);

    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    let found = finder.match_template(&pattern, None, MatchMode::Multiple).unwrap();
    assert_eq!(
        found,
        vec![Location::new(30, 20), Location::new(120, 20), Location::new(10, 90)]
    );

    let named = finder.match_template_named(&pattern, None, "MULTIPLE").unwrap();
    assert_eq!(named, found);
}

#[test]
fn oversized_pattern_is_rejected_without_capturing() {
    let dir = fixture_dir("oversized");
    let settings = Settings::default();
    let pattern = pattern_from(&dir, "big.png", &noise(50, 50, 15), &settings);

    let (finder, screen) = finder_over(settings, StaticScreen::new(noise(200, 200, 16)));
    let region = Rectangle::new(0, 0, 40, 50);
    let found = finder.match_template(&pattern, Some(region), MatchMode::Single).unwrap();
    assert!(found.is_empty());
    assert_eq!(screen.capture_count(), 0);
}

#[test]
fn capture_failures_are_empty_for_matching_but_surface_from_find() {
    let dir = fixture_dir("failing");
    let settings = Settings::default();
    let pattern = pattern_from(&dir, "any.png", &noise(8, 8, 17), &settings);

    let (finder, screen) = finder_over(settings, StaticScreen::new(noise(64, 64, 18)));
    screen.set_failing(true);
    assert!(finder
        .match_template(&pattern, None, MatchMode::Single)
        .unwrap()
        .is_empty());
    assert!(finder
        .find(&pattern, None, MatchMode::Single)
        .unwrap_err()
        .is_screenshot());

    screen.set_failing(false);
    let outside = Rectangle::new(60, 60, 20, 20);
    assert!(finder
        .match_template(&pattern, Some(outside), MatchMode::Single)
        .unwrap()
        .is_empty());
}

#[test]
fn missing_pattern_is_not_swallowed() {
    let dir = fixture_dir("missing");
    let settings = Settings::default();
    let pattern = Pattern::from_path(dir.join("absent.png"), &settings);
    let (finder, _) = finder_over(settings, StaticScreen::new(noise(32, 32, 19)));
    let err = finder
        .match_template(&pattern, None, MatchMode::Single)
        .unwrap_err();
    assert!(matches!(err, FinderError::PatternNotFound { .. }));
}

#[test]
fn unknown_mode_names_yield_nothing() {
    let dir = fixture_dir("mode");
    let settings = Settings::default();
    let screen_img = noise(64, 64, 20);
    let patch = imageops::crop_imm(&screen_img, 5, 5, 10, 10).to_image();
    let pattern = pattern_from(&dir, "mode.png", &patch, &settings);

    let (finder, screen) = finder_over(settings, StaticScreen::new(screen_img));
    assert!(finder
        .match_template_named(&pattern, None, "everything")
        .unwrap()
        .is_empty());
    assert_eq!(screen.capture_count(), 0);
    assert_eq!(
        finder.match_template_named(&pattern, None, "single").unwrap(),
        vec![Location::new(5, 5)]
    );
}

#[test]
fn secondary_display_with_negative_origin() {
    let dir = fixture_dir("secondary");
    let settings = Settings::default();
    let left = noise(120, 90, 21);
    let patch = imageops::crop_imm(&left, 30, 25, 14, 12).to_image();
    let pattern = pattern_from(&dir, "left.png", &patch, &settings);

    let screen = StaticScreen::new(noise(100, 100, 22)).with_display(-120, -10, left, false);
    let (finder, _) = finder_over(settings, screen);
    let region = Rectangle::new(-120, -10, 120, 90);
    let found = finder.match_template(&pattern, Some(region), MatchMode::Single).unwrap();
    assert_eq!(found, vec![Location::new(-90, 15)]);
}

#[test]
fn flat_patterns_never_match() {
    let dir = fixture_dir("flat");
    let settings = Settings::default();
    let flat = RgbImage::from_pixel(6, 6, Rgb([200, 200, 200]));
    let pattern = pattern_from(&dir, "flat.png", &flat, &settings);

    let mut screen_img = noise(50, 50, 23);
    imageops::replace(&mut screen_img, &flat, 10, 10);
    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    assert!(finder
        .match_template(&pattern, None, MatchMode::Multiple)
        .unwrap()
        .is_empty());
}

#[test]
fn debug_images_are_written_when_enabled() {
    let dir = fixture_dir("debug");
    let debug_dir = dir.join("out");
    let settings = Settings::default().with_debug_image(true, &debug_dir);
    let screen_img = noise(60, 60, 24);
    let patch = imageops::crop_imm(&screen_img, 20, 20, 10, 10).to_image();
    let pattern = pattern_from(&dir, "dbg.png", &patch, &settings);

    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    let found = finder.match_template(&pattern, None, MatchMode::Single).unwrap();
    assert_eq!(found.len(), 1);

    let written: Vec<_> = fs::read_dir(&debug_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("dbg_"));
}

#[test]
fn channel_swapped_copy_matches_in_gray_but_not_in_color() {
    let dir = fixture_dir("swapped");
    let settings = Settings::default();
    let patch = noise(32, 24, 21);
    let mut swapped = patch.clone();
    for px in swapped.pixels_mut() {
        px.0.swap(0, 2);
    }
    let mut screen_img = noise(200, 150, 22);
    imageops::replace(&mut screen_img, &patch, 20, 15);
    imageops::replace(&mut screen_img, &swapped, 130, 100);

    let mut pattern = pattern_from(&dir, "swap.png", &patch, &settings).with_similarity(0.9);
    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    let gray = finder.match_template(&pattern, None, MatchMode::Multiple).unwrap();
    assert_eq!(gray, vec![Location::new(20, 15), Location::new(130, 100)]);

    pattern.exact();
    let color = finder.match_template(&pattern, None, MatchMode::Multiple).unwrap();
    assert_eq!(color, vec![Location::new(20, 15)]);
}

#[test]
fn luma_preserving_tint_separates_098_from_099() {
    let dir = fixture_dir("tint");
    let settings = Settings::default();
    let mut rng = StdRng::seed_from_u64(23);
    let patch = RgbImage::from_fn(28, 20, |_, _| {
        let v: u8 = rng.random_range(100..=154);
        Rgb([v, v, v])
    });
    // Both tints leave the integer Rec. 709 luma of a gray pixel unchanged.
    let tinted = RgbImage::from_fn(28, 20, |x, y| {
        let v = patch.get_pixel(x, y).0[0];
        if (x + y) % 2 == 0 {
            Rgb([v + 34, v, v - 100])
        } else {
            Rgb([v - 34, v, v + 101])
        }
    });
    assert_eq!(imageops::grayscale(&tinted), imageops::grayscale(&patch));

    let mut screen_img = noise(220, 160, 24);
    imageops::replace(&mut screen_img, &patch, 20, 30);
    imageops::replace(&mut screen_img, &tinted, 140, 90);

    let pattern = pattern_from(&dir, "tint.png", &patch, &settings);
    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));

    let loose = pattern.clone().with_similarity(0.98);
    assert!(!loose.is_exact());
    let found = finder.match_template(&loose, None, MatchMode::Multiple).unwrap();
    assert_eq!(found, vec![Location::new(20, 30), Location::new(140, 90)]);

    let strict = pattern.with_similarity(0.99);
    assert!(strict.is_exact());
    let found = finder.match_template(&strict, None, MatchMode::Multiple).unwrap();
    assert_eq!(found, vec![Location::new(20, 30)]);
}

#[test]
fn large_screen_matches_through_frequency_domain() {
    let dir = fixture_dir("large");
    let settings = Settings::default();
    let screen_img = noise(640, 360, 25);
    let patch = imageops::crop_imm(&screen_img, 333, 201, 40, 30).to_image();
    let mut pattern = pattern_from(&dir, "large.png", &patch, &settings);

    let (finder, _) = finder_over(settings, StaticScreen::new(screen_img));
    let found = finder.match_template(&pattern, None, MatchMode::Single).unwrap();
    assert_eq!(found, vec![Location::new(333, 201)]);

    pattern.exact();
    let found = finder.match_template(&pattern, None, MatchMode::Multiple).unwrap();
    assert_eq!(found, vec![Location::new(333, 201)]);
}
