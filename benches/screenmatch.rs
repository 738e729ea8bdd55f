use criterion::{criterion_group, criterion_main, Criterion};
use image::{imageops, Rgb, RgbImage};
use screenmatch::lowlevel::{Kernel, TemplatePlan, ZnccFft, ZnccScalar};
use screenmatch::screen::ScreenshotImage;
use screenmatch::search::locate;
use screenmatch::{ImageView, MatchMode, PatternImage, Rectangle};
use std::hint::black_box;

fn make_screen(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
        Rgb([v as u8, (v as u8).wrapping_mul(3), (v as u8) ^ 0x5A])
    })
}

fn bench_score_map(c: &mut Criterion) {
    let screen = make_screen(320, 240);
    let gray = imageops::grayscale(&screen);
    let tpl = imageops::crop_imm(&gray, 100, 80, 32, 24).to_image();

    let image_view = ImageView::from_slice(gray.as_raw(), 320, 240, 1).unwrap();
    let tpl_view = ImageView::from_slice(tpl.as_raw(), 32, 24, 1).unwrap();
    let plan = TemplatePlan::from_view(tpl_view).unwrap();

    c.bench_function("zncc_scalar_320x240_32x24", |b| {
        b.iter(|| ZnccScalar::score_map(black_box(image_view), black_box(&plan)).unwrap())
    });

    #[cfg(feature = "rayon")]
    {
        use screenmatch::lowlevel::ZnccRayon;
        c.bench_function("zncc_rayon_320x240_32x24", |b| {
            b.iter(|| ZnccRayon::score_map(black_box(image_view), black_box(&plan)).unwrap())
        });
    }

    c.bench_function("zncc_fft_320x240_32x24", |b| {
        b.iter(|| ZnccFft::score_map(black_box(image_view), black_box(&plan)).unwrap())
    });
}

fn bench_locate(c: &mut Criterion) {
    let screen = make_screen(320, 240);
    let dir = std::env::temp_dir().join(format!("screenmatch-bench-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("patch.png");
    imageops::crop_imm(&screen, 64, 48, 40, 30)
        .to_image()
        .save(&path)
        .unwrap();

    let pattern = PatternImage::open(&path).unwrap();
    let shot = ScreenshotImage::from_rgb(Rectangle::new(0, 0, 320, 240), screen).unwrap();

    c.bench_function("locate_gray_single", |b| {
        b.iter(|| locate(black_box(&pattern), 0.8, black_box(&shot), MatchMode::Single).unwrap())
    });
    c.bench_function("locate_color_multiple", |b| {
        b.iter(|| locate(black_box(&pattern), 0.99, black_box(&shot), MatchMode::Multiple).unwrap())
    });
}

fn bench_locate_full_hd(c: &mut Criterion) {
    let screen = make_screen(1920, 1080);
    let dir = std::env::temp_dir().join(format!("screenmatch-bench-hd-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("patch.png");
    imageops::crop_imm(&screen, 900, 500, 48, 32)
        .to_image()
        .save(&path)
        .unwrap();

    let pattern = PatternImage::open(&path).unwrap();
    let shot = ScreenshotImage::from_rgb(Rectangle::new(0, 0, 1920, 1080), screen).unwrap();

    let mut group = c.benchmark_group("full_hd_1920x1080_48x32");
    group.sample_size(10);
    group.bench_function("locate_gray_single", |b| {
        b.iter(|| locate(black_box(&pattern), 0.8, black_box(&shot), MatchMode::Single).unwrap())
    });
    group.bench_function("locate_color_single", |b| {
        b.iter(|| locate(black_box(&pattern), 0.99, black_box(&shot), MatchMode::Single).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_score_map, bench_locate, bench_locate_full_hd);
criterion_main!(benches);
