use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use pixie::{Assets, ScaleFactor, TileGrid};

fn sheet_pixels() -> RgbaImage {
    RgbaImage::from_fn(128, 128, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]))
}

fn map_grid(size: usize) -> TileGrid {
    let rows: Vec<Vec<i32>> = (0..size)
        .map(|row| {
            (0..size)
                .map(|col| ((row * size + col) % 256) as i32 - 1)
                .collect::<Vec<_>>()
        })
        .collect();
    TileGrid::new(rows).expect("rectangular grid")
}

fn bench_bake_tilemap(c: &mut Criterion) {
    c.bench_function("bake_64x64_tilemap_scale_4", |b| {
        b.iter(|| {
            let mut assets = Assets::new();
            let sheet = assets.add_spritesheet(sheet_pixels(), 8, 8).unwrap();
            assets.add_tilemap(sheet, map_grid(64), None).unwrap();
            assets
                .materialize_all(black_box(ScaleFactor::new(4).unwrap()))
                .unwrap();
        })
    });
}

fn bench_slice_spritesheet(c: &mut Criterion) {
    c.bench_function("slice_16x16_sheet_scale_6", |b| {
        b.iter(|| {
            let mut assets = Assets::new();
            assets.add_spritesheet(sheet_pixels(), 8, 8).unwrap();
            assets
                .materialize_all(black_box(ScaleFactor::new(6).unwrap()))
                .unwrap();
        })
    });
}

fn bench_get_tile(c: &mut Criterion) {
    let mut assets = Assets::new();
    let sheet = assets.add_spritesheet(sheet_pixels(), 8, 8).unwrap();
    let map = assets.add_tilemap(sheet, map_grid(64), None).unwrap();
    let tilemap = assets.tilemap(map).unwrap();

    c.bench_function("get_tile", |b| {
        b.iter(|| {
            for y in -1..65 {
                black_box(tilemap.get_tile(black_box(7), y));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_bake_tilemap,
    bench_slice_spritesheet,
    bench_get_tile
);
criterion_main!(benches);
