//! Criterion benchmarks for whole-floor generation and its hot stages.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use undercroft_logic::config::determine_dungeon_size;
use undercroft_logic::doorways;
use undercroft_logic::layout::generate_layout;
use undercroft_logic::pipeline::FloorGenerator;
use undercroft_logic::walls;

fn bench_generate_floor(c: &mut Criterion) {
    for floor_index in [1u32, 5, 9] {
        c.bench_function(&format!("generate_floor_{}", floor_index), |b| {
            let mut generator = FloorGenerator::from_seed(42);
            b.iter(|| black_box(generator.generate_floor(black_box(floor_index))))
        });
    }
}

fn bench_enclosure(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let layout = match generate_layout(&mut rng, &determine_dungeon_size(9)) {
        Ok(layout) => layout,
        Err(e) => panic!("layout failed: {}", e),
    };

    c.bench_function("detect_doorways_tier3", |b| {
        b.iter(|| black_box(doorways::detect(&layout.rooms, &layout.corridors)))
    });

    let found = doorways::detect(&layout.rooms, &layout.corridors);
    c.bench_function("enclose_all_tier3", |b| {
        b.iter(|| black_box(walls::enclose_all(&layout.rooms, &layout.corridors, &found, 0.8)))
    });
}

criterion_group!(benches, bench_generate_floor, bench_enclosure);
criterion_main!(benches);
