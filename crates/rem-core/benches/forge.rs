use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rem_core::{Forge, ForgeConfig, HashingProvider, segment};
use serde_json::Map;

const PASSAGE: &str = "\
I remember the kitchen was warm and the bread smelled sweet. \
Now I see the window, bright and clear, while the street is quiet. \
I think it probably meant something, but the light is only red here. \
The wind was cold when I walked home, and I feel calm now.";

fn bench_forge(c: &mut Criterion) {
    let mut group = c.benchmark_group("forge");
    let lexicon = Forge::default();
    let provider =
        Forge::with_provider(ForgeConfig::default(), Arc::new(HashingProvider::default())).unwrap();

    for repeats in [1usize, 8, 32] {
        let text = PASSAGE.repeat(repeats);
        group.bench_with_input(BenchmarkId::new("lexicon", repeats), &text, |b, text| {
            b.iter(|| lexicon.forge(black_box(text), &Map::new()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("hashing", repeats), &text, |b, text| {
            b.iter(|| provider.forge(black_box(text), &Map::new()).unwrap());
        });
    }
    group.finish();
}

fn bench_segment(c: &mut Criterion) {
    let text = PASSAGE.repeat(32);
    let lexicon = Forge::default().lexicon();
    c.bench_function("segment_32x", |b| {
        b.iter(|| segment(black_box(&text), lexicon));
    });
}

criterion_group!(benches, bench_forge, bench_segment);
criterion_main!(benches);
