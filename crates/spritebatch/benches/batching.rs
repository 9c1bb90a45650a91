//! Benchmarks for sprite partitioning and vertex generation

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use spritebatch::transform::write_sprite_vertices;
use spritebatch::vertex::SpriteVertex;
use spritebatch::{Portions, Sprite, SpriteBatch, TextureHandle, Vec2};
use spritebatch_host::MockGraphicsHost;

/// `count` sprites cycling through `textures` textures in runs of `run` sprites.
fn make_sprites(count: usize, textures: u64, run: usize, rotated: bool) -> Vec<Sprite> {
    (0..count)
        .map(|i| {
            let texture = TextureHandle::new((i / run) as u64 % textures, 32, 32);
            let sprite = Sprite::new(texture, Vec2::new((i % 100) as f32 * 8.0, (i / 100) as f32 * 8.0));
            if rotated {
                sprite
                    .with_rotation(i as f32 * 0.01)
                    .with_scale(1.5)
                    .with_origin(Vec2::splat(16.0))
            } else {
                sprite
            }
        })
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for (name, run) in [("single_run", usize::MAX), ("runs_of_16", 16), ("alternating", 1)] {
        let sprites = make_sprites(10_000, 4, run, false);
        group.throughput(Throughput::Elements(sprites.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(name), &sprites, |b, sprites| {
            b.iter(|| Portions::new(black_box(sprites), 2000).count());
        });
    }

    group.finish();
}

fn bench_vertex_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_generation");

    for (name, rotated) in [("axis_aligned", false), ("transformed", true)] {
        let sprites = make_sprites(2000, 1, usize::MAX, rotated);
        let mut out = vec![SpriteVertex::default(); sprites.len() * 4];
        group.throughput(Throughput::Elements(sprites.len() as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                write_sprite_vertices(black_box(&sprites), Vec2::new(32.0, 32.0), &mut out);
                out[0]
            });
        });
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprite_batch_end");

    for size in [100, 1000, 10_000] {
        let host = Arc::new(MockGraphicsHost::new());
        let mut batch = SpriteBatch::new(host.clone()).expect("mock host provides Basic");
        let sprites = make_sprites(size, 4, 64, true);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &sprites, |b, sprites| {
            b.iter(|| {
                host.clear_calls();
                batch.begin().unwrap();
                for sprite in sprites {
                    batch.draw_sprite(*sprite).unwrap();
                }
                batch.end().unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_partition, bench_vertex_generation, bench_end_to_end);
criterion_main!(benches);
