//! Microbenchmarks for the entity cache hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pokefetch::repo::EntityCache;
use pokefetch::{normalize_name, NamedResource, Pokemon, TypeSlot};

fn sample(id: u32) -> Pokemon {
    Pokemon {
        id,
        name: format!("poke-{id}"),
        height: 7,
        weight: 69,
        base_experience: Some(64),
        stats: vec![],
        types: vec![TypeSlot {
            slot: 1,
            type_ref: NamedResource {
                name: "normal".to_string(),
                url: "https://pokeapi.co/api/v2/type/1/".to_string(),
            },
        }],
        abilities: vec![],
        moves: vec![],
    }
}

fn bench_cache(c: &mut Criterion) {
    c.bench_function("entity_cache_put", |b| {
        let cache = EntityCache::new();
        let mut id = 0u32;
        b.iter(|| {
            id = id.wrapping_add(1) % 1000 + 1;
            cache.put(black_box(sample(id)));
        });
    });

    let cache = EntityCache::new();
    for id in 1..=500 {
        cache.put(sample(id));
    }

    c.bench_function("entity_cache_get_by_id", |b| {
        b.iter(|| black_box(cache.get_by_id(black_box(250))));
    });

    c.bench_function("entity_cache_get_by_name", |b| {
        b.iter(|| black_box(cache.get_by_name(black_box("Poke-250"))));
    });
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_name", |b| {
        b.iter(|| normalize_name(black_box("Mr Mime")));
    });
}

criterion_group!(benches, bench_cache, bench_normalize);
criterion_main!(benches);
