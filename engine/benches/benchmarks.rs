//! Performance benchmarks for stash-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use stash_engine::domain::{Post, PostPatch};
use stash_engine::{envelope, Cart, CartItem, EntityCollection, Position, Reconciliation};

fn posts(count: usize) -> Vec<Post> {
    (0..count)
        .map(|i| {
            serde_json::from_value(json!({"_id": format!("p{}", i), "caption": format!("Post {}", i)}))
                .unwrap()
        })
        .collect()
}

fn bench_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection");

    for size in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("replace_all", size), &size, |b, &size| {
            let payload = posts(size);
            b.iter(|| EntityCollection::from_entities(black_box(payload.clone())))
        });

        group.bench_with_input(BenchmarkId::new("patch_last", size), &size, |b, &size| {
            let mut collection = EntityCollection::from_entities(posts(size));
            let id = format!("p{}", size - 1);
            let patch = PostPatch {
                caption: Some("patched".into()),
                ..Default::default()
            };
            b.iter(|| collection.patch(black_box(&id), black_box(&patch)))
        });
    }

    group.bench_function("insert_prepend", |b| {
        let mut collection = EntityCollection::from_entities(posts(100));
        let mut id = 0u64;
        b.iter(|| {
            id += 1;
            let post: Post =
                serde_json::from_value(json!({"_id": format!("new{}", id), "caption": "x"}))
                    .unwrap();
            Reconciliation::Insert {
                entity: post,
                position: Position::Prepend,
            }
            .apply(black_box(&mut collection))
        })
    });

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    for size in [10usize, 100, 1000] {
        let body = json!({"success": true, "posts": posts(size)});
        group.bench_with_input(BenchmarkId::new("decode_list", size), &body, |b, body| {
            b.iter(|| envelope::decode_payload::<Vec<Post>>(black_box(body), "posts"))
        });
    }

    group.finish();
}

fn bench_cart(c: &mut Criterion) {
    c.bench_function("cart_add_aggregate", |b| {
        let mut cart = Cart::new();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            cart.add(black_box(CartItem::new(format!("f{}", i % 50), "item", 10)));
        })
    });
}

criterion_group!(benches, bench_collection, bench_envelope, bench_cart);
criterion_main!(benches);
