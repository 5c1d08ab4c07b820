use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_ioc::*;
use std::sync::Arc;

struct Leaf {
    value: u64,
}

impl Injectable for Leaf {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<u64>("value")], |args| Ok(Leaf { value: args.value(0)? }))
            .build()
    }
}

struct Branch {
    left: Arc<Leaf>,
    right: Arc<Leaf>,
    label: String,
}

impl Injectable for Branch {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor(
                [param::<Leaf>("left"), param::<Leaf>("right"), param::<String>("label")],
                |args| {
                    Ok(Branch {
                        left: args.service(0)?,
                        right: args.service(1)?,
                        label: args.value(2)?,
                    })
                },
            )
            .build()
    }
}

trait Greeter: Send + Sync {
    fn greet(&self) -> usize;
}
interface!(dyn Greeter);

struct Hello;
impl Greeter for Hello {
    fn greet(&self) -> usize {
        5
    }
}

impl Injectable for Hello {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .default_constructor(|| Hello)
            .implements::<dyn Greeter>(|this| this)
            .build()
    }
}

// ===== Micro Benchmarks =====

fn bench_singleton_hit(c: &mut Criterion) {
    let container = Container::new();
    container.register::<Leaf>().unwrap().as_singleton().with_value("value", 42u64);

    // Prime the singleton
    let _ = container.get_instance::<Leaf>().unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let v = container.get_instance::<Leaf>().unwrap();
            black_box(v.value);
        })
    });
}

fn bench_instance_hit(c: &mut Criterion) {
    let container = Container::new();
    container.register_instance::<u64>(Arc::new(42)).unwrap();

    c.bench_function("instance_hit_u64", |b| {
        b.iter(|| {
            let v = container.get_instance::<u64>().unwrap();
            black_box(v);
        })
    });
}

fn bench_transient_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("transient_graph");

    for kind in [ActivationKind::Compiled, ActivationKind::Reflective] {
        let container = Container::with_options(ContainerOptions::new().activation(kind));
        container.register::<Branch>().unwrap().with_value("label", "root");

        group.bench_function(format!("{:?}", kind).to_lowercase(), |b| {
            b.iter(|| {
                let v = container.get_instance::<Branch>().unwrap();
                black_box((v.left.value, v.right.value, v.label.len()));
            })
        });
    }

    group.finish();
}

fn bench_concrete_vs_trait(c: &mut Criterion) {
    let mut group = c.benchmark_group("concrete_vs_trait");

    let container = Container::new();
    container.register::<Hello>().unwrap().as_singleton();
    container.register_type::<dyn Greeter, Hello>().unwrap().as_singleton();
    let _ = container.get_instance::<Hello>().unwrap();
    let _ = container.get_instance::<dyn Greeter>().unwrap();

    group.bench_function("concrete", |b| {
        b.iter(|| {
            let v = container.get_instance::<Hello>().unwrap();
            black_box(v.greet());
        })
    });

    group.bench_function("trait", |b| {
        b.iter(|| {
            let v = container.get_instance::<dyn Greeter>().unwrap();
            black_box(v.greet());
        })
    });

    group.finish();
}

fn bench_factory(c: &mut Criterion) {
    let container = Container::new();
    container
        .register_factory(|| Arc::new(String::from("produced")))
        .unwrap();

    c.bench_function("factory", |b| {
        b.iter(|| {
            let v = container.get_instance::<String>().unwrap();
            black_box(v.len());
        })
    });
}

fn bench_auto_discovery_cold(c: &mut Criterion) {
    c.bench_function("auto_discovery_cold", |b| {
        b.iter_batched(
            Container::new,
            |container| {
                let v = container.get_instance::<Branch>().unwrap();
                black_box(v.label.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_get_all_scaling(c: &mut Criterion) {
    const NAMES: [&str; 16] = [
        "n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7", "n8", "n9", "n10", "n11", "n12", "n13", "n14", "n15",
    ];
    let mut group = c.benchmark_group("get_all_scaling");

    for &count in &[1usize, 4, 16] {
        let container = Container::new();
        for name in &NAMES[..count] {
            container
                .register_instance_named::<dyn Greeter>(*name, Arc::new(Hello))
                .unwrap();
        }

        group.bench_with_input(BenchmarkId::new("get_all", count), &count, |b, _| {
            b.iter(|| {
                let all = container.get_all_instances::<dyn Greeter>().unwrap();
                black_box(all.len());
            })
        });
    }

    group.finish();
}

fn bench_build_up(c: &mut Criterion) {
    #[derive(Default)]
    struct Page {
        greeter: parking_lot::Mutex<Option<Arc<dyn Greeter>>>,
        title: parking_lot::Mutex<String>,
    }

    impl Injectable for Page {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::builder::<Self>()
                .default_constructor(Page::default)
                .dependency::<dyn Greeter, _>("greeter", |p, g| *p.greeter.lock() = Some(g))
                .value_dependency::<String, _>("title", None, |p, t| *p.title.lock() = t)
                .build()
        }
    }

    let container = Container::new();
    container.register_type::<dyn Greeter, Hello>().unwrap().as_singleton();
    container.register::<Page>().unwrap().with_value("title", "Home");

    c.bench_function("build_up", |b| {
        b.iter(|| {
            let page = container.build_up::<Page>().unwrap();
            black_box(page.title.lock().len());
        })
    });
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");

    let container = Container::new();
    container.register::<Leaf>().unwrap().as_singleton();

    // Prime the singleton
    let _ = container.get_instance::<Leaf>().unwrap();

    for &thread_count in &[1, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("singleton_threads", thread_count),
            &thread_count,
            |b, &threads| {
                b.iter_custom(|iters| {
                    let start = std::time::Instant::now();
                    crossbeam_utils::thread::scope(|s| {
                        for _ in 0..threads {
                            let container = &container;
                            s.spawn(move |_| {
                                for _ in 0..iters / threads as u64 {
                                    let v = container.get_instance::<Leaf>().unwrap();
                                    black_box(v.value);
                                }
                            });
                        }
                    })
                    .unwrap();
                    start.elapsed()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    micro_benches,
    bench_singleton_hit,
    bench_instance_hit,
    bench_transient_graph,
    bench_concrete_vs_trait,
    bench_factory,
    bench_build_up,
    bench_contention
);

criterion_group!(macro_benches, bench_auto_discovery_cold, bench_get_all_scaling);

criterion_main!(micro_benches, macro_benches);
