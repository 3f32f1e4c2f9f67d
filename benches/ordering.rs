//! Benchmarks for resource ordering and dependency queries

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use svc_orchestrator::{
    Dep, DepKind, DependencyStore, DriverGroup, Manifest, ProvisionState, Resource,
    ResourceConfig, ResourceCore, ResourceList, Result, Rid,
};
use std::sync::Arc;

struct BenchResource {
    core: ResourceCore,
}

impl BenchResource {
    fn new(group: DriverGroup, name: &str, subset: Option<&str>) -> Arc<Self> {
        let mut config = ResourceConfig::new(Rid::new(group, name), "/tmp/bench");
        config.subset = subset.map(String::from);
        Arc::new(Self {
            core: ResourceCore::from_config(config),
        })
    }
}

#[async_trait::async_trait]
impl Resource for BenchResource {
    fn core(&self) -> &ResourceCore {
        &self.core
    }

    fn manifest(&self) -> Manifest {
        Manifest::new(self.core.rid.group, "bench")
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn provisioned(&self) -> Result<ProvisionState> {
        Ok(ProvisionState::NotApplicable)
    }
}

fn make_list(count: usize) -> ResourceList {
    let subsets = [None, Some("a"), Some("b")];
    (0..count)
        .map(|i| {
            let group = DriverGroup::ALL[i % DriverGroup::ALL.len()];
            let name = format!("{}", count - i);
            BenchResource::new(group, &name, subsets[i % subsets.len()])
                as Arc<dyn Resource>
        })
        .collect()
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");
    group.throughput(Throughput::Elements(1000));

    let list = make_list(1000);
    group.bench_function("sort_1000", |b| {
        b.iter_batched(
            || list.clone(),
            |mut l| {
                l.sort();
                black_box(l.len())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_dependency_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");
    group.throughput(Throughput::Elements(1));

    let store = DependencyStore::new();
    for i in 0..1000 {
        store.register(Dep::new(
            "start",
            DepKind::Act,
            format!("app#{}", i % 100),
            format!("fs#{}", i),
        ));
    }

    group.bench_function("act_dependencies", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            let rid = format!("app#{}", counter % 100);
            black_box(store.act_dependencies("start", &rid))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sort, bench_dependency_queries);
criterion_main!(benches);
