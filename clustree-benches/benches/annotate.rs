//! Full pipeline benchmarks per node color strategy.
//!
//! Runs tree assembly plus both color passes so the cost of the aggregate
//! column pass can be compared with the palette and sample count passes.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
#![expect(
    clippy::excessive_nesting,
    reason = "Criterion bench_with_input + b.iter pattern requires deep nesting"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use clustree_benches::{
    error::BenchSetupError,
    params::{AnnotateBenchParams, TreeBenchParams},
    source::{METADATA_COLUMN, SyntheticMembership, SyntheticMembershipConfig},
};
use clustree_core::{Aggregator, ClustreeBuilder, NodeColorStrategy};

/// Seed used for all synthetic tables in this benchmark.
const SEED: u64 = 42;

/// Table sizes to benchmark.
const SAMPLE_COUNTS: &[usize] = &[1_000, 10_000];

/// Resolutions in every benchmarked table.
const KK: u32 = 10;

fn strategies() -> [(&'static str, NodeColorStrategy); 4] {
    [
        ("resolution", NodeColorStrategy::ByResolution),
        ("samples", NodeColorStrategy::BySampleCount),
        (
            "mean",
            NodeColorStrategy::ByAggregateColumn {
                column: METADATA_COLUMN.to_owned(),
                aggregator: Some(Aggregator::Mean),
            },
        ),
        (
            "median",
            NodeColorStrategy::ByAggregateColumn {
                column: METADATA_COLUMN.to_owned(),
                aggregator: Some(Aggregator::Median),
            },
        ),
    ]
}

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn pipeline_run_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("pipeline_run");
    group.sample_size(20);

    for &sample_count in SAMPLE_COUNTS {
        let generated = SyntheticMembership::generate(&SyntheticMembershipConfig {
            sample_count,
            kk: KK,
            split_probability: 0.5,
            noise: 0.05,
            seed: SEED,
        })?;

        for (strategy, node_color) in strategies() {
            let clustree = ClustreeBuilder::new().with_node_color(node_color).build()?;
            let bench_params = AnnotateBenchParams {
                tree: TreeBenchParams {
                    sample_count,
                    kk: KK,
                },
                strategy,
            };

            group.bench_with_input(
                BenchmarkId::from_parameter(&bench_params),
                &(&clustree, generated.table()),
                |b, &(clustree, table)| {
                    b.iter(|| {
                        if let Err(err) = clustree.run(table) {
                            panic!("pipeline run failed during benchmark: {err}");
                        }
                    });
                },
            );
        }
    }

    group.finish();
    Ok(())
}

fn pipeline_run(c: &mut Criterion) {
    if let Err(err) = pipeline_run_impl(c) {
        panic!("pipeline_run benchmark setup failed: {err}");
    }
}

criterion_group!(benches, pipeline_run);
criterion_main!(benches);
