//! # Marm-Chain Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | mc-01 State Trie | `put` into a populated trie, proof generation |
//! | mc-02 Contract VM | recursive GCD |
//! | mc-03 Block Production | sealing an empty block |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;

use mc_01_state_trie::MerkleTrie;
use mc_02_contract_vm::{Params, Vm, VmConfig};
use mc_03_block_production::{BlockSkeleton, PoWMiner};
use mc_tests::integration::fixtures::{account, config, state_with, GCD_CODE};
use shared_crypto::{sha256, Hash};

// ============================================================================
// mc-01: State Trie
// ============================================================================

fn random_hash(rng: &mut impl Rng) -> Hash {
    Hash::from_bytes(rng.gen())
}

fn bench_trie(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-01-state-trie");
    let mut rng = rand::thread_rng();

    for size in [100usize, 1_000, 10_000] {
        let trie = (0..size).try_fold(MerkleTrie::empty(), |trie, _| {
            trie.put(&random_hash(&mut rng), sha256(b"value"))
        });
        let Ok(trie) = trie else { continue };
        let path = random_hash(&mut rng);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("put", size), &trie, |b, trie| {
            b.iter(|| black_box(trie.put(&path, sha256(b"new"))))
        });
        let existing = trie.leaves()[0].0;
        group.bench_with_input(BenchmarkId::new("prove", size), &trie, |b, trie| {
            b.iter(|| black_box(trie.prove(&existing)))
        });
    }
    group.finish();
}

// ============================================================================
// mc-02: Contract VM
// ============================================================================

fn bench_vm(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-02-contract-vm");
    let contract = account(7, 0, GCD_CODE);
    let state = state_with(&[&contract]);

    for params in ["120 16", "832040 514229"] {
        group.bench_with_input(BenchmarkId::new("gcd", params), params, |b, params| {
            b.iter(|| {
                let vm = Vm::new(
                    state.clone(),
                    Params::Script(params.into()),
                    contract.clone(),
                    &[],
                    0,
                    VmConfig::default(),
                );
                black_box(vm.and_then(Vm::run))
            })
        });
    }
    group.finish();
}

// ============================================================================
// mc-03: Block Production
// ============================================================================

fn bench_seal(c: &mut Criterion) {
    let mut group = c.benchmark_group("mc-03-block-production");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for difficulty in [100u64, 1_000] {
        let config = config(difficulty);
        let Ok(skeleton) = BlockSkeleton::build(None, vec![], Hash::ZERO, 0, &config) else {
            continue;
        };
        let miner = PoWMiner::from_config(&config.pow);
        group.bench_with_input(BenchmarkId::new("seal", difficulty), &skeleton, |b, skeleton| {
            b.iter(|| black_box(miner.seal(skeleton.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_trie, bench_vm, bench_seal);
criterion_main!(benches);
