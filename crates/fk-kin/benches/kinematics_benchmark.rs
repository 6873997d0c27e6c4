//! Kinematics benchmarks: cubic solver, neutrino reconstruction, decay frame.
//!
//! Inputs are drawn from a fixed-seed RNG so runs are comparable.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fk_core::FourMomentum;
use fk_kin::{DecayFrame, reconstruct_neutrino_pz, solve_cubic};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

struct Sample {
    lepton: FourMomentum,
    met: (f64, f64),
    photon: FourMomentum,
}

fn make_samples(n: usize) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n)
        .map(|_| {
            let lepton = FourMomentum::from_pt_eta_phi_m(
                rng.gen_range(25.0..300.0),
                rng.gen_range(-2.5..2.5),
                rng.gen_range(-3.1..3.1),
                0.0,
            );
            let met_pt: f64 = rng.gen_range(10.0..400.0);
            let met_phi: f64 = rng.gen_range(-3.1..3.1);
            let photon = FourMomentum::from_pt_eta_phi_m(
                rng.gen_range(30.0..800.0),
                rng.gen_range(-2.5..2.5),
                rng.gen_range(-3.1..3.1),
                0.0,
            );
            Sample { lepton, met: (met_pt * met_phi.cos(), met_pt * met_phi.sin()), photon }
        })
        .collect()
}

fn bench_cubic(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_cubic");
    // three real roots, one real root
    let cases = [("three_real", (1.0, -6.0, 11.0, -6.0)), ("one_real", (1.0, -2.0, 1.0, -2.0))];
    for (name, (a, b, cc, d)) in cases {
        group.bench_function(name, |bench| {
            bench.iter(|| solve_cubic(black_box(a), black_box(b), black_box(cc), black_box(d)))
        });
    }
    group.finish();
}

fn bench_neutrino(c: &mut Criterion) {
    let mut group = c.benchmark_group("neutrino_pz");
    for n in [100usize, 10_000] {
        let samples = make_samples(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &samples, |bench, samples| {
            bench.iter(|| {
                let mut solved = 0usize;
                for s in samples {
                    if let Ok(sol) = reconstruct_neutrino_pz(&s.lepton, s.met.0, s.met.1)
                        && sol.is_solved()
                    {
                        solved += 1;
                    }
                }
                black_box(solved)
            })
        });
    }
    group.finish();
}

fn bench_decay_frame(c: &mut Criterion) {
    let samples = make_samples(10_000);
    let neutrinos: Vec<FourMomentum> = samples
        .iter()
        .filter_map(|s| reconstruct_neutrino_pz(&s.lepton, s.met.0, s.met.1).ok())
        .map(|sol| sol.primary)
        .collect();

    c.bench_function("decay_frame_folded_phi", |bench| {
        bench.iter(|| {
            let mut sum = 0.0;
            for (s, nu) in samples.iter().zip(&neutrinos) {
                if let Ok(frame) = DecayFrame::new(&s.lepton, 1, nu, &s.photon) {
                    sum += frame.folded_phi();
                }
            }
            black_box(sum)
        })
    });
}

criterion_group!(benches, bench_cubic, bench_neutrino, bench_decay_frame);
criterion_main!(benches);
