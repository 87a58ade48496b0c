#![allow(dead_code)]

use criterion::{BenchmarkId, Criterion, black_box};
use mixed_route_quoter::math::math_helpers::{mul_div, mul_div_rounding_up};
use mixed_route_quoter::math::sqrt_price_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_input,
};
use mixed_route_quoter::math::swap_math::compute_swap_step;
use mixed_route_quoter::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use mixed_route_quoter::path::{self, Protocol};
use mixed_route_quoter::pool::v2_pair::CurveVariant;
use mixed_route_quoter::pool::v3_pool::V3Pool;
use mixed_route_quoter::source::{InMemoryPairs, InMemoryPools, PairReserve};
use mixed_route_quoter::{Address, I256, Q96, Quoter, U256};

const TICKS: [i32; 5] = [-887220, -60, 0, 60, 887220];

pub fn bench_tick_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_math");
    for tick in TICKS {
        group.bench_with_input(BenchmarkId::new("sqrt_ratio_at_tick", tick), &tick, |b, &t| {
            b.iter(|| get_sqrt_ratio_at_tick(black_box(t)))
        });
        let price = get_sqrt_ratio_at_tick(tick).unwrap();
        group.bench_with_input(BenchmarkId::new("tick_at_sqrt_ratio", tick), &price, |b, &p| {
            b.iter(|| get_tick_at_sqrt_ratio(black_box(p)))
        });
    }
    group.finish();
}

pub fn bench_sqrt_price_math(c: &mut Criterion) {
    let lower = get_sqrt_ratio_at_tick(-120).unwrap();
    let upper = get_sqrt_ratio_at_tick(120).unwrap();
    let liquidity = 1_000_000_000_000_000_000u128;

    let mut group = c.benchmark_group("sqrt_price_math");
    group.bench_function("amount_0_delta", |b| {
        b.iter(|| get_amount_0_delta(black_box(lower), black_box(upper), liquidity, true))
    });
    group.bench_function("amount_1_delta", |b| {
        b.iter(|| get_amount_1_delta(black_box(lower), black_box(upper), liquidity, true))
    });
    group.bench_function("next_sqrt_price_from_input", |b| {
        b.iter(|| {
            get_next_sqrt_price_from_input(
                black_box(Q96),
                liquidity,
                black_box(U256::from(1_000_000_000u64)),
                true,
            )
        })
    });
    group.finish();
}

pub fn bench_swap_math(c: &mut Criterion) {
    let target = get_sqrt_ratio_at_tick(-60).unwrap();
    let amount = I256::from_raw(U256::from(1_000_000u64));

    c.bench_function("compute_swap_step", |b| {
        b.iter(|| {
            compute_swap_step(
                black_box(Q96),
                black_box(target),
                1_000_000_000_000,
                black_box(amount),
                3000,
            )
        })
    });
}

pub fn bench_math_helpers(c: &mut Criterion) {
    let a = U256::from(u128::MAX);
    let b = Q96;
    let denominator = U256::from(1_000_003u64);

    let mut group = c.benchmark_group("math_helpers");
    group.bench_function("mul_div", |bench| {
        bench.iter(|| mul_div(black_box(a), black_box(b), black_box(denominator)))
    });
    group.bench_function("mul_div_rounding_up", |bench| {
        bench.iter(|| mul_div_rounding_up(black_box(a), black_box(b), black_box(denominator)))
    });
    group.finish();
}

fn token(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

fn pools() -> InMemoryPools {
    let mut pools = InMemoryPools::with_capacity(2);
    for (address, a, b) in [(0xa0, 1, 2), (0xa1, 2, 3)] {
        let mut pool = V3Pool::new(token(address), token(a), token(b), 3000, 60);
        pool.initialize(Q96).unwrap();
        pool.add_position(-887220, 887220, 1_000_000_000_000_000_000).unwrap();
        // dense ladder so swaps cross many ticks
        for i in 1..=200 {
            pool.add_position(-60 * i, 60 * i, 10_000_000_000_000_000).unwrap();
        }
        pools.insert(pool);
    }
    pools
}

fn pairs() -> InMemoryPairs {
    let reserve = U256::from(10u128.pow(24));
    let mut pairs = InMemoryPairs::new();
    for variant in [CurveVariant::Volatile, CurveVariant::Stable] {
        pairs
            .insert_pair(
                variant,
                PairReserve::new(token(1), reserve, 18),
                PairReserve::new(token(2), reserve, 18),
            )
            .unwrap();
    }
    pairs
}

pub fn bench_quotes(c: &mut Criterion) {
    let legacy = pools();
    let canonical = InMemoryPools::new();
    let pairs = pairs();
    let quoter = Quoter::new(&legacy, &canonical, &pairs);

    let v3 = Protocol::V3Legacy { tick_spacing: 60 };
    let v3_route = path::encode(&[token(1), token(2), token(3)], &[v3, v3]).unwrap();
    let mixed_route = path::encode(
        &[token(1), token(2), token(3)],
        &[Protocol::V2Stable, v3],
    )
    .unwrap();
    let reversed_route = path::encode(&[token(3), token(2), token(1)], &[v3, v3]).unwrap();

    let mut group = c.benchmark_group("quote");
    for amount in [1_000_000u64, 1_000_000_000_000_000, 100_000_000_000_000_000] {
        let amount = U256::from(amount);
        group.bench_with_input(BenchmarkId::new("exact_input_v3", amount), &amount, |b, &a| {
            b.iter(|| quoter.quote_exact_input(black_box(&v3_route), a))
        });
        group.bench_with_input(BenchmarkId::new("exact_input_mixed", amount), &amount, |b, &a| {
            b.iter(|| quoter.quote_exact_input(black_box(&mixed_route), a))
        });
        group.bench_with_input(BenchmarkId::new("exact_output_v3", amount), &amount, |b, &a| {
            b.iter(|| quoter.quote_exact_output(black_box(&reversed_route), a))
        });
    }
    group.finish();
}
