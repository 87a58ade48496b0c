//! Quotes over mixed routes.
//!
//! Exact-input quotes walk the path front to back, feeding each hop's output
//! into the next hop. Exact-output quotes take a path encoded output token
//! first and walk it the same way, asking every hop for the input that
//! produces the amount the previous hop needs.

use crate::config::QuoterConfig;
use crate::error::{ConfigError, Error};
use crate::path::{Deployment, Hop, Path, Protocol};
use crate::pool::swap::{SwapOutcome, SwapParams, simulate_swap};
use crate::pool::v2_pair::CurveVariant;
use crate::source::{PairSource, PoolSource};
use alloy_primitives::{Address, U256};

/// Result of a path quote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteResult {
    /// Output for exact-input quotes, required input for exact-output quotes.
    pub amount: U256,
    /// Price after each concentrated-liquidity hop, in path order.
    pub sqrt_price_x96_after_list: Vec<U256>,
    /// Initialized ticks crossed by each concentrated-liquidity hop, in path order.
    pub initialized_ticks_crossed_list: Vec<u32>,
    /// Sum over concentrated-liquidity hops. Pairs add nothing.
    pub gas_estimate: u64,
}

impl QuoteResult {
    fn with_capacity(hops: usize) -> Self {
        Self {
            amount: U256::ZERO,
            sqrt_price_x96_after_list: Vec::with_capacity(hops),
            initialized_ticks_crossed_list: Vec::with_capacity(hops),
            gas_estimate: 0,
        }
    }

    fn record(&mut self, outcome: &SwapOutcome, config: &QuoterConfig) {
        self.sqrt_price_x96_after_list.push(outcome.sqrt_price_x96_after);
        self.initialized_ticks_crossed_list.push(outcome.ticks_crossed);
        self.gas_estimate = self
            .gas_estimate
            .saturating_add(outcome.gas_estimate(config));
    }
}

/// Result of a single concentrated-liquidity hop quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteSingleResult {
    pub amount: U256,
    pub sqrt_price_x96_after: U256,
    pub initialized_ticks_crossed: u32,
    pub gas_estimate: u64,
}

impl QuoteSingleResult {
    fn from_outcome(amount: U256, outcome: &SwapOutcome, config: &QuoterConfig) -> Self {
        Self {
            amount,
            sqrt_price_x96_after: outcome.sqrt_price_x96_after,
            initialized_ticks_crossed: outcome.ticks_crossed,
            gas_estimate: outcome.gas_estimate(config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteExactInputSingleV3Params {
    pub token_in: Address,
    pub token_out: Address,
    pub deployment: Deployment,
    pub tick_spacing: i32,
    pub amount_in: U256,
    /// Bounds the price move. With a limit, reaching it ends the swap with a
    /// partial fill instead of an error.
    pub sqrt_price_limit_x96: Option<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteExactOutputSingleV3Params {
    pub token_in: Address,
    pub token_out: Address,
    pub deployment: Deployment,
    pub tick_spacing: i32,
    pub amount_out: U256,
    pub sqrt_price_limit_x96: Option<U256>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteExactInputSingleV2Params {
    pub token_in: Address,
    pub token_out: Address,
    pub variant: CurveVariant,
    pub amount_in: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteExactOutputSingleV2Params {
    pub token_in: Address,
    pub token_out: Address,
    pub variant: CurveVariant,
    pub amount_out: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwapAmount {
    ExactIn(U256),
    ExactOut(U256),
}

/// Read-only quoter over two concentrated-liquidity deployments and a set of
/// constant-function pairs.
///
/// Every call reads fresh snapshots from the sources and never writes to
/// them, so identical inputs over identical state give identical quotes.
#[derive(Debug, Clone)]
pub struct Quoter<L, C, P> {
    legacy: L,
    canonical: C,
    pairs: P,
    config: QuoterConfig,
}

impl<L, C, P> Quoter<L, C, P>
where
    L: PoolSource,
    C: PoolSource,
    P: PairSource,
{
    pub fn new(legacy: L, canonical: C, pairs: P) -> Self {
        Self {
            legacy,
            canonical,
            pairs,
            config: QuoterConfig::default(),
        }
    }

    /// Quoter with a custom gas model. Fails if `config` does not validate.
    pub fn with_config(
        legacy: L,
        canonical: C,
        pairs: P,
        config: QuoterConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            legacy,
            canonical,
            pairs,
            config,
        })
    }

    pub fn config(&self) -> &QuoterConfig {
        &self.config
    }

    /// Output of swapping `amount_in` of the first path token for the last.
    pub fn quote_exact_input(&self, path: &[u8], amount_in: U256) -> Result<QuoteResult, Error> {
        let path = Path::new(path)?;
        let mut result = QuoteResult::with_capacity(path.num_pools());

        let mut amount = amount_in;
        for (index, hop) in path.hops().enumerate() {
            let hop = hop?;
            let amount_out = self.quote_hop(hop, SwapAmount::ExactIn(amount), &mut result)?;
            tracing::debug!(
                index,
                token_in = %hop.token_in,
                token_out = %hop.token_out,
                protocol = ?hop.protocol,
                amount_in = %amount,
                %amount_out,
                "quoted exact input hop"
            );
            amount = amount_out;
        }

        result.amount = amount;
        Ok(result)
    }

    /// Input needed to receive `amount_out` of the first path token. The path
    /// is encoded output token first, input token last.
    pub fn quote_exact_output(&self, path: &[u8], amount_out: U256) -> Result<QuoteResult, Error> {
        let path = Path::new(path)?;
        let mut result = QuoteResult::with_capacity(path.num_pools());

        let mut amount = amount_out;
        for (index, hop) in path.hops().enumerate() {
            let hop = hop?.reversed();
            let amount_in = self.quote_hop(hop, SwapAmount::ExactOut(amount), &mut result)?;
            tracing::debug!(
                index,
                token_in = %hop.token_in,
                token_out = %hop.token_out,
                protocol = ?hop.protocol,
                %amount_in,
                amount_out = %amount,
                "quoted exact output hop"
            );
            amount = amount_in;
        }

        result.amount = amount;
        Ok(result)
    }

    pub fn quote_exact_input_single_v3(
        &self,
        params: &QuoteExactInputSingleV3Params,
    ) -> Result<QuoteSingleResult, Error> {
        let hop = Hop {
            token_in: params.token_in,
            token_out: params.token_out,
            protocol: params.deployment.protocol(params.tick_spacing),
        };
        let outcome = self.simulate_v3(
            hop,
            params.deployment,
            params.tick_spacing,
            SwapAmount::ExactIn(params.amount_in),
            params.sqrt_price_limit_x96,
        )?;
        Ok(QuoteSingleResult::from_outcome(
            outcome.amount_out,
            &outcome,
            &self.config,
        ))
    }

    pub fn quote_exact_output_single_v3(
        &self,
        params: &QuoteExactOutputSingleV3Params,
    ) -> Result<QuoteSingleResult, Error> {
        let hop = Hop {
            token_in: params.token_in,
            token_out: params.token_out,
            protocol: params.deployment.protocol(params.tick_spacing),
        };
        let outcome = self.simulate_v3(
            hop,
            params.deployment,
            params.tick_spacing,
            SwapAmount::ExactOut(params.amount_out),
            params.sqrt_price_limit_x96,
        )?;
        Ok(QuoteSingleResult::from_outcome(
            outcome.amount_in,
            &outcome,
            &self.config,
        ))
    }

    pub fn quote_exact_input_single_v2(
        &self,
        params: &QuoteExactInputSingleV2Params,
    ) -> Result<U256, Error> {
        let hop = Hop {
            token_in: params.token_in,
            token_out: params.token_out,
            protocol: pair_protocol(params.variant),
        };
        self.swap_v2(hop, params.variant, SwapAmount::ExactIn(params.amount_in))
    }

    pub fn quote_exact_output_single_v2(
        &self,
        params: &QuoteExactOutputSingleV2Params,
    ) -> Result<U256, Error> {
        let hop = Hop {
            token_in: params.token_in,
            token_out: params.token_out,
            protocol: pair_protocol(params.variant),
        };
        self.swap_v2(hop, params.variant, SwapAmount::ExactOut(params.amount_out))
    }

    /// Quotes one hop in trade direction, returning the output for exact input
    /// and the required input for exact output.
    fn quote_hop(
        &self,
        hop: Hop,
        amount: SwapAmount,
        result: &mut QuoteResult,
    ) -> Result<U256, Error> {
        let (deployment, tick_spacing) = match hop.protocol {
            Protocol::V3Legacy { tick_spacing } => (Deployment::Legacy, tick_spacing),
            Protocol::V3Canonical { tick_spacing } => (Deployment::Canonical, tick_spacing),
            Protocol::V2Volatile => return self.swap_v2(hop, CurveVariant::Volatile, amount),
            Protocol::V2Stable => return self.swap_v2(hop, CurveVariant::Stable, amount),
        };

        let outcome = self.simulate_v3(hop, deployment, tick_spacing, amount, None)?;
        result.record(&outcome, &self.config);

        Ok(match amount {
            SwapAmount::ExactIn(_) => outcome.amount_out,
            SwapAmount::ExactOut(_) => outcome.amount_in,
        })
    }

    fn simulate_v3(
        &self,
        hop: Hop,
        deployment: Deployment,
        tick_spacing: i32,
        amount: SwapAmount,
        sqrt_price_limit_x96: Option<U256>,
    ) -> Result<SwapOutcome, Error> {
        match deployment {
            Deployment::Legacy => {
                simulate_on(&self.legacy, hop, tick_spacing, amount, sqrt_price_limit_x96)
            }
            Deployment::Canonical => {
                simulate_on(&self.canonical, hop, tick_spacing, amount, sqrt_price_limit_x96)
            }
        }
    }

    fn swap_v2(&self, hop: Hop, variant: CurveVariant, amount: SwapAmount) -> Result<U256, Error> {
        let pair = self
            .pairs
            .reserves(hop.token_in, hop.token_out, variant)
            .ok_or(Error::PoolNotFound {
                token_in: hop.token_in,
                token_out: hop.token_out,
                protocol: hop.protocol,
            })?;

        match amount {
            SwapAmount::ExactIn(amount_in) => pair.get_amount_out(hop.token_in, amount_in),
            SwapAmount::ExactOut(amount_out) => pair.get_amount_in(hop.token_in, amount_out),
        }
    }
}

fn simulate_on<S: PoolSource>(
    source: &S,
    hop: Hop,
    tick_spacing: i32,
    amount: SwapAmount,
    sqrt_price_limit_x96: Option<U256>,
) -> Result<SwapOutcome, Error> {
    let pool = source
        .pool_snapshot(hop.token_in, hop.token_out, tick_spacing)
        .ok_or(Error::PoolNotFound {
            token_in: hop.token_in,
            token_out: hop.token_out,
            protocol: hop.protocol,
        })?;

    let zero_for_one = hop.token_in < hop.token_out;
    let params = match amount {
        SwapAmount::ExactIn(amount_in) => SwapParams::exact_input(zero_for_one, amount_in)?,
        SwapAmount::ExactOut(amount_out) => SwapParams::exact_output(zero_for_one, amount_out)?,
    }
    .with_limit(sqrt_price_limit_x96);

    simulate_swap(source, &pool, params)
}

fn pair_protocol(variant: CurveVariant) -> Protocol {
    match variant {
        CurveVariant::Volatile => Protocol::V2Volatile,
        CurveVariant::Stable => Protocol::V2Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Q96;
    use crate::path::{self, encode};
    use crate::pool::v3_pool::V3Pool;
    use crate::source::{InMemoryPairs, InMemoryPools, PairReserve};
    use std::str::FromStr;

    const LEGACY: Protocol = Protocol::V3Legacy { tick_spacing: 60 };
    const CANONICAL: Protocol = Protocol::V3Canonical { tick_spacing: 60 };

    // ---------------- Fixtures ----------------

    fn tokens() -> [Address; 3] {
        [
            Address::repeat_byte(0x01),
            Address::repeat_byte(0x02),
            Address::repeat_byte(0x03),
        ]
    }

    fn make_pool(
        address: u8,
        token_a: Address,
        token_b: Address,
        positions: &[(i32, i32, u128)],
    ) -> V3Pool {
        let mut pool = V3Pool::new(Address::repeat_byte(address), token_a, token_b, 3000, 60);
        pool.initialize(Q96).unwrap();
        for &(lower, upper, liquidity) in positions {
            pool.add_position(lower, upper, liquidity).unwrap();
        }
        pool
    }

    const SIMPLE: &[(i32, i32, u128)] = &[(-887220, 887220, 1_000_000)];
    const MULTI: &[(i32, i32, u128)] = &[
        (-887220, 887220, 1_000_000),
        (-60, 60, 33_385),
        (-120, 120, 16_717),
    ];

    /// 0/1 and 1/2 hold full-range liquidity, 0/2 adds two narrow positions.
    fn deployment(base: u8) -> InMemoryPools {
        let [t0, t1, t2] = tokens();
        let mut pools = InMemoryPools::new();
        pools.insert(make_pool(base, t0, t1, SIMPLE));
        pools.insert(make_pool(base + 1, t1, t2, SIMPLE));
        pools.insert(make_pool(base + 2, t0, t2, MULTI));
        pools
    }

    fn pairs() -> InMemoryPairs {
        let reserve = U256::from(10u128.pow(24));
        let mut pairs = InMemoryPairs::new();
        for (a, b) in [(0, 1), (1, 2), (0, 2)] {
            for variant in [CurveVariant::Volatile, CurveVariant::Stable] {
                pairs
                    .insert_pair(
                        variant,
                        PairReserve::new(tokens()[a], reserve, 18),
                        PairReserve::new(tokens()[b], reserve, 18),
                    )
                    .unwrap();
            }
        }
        pairs
    }

    struct Fixture {
        legacy: InMemoryPools,
        canonical: InMemoryPools,
        pairs: InMemoryPairs,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                legacy: deployment(0xa0),
                canonical: deployment(0xb0),
                pairs: pairs(),
            }
        }

        fn quoter(&self) -> Quoter<&InMemoryPools, &InMemoryPools, &InMemoryPairs> {
            Quoter::new(&self.legacy, &self.canonical, &self.pairs)
        }
    }

    fn route(indices: &[usize], protocols: &[Protocol]) -> Vec<u8> {
        let tokens: Vec<Address> = indices.iter().map(|&i| tokens()[i]).collect();
        encode(&tokens, protocols).unwrap().to_vec()
    }

    fn price(value: &str) -> U256 {
        U256::from_str(value).unwrap()
    }

    fn amount(value: u64) -> U256 {
        U256::from(value)
    }

    // ---------------- Exact input ----------------

    #[test]
    fn exact_input_single_v3_hop() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();

        let result = quoter
            .quote_exact_input(&route(&[0, 2], &[LEGACY]), amount(10_000))
            .unwrap();
        assert_eq!(result.amount, amount(9871));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![price("78461846509168490764501028180")]
        );
        assert_eq!(result.initialized_ticks_crossed_list, vec![2]);
        assert_eq!(result.gas_estimate, 155_000 + 2 * 21_492);

        let result = quoter
            .quote_exact_input(&route(&[2, 1], &[LEGACY]), amount(10_000))
            .unwrap();
        assert_eq!(result.amount, amount(9871));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![price("80018067294531553039351583520")]
        );
        assert_eq!(result.initialized_ticks_crossed_list, vec![0]);
        assert_eq!(result.gas_estimate, 155_000);
    }

    #[test]
    fn exact_input_multi_hop_v3() {
        let fixture = Fixture::new();
        let result = fixture
            .quoter()
            .quote_exact_input(&route(&[0, 2, 1], &[LEGACY, LEGACY]), amount(10_000))
            .unwrap();

        assert_eq!(result.amount, amount(9745));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![
                price("78461846509168490764501028180"),
                price("80007846861567212939802016351"),
            ]
        );
        assert_eq!(result.initialized_ticks_crossed_list, vec![2, 0]);
        assert_eq!(result.gas_estimate, 2 * 155_000 + 2 * 21_492);
    }

    #[test]
    fn canonical_deployment_quotes_like_legacy() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();

        let legacy = quoter
            .quote_exact_input(&route(&[0, 2, 1], &[LEGACY, LEGACY]), amount(10_000))
            .unwrap();
        let canonical = quoter
            .quote_exact_input(&route(&[0, 2, 1], &[CANONICAL, CANONICAL]), amount(10_000))
            .unwrap();
        let mixed = quoter
            .quote_exact_input(&route(&[0, 2, 1], &[CANONICAL, LEGACY]), amount(10_000))
            .unwrap();
        assert_eq!(legacy, canonical);
        assert_eq!(legacy, mixed);
    }

    #[test]
    fn exact_input_v2_hops() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();

        let volatile = quoter
            .quote_exact_input(&route(&[0, 1], &[Protocol::V2Volatile]), amount(10_000))
            .unwrap();
        assert_eq!(volatile.amount, amount(9969));
        assert!(volatile.sqrt_price_x96_after_list.is_empty());
        assert!(volatile.initialized_ticks_crossed_list.is_empty());
        assert_eq!(volatile.gas_estimate, 0);

        let two_volatile = quoter
            .quote_exact_input(
                &route(&[0, 1, 2], &[Protocol::V2Volatile, Protocol::V2Volatile]),
                amount(10_000),
            )
            .unwrap();
        assert_eq!(two_volatile.amount, amount(9939));

        let stable = quoter
            .quote_exact_input(&route(&[0, 1], &[Protocol::V2Stable]), amount(10_000))
            .unwrap();
        assert_eq!(stable.amount, amount(9994));

        let two_stable = quoter
            .quote_exact_input(
                &route(&[0, 1, 2], &[Protocol::V2Stable, Protocol::V2Stable]),
                amount(10_000),
            )
            .unwrap();
        assert_eq!(two_stable.amount, amount(9989));
    }

    #[test]
    fn exact_input_mixed_route() {
        let fixture = Fixture::new();
        let result = fixture
            .quoter()
            .quote_exact_input(
                &route(&[0, 2, 1], &[LEGACY, Protocol::V2Volatile]),
                amount(10_000),
            )
            .unwrap();

        assert_eq!(result.amount, amount(9841));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![price("78461846509168490764501028180")]
        );
        assert_eq!(result.initialized_ticks_crossed_list, vec![2]);
        assert_eq!(result.gas_estimate, 155_000 + 2 * 21_492);
    }

    // ---------------- Exact output ----------------

    #[test]
    fn exact_output_multi_hop_v3() {
        let fixture = Fixture::new();
        // 0 -> 2 -> 1, encoded in reverse
        let result = fixture
            .quoter()
            .quote_exact_output(&route(&[1, 2, 0], &[LEGACY, LEGACY]), amount(9745))
            .unwrap();

        assert_eq!(result.amount, amount(10_000));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![
                price("80007838904387594703933785072"),
                price("78461888503179331029803316753"),
            ]
        );
        assert_eq!(result.initialized_ticks_crossed_list, vec![0, 2]);
    }

    #[test]
    fn exact_output_single_v3_hops() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();

        let result = quoter
            .quote_exact_output(&route(&[1, 2], &[LEGACY]), amount(9871))
            .unwrap();
        assert_eq!(result.amount, amount(10_000));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![price("80018020393569259756601362385")]
        );

        let result = quoter
            .quote_exact_output(&route(&[2, 0], &[LEGACY]), amount(10))
            .unwrap();
        assert_eq!(result.amount, amount(12));
        assert_eq!(
            result.sqrt_price_x96_after_list,
            vec![price("79227408033628034983534698435")]
        );
        assert_eq!(result.initialized_ticks_crossed_list, vec![0]);
    }

    #[test]
    fn exact_output_v2_hops() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();

        let volatile = quoter
            .quote_exact_output(
                &route(&[2, 1, 0], &[Protocol::V2Volatile, Protocol::V2Volatile]),
                amount(9939),
            )
            .unwrap();
        assert_eq!(volatile.amount, amount(9999));
        assert_eq!(volatile.gas_estimate, 0);

        let stable = quoter
            .quote_exact_output(
                &route(&[2, 1, 0], &[Protocol::V2Stable, Protocol::V2Stable]),
                amount(9989),
            )
            .unwrap();
        assert_eq!(stable.amount, amount(9999));
    }

    #[test]
    fn exact_output_covers_exact_input_quote() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();
        let protocols = [Protocol::V2Stable, LEGACY, Protocol::V2Volatile];
        let forward_path = route(&[0, 1, 2, 0], &protocols);

        let forward = quoter
            .quote_exact_input(&forward_path, amount(50_000))
            .unwrap();
        assert_eq!(forward.amount, amount(47_316));

        let mut reversed = protocols;
        reversed.reverse();
        let backward = quoter
            .quote_exact_output(&route(&[0, 2, 1, 0], &reversed), forward.amount)
            .unwrap();
        assert_eq!(backward.amount, amount(49_999));
        assert_eq!(backward.initialized_ticks_crossed_list, vec![0]);

        let replay = quoter
            .quote_exact_input(&forward_path, backward.amount)
            .unwrap();
        assert_eq!(replay.amount, forward.amount);
    }

    // ---------------- Single hop entry points ----------------

    #[test]
    fn exact_input_single_v3_with_limit() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();
        let [t0, _, t2] = tokens();

        for deployment in [Deployment::Legacy, Deployment::Canonical] {
            let down = quoter
                .quote_exact_input_single_v3(&QuoteExactInputSingleV3Params {
                    token_in: t0,
                    token_out: t2,
                    deployment,
                    tick_spacing: 60,
                    amount_in: amount(10_000),
                    sqrt_price_limit_x96: Some(price("78447570448055484695608110440")),
                })
                .unwrap();
            assert_eq!(down.amount, amount(9871));
            assert_eq!(down.initialized_ticks_crossed, 2);
            assert_eq!(down.sqrt_price_x96_after, price("78461846509168490764501028180"));
            assert_eq!(down.gas_estimate, 155_000 + 2 * 21_492);

            let up = quoter
                .quote_exact_input_single_v3(&QuoteExactInputSingleV3Params {
                    token_in: t2,
                    token_out: t0,
                    deployment,
                    tick_spacing: 60,
                    amount_in: amount(10_000),
                    sqrt_price_limit_x96: Some(price("80016521857016594389520272648")),
                })
                .unwrap();
            assert_eq!(up.amount, amount(9871));
            assert_eq!(up.initialized_ticks_crossed, 2);
            assert_eq!(up.sqrt_price_x96_after, price("80001962924147897865541384515"));
        }
    }

    #[test]
    fn exact_output_single_v3_stops_at_limit() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();
        let [t0, t1, _] = tokens();
        let cases = [
            (t0, t1, "78447570448055484695608110440"),
            (t1, t0, "80016521857016594389520272648"),
        ];

        for (token_in, token_out, limit) in cases {
            let result = quoter
                .quote_exact_output_single_v3(&QuoteExactOutputSingleV3Params {
                    token_in,
                    token_out,
                    deployment: Deployment::Legacy,
                    tick_spacing: 60,
                    amount_out: U256::from(u128::MAX),
                    sqrt_price_limit_x96: Some(price(limit)),
                })
                .unwrap();
            assert_eq!(result.amount, amount(9981));
            assert_eq!(result.initialized_ticks_crossed, 0);
            assert_eq!(result.sqrt_price_x96_after, price(limit));
            assert_eq!(result.gas_estimate, 155_000);
        }
    }

    #[test]
    fn single_v2_quotes() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();
        let [t0, t1, _] = tokens();

        let cases = [
            (CurveVariant::Volatile, 10_000u64, 9969u64),
            (CurveVariant::Volatile, 2_000_000, 1_993_999),
            (CurveVariant::Stable, 10_000, 9994),
            (CurveVariant::Stable, 2_000_000, 1_998_999),
        ];
        for (variant, amount_in, amount_out) in cases {
            let quote = quoter
                .quote_exact_input_single_v2(&QuoteExactInputSingleV2Params {
                    token_in: t0,
                    token_out: t1,
                    variant,
                    amount_in: amount(amount_in),
                })
                .unwrap();
            assert_eq!(quote, amount(amount_out), "{variant:?} {amount_in}");
        }

        let required = quoter
            .quote_exact_output_single_v2(&QuoteExactOutputSingleV2Params {
                token_in: t1,
                token_out: t0,
                variant: CurveVariant::Volatile,
                amount_out: amount(9969),
            })
            .unwrap();
        assert_eq!(required, amount(9999));
    }

    // ---------------- Failures ----------------

    #[test]
    fn malformed_paths_fail_before_any_lookup() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();
        let valid = route(&[0, 1], &[LEGACY]);

        for len in [0, 20, 42, 44, 65] {
            let bytes = vec![0x01; len];
            assert!(matches!(
                quoter.quote_exact_input(&bytes, amount(1)),
                Err(Error::MalformedPath(_))
            ));
            assert!(matches!(
                quoter.quote_exact_output(&bytes, amount(1)),
                Err(Error::MalformedPath(_))
            ));
        }
        assert!(matches!(
            quoter.quote_exact_input(&valid[..valid.len() - 1], amount(1)),
            Err(Error::MalformedPath(_))
        ));
    }

    #[test]
    fn missing_pools_are_reported_per_hop() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();
        let [t0, t1, _] = tokens();

        let other_spacing = Protocol::V3Legacy { tick_spacing: 10 };
        assert_eq!(
            quoter
                .quote_exact_input(&route(&[0, 1], &[other_spacing]), amount(10_000))
                .unwrap_err(),
            Error::PoolNotFound {
                token_in: t0,
                token_out: t1,
                protocol: other_spacing,
            }
        );

        let empty_pairs = InMemoryPairs::new();
        let quoter = Quoter::new(&fixture.legacy, &fixture.canonical, &empty_pairs);
        assert_eq!(
            quoter
                .quote_exact_output(&route(&[1, 0], &[Protocol::V2Stable]), amount(10))
                .unwrap_err(),
            Error::PoolNotFound {
                token_in: t0,
                token_out: t1,
                protocol: Protocol::V2Stable,
            }
        );
    }

    #[test]
    fn unfillable_amounts_are_insufficient_liquidity() {
        let fixture = Fixture::new();
        let quoter = fixture.quoter();

        assert_eq!(
            quoter
                .quote_exact_output(&route(&[1, 0], &[LEGACY]), amount(2_000_000))
                .unwrap_err(),
            Error::InsufficientLiquidity
        );
        assert_eq!(
            quoter
                .quote_exact_output(
                    &route(&[1, 0], &[Protocol::V2Volatile]),
                    U256::from(10u128.pow(24)),
                )
                .unwrap_err(),
            Error::InsufficientLiquidity
        );
    }

    #[test]
    fn quotes_are_repeatable_and_configurable() {
        let fixture = Fixture::new();
        let path = route(&[0, 2, 1], &[LEGACY, LEGACY]);

        let quoter = fixture.quoter();
        let first = quoter.quote_exact_input(&path, amount(10_000)).unwrap();
        let second = quoter.quote_exact_input(&path, amount(10_000)).unwrap();
        assert_eq!(first, second);

        let config = QuoterConfig {
            v3_base_gas: 100_000,
            v3_gas_per_initialized_tick: 1_000,
            ..QuoterConfig::default()
        };
        let quoter =
            Quoter::with_config(&fixture.legacy, &fixture.canonical, &fixture.pairs, config)
                .unwrap();
        assert_eq!(quoter.config(), &config);
        let result = quoter.quote_exact_input(&path, amount(10_000)).unwrap();
        assert_eq!(result.amount, first.amount);
        assert_eq!(result.gas_estimate, 2 * 100_000 + 2 * 1_000);
    }

    #[test]
    fn quoter_rejects_fees_above_ten_thousand_bps() {
        let fixture = Fixture::new();
        let config = QuoterConfig {
            stable_fee_bps: 10_001,
            ..QuoterConfig::default()
        };
        match Quoter::with_config(&fixture.legacy, &fixture.canonical, &fixture.pairs, config) {
            Err(ConfigError::FeeOutOfRange { value: 10_001, .. }) => {}
            other => panic!("expected FeeOutOfRange, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn decoded_hops_match_quoted_hops() {
        let path = route(&[0, 2, 1], &[CANONICAL, Protocol::V2Stable]);
        let hops = path::decode(&path).unwrap();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].protocol.deployment(), Some(Deployment::Canonical));
        assert_eq!(hops[1].protocol.curve_variant(), Some(CurveVariant::Stable));
    }

    #[test]
    fn quoter_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Quoter<&InMemoryPools, &InMemoryPools, &InMemoryPairs>>();
        assert_send_sync::<Quoter<InMemoryPools, InMemoryPools, InMemoryPairs>>();
    }
}
