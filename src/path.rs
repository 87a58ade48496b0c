//! Packed route codec.
//!
//! A path is `token (20 bytes) | param (3 bytes) | token | ... | token`, with
//! one big-endian 24-bit pool parameter between each pair of tokens. The
//! parameter selects the pool family of the hop:
//!
//! | bits               | hop                                   |
//! |--------------------|---------------------------------------|
//! | `1 << 22`          | constant-function pair, volatile      |
//! | `1 << 21`          | constant-function pair, stable        |
//! | `1 << 20 \| s`     | concentrated liquidity, canonical, spacing `s` |
//! | `s`                | concentrated liquidity, legacy, spacing `s`    |
//!
//! Bit 23 is reserved. Exact-output routes are encoded output token first.

use crate::error::{Error, PathError};
use crate::pool::v2_pair::CurveVariant;
use alloy_primitives::{Address, Bytes};

/// The length of the bytes encoded address.
pub const ADDR_SIZE: usize = 20;
/// The length of the bytes encoded pool parameter.
pub const POOL_PARAM_SIZE: usize = 3;
/// Offset of a single token address and pool parameter.
pub const NEXT_OFFSET: usize = ADDR_SIZE + POOL_PARAM_SIZE;
/// Offset of an encoded pool key, i.e. the length of a single-hop path.
pub const POP_OFFSET: usize = NEXT_OFFSET + ADDR_SIZE;
/// Minimum length of a path that contains two or more pools.
pub const MULTIPLE_POOLS_MIN_LENGTH: usize = POP_OFFSET + NEXT_OFFSET;

pub const RESERVED_FLAG: u32 = 1 << 23;
pub const V2_VOLATILE_FLAG: u32 = 1 << 22;
pub const V2_STABLE_FLAG: u32 = 1 << 21;
pub const V3_CANONICAL_FLAG: u32 = 1 << 20;
pub const TICK_SPACING_MASK: u32 = V3_CANONICAL_FLAG - 1;

/// Pool deployment serving a concentrated-liquidity hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deployment {
    Legacy,
    Canonical,
}

impl Deployment {
    pub fn protocol(self, tick_spacing: i32) -> Protocol {
        match self {
            Deployment::Legacy => Protocol::V3Legacy { tick_spacing },
            Deployment::Canonical => Protocol::V3Canonical { tick_spacing },
        }
    }
}

/// Pool family of one hop, decoded from its 3-byte parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    V3Legacy { tick_spacing: i32 },
    V3Canonical { tick_spacing: i32 },
    V2Volatile,
    V2Stable,
}

impl Protocol {
    pub fn from_pool_param(param: u32) -> Result<Self, PathError> {
        let tick_spacing = (param & TICK_SPACING_MASK) as i32;

        match param & !TICK_SPACING_MASK {
            0 if tick_spacing != 0 => Ok(Protocol::V3Legacy { tick_spacing }),
            V3_CANONICAL_FLAG if tick_spacing != 0 => Ok(Protocol::V3Canonical { tick_spacing }),
            V2_VOLATILE_FLAG if tick_spacing == 0 => Ok(Protocol::V2Volatile),
            V2_STABLE_FLAG if tick_spacing == 0 => Ok(Protocol::V2Stable),
            _ => Err(PathError::UnknownPoolParam { param }),
        }
    }

    pub fn pool_param(&self) -> Result<u32, PathError> {
        match *self {
            Protocol::V3Legacy { tick_spacing } => encode_tick_spacing(tick_spacing),
            Protocol::V3Canonical { tick_spacing } => {
                Ok(V3_CANONICAL_FLAG | encode_tick_spacing(tick_spacing)?)
            }
            Protocol::V2Volatile => Ok(V2_VOLATILE_FLAG),
            Protocol::V2Stable => Ok(V2_STABLE_FLAG),
        }
    }

    /// Deployment of a concentrated-liquidity hop, `None` for pairs.
    pub fn deployment(&self) -> Option<Deployment> {
        match self {
            Protocol::V3Legacy { .. } => Some(Deployment::Legacy),
            Protocol::V3Canonical { .. } => Some(Deployment::Canonical),
            Protocol::V2Volatile | Protocol::V2Stable => None,
        }
    }

    /// Curve of a constant-function hop, `None` for tick based pools.
    pub fn curve_variant(&self) -> Option<CurveVariant> {
        match self {
            Protocol::V2Volatile => Some(CurveVariant::Volatile),
            Protocol::V2Stable => Some(CurveVariant::Stable),
            Protocol::V3Legacy { .. } | Protocol::V3Canonical { .. } => None,
        }
    }
}

#[inline]
fn encode_tick_spacing(tick_spacing: i32) -> Result<u32, PathError> {
    match u32::try_from(tick_spacing) {
        Ok(spacing) if spacing != 0 && spacing <= TICK_SPACING_MASK => Ok(spacing),
        _ => Err(PathError::InvalidTickSpacing { tick_spacing }),
    }
}

/// One decoded hop, in the order the tokens appear in the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub token_in: Address,
    pub token_out: Address,
    pub protocol: Protocol,
}

impl Hop {
    /// Same pool, opposite direction.
    pub fn reversed(self) -> Self {
        Self {
            token_in: self.token_out,
            token_out: self.token_in,
            protocol: self.protocol,
        }
    }
}

/// Borrowed view over a validated encoded path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Path<'a> {
    data: &'a [u8],
}

impl<'a> Path<'a> {
    /// Checks that `data` holds `n + 1` tokens and `n >= 1` parameters.
    pub fn new(data: &'a [u8]) -> Result<Self, PathError> {
        let len = data.len();
        if len < POP_OFFSET || (len - ADDR_SIZE) % NEXT_OFFSET != 0 {
            return Err(PathError::InvalidLength { len });
        }
        Ok(Self { data })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn num_pools(&self) -> usize {
        (self.data.len() - ADDR_SIZE) / NEXT_OFFSET
    }

    pub fn has_multiple_pools(&self) -> bool {
        self.data.len() >= MULTIPLE_POOLS_MIN_LENGTH
    }

    pub fn decode_first_hop(&self) -> Result<Hop, PathError> {
        let token_in = Address::from_slice(&self.data[..ADDR_SIZE]);
        let param = &self.data[ADDR_SIZE..NEXT_OFFSET];
        let token_out = Address::from_slice(&self.data[NEXT_OFFSET..POP_OFFSET]);

        let param = u32::from_be_bytes([0, param[0], param[1], param[2]]);

        Ok(Hop {
            token_in,
            token_out,
            protocol: Protocol::from_pool_param(param)?,
        })
    }

    /// The path without its first token and parameter, `None` on the last hop.
    pub fn skip_token(&self) -> Option<Path<'a>> {
        self.has_multiple_pools().then(|| Path {
            data: &self.data[NEXT_OFFSET..],
        })
    }

    pub fn hops(&self) -> Hops<'a> {
        Hops { next: Some(*self) }
    }
}

/// Streams the hops of a [`Path`] front to back.
#[derive(Debug, Clone)]
pub struct Hops<'a> {
    next: Option<Path<'a>>,
}

impl Iterator for Hops<'_> {
    type Item = Result<Hop, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.next.take()?;
        let hop = path.decode_first_hop();
        if hop.is_ok() {
            self.next = path.skip_token();
        }
        Some(hop)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |path| path.num_pools());
        (0, Some(remaining))
    }
}

/// Decodes every hop of `path`.
pub fn decode(path: &[u8]) -> Result<Vec<Hop>, Error> {
    let hops = Path::new(path)?.hops().collect::<Result<Vec<_>, _>>()?;
    Ok(hops)
}

/// Encodes `tokens[i] -> tokens[i + 1]` through `protocols[i]`.
pub fn encode(tokens: &[Address], protocols: &[Protocol]) -> Result<Bytes, Error> {
    if protocols.is_empty() || tokens.len() != protocols.len() + 1 {
        return Err(PathError::MismatchedLengths {
            tokens: tokens.len(),
            params: protocols.len(),
        }
        .into());
    }

    let mut encoded = Vec::with_capacity(ADDR_SIZE + protocols.len() * NEXT_OFFSET);
    encoded.extend_from_slice(tokens[0].as_slice());

    for (protocol, token) in protocols.iter().zip(&tokens[1..]) {
        // u24, big endian
        let param = protocol.pool_param()?.to_be_bytes();
        encoded.extend_from_slice(&param[1..]);
        encoded.extend_from_slice(token.as_slice());
    }

    Ok(encoded.into())
}
