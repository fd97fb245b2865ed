use hybrid_array::{Array, ArraySize, typenum::U128};
use sha3::{
    Sha3_256, Sha3_512, Shake128, Shake256,
    digest::{ExtendableOutput, Update, XofReader},
};

use crate::error::{Error, Result};
use crate::util::{B32, B64, split_b64};

/// An incremental SHAKE instance: absorb any number of inputs, then squeeze any number of
/// outputs from the same stream.
pub(crate) enum ShakeState<Shake: ExtendableOutput> {
    Absorbing(Shake),
    Squeezing(Shake::Reader),
}

impl<Shake: ExtendableOutput + Default> Default for ShakeState<Shake> {
    fn default() -> Self {
        Self::Absorbing(Shake::default())
    }
}

impl<Shake: ExtendableOutput + Default + Clone> ShakeState<Shake> {
    pub(crate) fn absorb(mut self, input: &[u8]) -> Self {
        match &mut self {
            Self::Absorbing(sponge) => Update::update(sponge, input),
            Self::Squeezing(_) => unreachable!("absorb after squeeze"),
        }

        self
    }

    pub(crate) fn squeeze(&mut self, output: &mut [u8]) -> &mut Self {
        match self {
            Self::Absorbing(sponge) => {
                let mut reader = sponge.clone().finalize_xof();
                reader.read(output);
                *self = Self::Squeezing(reader);
            }
            Self::Squeezing(reader) => {
                reader.read(output);
            }
        }

        self
    }

    pub(crate) fn squeeze_new<N: ArraySize>(&mut self) -> Array<u8, N> {
        let mut v = Array::default();
        self.squeeze(&mut v);
        v
    }
}

/// SHAKE-128, the stream that `SampleNTT` draws from
pub(crate) type Xof = ShakeState<Shake128>;

/// SHAKE-256, the primitive behind `J` and `PRF`
pub(crate) type Shake256State = ShakeState<Shake256>;

/// The output of `PRF_eta` for `eta = 2`
pub(crate) type PrfOutput = Array<u8, U128>;

fn sha3_512(inputs: &[&[u8]]) -> B64 {
    use sha3::digest::Digest;

    let mut h = Sha3_512::new();
    for input in inputs {
        Digest::update(&mut h, input);
    }
    let out = h.finalize();
    Array::from_fn(|i| out[i])
}

fn sha3_256(inputs: &[&[u8]]) -> B32 {
    use sha3::digest::Digest;

    let mut h = Sha3_256::new();
    for input in inputs {
        Digest::update(&mut h, input);
    }
    let out = h.finalize();
    Array::from_fn(|i| out[i])
}

/// `G(c) = SHA3-512(c)`, split into two 32-byte halves
pub(crate) fn G(inputs: &[&[u8]]) -> (B32, B32) {
    split_b64(&sha3_512(inputs))
}

/// `H(s) = SHA3-256(s)`
pub(crate) fn H(input: &[u8]) -> B32 {
    sha3_256(&[input])
}

/// `J(s) = SHAKE-256(s, 32)`
pub(crate) fn J(inputs: &[&[u8]]) -> B32 {
    let mut state = inputs
        .iter()
        .fold(Shake256State::default(), |state, input| state.absorb(input));
    state.squeeze_new()
}

/// `PRF_2(s, b) = SHAKE-256(s || b, 128)`
pub(crate) fn PRF(s: &B32, b: u8) -> PrfOutput {
    Shake256State::default().absorb(s).absorb(&[b]).squeeze_new()
}

/// The hash modes of the shared Keccak sponge.  The discriminants are the mode selector values
/// of the hardware sponge controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum HashMode {
    /// SHA3-256, 32-byte digest
    Sha3_256 = 0,
    /// SHA3-512, 64-byte digest
    Sha3_512 = 1,
    /// SHAKE-128, any output length
    Shake128 = 2,
    /// SHAKE-256, any output length
    Shake256 = 3,
}

impl HashMode {
    fn name(self) -> &'static str {
        match self {
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_512 => "SHA3-512",
            Self::Shake128 => "SHAKE-128",
            Self::Shake256 => "SHAKE-256",
        }
    }
}

impl TryFrom<u8> for HashMode {
    type Error = Error;

    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(Self::Sha3_256),
            1 => Ok(Self::Sha3_512),
            2 => Ok(Self::Shake128),
            3 => Ok(Self::Shake256),
            _ => Err(Error::OutOfRange {
                what: "hash mode",
                value: mode.into(),
                bound: 4,
            }),
        }
    }
}

/// Hash `input` in the given mode, producing `out_len` bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidOutputLength`] if a fixed-output mode is asked for anything other
/// than its digest size.
pub fn sponge(mode: HashMode, input: &[u8], out_len: usize) -> Result<Vec<u8>> {
    let fixed = |expected: usize, digest: &[u8]| {
        if out_len == expected {
            Ok(digest.to_vec())
        } else {
            Err(Error::InvalidOutputLength {
                mode: mode.name(),
                expected,
                got: out_len,
            })
        }
    };

    match mode {
        HashMode::Sha3_256 => fixed(32, &sha3_256(&[input])),
        HashMode::Sha3_512 => fixed(64, &sha3_512(&[input])),
        HashMode::Shake128 => {
            let mut out = vec![0u8; out_len];
            Xof::default().absorb(input).squeeze(&mut out);
            Ok(out)
        }
        HashMode::Shake256 => {
            let mut out = vec![0u8; out_len];
            Shake256State::default().absorb(input).squeeze(&mut out);
            Ok(out)
        }
    }
}
