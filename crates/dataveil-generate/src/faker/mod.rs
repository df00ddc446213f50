mod locales;
mod methods;
mod params;

use fake::locales::{EN, FR_FR, PT_BR};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use tracing::debug;

pub use locales::LocaleKey;
pub use methods::{SUPPORTED_METHODS, canonical_method};

use crate::errors::GenerationError;
use crate::generator::ValueGenerator;
use params::Params;

/// Localized fake data backed by the `fake` crate.
///
/// With a seed the output is reproducible: the same seed, language and
/// sequence of calls always yield the same values.
pub struct FakerGenerator {
    locale: LocaleKey,
    seed: Option<u64>,
    rng: ChaCha8Rng,
}

impl FakerGenerator {
    pub fn new(language: &str, seed: Option<u64>) -> Result<Self, GenerationError> {
        let locale = LocaleKey::resolve(language)?;
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Ok(Self { locale, seed, rng })
    }

    pub fn locale(&self) -> LocaleKey {
        self.locale
    }

    /// Restart the stream for `scope` so each entity gets its own sequence,
    /// independent of the order entities are processed in. No-op when
    /// unseeded.
    pub fn reseed_for(&mut self, scope: &str) {
        if let Some(seed) = self.seed {
            let scoped = scoped_seed(seed, scope);
            debug!(scope, seed = scoped, "generator reseeded");
            self.rng = ChaCha8Rng::seed_from_u64(scoped);
        }
    }
}

impl ValueGenerator for FakerGenerator {
    fn generate(&mut self, method: &str, params: &[Value]) -> Result<Value, GenerationError> {
        let method =
            canonical_method(method).ok_or_else(|| GenerationError::UnknownMethod(method.to_string()))?;
        let params = Params::new(method, params);
        match self.locale {
            LocaleKey::EnUs => methods::generate(EN, method, &params, &mut self.rng),
            LocaleKey::FrFr => methods::generate(FR_FR, method, &params, &mut self.rng),
            LocaleKey::PtBr => methods::generate(PT_BR, method, &params, &mut self.rng),
        }
    }

    fn supports(&self, method: &str) -> bool {
        canonical_method(method).is_some()
    }

    fn begin_scope(&mut self, scope: &str) {
        self.reseed_for(scope);
    }
}

fn scoped_seed(seed: u64, scope: &str) -> u64 {
    let mut hash = seed ^ 0xcbf2_9ce4_8422_2325;
    for byte in scope.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
