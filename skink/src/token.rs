use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skink_msg::{Id, Token, MAX_TOKEN_LEN};
use toad_stem::Stem;

use crate::config::Config;

/// Generates random correlation [`Token`]s
///
/// The generator is seeded from [`Msg::token_seed`](crate::config::Msg::token_seed)
/// and the time the generator was created, so two endpoints sharing a seed
/// still produce different sequences.
#[derive(Debug)]
pub struct TokenGenerator {
  rng: Stem<ChaCha8Rng>,
  len: usize,
}

impl TokenGenerator {
  /// Create a new generator
  pub fn new(config: &Config, now_millis: u64) -> Self {
    let seed = ((config.msg.token_seed as u64) << 48) ^ now_millis;
    Self { rng: Stem::new(ChaCha8Rng::seed_from_u64(seed)),
           len: (config.msg.token_len as usize).min(MAX_TOKEN_LEN) }
  }

  /// Get a fresh token
  pub fn next(&self) -> Token {
    let mut bytes = [0u8; MAX_TOKEN_LEN];
    self.rng.map_mut(|rng| rng.fill_bytes(&mut bytes[..self.len]));

    let mut token = Token::default();
    token.0.extend_from_slice(&bytes[..self.len]);
    token
  }

  /// Get a random message id, used as the first id of a session
  pub fn next_id(&self) -> Id {
    Id(self.rng.map_mut(|rng| rng.next_u32()) as u16)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tokens_differ() {
    let gen = TokenGenerator::new(&Config::default(), 1000);
    let a = gen.next();
    let b = gen.next();
    assert_eq!(a.len(), 8);
    assert_ne!(a, b);
  }

  #[test]
  fn token_len_is_clamped() {
    let mut cfg = Config::default();
    cfg.msg.token_len = 3;
    assert_eq!(TokenGenerator::new(&cfg, 0).next().len(), 3);

    cfg.msg.token_len = 200;
    assert_eq!(TokenGenerator::new(&cfg, 0).next().len(), 8);
  }

  #[test]
  fn seed_changes_sequence() {
    let mut cfg = Config::default();
    let a = TokenGenerator::new(&cfg, 0).next();
    cfg.msg.token_seed = 1;
    let b = TokenGenerator::new(&cfg, 0).next();
    assert_ne!(a, b);
  }
}
