use std::fmt;

use crate::foundation::math::Fnv1a64;

/// Deterministic 128-bit fingerprint of an artifact's generation inputs.
///
/// Doubles as the cache index and the file stem of the generated artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub hi: u64,
    pub lo: u64,
}

impl CacheKey {
    /// 32 lower-case hex characters.
    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Order-sensitive builder over two independently seeded FNV-1a lanes.
///
/// Each field is length-prefixed, so `("ab", "c")` and `("a", "bc")` never collide by
/// concatenation.
#[derive(Clone, Copy, Debug)]
pub struct Fingerprinter {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self {
            a: Fnv1a64::new(Fnv1a64::OFFSET_BASIS),
            b: Fnv1a64::new(Fnv1a64::ALT_BASIS),
        }
    }

    pub fn str(mut self, s: &str) -> Self {
        self.write_u64(s.len() as u64);
        self.a.write_bytes(s.as_bytes());
        self.b.write_bytes(s.as_bytes());
        self
    }

    fn write_u64(&mut self, v: u64) {
        self.a.write_u64(v);
        self.b.write_u64(v);
    }

    pub fn finish(self) -> CacheKey {
        CacheKey {
            hi: self.a.finish(),
            lo: self.b.finish(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
