use std::fmt;

/// Random bytes per identifier (128 bits, 32 hex chars on the wire).
const ID_BYTES: usize = 16;

/// Opaque token naming one stack instance.
///
/// Possession of the identifier is the sole access credential for the
/// corresponding stack, so fresh identifiers are drawn from the operating
/// system's CSPRNG. At 128 bits, guessing or enumerating live identifiers
/// is infeasible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackId(String);

impl StackId {
    /// Generates a fresh random identifier.
    ///
    /// # Panics
    ///
    /// Panics if the system entropy source is unavailable. That is a fatal
    /// process-level condition, not a per-request error.
    pub fn generate() -> Self {
        let mut buf = [0u8; ID_BYTES];
        getrandom::getrandom(&mut buf).expect("system entropy source unavailable");
        StackId(hex::encode(buf))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Identifiers arrive over the wire as arbitrary client-supplied tokens;
// lookup decides whether they name anything.
impl From<&str> for StackId {
    fn from(s: &str) -> Self {
        StackId(s.to_string())
    }
}

impl From<String> for StackId {
    fn from(s: String) -> Self {
        StackId(s)
    }
}
