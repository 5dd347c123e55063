//! CBLAS-style storage order and transpose flags.

use crate::error::{BlasError, BlasResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Fortran order: element `(i, j)` at `i + j * lda`.
    #[default]
    ColMajor,
    /// C order: element `(i, j)` at `i * lda + j`.
    RowMajor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transpose {
    #[default]
    NoTrans,
    /// `op(A) = A^T`. Conjugate transpose is the same thing for real data.
    Trans,
}

impl Transpose {
    /// Parses a BLAS `trans` character (`N`, `T` or `C`, any case).
    pub fn from_char(c: char) -> BlasResult<Self> {
        match c.to_ascii_uppercase() {
            'N' => Ok(Transpose::NoTrans),
            'T' | 'C' => Ok(Transpose::Trans),
            other => Err(BlasError::invalid(
                1,
                "trans",
                format!("expected 'N', 'T' or 'C', got {:?}", other),
            )),
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Transpose::NoTrans => Transpose::Trans,
            Transpose::Trans => Transpose::NoTrans,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_char() {
        assert_eq!(Transpose::from_char('n').unwrap(), Transpose::NoTrans);
        assert_eq!(Transpose::from_char('T').unwrap(), Transpose::Trans);
        assert_eq!(Transpose::from_char('c').unwrap(), Transpose::Trans);
        match Transpose::from_char('x') {
            Err(BlasError::InvalidArgument { position, .. }) => assert_eq!(position, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_flip() {
        assert_eq!(Transpose::NoTrans.flip(), Transpose::Trans);
        assert_eq!(Transpose::Trans.flip().flip(), Transpose::Trans);
    }
}
