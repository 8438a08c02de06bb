/// An unsigned integer constant, used for literals and register default values.
///
/// This type isn't typically used explicitly, as the graph API always takes `Constant` parameters as `Into<Constant>`, and `Constant` implements `From` for `bool` and Rust's unsigned integer types. Prefer passing integer values/literals directly.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
///
/// let a = m.lit(true, 16);
/// let b = m.lit(0xdeadbeefu32, 47);
/// let r = m.reg("data", 20);
/// r.default_value(5u8);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Constant(u128);

impl Constant {
    /// Returns the numeric value of this `Constant`.
    pub fn value(&self) -> u128 {
        self.0
    }

    pub(crate) fn required_bits(&self) -> u32 {
        128 - self.0.leading_zeros()
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant(value as _)
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Constant {
                fn from(value: $t) -> Self {
                    Constant(value as _)
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_bits() {
        assert_eq!(Constant::from(false).required_bits(), 0);
        assert_eq!(Constant::from(true).required_bits(), 1);
        assert_eq!(Constant::from(0xffu8).required_bits(), 8);
        assert_eq!(Constant::from(0x100u16).required_bits(), 9);
        assert_eq!(Constant::from(u128::MAX).required_bits(), 128);
    }
}
