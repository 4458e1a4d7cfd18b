//! Array keys: strings, with integers coerced to their decimal form.

use std::borrow::{Borrow, Cow};
use std::fmt;

/// Owned key of a `PhpArray` entry.
///
/// Integer keys are stringified on conversion, so `5` and `"5"` name the
/// same entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrayKey(String);

impl ArrayKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArrayKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ArrayKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        ArrayKey(s)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey(s.to_owned())
    }
}

impl From<&String> for ArrayKey {
    fn from(s: &String) -> Self {
        ArrayKey(s.clone())
    }
}

impl From<&ArrayKey> for ArrayKey {
    fn from(k: &ArrayKey) -> Self {
        k.clone()
    }
}

impl From<ArrayKey> for String {
    fn from(k: ArrayKey) -> Self {
        k.0
    }
}

/// Borrowed form of a key used for lookups, so `get("a")` does not allocate.
pub trait AsArrayKey {
    fn as_array_key(&self) -> Cow<'_, str>;
}

impl AsArrayKey for str {
    fn as_array_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl AsArrayKey for String {
    fn as_array_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl AsArrayKey for ArrayKey {
    fn as_array_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: AsArrayKey + ?Sized> AsArrayKey for &T {
    fn as_array_key(&self) -> Cow<'_, str> {
        (**self).as_array_key()
    }
}

macro_rules! integer_keys {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ArrayKey {
                fn from(n: $t) -> Self {
                    ArrayKey(n.to_string())
                }
            }

            impl AsArrayKey for $t {
                fn as_array_key(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_keys!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
