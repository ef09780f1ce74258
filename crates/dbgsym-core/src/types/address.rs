//! Memory address type.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed address in a debuggee's address space
///
/// Keeps addresses apart from sizes, displacements and other `u64` values
/// that flow through symbol resolution.
///
/// Arithmetic with the `+`/`-` operators wraps, matching native pointer
/// arithmetic on a 64-bit target. Use [`Address::checked_add`] when an overflow
/// has to be detected.
///
/// ## Example
///
/// ```rust
/// use dbgsym_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next_addr = addr + 0x100;
/// assert_eq!(next_addr.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// No valid code lives here; constructors that describe code reject it.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value (usable in const contexts).
    ///
    /// ```rust
    /// use dbgsym_core::types::Address;
    ///
    /// const IMAGE_BASE: Address = Address::new(0x7ff6_0000_0000);
    /// assert_eq!(IMAGE_BASE.value(), 0x7ff6_0000_0000);
    /// ```
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Raw `u64` value of this address.
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Returns `true` for the null address.
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use dbgsym_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    pub fn checked_sub(self, offset: u64) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Apply a signed displacement using two's-complement wraparound
    ///
    /// This is the arithmetic a 64-bit debuggee performs on `base + disp`: a
    /// negative displacement moves the address down, and the result wraps at
    /// both ends of the address space.
    ///
    /// ```rust
    /// use dbgsym_core::types::Address;
    ///
    /// assert_eq!(Address::from(0x1000).wrapping_offset(-0x10), Address::from(0xff0));
    /// assert_eq!(Address::from(u64::MAX).wrapping_offset(1), Address::ZERO);
    /// ```
    #[must_use]
    pub const fn wrapping_offset(self, displacement: i64) -> Self
    {
        Address(self.0.wrapping_add_signed(displacement))
    }

    /// Signed distance from `origin` to `self` (`self - origin`), wrapping.
    ///
    /// ```rust
    /// use dbgsym_core::types::Address;
    ///
    /// let symbol = Address::from(0x1000);
    /// assert_eq!(Address::from(0x1010).offset_from(symbol), 0x10);
    /// assert_eq!(Address::from(0x0ff0).offset_from(symbol), -0x10);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn offset_from(self, origin: Address) -> i64
    {
        self.0.wrapping_sub(origin.0) as i64
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
