use rust_decimal::Decimal;

pub const SOL_DECIMALS: u32 = 9;

/// Native balance in display units (SOL).
pub type Sol = Decimal;

/// Convert lamports to SOL without going through floats.
///
/// Examples:
/// - 1_500_000_000 => 1.5
/// - 1 => 0.000000001
pub fn lamports_to_sol(lamports: u64) -> Sol {
    Decimal::from_i128_with_scale(i128::from(lamports), SOL_DECIMALS).normalize()
}
