use crate::error::{NameGenError, Result};

/// Reserved character used both as start padding and as the end marker.
///
/// It must never appear in a training line nor in an exemplar alphabet.
pub const DELIMITER: char = '#';

/// Smallest accepted model order.
pub const MIN_ORDER: usize = 1;

/// Largest accepted model order.
pub const MAX_ORDER: usize = 10;

/// Returns the start padding for a model of the given order:
/// `order` repetitions of [`DELIMITER`].
///
/// # Errors
/// Returns a Configuration error if `order` is 0.
pub fn start_symbol(order: usize) -> Result<String> {
	if order == 0 {
		return Err(NameGenError::configuration("Order must be positive"));
	}
	Ok(std::iter::repeat_n(DELIMITER, order).collect())
}

/// Returns the end marker appended to every training line.
pub fn end_symbol() -> char {
	DELIMITER
}

/// Checks that `order` lies in `[MIN_ORDER, MAX_ORDER]`.
pub fn check_order(order: usize) -> Result<usize> {
	if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
		return Err(NameGenError::configuration(format!(
			"Order must be between {MIN_ORDER} and {MAX_ORDER}, got {order}"
		)));
	}
	Ok(order)
}
