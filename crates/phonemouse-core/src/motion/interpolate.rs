//! Motion interpolation: one scaled delta replayed as several equal steps.
//!
//! With `steps = 0` the delta passes through unchanged.  With `steps = n` the
//! delta becomes `n` copies of `(dx / n, dy / n)`.  Division truncates toward
//! zero and the remainder is dropped, so the replayed sum can fall short of
//! the original delta by up to `n - 1` units per axis.  That loss is accepted
//! in exchange for emitting identical steps.

/// Exact-size iterator over the sub-steps of one delta.
///
/// Produced by [`split`]; yields its steps in replay order.
#[derive(Debug, Clone)]
pub struct MotionSteps {
    step: (i32, i32),
    remaining: u32,
}

impl Iterator for MotionSteps {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for MotionSteps {}

/// Splits `(dx, dy)` into `steps` equal sub-steps.
///
/// # Examples
///
/// ```rust
/// use phonemouse_core::split;
///
/// assert_eq!(split(10, -7, 0).collect::<Vec<_>>(), vec![(10, -7)]);
/// assert_eq!(split(10, -7, 3).collect::<Vec<_>>(), vec![(3, -2); 3]);
/// ```
pub fn split(dx: i32, dy: i32, steps: u32) -> MotionSteps {
    if steps == 0 {
        return MotionSteps { step: (dx, dy), remaining: 1 };
    }
    // `steps` fits in i64 and the quotient magnitude never exceeds |dx|.
    let n = i64::from(steps);
    let step = (
        (i64::from(dx) / n) as i32,
        (i64::from(dy) / n) as i32,
    );
    MotionSteps { step, remaining: steps }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_zero_steps_is_pass_through() {
        for &(dx, dy) in &[(0, 0), (10, -7), (i32::MIN, i32::MAX), (-1, 1)] {
            assert_eq!(split(dx, dy, 0).collect::<Vec<_>>(), vec![(dx, dy)]);
        }
    }

    #[test]
    fn test_split_emits_exactly_n_truncated_steps() {
        // Arrange / Act
        let steps: Vec<_> = split(10, -7, 3).collect();

        // Assert
        assert_eq!(steps, vec![(3, -2), (3, -2), (3, -2)]);
    }

    #[test]
    fn test_split_drops_remainder() {
        let total: (i32, i32) = split(10, -7, 3).fold((0, 0), |acc, s| (acc.0 + s.0, acc.1 + s.1));
        assert_eq!(total, (9, -6));
    }

    #[test]
    fn test_split_more_steps_than_delta_yields_zero_steps() {
        let steps: Vec<_> = split(2, -3, 5).collect();
        assert_eq!(steps, vec![(0, 0); 5]);
    }

    #[test]
    fn test_split_reports_exact_len() {
        assert_eq!(split(100, 100, 7).len(), 7);
        assert_eq!(split(100, 100, 0).len(), 1);
    }

    #[test]
    fn test_split_even_division() {
        let steps: Vec<_> = split(-5, -5, 5).collect();
        assert_eq!(steps, vec![(-1, -1); 5]);
    }

    #[test]
    fn test_split_handles_i32_min() {
        let steps: Vec<_> = split(i32::MIN, 0, 1).collect();
        assert_eq!(steps, vec![(i32::MIN, 0)]);
    }
}
