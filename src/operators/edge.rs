/// How the forward shift treats the last point along an axis.
///
/// The forward shift of point `j` is `j + 1`; the last point has no such neighbor, so
/// its row in the shift matrix (and therefore in the forward difference) is fixed here.
///
/// | behavior | shift row at the last point | forward difference row |
/// |----------|-----------------------------|------------------------|
/// | `Clamp`  | the point itself            | zero                   |
/// | `Wrap`   | the first point on the axis | `u[0] - u[last]`       |
/// | `Absorb` | empty                       | `-u[last]`             |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EdgeBehavior {
    /// Out-of-range shift maps the last point onto itself
    #[default]
    Clamp,
    /// Out-of-range shift wraps to the opposite side (periodic)
    Wrap,
    /// Out-of-range shift is dropped
    Absorb,
}

impl EdgeBehavior {
    /// Linear index reached by a forward shift from point `p`, which sits at index `j`
    /// of an axis with `len` points and linear stride `stride`
    pub(crate) fn forward_target(self, p: usize, j: usize, len: usize, stride: usize) -> Option<usize> {
        if j + 1 < len {
            Some(p + stride)
        } else {
            match self {
                Self::Clamp => Some(p),
                Self::Wrap => Some(p - j * stride),
                Self::Absorb => None,
            }
        }
    }
}
