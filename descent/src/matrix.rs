use serde::Serialize;
use std::fmt::Debug;
use std::ops::MulAssign;
use std::{
    borrow::Borrow,
    ops::{AddAssign, Index, IndexMut, Mul},
};

#[derive(Serialize, Clone)]
pub struct Matrix<T, const R: usize, const C: usize> {
    data: Vec<T>,
}

pub type DMatrix<const R: usize, const C: usize> = Matrix<f64, R, C>;

impl<TA: Debug, const RA: usize, const CA: usize> Debug for Matrix<TA, RA, CA> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_list();
        for i in 0..RA {
            dbg.entry(&&self.data[i * CA..(i * CA) + CA]);
        }
        dbg.finish()
    }
}

impl<TA: Default + Copy, const RA: usize, const CA: usize> Default for Matrix<TA, RA, CA> {
    fn default() -> Self {
        Self {
            data: vec![TA::default(); RA * CA],
        }
    }
}

impl<TA, const RA: usize, const CA: usize> Index<(usize, usize)> for Matrix<TA, RA, CA> {
    type Output = TA;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let (r, c) = index;
        assert!(r < RA);
        assert!(c < CA);

        &self.data[r * CA + c]
    }
}

impl<TA, const RA: usize, const CA: usize> IndexMut<(usize, usize)> for Matrix<TA, RA, CA> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let (r, c) = index;
        assert!(r < RA);
        assert!(c < CA);

        &mut self.data[r * CA + c]
    }
}

impl<TA: Default + Copy, const RA: usize, const CA: usize> From<[[TA; CA]; RA]>
    for Matrix<TA, RA, CA>
{
    fn from(value: [[TA; CA]; RA]) -> Self {
        let mut out = Self::default();

        for r in 0..RA {
            for c in 0..CA {
                out[(r, c)] = value[r][c];
            }
        }

        out
    }
}

impl<
        TA: Default + Copy + PartialEq,
        const RA: usize,
        const CA: usize,
        const R: usize,
        const C: usize,
    > PartialEq<Matrix<TA, R, C>> for Matrix<TA, RA, CA>
{
    fn eq(&self, other: &Matrix<TA, R, C>) -> bool {
        if R != RA || C != CA {
            return false;
        }

        let mut res = true;

        for i in 0..RA * CA {
            res = res && (self.data[i] == other.data[i]);
        }

        res
    }
}

impl<
        TA: Default + Copy + Mul<Output = TA> + AddAssign + MulAssign,
        const RA: usize,
        const CA: usize,
    > Matrix<TA, RA, CA>
{
    pub fn add_ip<RHS: Borrow<Self>>(&mut self, rhs: RHS) {
        self.data
            .iter_mut()
            .zip(&rhs.borrow().data)
            .for_each(|(lhs_elem, rhs_elem)| {
                *lhs_elem += *rhs_elem;
            });
    }

    pub fn scalar_mul_ip(&mut self, scalar: TA) {
        self.data.iter_mut().for_each(|el| {
            *el *= scalar;
        });
    }

    pub fn mul<const D: usize, RHS: Borrow<Matrix<TA, CA, D>>>(
        &self,
        rhs: RHS,
    ) -> Matrix<TA, RA, D> {
        let mut out = Matrix::<TA, RA, D>::default();
        self.mul_mut(rhs, &mut out);
        out
    }

    /// Accumulates `self · rhs` into `out`; callers hand in a zeroed matrix.
    pub fn mul_mut<const D: usize, RHS: Borrow<Matrix<TA, CA, D>>>(
        &self,
        rhs: RHS,
        out: &mut Matrix<TA, RA, D>,
    ) {
        let out_row_iterator = out.data.chunks_mut(D);
        let self_row_iterator = self.data.chunks(CA);

        let rhsdata = &rhs.borrow().data;

        out_row_iterator
            .zip(self_row_iterator)
            .for_each(|(out_row, self_row)| {
                self_row
                    .iter()
                    .zip(rhsdata.chunks_exact(D))
                    .for_each(|(self_elem, rhs_row)| {
                        out_row
                            .iter_mut()
                            .zip(rhs_row.iter())
                            .for_each(|(out_elem, rhs_elem)| {
                                *out_elem += (*self_elem) * (*rhs_elem);
                            });
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use crate::matrix::DMatrix;

    #[test]
    fn index_and_index_mut_work() {
        let mut w = DMatrix::<2, 2>::default();

        w[(1, 0)] = -0.4;

        assert_eq!(w[(0, 0)], 0.0);
        assert_eq!(w[(1, 0)], -0.4);
    }

    #[test]
    #[should_panic]
    fn accessing_out_of_bound_panics() {
        let w = DMatrix::<2, 2>::default();
        w[(2, 0)];
    }

    #[test]
    #[should_panic]
    fn accessing_mut_out_of_bound_panics() {
        let mut b = DMatrix::<2, 1>::default();
        b[(0, 1)] = 0.3;
    }

    #[test]
    fn from_2d_array_works() {
        let b = DMatrix::from([[0.1], [-0.2]]);

        assert_eq!(b[(0, 0)], 0.1);
        assert_eq!(b[(1, 0)], -0.2);
    }

    #[test]
    fn affine_combination_works() {
        // w·x + b for a single hidden layer.
        let w = DMatrix::from([[0.5, -0.25], [1.0, 0.75]]);
        let x = DMatrix::from([[2.0], [4.0]]);

        let mut a = w.mul(x);
        a.add_ip(DMatrix::from([[0.1], [-0.1]]));

        assert_eq!(a[(0, 0)], 0.5 * 2.0 + -0.25 * 4.0 + 0.1);
        assert_eq!(a[(1, 0)], 1.0 * 2.0 + 0.75 * 4.0 + -0.1);
    }

    #[test]
    fn scalar_mul_scales_every_entry() {
        // Weight scaling with keep probability 0.8.
        let mut w = DMatrix::from([[0.5, -0.25], [1.0, 0.75]]);

        w.scalar_mul_ip(0.8);

        assert_eq!(w[(0, 0)], 0.5 * 0.8);
        assert_eq!(w[(0, 1)], -0.25 * 0.8);
        assert_eq!(w[(1, 0)], 1.0 * 0.8);
        assert_eq!(w[(1, 1)], 0.75 * 0.8);
    }

    #[test]
    fn mul_mut_writes_into_a_zeroed_output() {
        let a = DMatrix::<2, 2>::from([[0.5, -0.25], [1.0, 0.75]]);
        let b = DMatrix::<2, 2>::from([[0.2, 0.0], [0.0, 0.2]]);

        let expected = DMatrix::<2, 2>::from([[0.5 * 0.2, -0.25 * 0.2], [1.0 * 0.2, 0.75 * 0.2]]);

        let mut c = Default::default();
        a.mul_mut(b, &mut c);

        assert_eq!(c, expected);
    }

    #[test]
    fn debug_works() {
        let a = DMatrix::from([[0.5, -0.25], [1.0, 0.75]]);
        assert_eq!(format!("{:?}", a), "[[0.5, -0.25], [1.0, 0.75]]",);
    }

    #[test]
    fn eq_compares_entrywise() {
        let a = DMatrix::from([[0.3], [0.7]]);
        let b = DMatrix::from([[0.3], [0.7]]);
        let c = DMatrix::from([[0.3], [0.7001]]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
