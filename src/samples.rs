use ndarray::{Array1, Array2, ArrayBase, ArrayD, Data, Dimension, Ix1, Ix2, IxDyn};

use crate::error::{PredictError, PredictResult};

/// Merge the leading (chains, draws) axes into one sample axis, draws within chains.
pub fn flatten_samples<S, D, A>(samples: &ArrayBase<S, D>) -> PredictResult<ArrayD<A>>
where
    S: Data<Elem = A>,
    D: Dimension,
    A: Clone,
{
    let shape = samples.shape();
    if shape.len() < 2 {
        return Err(PredictError::configuration(format!(
            "posterior samples need (chains, draws, ...) axes, got shape {shape:?}"
        )));
    }

    let mut new_shape = Vec::with_capacity(shape.len() - 1);
    new_shape.push(shape[0] * shape[1]);
    new_shape.extend_from_slice(&shape[2..]);

    // `iter` follows logical order even for transposed or sliced views.
    let data: Vec<A> = samples.iter().cloned().collect();
    ArrayD::from_shape_vec(IxDyn(&new_shape), data)
        .map_err(|err| PredictError::configuration(format!("flatten samples: {err}")))
}

pub fn flatten_scalar<S>(samples: &ArrayBase<S, Ix2>) -> PredictResult<Array1<f64>>
where
    S: Data<Elem = f64>,
{
    flatten_samples(samples)?
        .into_dimensionality::<Ix1>()
        .map_err(|err| PredictError::configuration(format!("flatten scalar samples: {err}")))
}

pub fn flatten_per_team<S>(samples: &ArrayBase<S, ndarray::Ix3>) -> PredictResult<Array2<f64>>
where
    S: Data<Elem = f64>,
{
    flatten_samples(samples)?
        .into_dimensionality::<Ix2>()
        .map_err(|err| PredictError::configuration(format!("flatten per-team samples: {err}")))
}
