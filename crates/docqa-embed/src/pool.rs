use anyhow::{ensure, Result};
use candle_core::Tensor;

const NORM_FLOOR: f64 = 1e-12;

/// Sentence vectors from token states: average the unmasked tokens of each
/// row, then scale the row to unit length. `[B,T,H]` + `[B,T]` -> `[B,H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, _hidden_dim) = hidden.dims3()?;
    ensure!(
        attention_mask.dims() == [batch, tokens],
        "attention mask {:?} does not match hidden states [{batch}, {tokens}, _]",
        attention_mask.dims()
    );

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    // an all-padding row averages to zero instead of NaN
    let counts = mask.sum_keepdim(1)?.maximum(1f64)?;
    let mean = summed.broadcast_div(&counts)?;

    let norms = mean.sqr()?.sum_keepdim(1)?.sqrt()?.maximum(NORM_FLOOR)?;
    Ok(mean.broadcast_div(&norms)?)
}
