//! Resizing of `tch` tensors laid out as `[H, W, C]` or `[N, H, W, C]`.

use crate::{
    common::*,
    resize::{invalid_rank, Resizer, SmartResize},
    size::TargetSize,
};
use tch::{Device, Kind, Tensor};

fn to_array(tensor: &Tensor) -> Result<ArrayD<f32>> {
    let shape: Vec<usize> = tensor.size().into_iter().map(|size| size as usize).collect();
    if !matches!(shape.len(), 3 | 4) {
        return Err(invalid_rank(&shape).into());
    }

    let values = Vec::<f32>::from(
        &tensor
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .contiguous()
            .view([-1i64]),
    );
    ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| invalid_rank(&shape).into())
}

fn from_array(array: ArrayD<f32>, device: Device) -> Tensor {
    let shape: Vec<i64> = array.shape().iter().map(|&size| size as i64).collect();
    let values: Vec<f32> = array.iter().cloned().collect();
    Tensor::of_slice(&values)
        .view(shape.as_slice())
        .to_device(device)
}

/// Resized tensors are `Float` and stay on the device of the input.
impl SmartResize for Tensor {
    fn smart_resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        let output = to_array(self)?.smart_resize(size, resizer)?;
        Ok(from_array(output, self.device()))
    }

    fn resize(&self, size: TargetSize, resizer: &Resizer) -> Result<Self> {
        let output = SmartResize::resize(&to_array(self)?, size, resizer)?;
        Ok(from_array(output, self.device()))
    }
}
