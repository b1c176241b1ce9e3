use crate::{error::Result, mat::Mat};

/// A single delegated processing routine applied to a working matrix
pub trait MatFilter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether the input is reduced to one intensity channel before [`apply`](Self::apply)
    fn requires_gray(&self) -> bool {
        true
    }

    /// Run the routine, producing a new matrix
    fn apply(&self, src: &Mat) -> Result<Mat>;
}
